//! Declarative layout description.
//!
//! Slots are written as `[id, width, height]` or `[]` for an absent child,
//! which keeps the encoding expressible in TOML (which has no null):
//!
//! ```toml
//! slots = [[0, 6, 8], [1, 4, 6], [], [2, 4, 4], [], [], [3, 6, 2], [], []]
//!
//! [panes]
//! Source = 0
//! ValueHistory = 1
//! Stack = 2
//! Breakpoints = 3
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::tree::SlotId;

/// One declared slot on the unit grid.
///
/// Width and height are kept signed so out-of-range values survive parsing
/// and are reported by validation with the offending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub id: SlotId,
    pub width: i32,
    pub height: i32,
}

impl SlotSpec {
    #[must_use]
    pub const fn new(id: SlotId, width: i32, height: i32) -> Self {
        Self { id, width, height }
    }

    /// Width and height in units, validated to `(0, 10]`.
    pub fn units(&self) -> Result<(u8, u8), LayoutError> {
        let in_range = |v: i32| (1..=i32::from(crate::GRID_UNITS)).contains(&v);
        if in_range(self.width) && in_range(self.height) {
            // Both are within 1..=10.
            Ok((self.width as u8, self.height as u8))
        } else {
            Err(LayoutError::UnitOutOfRange {
                slot: self.id,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// A pre-order element: a slot or an absent child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct SlotEntry(pub Option<SlotSpec>);

impl TryFrom<Vec<i64>> for SlotEntry {
    type Error = String;

    fn try_from(raw: Vec<i64>) -> Result<Self, Self::Error> {
        match raw.as_slice() {
            [] => Ok(Self(None)),
            &[id, width, height] => {
                let id = SlotId::try_from(id).map_err(|_| format!("invalid slot id {id}"))?;
                let unit = |v: i64| i32::try_from(v).unwrap_or(i32::MAX);
                Ok(Self(Some(SlotSpec::new(id, unit(width), unit(height)))))
            }
            other => Err(format!(
                "slot entry must be [id, width, height] or [], got {} values",
                other.len()
            )),
        }
    }
}

impl From<SlotEntry> for Vec<i64> {
    fn from(entry: SlotEntry) -> Self {
        match entry.0 {
            Some(spec) => vec![
                i64::from(spec.id),
                i64::from(spec.width),
                i64::from(spec.height),
            ],
            None => Vec::new(),
        }
    }
}

impl From<Option<SlotSpec>> for SlotEntry {
    fn from(spec: Option<SlotSpec>) -> Self {
        Self(spec)
    }
}

/// Slot tree plus the pane-name to slot-id mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub slots: Vec<SlotEntry>,
    pub panes: BTreeMap<String, SlotId>,
}

impl LayoutConfig {
    pub fn new(slots: impl IntoIterator<Item = Option<SlotSpec>>) -> Self {
        Self {
            slots: slots.into_iter().map(SlotEntry).collect(),
            panes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_pane(mut self, pane: impl Into<String>, slot: SlotId) -> Self {
        self.panes.insert(pane.into(), slot);
        self
    }

    /// Declared slots in encoding order.
    pub fn declared(&self) -> impl Iterator<Item = &SlotSpec> {
        self.slots.iter().filter_map(|entry| entry.0.as_ref())
    }

    /// Check unit ranges and the pane mapping against the known pane names.
    ///
    /// Every declared slot must end up with exactly one pane.
    pub fn validate(&self, pane_names: &[&str]) -> Result<(), LayoutError> {
        let mut mapping: BTreeMap<SlotId, Option<&str>> = BTreeMap::new();
        for spec in self.declared() {
            spec.units()?;
            mapping.insert(spec.id, None);
        }

        for (pane, &slot) in &self.panes {
            if !pane_names.contains(&pane.as_str()) {
                return Err(LayoutError::UnknownPane { pane: pane.clone() });
            }
            match mapping.get_mut(&slot) {
                None => {
                    return Err(LayoutError::UnknownSlot {
                        pane: pane.clone(),
                        slot,
                    });
                }
                Some(Some(first)) => {
                    return Err(LayoutError::ConflictingAssignment {
                        slot,
                        first: (*first).to_owned(),
                        second: pane.clone(),
                    });
                }
                Some(entry) => *entry = Some(pane.as_str()),
            }
        }

        match mapping.iter().find(|(_, pane)| pane.is_none()) {
            Some((&slot, _)) => Err(LayoutError::UnfilledSlot { slot }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["Source", "Stack", "Breakpoints", "ValueHistory", "Log"];

    fn four_slots() -> LayoutConfig {
        LayoutConfig::new([
            Some(SlotSpec::new(0, 6, 8)),
            Some(SlotSpec::new(1, 4, 6)),
            None,
            Some(SlotSpec::new(2, 4, 4)),
            None,
            None,
            Some(SlotSpec::new(3, 6, 2)),
            None,
            None,
        ])
        .with_pane("Source", 0)
        .with_pane("ValueHistory", 1)
        .with_pane("Stack", 2)
        .with_pane("Breakpoints", 3)
    }

    #[test]
    fn valid_mapping_passes() {
        assert_eq!(four_slots().validate(NAMES), Ok(()));
    }

    #[test]
    fn unit_out_of_range() {
        let config = LayoutConfig::new([Some(SlotSpec::new(0, 11, 10)), None, None])
            .with_pane("Source", 0);
        assert_eq!(
            config.validate(NAMES),
            Err(LayoutError::UnitOutOfRange {
                slot: 0,
                width: 11,
                height: 10
            })
        );
        let zero = LayoutConfig::new([Some(SlotSpec::new(0, 10, 0)), None, None]);
        assert!(matches!(
            zero.validate(NAMES),
            Err(LayoutError::UnitOutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_pane() {
        let config = four_slots().with_pane("Registers", 0);
        assert_eq!(
            config.validate(NAMES),
            Err(LayoutError::UnknownPane {
                pane: "Registers".into()
            })
        );
    }

    #[test]
    fn unknown_slot() {
        let config = four_slots().with_pane("Log", 7);
        assert_eq!(
            config.validate(NAMES),
            Err(LayoutError::UnknownSlot {
                pane: "Log".into(),
                slot: 7
            })
        );
    }

    #[test]
    fn conflicting_assignment() {
        let config = four_slots().with_pane("Log", 3);
        assert_eq!(
            config.validate(NAMES),
            Err(LayoutError::ConflictingAssignment {
                slot: 3,
                first: "Breakpoints".into(),
                second: "Log".into(),
            })
        );
    }

    #[test]
    fn unfilled_slot() {
        let mut config = four_slots();
        config.panes.remove("Stack");
        assert_eq!(
            config.validate(NAMES),
            Err(LayoutError::UnfilledSlot { slot: 2 })
        );
    }

    #[test]
    fn parses_from_toml() {
        let config: LayoutConfig = toml::from_str(
            r#"
            slots = [[0, 6, 8], [1, 4, 6], [], [2, 4, 4], [], [], [3, 6, 2], [], []]

            [panes]
            Source = 0
            ValueHistory = 1
            Stack = 2
            Breakpoints = 3
            "#,
        )
        .unwrap();
        assert_eq!(config, four_slots());
    }

    #[test]
    fn parses_from_json_and_rejects_bad_arity() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"slots": [[0, 10, 10], [], []], "panes": {"Log": 0}}"#)
                .unwrap();
        assert_eq!(config.declared().count(), 1);

        let err = serde_json::from_str::<LayoutConfig>(r#"{"slots": [[0, 10]]}"#).unwrap_err();
        assert!(err.to_string().contains("slot entry must be"));
    }
}
