use dashpanel_relay::{DEFAULT_CAPACITY, LogRing};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ring_keeps_most_recent_in_write_order(count in 0usize..1500, window in 0usize..600) {
        let mut ring = LogRing::default();
        for i in 0..count {
            ring.push(i.to_string());
        }
        let kept = count.min(DEFAULT_CAPACITY);
        prop_assert_eq!(ring.len(), kept);

        let tail = ring.tail(window);
        let shown = kept.min(window);
        let expected: Vec<String> = (count - shown..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(tail, expected);
    }
}
