mod common;

use common::video_track;
use mp4inspect::tracks::TrackStore;
use proptest::prelude::*;

proptest! {
    /// Presentation order sorts by pts and keeps the decode-order tie break.
    #[test]
    fn presentation_order_is_sorted_and_stable(pts in prop::collection::vec(0i64..100_000, 1..64)) {
        let mut store = TrackStore::new();
        store.load(&[video_track("avc1", &pts, &[0])]);

        let order = store.presentation_order(0).unwrap();
        prop_assert_eq!(order.len(), pts.len());

        // Every sample appears exactly once
        let mut seen = vec![false; pts.len()];
        for &idx in order {
            prop_assert!(!seen[idx]);
            seen[idx] = true;
        }

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(pts[a] <= pts[b]);
            if pts[a] == pts[b] {
                // Equal timestamps keep decode order
                prop_assert!(a < b);
            }
        }
    }

    /// Resolving every presentation index round-trips through the order table.
    #[test]
    fn sample_index_at_matches_order(pts in prop::collection::vec(0i64..100_000, 1..64)) {
        let mut store = TrackStore::new();
        store.load(&[video_track("avc1", &pts, &[0])]);

        for play_pos in 0..pts.len() {
            let idx = store.sample_index_at(0, play_pos).unwrap();
            prop_assert_eq!(idx, store.presentation_order(0).unwrap()[play_pos]);
        }
        prop_assert!(store.sample_index_at(0, pts.len()).is_none());
    }
}
