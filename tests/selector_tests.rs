// Integration tests for evenly spaced sample selection
//
// These tests verify that the selector bounds the number of samples while
// keeping the first and last chunk and the original ordering.

use mix_identify::pipeline::select_evenly;

#[test]
fn test_undersized_input_is_returned_unchanged() {
    let items = vec![(0u64, "a"), (3, "b"), (6, "c")];

    assert_eq!(select_evenly(items.clone(), 3), items);
    assert_eq!(select_evenly(items.clone(), 10), items);
    assert!(select_evenly(Vec::<u64>::new(), 3).is_empty());
}

#[test]
fn test_selects_exactly_max_count_including_endpoints() {
    for n in 2..40u64 {
        let items: Vec<u64> = (0..n).collect();

        for k in 2..=n as usize {
            let selected = select_evenly(items.clone(), k);

            assert_eq!(selected.len(), k, "n={} k={}", n, k);
            assert_eq!(selected.first(), Some(&0));
            assert_eq!(selected.last(), Some(&(n - 1)));
            assert!(
                selected.windows(2).all(|w| w[0] < w[1]),
                "selection should keep input order: {:?}",
                selected
            );
        }
    }
}

#[test]
fn test_ten_chunks_three_samples() {
    // 30s window, 3s chunks: timestamps 0, 3, ..., 27
    let timestamps: Vec<u64> = (0..10).map(|i| i * 3).collect();

    // step = 9 / 2 = 4.5, which rounds up to index 5
    assert_eq!(select_evenly(timestamps, 3), vec![0, 15, 27]);
}

#[test]
fn test_degenerate_max_counts() {
    let items = vec!["first", "second", "third"];

    assert_eq!(select_evenly(items.clone(), 1), vec!["first"]);
    assert!(select_evenly(items, 0).is_empty());
}
