/// Pick at most `max_count` evenly spaced items, keeping their order.
///
/// When `items.len() <= max_count` every item is returned unchanged. Otherwise
/// item `round(i * (n - 1) / (max_count - 1))` is taken for each `i` in
/// `0..max_count`, so the first and last items are always included. Rounding is
/// half away from zero (`f64::round`): with 10 items and 3 samples the middle
/// index is `round(4.5) = 5`.
///
/// Degenerate counts: `max_count == 0` selects nothing and `max_count == 1`
/// selects only the first item.
pub fn select_evenly<T>(items: Vec<T>, max_count: usize) -> Vec<T> {
    let n = items.len();

    if n <= max_count {
        return items;
    }

    match max_count {
        0 => return Vec::new(),
        1 => return items.into_iter().take(1).collect(),
        _ => {}
    }

    let indices = even_indices(n, max_count);
    let mut wanted = indices.iter().peekable();

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if wanted.peek() == Some(&&index) {
                wanted.next();
                Some(item)
            } else {
                None
            }
        })
        .collect()
}

/// Indices chosen by [`select_evenly`] for `n` items and `k >= 2` samples, `k < n`
fn even_indices(n: usize, k: usize) -> Vec<usize> {
    let step = (n - 1) as f64 / (k - 1) as f64;

    // step > 1 when k < n, so rounded indices are strictly increasing
    (0..k).map(|i| (i as f64 * step).round() as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_index_rounds_half_up() {
        assert_eq!(even_indices(10, 3), [0, 5, 9]);
        assert_eq!(even_indices(4, 3), [0, 2, 3]);
    }

    #[test]
    fn indices_are_strictly_increasing_and_span_the_range() {
        for n in 2..60 {
            for k in 2..n {
                let indices = even_indices(n, k);
                assert_eq!(indices.len(), k);
                assert_eq!(indices[0], 0);
                assert_eq!(indices[k - 1], n - 1);
                assert!(indices.windows(2).all(|w| w[0] < w[1]), "n={n} k={k}");
            }
        }
    }
}
