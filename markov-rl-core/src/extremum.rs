//! Extremum search over restricted index sets
//!
//! Every algorithm that picks a best action does so through these two
//! functions, so the tie-break is uniform across the workspace: the first
//! index in iteration order achieving the maximum wins (strict `>` while
//! scanning, so later ties never overwrite an earlier winner).

/// Largest value among `values` at the given indices
///
/// # Panics
///
/// Panics if `indices` is empty or references an index outside `values`;
/// both are contract violations in the caller.
#[must_use]
pub fn max_value(indices: &[usize], values: &[f64]) -> f64 {
    values[arg_max_value(indices, values)]
}

/// Index into `values` achieving the largest value over `indices`
///
/// # Panics
///
/// Panics if `indices` is empty or references an index outside `values`;
/// both are contract violations in the caller.
#[must_use]
pub fn arg_max_value(indices: &[usize], values: &[f64]) -> usize {
    assert!(!indices.is_empty(), "arg_max_value: empty index set");

    let mut arg = indices[0];
    let mut max = values[arg];
    for &index in &indices[1..] {
        if values[index] > max {
            max = values[index];
            arg = index;
        }
    }
    arg
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn finds_maximum_over_a_restricted_set() {
        let values = [5.0, -1.0, 7.0, 3.0];
        // Index 2 is excluded, so 5.0 at index 0 is the best reachable value.
        assert_eq!(arg_max_value(&[0, 1, 3], &values), 0);
        assert_eq!(max_value(&[0, 1, 3], &values), 5.0);
    }

    #[test]
    fn first_maximal_index_wins_ties() {
        let values = [2.0, 4.0, 4.0, 4.0];
        assert_eq!(arg_max_value(&[1, 2, 3], &values), 1);
        assert_eq!(arg_max_value(&[3, 2, 1], &values), 3);
    }

    #[test]
    fn singleton_index_set() {
        let values = [1.0, 2.0];
        assert_eq!(arg_max_value(&[1], &values), 1);
    }

    #[test]
    #[should_panic(expected = "empty index set")]
    fn empty_index_set_panics() {
        arg_max_value(&[], &[1.0]);
    }

    proptest! {
        #[test]
        fn argmax_dominates_every_listed_index(
            values in proptest::collection::vec(-1e6f64..1e6, 1..32),
            seed_indices in proptest::collection::vec(0usize..32, 1..16),
        ) {
            let indices: Vec<usize> = seed_indices
                .into_iter()
                .map(|i| i % values.len())
                .collect();

            let arg = arg_max_value(&indices, &values);
            prop_assert!(indices.contains(&arg));
            for &index in &indices {
                prop_assert!(values[index] <= values[arg]);
            }
        }
    }
}
