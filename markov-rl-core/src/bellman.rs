//! Bellman expectation kernel shared by the planning algorithms

use crate::mdp::Mdp;

/// Expected utility of taking `action` in `state` under `utilities`
///
/// Computes `sum over s' of P(s' | state, action) * utilities[s']`.
#[must_use]
pub fn expected_utility(mdp: &Mdp, state: usize, utilities: &[f64], action: usize) -> f64 {
    mdp.transitions[state][action]
        .iter()
        .zip(utilities)
        .map(|(p, u)| p * u)
        .sum()
}

/// Maximum expected utility over the actions available in `state`
///
/// Returns the maximum together with the maximizing action; ties go to the
/// first action encountered in the state's action list.
///
/// # Panics
///
/// Panics if `state` has no available actions. Callers must guard dead
/// states and report a sentinel instead.
#[must_use]
pub fn max_expected_utility(mdp: &Mdp, state: usize, utilities: &[f64]) -> (f64, usize) {
    let actions = &mdp.actions[state];
    assert!(
        !actions.is_empty(),
        "max_expected_utility: state {state} has no available actions"
    );

    let mut best_action = actions[0];
    let mut best = expected_utility(mdp, state, utilities, best_action);
    for &action in &actions[1..] {
        let eu = expected_utility(mdp, state, utilities, action);
        if eu > best {
            best = eu;
            best_action = action;
        }
    }
    (best, best_action)
}
