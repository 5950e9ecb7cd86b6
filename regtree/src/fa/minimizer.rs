//! DFA minimization by partition refinement
//!
//! Starts from the accepting / non-accepting split and keeps splitting
//! classes whose members disagree on the class reached by some symbol
//! until nothing changes. A missing transition counts as its own target,
//! so two states both lacking a transition on a symbol agree on it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::dfa::{Dfa, TransitionTable};

type Partition = Vec<BTreeSet<usize>>;

fn class_index(partition: &Partition) -> HashMap<usize, usize> {
    partition
        .iter()
        .enumerate()
        .flat_map(|(index, class)| class.iter().map(move |state| (*state, index)))
        .collect()
}

fn refine(dfa: &Dfa, partition: &Partition) -> Partition {
    let index = class_index(partition);
    let mut refined = Partition::new();
    for class in partition {
        let mut groups: BTreeMap<Vec<Option<usize>>, BTreeSet<usize>> = BTreeMap::new();
        for &state in class {
            let row = dfa.table.get(&state);
            let signature = dfa
                .alphabet
                .iter()
                .map(|symbol| {
                    row.and_then(|row| row.get(symbol))
                        .and_then(|target| index.get(target).copied())
                })
                .collect();
            groups.entry(signature).or_default().insert(state);
        }
        refined.extend(groups.into_values());
    }
    refined
}

/// Merge indistinguishable states of `dfa`
pub(super) fn minimize(dfa: &Dfa) -> Dfa {
    let (accepting, rejecting): (BTreeSet<usize>, BTreeSet<usize>) = dfa
        .table
        .keys()
        .copied()
        .partition(|state| dfa.accepting.contains(state));
    let mut partition: Partition = [rejecting, accepting]
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect();

    loop {
        let refined = refine(dfa, &partition);
        // classes only ever split, so equal counts mean equal partitions
        if refined.len() == partition.len() {
            break;
        }
        partition = refined;
    }

    // the class holding state 1 becomes the new start, the rest follow
    // in order of their smallest member
    partition.sort_by_key(|class| (!class.contains(&1), class.first().copied()));
    let index = class_index(&partition);

    let mut table = TransitionTable::new();
    let mut accepting = BTreeSet::new();
    for (position, class) in partition.iter().enumerate() {
        let number = position + 1;
        let mut row = BTreeMap::new();
        if let Some(representative) = class.first()
            && let Some(transitions) = dfa.table.get(representative)
        {
            for (symbol, target) in transitions {
                if let Some(target_class) = index.get(target) {
                    row.insert(*symbol, target_class + 1);
                }
            }
        }
        if class.iter().any(|state| dfa.accepting.contains(state)) {
            accepting.insert(number);
        }
        table.insert(number, row);
    }

    debug!(
        before = dfa.state_count(),
        after = table.len(),
        "minimized DFA"
    );
    Dfa {
        alphabet: dfa.alphabet.clone(),
        table,
        accepting,
        original: dfa.original.clone(),
        minimized: true,
    }
}

#[cfg(test)]
mod tests {
    use crate::fa::builder::build;
    use crate::fa::dfa::Dfa;
    use crate::parser::parse;

    fn dfa(source: &str) -> Dfa {
        Dfa::from_nfa(&build(&parse(source).unwrap()).unwrap())
    }

    #[test]
    fn test_minimize_merges_equivalent_states() {
        let original = dfa("/(?:a|b)*/");
        let minimized = original.minimize();
        assert_eq!(minimized.state_count(), 1);
        assert!(minimized.is_minimized());
        assert!(minimized.matches(""));
        assert!(minimized.matches("abba"));
        assert!(!minimized.matches("abc"));
    }

    #[test]
    fn test_minimize_keeps_language() {
        for source in ["/ab*c/", "/a(?:b|c)d|e/", "/(?:ab){1,3}/", "/a*b*a*/"] {
            let original = dfa(source);
            let minimized = original.minimize();
            assert!(minimized.state_count() <= original.state_count(), "{source}");
            for input in ["", "a", "ab", "ac", "abc", "abbc", "acd", "e", "abab", "ababab", "abababab", "aba", "bba"] {
                assert_eq!(
                    original.matches(input),
                    minimized.matches(input),
                    "{source} on {input:?}"
                );
            }
        }
    }

    #[test]
    fn test_start_state_is_one() {
        let minimized = dfa("/ab*c/").minimize();
        assert!(minimized.transition_table()[&1].contains_key(&'a'));
        assert_eq!(minimized.state_count(), 3);
    }

    #[test]
    fn test_original_table_survives() {
        let original = dfa("/a|b/");
        let minimized = original.minimize();
        assert_eq!(
            minimized.original_transition_table(),
            original.original_transition_table()
        );
    }
}
