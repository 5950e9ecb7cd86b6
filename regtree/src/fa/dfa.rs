//! DFA built from an NFA by subset construction
//!
//! Each DFA state is the epsilon-closed set of NFA states reachable on the
//! same input. Sets are keyed by their sorted, comma-joined NFA state
//! numbers and renumbered from 1 in discovery order; a set with no
//! successor on some symbol simply has no transition there.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::debug;

use super::minimizer;
use super::nfa::{Nfa, NfaTable};

/// DFA transitions: state number to successor per input char
pub type TransitionTable = BTreeMap<usize, BTreeMap<char, usize>>;

/// A DFA state as found by subset construction, before renumbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedState {
    /// Number assigned in discovery order
    pub number: usize,
    /// Comma-joined NFA state numbers, e.g. `1,2,5`
    pub key: String,
    /// Successor keys per input char
    pub transitions: BTreeMap<char, String>,
    /// Whether some member NFA state accepts
    pub accepting: bool,
}

/// A DFA (Deterministic Finite Automaton)
#[derive(Debug, Clone)]
pub struct Dfa {
    pub(super) alphabet: BTreeSet<char>,
    pub(super) table: TransitionTable,
    pub(super) accepting: BTreeSet<usize>,
    pub(super) original: Vec<CombinedState>,
    pub(super) minimized: bool,
}

fn key_of(states: &BTreeSet<usize>) -> String {
    states
        .iter()
        .map(|state| state.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn closure_of(table: &NfaTable, state: usize) -> &[usize] {
    table
        .get(&state)
        .map(|row| row.closure.as_slice())
        .unwrap_or(&[])
}

impl Dfa {
    /// Subset construction over `nfa`
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let nfa_table: NfaTable = nfa.transition_table();
        let nfa_accepting = nfa.accepting_state_numbers();
        let alphabet = nfa.alphabet();

        let start: BTreeSet<usize> = closure_of(&nfa_table, 1).iter().copied().collect();
        let mut numbers: HashMap<String, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        numbers.insert(key_of(&start), 1);
        queue.push_back(start);

        let mut table = TransitionTable::new();
        let mut accepting = BTreeSet::new();
        let mut original = Vec::new();

        while let Some(set) = queue.pop_front() {
            let key = key_of(&set);
            let number = numbers[&key];
            let is_accepting = set.iter().any(|state| nfa_accepting.contains(state));
            if is_accepting {
                accepting.insert(number);
            }

            let mut row = BTreeMap::new();
            let mut combined = BTreeMap::new();
            for &symbol in &alphabet {
                let mut next = BTreeSet::new();
                for state in &set {
                    let Some(targets) = nfa_table
                        .get(state)
                        .and_then(|row| row.transitions.get(&symbol))
                    else {
                        continue;
                    };
                    for target in targets {
                        next.extend(closure_of(&nfa_table, *target).iter().copied());
                    }
                }
                if next.is_empty() {
                    continue;
                }

                let next_key = key_of(&next);
                let next_number = match numbers.get(&next_key) {
                    Some(existing) => *existing,
                    None => {
                        let assigned = numbers.len() + 1;
                        numbers.insert(next_key.clone(), assigned);
                        queue.push_back(next);
                        assigned
                    }
                };
                row.insert(symbol, next_number);
                combined.insert(symbol, next_key);
            }

            table.insert(number, row);
            original.push(CombinedState {
                number,
                key,
                transitions: combined,
                accepting: is_accepting,
            });
        }

        debug!(
            nfa_states = nfa.state_count(),
            dfa_states = table.len(),
            "subset construction done"
        );
        Dfa {
            alphabet,
            table,
            accepting,
            original,
            minimized: false,
        }
    }

    /// Input chars with a transition somewhere
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Transitions by state number; state 1 is the start
    pub fn transition_table(&self) -> &TransitionTable {
        &self.table
    }

    /// Numbers of the accepting states
    pub fn accepting_state_numbers(&self) -> &BTreeSet<usize> {
        &self.accepting
    }

    /// The combined-state table from subset construction, kept across
    /// minimization
    pub fn original_transition_table(&self) -> &[CombinedState] {
        &self.original
    }

    /// Number of states
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Whether this DFA came out of [`Dfa::minimize`]
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Equivalent DFA with indistinguishable states merged
    pub fn minimize(&self) -> Dfa {
        minimizer::minimize(self)
    }

    /// Whether the DFA accepts the whole of `input`
    pub fn matches(&self, input: &str) -> bool {
        let mut state = 1;
        for c in input.chars() {
            match self.table.get(&state).and_then(|row| row.get(&c)) {
                Some(next) => state = *next,
                None => return false,
            }
        }
        self.accepting.contains(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fa::builder::build;
    use crate::parser::parse;

    fn dfa(source: &str) -> Dfa {
        Dfa::from_nfa(&build(&parse(source).unwrap()).unwrap())
    }

    #[test]
    fn test_subset_construction() {
        let dfa = dfa("/ab*c/");
        assert!(dfa.matches("ac"));
        assert!(dfa.matches("abbbc"));
        assert!(!dfa.matches("abd"));
        assert!(!dfa.matches("ab"));
        assert!(!dfa.is_minimized());
    }

    #[test]
    fn test_states_numbered_from_one() {
        let dfa = dfa("/ab/");
        let numbers: Vec<usize> = dfa.transition_table().keys().copied().collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(dfa.transition_table()[&1][&'a'], 2);
        assert_eq!(dfa.transition_table()[&2][&'b'], 3);
        assert_eq!(dfa.accepting_state_numbers(), &BTreeSet::from([3]));
    }

    #[test]
    fn test_original_table_keys() {
        let dfa = dfa("/a/");
        let original = dfa.original_transition_table();
        assert_eq!(original.len(), 2);
        assert_eq!(original[0].key, "1");
        assert_eq!(original[0].transitions[&'a'], original[1].key);
        assert!(original[1].accepting);
    }

    #[test]
    fn test_empty_language_parts() {
        let dfa = dfa("/(?:)/");
        assert!(dfa.matches(""));
        assert!(!dfa.matches("a"));
        assert!(dfa.alphabet().is_empty());
    }
}
