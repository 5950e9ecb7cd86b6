//! Integration tests for the finite-automaton interpreter
//!
//! The automata are checked against the native engine on anchored
//! versions of the same patterns.

use regtree::{GroupMap, NativeRegex, RegexError, to_dfa, to_nfa};

/// Whole-input match through the native engine
fn native_full_match(source: &str, input: &str) -> bool {
    let body = &source[1..source.rfind('/').unwrap()];
    let anchored = format!("^(?:{})$", body);
    NativeRegex::compile(&anchored, "", GroupMap::new())
        .unwrap()
        .is_match(input)
}

const PATTERNS: &[&str] = &[
    "/ab*c/",
    "/(?:a|b)*abb/",
    "/a(?:bc)?d/",
    "/(?:a*b)*/",
    "/(?:ab|a)(?:bc|c)/",
    "/a{2,3}|b{2}/",
    "/(x(y))+z?/",
    "/(?:a+)?b/",
    "/|a/",
    "/\\x61\\u0062/",
];

const INPUTS: &[&str] = &[
    "", "a", "b", "ab", "ac", "abc", "abbc", "abb", "aabb", "babb", "ad", "abcd", "aab", "aaa",
    "aaaa", "bb", "xy", "xyz", "xyxy", "xyxyz", "abab",
];

#[test]
fn test_automata_agree_with_native() {
    for source in PATTERNS {
        let nfa = to_nfa(source).unwrap();
        let dfa = to_dfa(source).unwrap();
        let minimized = dfa.minimize();
        for input in INPUTS {
            let expected = native_full_match(source, input);
            assert_eq!(nfa.matches(input), expected, "NFA {} on {:?}", source, input);
            assert_eq!(dfa.matches(input), expected, "DFA {} on {:?}", source, input);
            assert_eq!(
                minimized.matches(input),
                expected,
                "minimized DFA {} on {:?}",
                source,
                input
            );
            assert_eq!(regtree::test(source, input).unwrap(), expected);
        }
    }
}

#[test]
fn test_minimization_never_grows() {
    for source in PATTERNS {
        let dfa = to_dfa(source).unwrap();
        assert!(dfa.minimize().state_count() <= dfa.state_count(), "{}", source);
    }
}

#[test]
fn test_classic_minimization() {
    // (a|b)*abb needs exactly four states
    let minimized = to_dfa("/(?:a|b)*abb/").unwrap().minimize();
    assert_eq!(minimized.state_count(), 4);
    assert_eq!(minimized.accepting_state_numbers().len(), 1);
}

#[test]
fn test_unsupported_features() {
    for source in ["/[a-z]/", "/a./", "/\\w/", "/a$/", "/(a)\\1/", "/(?<=a)b/", "/A/i", "/\\p{L}/u"] {
        match to_nfa(source) {
            Err(RegexError::Unsupported(what)) => assert!(!what.is_empty()),
            other => panic!("expected unsupported for {}, got {:?}", source, other.map(|_| ())),
        }
    }
}

#[test]
fn test_tables() {
    let nfa = to_nfa("/ab/").unwrap();
    let table = nfa.transition_table();
    assert_eq!(table.len(), nfa.state_count());
    assert_eq!(table[&1].transitions[&'a'], vec![2]);

    let dfa = to_dfa("/ab/").unwrap();
    let original = dfa.original_transition_table();
    assert_eq!(original.len(), dfa.state_count());
    assert!(original.iter().all(|state| !state.key.is_empty()));
}
