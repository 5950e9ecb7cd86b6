//! Finite automata for the regular subset of the syntax
//!
//! A pattern is compiled to an NFA by Thompson construction, turned into a
//! DFA by subset construction and minimized by partition refinement.
//! Classes, anchors, lookaround, backreferences and the `i` flag are
//! rejected with [`RegexError::Unsupported`](crate::RegexError::Unsupported).

mod builder;
mod dfa;
mod minimizer;
mod nfa;

pub use builder::build as nfa_from_ast;
pub use dfa::{CombinedState, Dfa, TransitionTable};
pub use nfa::{Fragment, Nfa, NfaRow, NfaTable, State, StateId, Transition};

use crate::error::Result;
use crate::parser::parse;

/// Compile `source` (`/pattern/flags`) to an NFA
pub fn to_nfa(source: &str) -> Result<Nfa> {
    builder::build(&parse(source)?)
}

/// Compile `source` to a DFA, not minimized
pub fn to_dfa(source: &str) -> Result<Dfa> {
    Ok(Dfa::from_nfa(&to_nfa(source)?))
}

/// Whether the minimized DFA for `source` accepts the whole of `input`
pub fn test(source: &str, input: &str) -> Result<bool> {
    Ok(to_dfa(source)?.minimize().matches(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegexError;

    #[test]
    fn test_entry_points_agree() {
        let inputs = ["", "ac", "abc", "abbbc", "abd", "a", "bc"];
        let nfa = to_nfa("/ab*c/").unwrap();
        let dfa = to_dfa("/ab*c/").unwrap();
        let minimized = dfa.minimize();
        for input in inputs {
            let expected = nfa.matches(input);
            assert_eq!(dfa.matches(input), expected, "{input:?}");
            assert_eq!(minimized.matches(input), expected, "{input:?}");
            assert_eq!(test("/ab*c/", input).unwrap(), expected, "{input:?}");
        }
        assert!(test("/ab*c/", "ac").unwrap());
        assert!(test("/ab*c/", "abbbc").unwrap());
        assert!(!test("/ab*c/", "abd").unwrap());
    }

    #[test]
    fn test_errors_propagate() {
        assert!(matches!(test("/a[b]/", "ab"), Err(RegexError::Unsupported(_))));
        assert!(to_nfa("/(/").is_err());
    }

    #[test]
    fn test_unsupported_message() {
        let err = to_dfa("/\\d/").unwrap_err();
        assert!(
            err.to_string()
                .ends_with("is not supported in NFA/DFA interpreter")
        );
    }
}
