//! Thompson construction from a parsed AST
//!
//! Only the regular core is supported: chars with a fixed code point,
//! concatenation, alternation, groups and repetition.

use tracing::debug;

use crate::ast::{Ast, Group, NodeId, NodeKind, QuantifierKind};
use crate::error::{RegexError, Result};

use super::nfa::{Fragment, Nfa};

/// Build an NFA for the whole expression
pub fn build(ast: &Ast) -> Result<Nfa> {
    if ast.flags().has('i') {
        return Err(RegexError::Unsupported("the `i` flag".to_string()));
    }
    let mut nfa = Nfa::new();
    let fragment = match ast.body() {
        Some(body) => compile(&mut nfa, ast, body)?,
        None => nfa.epsilon(),
    };
    let nfa = nfa.finish(fragment);
    debug!(states = nfa.state_count(), "built NFA");
    Ok(nfa)
}

fn compile_optional(nfa: &mut Nfa, ast: &Ast, id: Option<NodeId>) -> Result<Fragment> {
    match id {
        Some(id) => compile(nfa, ast, id),
        None => Ok(nfa.epsilon()),
    }
}

fn compile(nfa: &mut Nfa, ast: &Ast, id: NodeId) -> Result<Fragment> {
    match ast.kind(id) {
        NodeKind::Alternative { expressions } => {
            let fragments = expressions
                .iter()
                .map(|item| compile(nfa, ast, *item))
                .collect::<Result<Vec<_>>>()?;
            Ok(nfa.concat(fragments))
        }
        NodeKind::Disjunction { left, right } => {
            let left = compile_optional(nfa, ast, *left)?;
            let right = compile_optional(nfa, ast, *right)?;
            Ok(nfa.or(vec![left, right]))
        }
        NodeKind::Group(Group { expression, .. }) => compile_optional(nfa, ast, *expression),
        NodeKind::Repetition {
            expression,
            quantifier,
        } => match quantifier.kind {
            QuantifierKind::ZeroOrMore => {
                let body = compile(nfa, ast, *expression)?;
                Ok(nfa.star(body))
            }
            QuantifierKind::OneOrMore => {
                let body = compile(nfa, ast, *expression)?;
                Ok(nfa.plus(body))
            }
            QuantifierKind::ZeroOrOne => {
                let body = compile(nfa, ast, *expression)?;
                Ok(nfa.optional(body))
            }
            QuantifierKind::Range { from, to } => compile_range(nfa, ast, *expression, from, to),
        },
        NodeKind::Char(c) => match c.code_point.and_then(char::from_u32) {
            Some(symbol) => Ok(nfa.char(symbol)),
            None => Err(RegexError::Unsupported(format!("Char `{}`", c.value))),
        },
        other => Err(RegexError::Unsupported(other.type_name().to_string())),
    }
}

/// `{n}`, `{n,}` and `{n,m}` as copies of the body
fn compile_range(
    nfa: &mut Nfa,
    ast: &Ast,
    expression: NodeId,
    from: u32,
    to: Option<u32>,
) -> Result<Fragment> {
    let mut fragments = Vec::new();
    for _ in 0..from {
        fragments.push(compile(nfa, ast, expression)?);
    }
    match to {
        None => {
            let body = compile(nfa, ast, expression)?;
            fragments.push(nfa.star(body));
        }
        Some(to) => {
            for _ in from..to {
                let body = compile(nfa, ast, expression)?;
                fragments.push(nfa.optional(body));
            }
        }
    }
    Ok(nfa.concat(fragments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn nfa(source: &str) -> Result<Nfa> {
        build(&parse(source)?)
    }

    #[test]
    fn test_build_core() {
        let nfa = nfa("/ab*c/").unwrap();
        assert!(nfa.matches("ac"));
        assert!(nfa.matches("abbbc"));
        assert!(!nfa.matches("abd"));
    }

    #[test]
    fn test_build_disjunction_and_groups() {
        let nfa = nfa("/(?:ab|c)+|/").unwrap();
        assert!(nfa.matches(""));
        assert!(nfa.matches("abcab"));
        assert!(!nfa.matches("ac"));
    }

    #[test]
    fn test_build_ranges() {
        let exact = nfa("/a{2}/").unwrap();
        assert!(exact.matches("aa"));
        assert!(!exact.matches("a"));
        assert!(!exact.matches("aaa"));

        let bounded = nfa("/a{1,3}b/").unwrap();
        assert!(bounded.matches("ab"));
        assert!(bounded.matches("aaab"));
        assert!(!bounded.matches("aaaab"));

        let open = nfa("/x(?:ab){2,}/").unwrap();
        assert!(open.matches("xabab"));
        assert!(open.matches("xababab"));
        assert!(!open.matches("xab"));

        let none = nfa("/a{0}b/").unwrap();
        assert!(none.matches("b"));
    }

    #[test]
    fn test_build_coded_chars() {
        let nfa = nfa("/\\x41\\u0042\\n/").unwrap();
        assert!(nfa.matches("AB\n"));
    }

    #[test]
    fn test_empty_pattern() {
        let nfa = nfa("/(?:)/").unwrap();
        assert!(nfa.matches(""));
        assert!(!nfa.matches("a"));
    }

    #[test]
    fn test_unsupported() {
        for source in ["/a./", "/\\d/", "/[ab]/", "/^a/", "/(a)\\1/", "/a/i", "/(?=a)/"] {
            assert!(
                matches!(nfa(source), Err(RegexError::Unsupported(_))),
                "{source} should be rejected"
            );
        }
    }
}
