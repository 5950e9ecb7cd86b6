//! Code generation from an [`Ast`] back to regex source text
//!
//! `generate(parse(s)) == s` for every valid source whose flags are
//! already in canonical order.

use std::fmt;

use crate::ast::{AssertionKind, Ast, BackreferenceKind, Char, CharKind, NodeId, NodeKind};

/// Generate the `/pattern/flags` source of a whole expression
pub fn generate(ast: &Ast) -> String {
    generate_node(ast, ast.root())
}

/// Generate the source of one subtree
pub fn generate_node(ast: &Ast, id: NodeId) -> String {
    let mut out = String::new();
    write_node(ast, Some(id), &mut out);
    out
}

/// Source text of a single char, as written inside or outside a class
pub fn char_source(c: &Char) -> String {
    if c.kind == CharKind::Simple && c.escaped {
        format!("\\{}", c.value)
    } else {
        c.value.clone()
    }
}

fn write_node(ast: &Ast, id: Option<NodeId>, out: &mut String) {
    let Some(id) = id else {
        return;
    };
    match ast.kind(id) {
        NodeKind::RegExp { body, flags } => {
            out.push('/');
            write_node(ast, *body, out);
            out.push('/');
            out.push_str(flags.as_str());
        }
        NodeKind::Disjunction { left, right } => {
            write_node(ast, *left, out);
            out.push('|');
            write_node(ast, *right, out);
        }
        NodeKind::Alternative { expressions } => {
            for expression in expressions {
                write_node(ast, Some(*expression), out);
            }
        }
        NodeKind::Assertion {
            kind,
            negative,
            assertion,
        } => {
            let opener = match (kind, negative) {
                (AssertionKind::Start, _) => return out.push('^'),
                (AssertionKind::End, _) => return out.push('$'),
                (AssertionKind::WordBoundary, _) => return out.push_str("\\b"),
                (AssertionKind::NonWordBoundary, _) => return out.push_str("\\B"),
                (AssertionKind::Lookahead, false) => "(?=",
                (AssertionKind::Lookahead, true) => "(?!",
                (AssertionKind::Lookbehind, false) => "(?<=",
                (AssertionKind::Lookbehind, true) => "(?<!",
            };
            out.push_str(opener);
            write_node(ast, *assertion, out);
            out.push(')');
        }
        NodeKind::Char(c) => out.push_str(&char_source(c)),
        NodeKind::CharacterClass {
            negative,
            expressions,
        } => {
            out.push('[');
            if *negative {
                out.push('^');
            }
            for expression in expressions {
                write_node(ast, Some(*expression), out);
            }
            out.push(']');
        }
        NodeKind::ClassRange { from, to } => {
            out.push_str(&char_source(from));
            out.push('-');
            out.push_str(&char_source(to));
        }
        NodeKind::Backreference(backref) => match backref.kind {
            BackreferenceKind::Number => {
                out.push('\\');
                out.push_str(&backref.number.to_string());
            }
            BackreferenceKind::Name => {
                out.push_str("\\k<");
                out.push_str(backref.reference_raw.as_ref().unwrap_or(&backref.reference));
                out.push('>');
            }
        },
        NodeKind::Group(group) => {
            match (&group.name, group.capturing) {
                (Some(name), true) => {
                    out.push_str("(?<");
                    out.push_str(group.name_raw.as_ref().unwrap_or(name));
                    out.push('>');
                }
                (None, true) => out.push('('),
                (_, false) => out.push_str("(?:"),
            }
            write_node(ast, group.expression, out);
            out.push(')');
        }
        NodeKind::Repetition {
            expression,
            quantifier,
        } => {
            write_node(ast, Some(*expression), out);
            out.push_str(&quantifier.to_string());
        }
        NodeKind::UnicodeProperty(prop) => {
            out.push_str(if prop.negative { "\\P{" } else { "\\p{" });
            if prop.shorthand {
                out.push_str(&prop.value);
            } else if prop.binary {
                out.push_str(&prop.name);
            } else {
                out.push_str(&prop.name);
                out.push('=');
                out.push_str(&prop.value);
            }
            out.push('}');
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&generate(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn round_trip(source: &str) {
        let ast = parse(source).unwrap();
        assert_eq!(generate(&ast), source);
    }

    #[test]
    fn test_round_trip_literals_and_escapes() {
        round_trip("/abc/");
        round_trip("/a\\.b\\/c/");
        round_trip("/\\x41\\u0042\\cJ\\0\\012\\n/");
        round_trip("/\\u{1F600}/u");
        round_trip("/\\ud83d\\ude00/u");
    }

    #[test]
    fn test_round_trip_quantifiers() {
        round_trip("/a*b+?c?d{2}e{2,}f{2,5}?/");
    }

    #[test]
    fn test_round_trip_groups_and_assertions() {
        round_trip("/^(a)(?:b)(?<name>c)(?=d)(?!e)(?<=f)(?<!g)\\b\\B$/");
        round_trip("/(?<\\u0061>x)\\k<\\u0061>/");
        round_trip("/(a)\\1/");
    }

    #[test]
    fn test_round_trip_classes() {
        round_trip("/[^a-z\\d_-]/");
        round_trip("/[\\b\\-\\]]/");
        round_trip("/[\\p{L}\\P{Script=Greek}]/u");
    }

    #[test]
    fn test_round_trip_disjunction() {
        round_trip("/a|b|/");
        round_trip("/|a/");
        round_trip("/(|)/");
    }

    #[test]
    fn test_round_trip_sorts_flags() {
        let ast = parse("/a/yig").unwrap();
        assert_eq!(ast.to_string(), "/a/giy");
    }

    #[test]
    fn test_round_trip_missing_named_reference() {
        round_trip("/\\k<missing>/");
    }

    #[test]
    fn test_generate_node() {
        let ast = parse("/a(bc)/").unwrap();
        let group = ast.expressions(ast.body().unwrap())[1];
        assert_eq!(generate_node(&ast, group), "(bc)");
    }
}
