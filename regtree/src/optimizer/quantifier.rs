//! Rules rewriting repetitions

use crate::ast::{Ast, NodeKind, Quantifier, QuantifierKind};
use crate::traverse::{Handler, NodePath, Visit};

use super::{ends_with_numeric_escape, precedes_digit};

fn set_quantifier(ast: &mut Ast, path: NodePath, new: Quantifier) {
    if let NodeKind::Repetition { quantifier, .. } = ast.kind_mut(path.id()) {
        *quantifier = new;
    }
}

/// Fold a repetition into the preceding copy of its body:
/// `a{1,2}a{2,3}` to `a{3,5}`, `aa*` to `a+`
pub(super) struct QuantifiersMerge;

impl QuantifiersMerge {
    fn merged(previous: Quantifier, current: Quantifier) -> Option<Quantifier> {
        let open = previous.is_greedy_open_range() || current.is_greedy_open_range();
        if previous.greedy != current.greedy && !open {
            return None;
        }
        let (previous_from, previous_to) = previous.bounds();
        let (from, to) = current.bounds();
        let to = match (previous_to, to) {
            (Some(a), Some(b)) => Some(a.checked_add(b)?),
            _ => None,
        };
        Some(Quantifier {
            kind: QuantifierKind::Range {
                from: previous_from.checked_add(from)?,
                to,
            },
            greedy: current.greedy || open,
        })
    }
}

impl Handler for QuantifiersMerge {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let NodeKind::Repetition {
            expression,
            quantifier,
        } = *path.node(ast)
        else {
            return Visit::Continue;
        };
        let Some(previous) = path.previous_sibling(ast) else {
            return Visit::Continue;
        };

        let new = match *previous.node(ast) {
            NodeKind::Repetition {
                expression: previous_expression,
                quantifier: previous_quantifier,
            } => {
                if !ast.same_source(previous_expression, expression) {
                    return Visit::Continue;
                }
                match Self::merged(previous_quantifier, quantifier) {
                    Some(new) => new,
                    None => return Visit::Continue,
                }
            }
            _ => {
                if !ast.same_source(previous.id(), expression) {
                    return Visit::Continue;
                }
                match quantifier.incremented() {
                    Some(new) => new,
                    None => return Visit::Continue,
                }
            }
        };
        set_quantifier(ast, path, new);
        previous.remove(ast);
        Visit::Continue
    }
}

/// `{0,}` to `*`, `{1,}` to `+`, `{0,1}` to `?` and `a{1}` to `a`
pub(super) struct RangeToSymbol;

impl Handler for RangeToSymbol {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let NodeKind::Repetition {
            expression,
            quantifier,
        } = *path.node(ast)
        else {
            return Visit::Continue;
        };
        let QuantifierKind::Range { from, to } = quantifier.kind else {
            return Visit::Continue;
        };
        let kind = match (from, to) {
            (0, None) => QuantifierKind::ZeroOrMore,
            (1, None) => QuantifierKind::OneOrMore,
            (0, Some(1)) => QuantifierKind::ZeroOrOne,
            (1, Some(1)) => {
                // `\1{1}0` must not become `\10`
                if !(ends_with_numeric_escape(ast, expression) && precedes_digit(ast, path)) {
                    path.replace_with(ast, expression);
                }
                return Visit::Continue;
            }
            _ => return Visit::Continue,
        };
        set_quantifier(
            ast,
            path,
            Quantifier {
                kind,
                greedy: quantifier.greedy,
            },
        );
        Visit::Continue
    }
}
