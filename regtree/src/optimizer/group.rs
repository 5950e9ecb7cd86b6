//! Rules rewriting groups and disjunctions

use std::collections::BTreeMap;

use crate::ast::{Ast, Char, CharKind, NodeId, NodeKind};
use crate::generator::generate_node;
use crate::traverse::{Handler, NodePath, Visit};

use super::fuses_tokens;

/// Alternatives of a left-leaning disjunction chain, left to right
fn disjunction_parts(ast: &Ast, id: NodeId, parts: &mut Vec<Option<NodeId>>) {
    if let NodeKind::Disjunction { left, right } = *ast.kind(id) {
        match left {
            Some(left) if matches!(ast.kind(left), NodeKind::Disjunction { .. }) => {
                disjunction_parts(ast, left, parts)
            }
            _ => parts.push(left),
        }
        parts.push(right);
    }
}

/// `a|b|a` to `a|b`
pub(super) struct DisjunctionRemoveDuplicates;

impl Handler for DisjunctionRemoveDuplicates {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        if !matches!(path.node(ast), NodeKind::Disjunction { .. }) {
            return Visit::Continue;
        }
        let mut parts = Vec::new();
        disjunction_parts(ast, path.id(), &mut parts);

        let mut unique: Vec<Option<NodeId>> = Vec::with_capacity(parts.len());
        for part in &parts {
            let seen = unique.iter().any(|kept| match (kept, part) {
                (Some(a), Some(b)) => ast.same_source(*a, *b),
                (None, None) => true,
                _ => false,
            });
            if !seen {
                unique.push(*part);
            }
        }
        if unique.len() == parts.len() {
            return Visit::Continue;
        }

        let mut rest = unique.into_iter();
        let mut chain = rest.next().flatten();
        for right in rest {
            chain = Some(ast.alloc(NodeKind::Disjunction { left: chain, right }));
        }
        match chain {
            Some(chain) => {
                path.replace_with(ast, chain);
            }
            None => path.remove(ast),
        }
        Visit::Continue
    }
}

/// `a|b|c` to `[abc]`, `(?:a|[bc])` to `[abc]`
pub(super) struct SingleCharsToCharClass;

impl SingleCharsToCharClass {
    /// Collect class items keyed by their source; `false` if some
    /// alternative is not a single char or a plain class
    fn collect(ast: &Ast, id: Option<NodeId>, items: &mut BTreeMap<String, NodeKind>) -> bool {
        let Some(id) = id else {
            return false;
        };
        match ast.kind(id) {
            NodeKind::Disjunction { left, right } => {
                Self::collect(ast, *left, items) && Self::collect(ast, *right, items)
            }
            NodeKind::Char(c) if !c.is_dot() => {
                items.insert(generate_node(ast, id), NodeKind::Char(in_class(c)));
                true
            }
            NodeKind::CharacterClass {
                negative: false,
                expressions,
            } => {
                for item in expressions {
                    items.insert(generate_node(ast, *item), ast.kind(*item).clone());
                }
                true
            }
            _ => false,
        }
    }
}

/// A char lifted into a class, escaped only where the class needs it
fn in_class(c: &Char) -> Char {
    match (c.kind, c.symbol) {
        (CharKind::Simple, Some(symbol)) => Char {
            escaped: matches!(symbol, ']' | '\\' | '-'),
            ..c.clone()
        },
        _ => c.clone(),
    }
}

impl Handler for SingleCharsToCharClass {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        if !matches!(path.node(ast), NodeKind::Disjunction { .. }) {
            return Visit::Continue;
        }
        let Some(parent) = path.parent(ast) else {
            return Visit::Continue;
        };
        let target = match parent.node(ast) {
            NodeKind::RegExp { .. } => path,
            NodeKind::Group(group) if group.capturing => path,
            NodeKind::Group(_) => parent,
            _ => return Visit::Continue,
        };

        let mut items = BTreeMap::new();
        if !Self::collect(ast, Some(path.id()), &mut items) || items.is_empty() {
            return Visit::Continue;
        }
        let mut kinds: Vec<NodeKind> = items.into_values().collect();
        if let Some(NodeKind::Char(first)) = kinds.first_mut()
            && first.kind == CharKind::Simple
            && first.symbol == Some('^')
        {
            first.escaped = true;
        }
        let expressions = kinds.into_iter().map(|kind| ast.alloc(kind)).collect();
        target.replace(
            ast,
            NodeKind::CharacterClass {
                negative: false,
                expressions,
            },
        );
        Visit::Continue
    }
}

/// Drop non-capturing groups with nothing inside: `a(?:)b` to `ab`
pub(super) struct RemoveEmptyGroup;

impl Handler for RemoveEmptyGroup {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let NodeKind::Group(group) = path.node(ast) else {
            return Visit::Continue;
        };
        if group.capturing || group.expression.is_some() {
            return Visit::Continue;
        }
        let Some(parent) = path.parent(ast) else {
            return Visit::Continue;
        };
        match parent.node(ast) {
            NodeKind::Repetition { .. } => {
                parent.replace_with(ast, path.id());
            }
            // `//` would read as a comment
            NodeKind::RegExp { .. } => {}
            _ => {
                if !fuses_tokens(ast, path, None) {
                    path.remove(ast);
                }
            }
        }
        Visit::Continue
    }
}

/// Unwrap non-capturing groups whose content needs no grouping:
/// `(?:a)+` to `a+`, `x(?:ab)y` to `xaby`
pub(super) struct Ungroup;

impl Handler for Ungroup {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let NodeKind::Group(group) = path.node(ast) else {
            return Visit::Continue;
        };
        let (false, Some(child)) = (group.capturing, group.expression) else {
            return Visit::Continue;
        };
        let Some(parent) = path.parent(ast) else {
            return Visit::Continue;
        };
        let child_kind = ast.kind(child);

        match parent.node(ast) {
            NodeKind::Alternative { .. } => {
                if matches!(child_kind, NodeKind::Disjunction { .. }) {
                    return Visit::Continue;
                }
            }
            NodeKind::Repetition { .. } => {
                if !matches!(
                    child_kind,
                    NodeKind::Char(_) | NodeKind::CharacterClass { .. } | NodeKind::UnicodeProperty(_)
                ) {
                    return Visit::Continue;
                }
            }
            NodeKind::RegExp { .. } | NodeKind::Group(_) => {}
            _ => {
                if matches!(child_kind, NodeKind::Disjunction { .. }) {
                    return Visit::Continue;
                }
            }
        }

        // `\1(?:0)` must not become `\10`, nor `a{(?:2)}` become `a{2}`
        if fuses_tokens(ast, path, Some(child)) {
            return Visit::Continue;
        }

        let splice = matches!(ast.kind(child), NodeKind::Alternative { .. })
            && matches!(parent.node(ast), NodeKind::Alternative { .. });
        if splice && let Some(index) = path.index(ast) {
            let items = ast.expressions(child).to_vec();
            path.remove(ast);
            for (k, item) in items.into_iter().enumerate() {
                parent.insert_child_at(ast, index + k, item);
            }
        } else {
            path.replace_with(ast, child);
        }
        Visit::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;

    fn run(handler: &mut dyn Handler, source: &str) -> String {
        transform(source, &mut [handler]).unwrap().to_string()
    }

    #[test]
    fn test_disjunction_remove_duplicates() {
        let mut rule = DisjunctionRemoveDuplicates;
        assert_eq!(run(&mut rule, "/(ab|bc|ab)+(xy|xy)+/"), "/(ab|bc)+(xy)+/");
        assert_eq!(run(&mut rule, "/a|a|/"), "/a|/");
        assert_eq!(run(&mut rule, "/a|b/"), "/a|b/");
    }

    #[test]
    fn test_single_chars_to_char_class() {
        let mut rule = SingleCharsToCharClass;
        assert_eq!(run(&mut rule, "/a|b|c/"), "/[abc]/");
        assert_eq!(run(&mut rule, "/(a|\\.|[xy])/"), "/([.axy])/");
        assert_eq!(run(&mut rule, "/x(?:a|b)+/"), "/x[ab]+/");
        assert_eq!(run(&mut rule, "/a|-|]/"), "/[\\-\\]a]/");
    }

    #[test]
    fn test_single_chars_rejects_other_alternatives() {
        let mut rule = SingleCharsToCharClass;
        assert_eq!(run(&mut rule, "/a|./"), "/a|./");
        assert_eq!(run(&mut rule, "/a|bc/"), "/a|bc/");
        assert_eq!(run(&mut rule, "/a|[^b]/"), "/a|[^b]/");
        assert_eq!(run(&mut rule, "/a|/"), "/a|/");
    }

    #[test]
    fn test_remove_empty_group() {
        assert_eq!(run(&mut RemoveEmptyGroup, "/a(?:)b/"), "/ab/");
        assert_eq!(run(&mut RemoveEmptyGroup, "/a(?:)*/"), "/a(?:)/");
        assert_eq!(run(&mut RemoveEmptyGroup, "/(?:)/"), "/(?:)/");
        assert_eq!(run(&mut RemoveEmptyGroup, "/a()/"), "/a()/");
    }

    #[test]
    fn test_ungroup() {
        assert_eq!(run(&mut Ungroup, "/(?:a)+/"), "/a+/");
        assert_eq!(run(&mut Ungroup, "/x(?:ab)y/"), "/xaby/");
        assert_eq!(run(&mut Ungroup, "/(?:a|b)/"), "/a|b/");
        assert_eq!(run(&mut Ungroup, "/(?:(?:a))/"), "/a/");
        assert_eq!(run(&mut Ungroup, "/((?:ab))/"), "/(ab)/");
    }

    #[test]
    fn test_ungroup_keeps_needed_groups() {
        assert_eq!(run(&mut Ungroup, "/x(?:a|b)/"), "/x(?:a|b)/");
        assert_eq!(run(&mut Ungroup, "/(?:ab)+/"), "/(?:ab)+/");
        assert_eq!(run(&mut Ungroup, "/(a)\\1(?:0)/"), "/(a)\\1(?:0)/");
        assert_eq!(run(&mut Ungroup, "/(a)(?:\\1)0/"), "/(a)(?:\\1)0/");
    }
}
