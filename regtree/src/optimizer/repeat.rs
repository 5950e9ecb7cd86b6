//! Folding repeated runs inside an alternative into repetitions

use crate::ast::{Ast, Group, NodeId, NodeKind, Quantifier};
use crate::traverse::{Handler, NodePath, Visit};

use super::{ends_with_numeric_escape, starts_with_digit};

/// `abcabc` to `(?:abc){2}`, `(?:abc){2}abc` and `abc(?:abc){2}` to `(?:abc){3}`
pub(super) struct CombineRepeatingPatterns;

impl Handler for CombineRepeatingPatterns {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        if !matches!(path.node(ast), NodeKind::Alternative { .. }) {
            return Visit::Continue;
        }
        let alternative = path.id();

        let mut index = 1;
        while index < ast.expressions(alternative).len() {
            index = combine_repeating_left(ast, alternative, index).max(1);
            if index >= ast.expressions(alternative).len() {
                break;
            }
            index = combine_with_previous_repetition(ast, alternative, index).max(1);
            if index >= ast.expressions(alternative).len() {
                break;
            }
            index = combine_repetition_with_previous(ast, alternative, index).max(1);
            index += 1;
        }
        Visit::Continue
    }
}

fn non_capturing(expression: NodeId) -> NodeKind {
    NodeKind::Group(Group {
        capturing: false,
        name: None,
        name_raw: None,
        number: None,
        expression: Some(expression),
    })
}

/// The content of a non-capturing group, or the node itself
fn unwrap_group(ast: &Ast, id: NodeId) -> NodeId {
    match ast.kind(id) {
        NodeKind::Group(Group {
            capturing: false,
            expression: Some(expression),
            ..
        }) => *expression,
        _ => id,
    }
}

fn as_sequence(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    match ast.kind(id) {
        NodeKind::Alternative { expressions } => expressions.clone(),
        _ => vec![id],
    }
}

/// Nodes a quantifier can follow without a wrapping group
fn is_atom(ast: &Ast, id: NodeId) -> bool {
    matches!(
        ast.kind(id),
        NodeKind::Char(_)
            | NodeKind::CharacterClass { .. }
            | NodeKind::Group(_)
            | NodeKind::Backreference(_)
            | NodeKind::UnicodeProperty(_)
    )
}

/// Bump the count of the repetition at `id`; `false` if it would overflow
fn increment(ast: &mut Ast, id: NodeId) -> bool {
    let NodeKind::Repetition { quantifier, .. } = ast.kind_mut(id) else {
        return false;
    };
    match quantifier.incremented() {
        Some(new) => {
            *quantifier = new;
            true
        }
        None => false,
    }
}

/// A run ending at `index` that directly repeats the run before it,
/// trying the longest unit first
fn combine_repeating_left(ast: &mut Ast, alternative: NodeId, index: usize) -> usize {
    let items = ast.expressions(alternative).to_vec();
    for i in (0..index.div_ceil(2)).rev() {
        let start = index - 2 * i - 1;
        let (left, right) = (&items[start..index - i], &items[index - i..=index]);
        if !ast.same_sequence(left, right) {
            continue;
        }
        let bare = i == 0 && is_atom(ast, right[0]);
        if bare
            && start > 0
            && ends_with_numeric_escape(ast, items[start - 1])
            && starts_with_digit(ast, right[0])
        {
            continue;
        }

        let right = right.to_vec();
        for item in &items[start..=index] {
            ast.remove(*item);
        }
        let expression = if bare {
            right[0]
        } else {
            let content = match right.as_slice() {
                [only] => *only,
                _ => ast.alloc(NodeKind::Alternative { expressions: right }),
            };
            ast.alloc(non_capturing(content))
        };
        let repetition = ast.alloc(NodeKind::Repetition {
            expression,
            quantifier: Quantifier::exactly(2),
        });
        ast.insert_child_at(alternative, start, repetition);
        return start;
    }
    index
}

/// A greedy repetition before `index` whose body the following run repeats
fn combine_with_previous_repetition(ast: &mut Ast, alternative: NodeId, index: usize) -> usize {
    let items = ast.expressions(alternative).to_vec();
    for i in 0..index {
        let NodeKind::Repetition {
            expression,
            quantifier,
        } = *ast.kind(items[i])
        else {
            continue;
        };
        if !quantifier.greedy {
            continue;
        }
        let left = as_sequence(ast, unwrap_group(ast, expression));
        let right = if i + 1 == index {
            as_sequence(ast, unwrap_group(ast, items[index]))
        } else {
            items[i + 1..=index].to_vec()
        };
        if ast.same_sequence(&left, &right) && increment(ast, items[i]) {
            for item in &items[i + 1..=index] {
                ast.remove(*item);
            }
            return i;
        }
    }
    index
}

/// A greedy repetition at `index` whose body the run before it repeats
fn combine_repetition_with_previous(ast: &mut Ast, alternative: NodeId, index: usize) -> usize {
    let items = ast.expressions(alternative).to_vec();
    let NodeKind::Repetition {
        expression,
        quantifier,
    } = *ast.kind(items[index])
    else {
        return index;
    };
    if !quantifier.greedy {
        return index;
    }
    let body = unwrap_group(ast, expression);
    let width = match ast.kind(body) {
        NodeKind::Alternative { expressions } => {
            let width = expressions.len();
            if width > index || !ast.same_sequence(&items[index - width..index], expressions) {
                return index;
            }
            width
        }
        _ => {
            if !ast.same_source(unwrap_group(ast, items[index - 1]), body) {
                return index;
            }
            1
        }
    };
    let start = index - width;
    // `\1` `0` `0{2}` must not become `\10{3}`
    if start > 0
        && ends_with_numeric_escape(ast, items[start - 1])
        && starts_with_digit(ast, items[index])
    {
        return index;
    }
    if !increment(ast, items[index]) {
        return index;
    }
    for item in &items[start..index] {
        ast.remove(*item);
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Char;
    use crate::generator::generate;
    use crate::parser::parse;
    use crate::transform::{transform, transform_ast};

    fn run(source: &str) -> String {
        transform(source, &mut [&mut CombineRepeatingPatterns])
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_repeating_left() {
        assert_eq!(run("/abcabc/"), "/(?:abc){2}/");
        assert_eq!(run("/xaa/"), "/xa{2}/");
        assert_eq!(run("/abcabcabc/"), "/(?:abc){3}/");
    }

    #[test]
    fn test_longest_unit_first() {
        let mut ast = parse("/aaaa/").unwrap();
        let body = ast.body().unwrap();
        assert_eq!(combine_repeating_left(&mut ast, body, 3), 0);
        assert_eq!(generate(&ast), "/(?:aa){2}/");
    }

    #[test]
    fn test_with_previous_repetition() {
        assert_eq!(run("/(?:abc){2}abc/"), "/(?:abc){3}/");
        assert_eq!(run("/a*a/"), "/a+/");
        assert_eq!(run("/a*?a/"), "/a*?a/");
    }

    #[test]
    fn test_repetition_with_previous() {
        assert_eq!(run("/abc(?:abc){2}/"), "/(?:abc){3}/");
        assert_eq!(run("/aa{2}/"), "/a{3}/");
    }

    #[test]
    fn test_assertions_get_wrapped() {
        assert_eq!(run("/^^/"), "/(?:^){2}/");
    }

    #[test]
    fn test_numeric_escape_guard() {
        let mut ast = parse("/(a)\\1xx/").unwrap();
        let body = ast.body().unwrap();
        for id in ast.expressions(body)[2..].to_vec() {
            *ast.kind_mut(id) = NodeKind::Char(Char::simple('0'));
        }
        let result = transform_ast(ast, &mut [&mut CombineRepeatingPatterns]);
        assert_eq!(result.to_string(), "/(a)\\100/");
    }
}
