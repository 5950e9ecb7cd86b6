//! Regex optimizer
//!
//! Runs an ordered list of rewrite rules to a fixed point. Each rule is
//! tried on a copy of the current best AST; the copy is kept when its
//! source is not longer than the best one (equal length included, so a
//! reshaped pattern can feed a later rule) and parses back to the same
//! tree, and thrown away otherwise.
//! Rounds repeat until one produces no change.
//!
//! Rules are grouped by what they rewrite:
//! - [`char`]: single chars and escapes
//! - [`class`]: character classes
//! - [`quantifier`]: repetitions
//! - [`group`]: groups and disjunctions
//! - [`repeat`]: repeated runs inside an alternative

mod char;
mod class;
mod group;
mod quantifier;
mod repeat;

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{Ast, BackreferenceKind, Char, CharKind, NodeId, NodeKind};
use crate::error::{RegexError, Result};
use crate::generator::{generate, generate_node};
use crate::parser::{ParseOptions, parse, parse_with};
use crate::transform::TransformResult;
use crate::traverse::{Handler, NodePath, traverse};

/// Names of the optimizer rules, in application order
pub const TRANSFORMS: &[&str] = &[
    "char-surrogate-pair-to-single-unicode",
    "char-code-to-simple-char",
    "char-case-insensitive-lowercase-ranges",
    "char-class-remove-duplicates",
    "quantifiers-merge",
    "quantifier-range-to-symbol",
    "char-class-classranges-to-chars",
    "char-class-to-meta",
    "char-class-to-single-char",
    "char-escape-unescape",
    "char-class-classranges-merge",
    "disjunction-remove-duplicates",
    "group-single-chars-to-char-class",
    "remove-empty-group",
    "ungroup",
    "combine-repeating-patterns",
];

/// Optimizer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Rules to run; empty means all
    pub whitelist: Vec<String>,
    /// Rules to leave out
    pub blacklist: Vec<String>,
}

fn handler_for(name: &str) -> Option<Box<dyn Handler>> {
    let handler: Box<dyn Handler> = match name {
        "char-surrogate-pair-to-single-unicode" => Box::new(char::SurrogatePairToSingleUnicode),
        "char-code-to-simple-char" => Box::new(char::CharCodeToSimpleChar::default()),
        "char-case-insensitive-lowercase-ranges" => {
            Box::new(char::CaseInsensitiveLowercaseRanges::default())
        }
        "char-class-remove-duplicates" => Box::new(class::RemoveDuplicates),
        "quantifiers-merge" => Box::new(quantifier::QuantifiersMerge),
        "quantifier-range-to-symbol" => Box::new(quantifier::RangeToSymbol),
        "char-class-classranges-to-chars" => Box::new(class::ClassRangesToChars),
        "char-class-to-meta" => Box::new(class::ClassToMeta::default()),
        "char-class-to-single-char" => Box::new(class::ClassToSingleChar::default()),
        "char-escape-unescape" => Box::new(char::EscapeUnescape::default()),
        "char-class-classranges-merge" => Box::new(class::ClassRangesMerge::default()),
        "disjunction-remove-duplicates" => Box::new(group::DisjunctionRemoveDuplicates),
        "group-single-chars-to-char-class" => Box::new(group::SingleCharsToCharClass),
        "remove-empty-group" => Box::new(group::RemoveEmptyGroup),
        "ungroup" => Box::new(group::Ungroup),
        "combine-repeating-patterns" => Box::new(repeat::CombineRepeatingPatterns),
        _ => return None,
    };
    Some(handler)
}

fn check_names(names: &[String]) -> Result<()> {
    for name in names {
        if !TRANSFORMS.contains(&name.as_str()) {
            return Err(RegexError::UnknownTransform {
                name: name.clone(),
                available: TRANSFORMS.join(", "),
            });
        }
    }
    Ok(())
}

/// Collapses alternatives left with fewer than two terms by a rewrite
struct Normalize;

impl Handler for Normalize {
    fn post(&mut self, ast: &mut Ast, path: NodePath) {
        if matches!(path.node(ast), NodeKind::Alternative { .. }) {
            ast.normalize_alternative(path.id());
        }
    }
}

/// Optimize `source` with every rule
pub fn optimize(source: &str) -> Result<TransformResult> {
    optimize_with(source, &OptimizeOptions::default())
}

/// Optimize `source` with the selected rules
pub fn optimize_with(source: &str, options: &OptimizeOptions) -> Result<TransformResult> {
    let ast = parse(source)?;
    optimize_ast(&ast, options)
}

/// Optimize a parsed expression; the input is left untouched
pub fn optimize_ast(ast: &Ast, options: &OptimizeOptions) -> Result<TransformResult> {
    check_names(&options.whitelist)?;
    check_names(&options.blacklist)?;

    let rules: Vec<&str> = TRANSFORMS
        .iter()
        .copied()
        .filter(|name| options.whitelist.is_empty() || options.whitelist.iter().any(|w| w == name))
        .filter(|name| !options.blacklist.iter().any(|b| b == name))
        .collect();

    let mut best = ast.compacted();
    let mut best_source = generate(&best);
    let mut seen = HashSet::from([best_source.clone()]);
    let mut round = 0;

    loop {
        round += 1;
        let round_start = best_source.clone();
        for name in &rules {
            let Some(mut handler) = handler_for(name) else {
                continue;
            };
            let mut candidate = best.clone();
            traverse(&mut candidate, &mut [handler.as_mut()]);
            traverse(&mut candidate, &mut [&mut Normalize]);
            let source = generate(&candidate);
            if source != best_source && !reads_back(&candidate, &source) {
                debug!(rule = name, rejected = %source, "rule output reads differently");
                continue;
            }
            if source.chars().count() <= best_source.chars().count() {
                if source != best_source {
                    debug!(rule = name, from = %best_source, to = %source, "rule accepted");
                }
                best = candidate.compacted();
                best_source = source;
            } else {
                debug!(rule = name, rejected = %source, "rule rejected");
            }
        }
        debug!(round, result = %best_source, "optimizer round finished");
        if best_source == round_start || !seen.insert(best_source.clone()) {
            break;
        }
    }

    Ok(TransformResult::new(best))
}

/// Whether `c` needs a backslash to stand for itself outside a class
pub(crate) fn needs_escape_outside(c: char, unicode: bool) -> bool {
    matches!(
        c,
        '*' | '[' | '(' | ')' | '+' | '?' | '^' | '$' | '.' | '/' | '\\' | '|' | '{' | '}'
    ) || (unicode && c == ']')
}

/// Whether `c` needs a backslash to stand for itself inside a class
pub(crate) fn needs_escape_in_class(c: char) -> bool {
    matches!(c, ']' | '\\' | '^' | '-')
}

/// A literal char spelled plainly, escaped only where syntax requires
pub(crate) fn plain_char(symbol: char, in_class: bool, unicode: bool) -> Char {
    let escaped = if in_class {
        needs_escape_in_class(symbol)
    } else {
        needs_escape_outside(symbol, unicode)
    };
    Char {
        escaped,
        ..Char::simple(symbol)
    }
}

/// A numeric escape that a directly following digit would extend
pub(crate) fn is_numeric_escape(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Backreference(backref) => backref.kind == BackreferenceKind::Number,
        NodeKind::Char(c) => matches!(c.kind, CharKind::Decimal | CharKind::Oct),
        _ => false,
    }
}

/// Whether the generated source of `id` starts with a plain digit
pub(crate) fn starts_with_digit(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Char(c) => {
            c.kind == CharKind::Simple && !c.escaped && c.symbol.is_some_and(|s| s.is_ascii_digit())
        }
        NodeKind::Alternative { expressions } => expressions
            .first()
            .is_some_and(|first| starts_with_digit(ast, *first)),
        NodeKind::Repetition { expression, .. } => starts_with_digit(ast, *expression),
        NodeKind::ClassRange { from, .. } => {
            from.kind == CharKind::Simple
                && !from.escaped
                && from.symbol.is_some_and(|s| s.is_ascii_digit())
        }
        _ => false,
    }
}

/// Whether the generated source of `id` ends with a numeric escape
pub(crate) fn ends_with_numeric_escape(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Alternative { expressions } => expressions
            .last()
            .is_some_and(|last| ends_with_numeric_escape(ast, *last)),
        _ => is_numeric_escape(ast, id),
    }
}

/// Whether the sibling before `path` is a numeric escape
pub(crate) fn follows_numeric_escape(ast: &Ast, path: NodePath) -> bool {
    path.previous_sibling(ast)
        .is_some_and(|previous| ends_with_numeric_escape(ast, previous.id()))
}

/// Whether the sibling after `path` starts with a plain digit
pub(crate) fn precedes_digit(ast: &Ast, path: NodePath) -> bool {
    path.next_sibling(ast)
        .is_some_and(|next| starts_with_digit(ast, next.id()))
}

/// Whether `path` sits directly inside a character class
pub(crate) fn in_class(ast: &Ast, path: NodePath) -> bool {
    path.parent(ast)
        .is_some_and(|parent| matches!(parent.node(ast), NodeKind::CharacterClass { .. }))
}

/// Symbol of an unescaped simple char
fn plain_symbol(ast: &Ast, id: NodeId) -> Option<char> {
    match ast.kind(id) {
        NodeKind::Char(c) if c.kind == CharKind::Simple && !c.escaped => c.symbol,
        _ => None,
    }
}

/// Symbol of an identity escape such as `\x` left without its digits
fn escaped_symbol(ast: &Ast, id: NodeId) -> Option<char> {
    match ast.kind(id) {
        NodeKind::Char(c) if c.kind == CharKind::Simple && c.escaped => c.symbol,
        _ => None,
    }
}

/// The unescaped char the source of `id` starts with
fn leading_plain_char(ast: &Ast, id: NodeId) -> Option<char> {
    match ast.kind(id) {
        NodeKind::Alternative { expressions } => leading_plain_char(ast, *expressions.first()?),
        NodeKind::Repetition { expression, .. } => leading_plain_char(ast, *expression),
        NodeKind::ClassRange { from, .. } if from.kind == CharKind::Simple && !from.escaped => {
            from.symbol
        }
        _ => plain_symbol(ast, id),
    }
}

/// Whether `next` would complete an escape left open at the end of
/// `before`: `\x4` and `1`, `\u00` and `4`, `\c` and `A`, `\k` and `<`
fn extends_escape(ast: &Ast, before: &[NodeId], next: char) -> bool {
    let mut digits = 0;
    for id in before.iter().rev() {
        if plain_symbol(ast, *id).is_some_and(|c| c.is_ascii_hexdigit()) {
            digits += 1;
            continue;
        }
        return match escaped_symbol(ast, *id) {
            Some('x') => digits < 2 && next.is_ascii_hexdigit(),
            Some('u') => (digits < 4 && next.is_ascii_hexdigit()) || (digits == 0 && next == '{'),
            Some('c') => digits == 0 && next.is_ascii_alphabetic(),
            Some('k') => digits == 0 && next == '<',
            _ => false,
        };
    }
    false
}

/// Whether a `{` before `at` and a `}` from `at` on enclose nothing but
/// digits and commas, which reads as a quantifier
fn completes_brace(ast: &Ast, items: &[NodeId], at: usize) -> bool {
    let inside = |id: &&NodeId| plain_symbol(ast, **id).is_some_and(|c| c.is_ascii_digit() || c == ',');
    let open = items[..at].iter().rev().find(|id| !inside(id));
    let close = items[at..].iter().find(|id| !inside(id));
    open.and_then(|id| plain_symbol(ast, *id)) == Some('{')
        && close.and_then(|id| plain_symbol(ast, *id)) == Some('}')
}

fn fuses_at(ast: &Ast, items: &[NodeId], at: usize, in_class: bool) -> bool {
    if at == 0 || at >= items.len() {
        return false;
    }
    (ends_with_numeric_escape(ast, items[at - 1]) && starts_with_digit(ast, items[at]))
        || leading_plain_char(ast, items[at])
            .is_some_and(|next| extends_escape(ast, &items[..at], next))
        || (!in_class && completes_brace(ast, items, at))
}

/// Whether putting `replacement` in place of `path` (or dropping it, for
/// `None`) would run its neighbours together into other tokens: `\1` and
/// `0` into `\10`, `{`, `2` and `}` into a quantifier, `\x4` and `1`
/// into `\x41`
pub(crate) fn fuses_tokens(ast: &Ast, path: NodePath, replacement: Option<NodeId>) -> bool {
    let Some(parent) = path.parent(ast) else {
        return false;
    };
    match parent.node(ast) {
        NodeKind::Alternative { .. } | NodeKind::CharacterClass { .. } => {}
        // only the front of a repeated atom meets a neighbour
        NodeKind::Repetition { .. } => {
            let (Some(replacement), Some(outer), Some(index)) =
                (replacement, parent.parent(ast), parent.index(ast))
            else {
                return false;
            };
            if !matches!(outer.node(ast), NodeKind::Alternative { .. }) {
                return false;
            }
            let mut items = ast.expressions(outer.id())[..index].to_vec();
            items.push(replacement);
            return fuses_at(ast, &items, index, false);
        }
        _ => return false,
    }
    let Some(index) = path.index(ast) else {
        return false;
    };
    let class = matches!(parent.node(ast), NodeKind::CharacterClass { .. });
    let siblings = ast.expressions(parent.id());
    let middle = match replacement {
        None => Vec::new(),
        Some(id) => match ast.kind(id) {
            NodeKind::Alternative { expressions } => expressions.clone(),
            _ => vec![id],
        },
    };
    let mut items = siblings[..index].to_vec();
    items.extend(&middle);
    items.extend(&siblings[index + 1..]);
    [index, index + middle.len()]
        .into_iter()
        .any(|at| fuses_at(ast, &items, at, class))
}

/// Source of the tree under `id` with its token structure spelled out,
/// so two trees compare equal exactly when they read the same
fn shape(ast: &Ast, id: NodeId, out: &mut String) {
    match ast.kind(id) {
        NodeKind::RegExp { body, .. } => {
            if let Some(body) = body {
                shape(ast, *body, out);
            }
        }
        NodeKind::Alternative { expressions } => {
            for item in expressions {
                shape(ast, *item, out);
            }
        }
        NodeKind::Disjunction { .. } => {
            let mut parts = Vec::new();
            disjunction_parts(ast, Some(id), &mut parts);
            out.push('(');
            for (i, part) in parts.into_iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                if let Some(part) = part {
                    shape(ast, part, out);
                }
            }
            out.push(')');
        }
        NodeKind::Group(group) => {
            out.push_str(if group.capturing { "(c" } else { "(n" });
            if let Some(name) = &group.name {
                out.push_str(&format!("<{}>", name));
            }
            if let Some(expression) = group.expression {
                shape(ast, expression, out);
            }
            out.push(')');
        }
        NodeKind::Repetition {
            expression,
            quantifier,
        } => {
            out.push('(');
            shape(ast, *expression, out);
            out.push_str(&format!("){}", quantifier));
        }
        NodeKind::Assertion {
            kind,
            negative,
            assertion: Some(assertion),
        } => {
            out.push_str(&format!("({:?}{}", kind, negative));
            shape(ast, *assertion, out);
            out.push(')');
        }
        NodeKind::CharacterClass {
            negative,
            expressions,
        } => {
            out.push_str(if *negative { "[^" } else { "[" });
            for item in expressions {
                out.push_str(&format!("<{}>", generate_node(ast, *item)));
            }
            out.push(']');
        }
        _ => out.push_str(&format!("<{}>", generate_node(ast, id))),
    }
}

/// Alternatives of a disjunction, with nested disjunctions on either side
/// flattened
fn disjunction_parts(ast: &Ast, id: Option<NodeId>, parts: &mut Vec<Option<NodeId>>) {
    match id.map(|id| ast.kind(id)) {
        Some(NodeKind::Disjunction { left, right }) => {
            disjunction_parts(ast, *left, parts);
            disjunction_parts(ast, *right, parts);
        }
        _ => parts.push(id),
    }
}

/// Whether `source`, generated from `ast`, parses back to the same tokens
fn reads_back(ast: &Ast, source: &str) -> bool {
    let options = ParseOptions {
        allow_group_name_duplicates: true,
        ..ParseOptions::default()
    };
    let Ok(reparsed) = parse_with(source, &options) else {
        return false;
    };
    let (mut expected, mut actual) = (String::new(), String::new());
    shape(ast, ast.root(), &mut expected);
    shape(&reparsed, reparsed.root(), &mut actual);
    expected == actual
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimized(source: &str) -> String {
        optimize(source).unwrap().to_string()
    }

    fn only(rule: &str, source: &str) -> String {
        let options = OptimizeOptions {
            whitelist: vec![rule.to_string()],
            ..OptimizeOptions::default()
        };
        optimize_with(source, &options).unwrap().to_string()
    }

    #[test]
    fn test_digit_class_to_meta() {
        assert_eq!(optimized("/[0-9]/"), "/\\d/");
    }

    #[test]
    fn test_quantifiers_merge() {
        assert_eq!(optimized("/a{1,2}a{2,3}/"), "/a{3,5}/");
    }

    #[test]
    fn test_combine_with_previous_repetition() {
        assert_eq!(optimized("/(?:abc){2}abc/"), "/(?:abc){3}/");
    }

    #[test]
    fn test_disjunction_duplicates() {
        assert_eq!(
            only("disjunction-remove-duplicates", "/(ab|bc|ab)+(xy|xy)+/"),
            "/(ab|bc)+(xy)+/"
        );
    }

    #[test]
    fn test_word_class() {
        assert_eq!(optimized("/[a-zA-Z_0-9]/"), "/\\w/");
        assert_eq!(optimized("/[^a-zA-Z_0-9]/"), "/\\W/");
        assert_eq!(optimized("/[a-z_0-9]/i"), "/\\w/i");
    }

    #[test]
    fn test_range_to_symbol() {
        assert_eq!(optimized("/a{0,}b{1,}c{0,1}d{1}/"), "/a*b+c?d/");
    }

    #[test]
    fn test_ungroup() {
        assert_eq!(optimized("/(?:a)+/"), "/a+/");
        assert_eq!(optimized("/x(?:ab)y/"), "/xaby/");
        assert_eq!(optimized("/a(?:b|c)/"), "/a[bc]/");
        assert_eq!(optimized("/(?:ab)+/"), "/(?:ab)+/");
    }

    #[test]
    fn test_backreference_adjacency_guards() {
        assert_eq!(optimized("/(a)\\1(?:0)/"), "/(a)\\1(?:0)/");
        assert_eq!(optimized("/(a)\\1[0]/"), "/(a)\\1[0]/");
        assert_eq!(optimized("/(a)\\1\\x30/"), "/(a)\\1\\x30/");
    }

    #[test]
    fn test_escape_unescape() {
        assert_eq!(optimized("/\\e\\{\\}[\\(\\]]/"), "/e\\{\\}[(\\]]/");
    }

    #[test]
    fn test_char_code_to_simple_char() {
        assert_eq!(optimized("/\\x41\\u0042\\x2e/"), "/AB\\./");
    }

    #[test]
    fn test_surrogate_pair() {
        assert_eq!(
            only("char-surrogate-pair-to-single-unicode", "/\\ud83d\\ude80/u"),
            "/\\u{1f680}/u"
        );
    }

    #[test]
    fn test_class_ranges_merge() {
        assert_eq!(optimized("/[a-fc-kx]/"), "/[a-kx]/");
        assert_eq!(optimized("/[\\d\\w5a]/"), "/\\w/");
        assert_eq!(optimized("/[abcdef]/"), "/[a-f]/");
    }

    #[test]
    fn test_group_single_chars() {
        assert_eq!(optimized("/a|x|m/"), "/[amx]/");
        assert_eq!(optimized("/(?:a|x|m)+/"), "/[amx]+/");
        assert_eq!(optimized("/a|b|c/"), "/[a-c]/");
        assert_eq!(optimized("/a|./"), "/a|./");
    }

    #[test]
    fn test_remove_empty_group() {
        assert_eq!(optimized("/a(?:)b/"), "/ab/");
        assert_eq!(optimized("/(?:)/"), "/(?:)/");
    }

    #[test]
    fn test_combine_repeating_patterns() {
        assert_eq!(optimized("/abcdabcdabcd/"), "/(?:abcd){3}/");
        // not shorter, so left alone
        assert_eq!(optimized("/abab/"), "/abab/");
        assert_eq!(optimized("/abc(?:abc){2}/"), "/(?:abc){3}/");
    }

    #[test]
    fn test_idempotent() {
        for source in ["/[0-9a-z_A-Z]+(?:xx)*x|[0-9]/i", "/a{1}b{0,}(?:c)d|d/"] {
            let once = optimized(source);
            assert_eq!(optimized(&once), once);
        }
    }

    #[test]
    fn test_never_longer() {
        for source in ["/a|b/", "/aa/", "/[ab]/", "/\\d\\d/"] {
            assert!(optimized(source).len() <= source.len());
        }
    }

    #[test]
    fn test_input_untouched() {
        let ast = parse("/[0-9]/").unwrap();
        let before = generate(&ast);
        optimize_ast(&ast, &OptimizeOptions::default()).unwrap();
        assert_eq!(generate(&ast), before);
    }

    #[test]
    fn test_unknown_rule() {
        let options = OptimizeOptions {
            blacklist: vec!["nope".to_string()],
            ..OptimizeOptions::default()
        };
        match optimize_with("/a/", &options) {
            Err(RegexError::UnknownTransform { available, .. }) => {
                assert!(available.contains("ungroup"));
            }
            other => panic!("expected unknown transform error, got {:?}", other),
        }
    }

    #[test]
    fn test_removal_keeps_tokens_apart() {
        assert_eq!(optimized("/(a)\\1(?:)0/"), "/(a)\\1(?:)0/");
        assert_eq!(optimized("/a{(?:)2}/"), "/a{(?:)2}/");
        assert_eq!(optimized("/a{2(?:),3}/"), "/a{2(?:),3}/");
        assert_eq!(optimized("/a(?:)b{(?:)/"), "/ab{/");
    }

    #[test]
    fn test_unwrapping_keeps_braces_literal() {
        assert_eq!(optimized("/a{(?:2)}/"), "/a{(?:2)}/");
        assert_eq!(optimized("/a{[2]}/"), "/a{[2]}/");
        assert_eq!(optimized("/a{\\x32}/"), "/a{\\x32}/");
    }

    #[test]
    fn test_unwrapping_keeps_escapes_apart() {
        assert_eq!(only("ungroup", "/\\x4(?:1)/"), "/\\x4(?:1)/");
        assert_eq!(only("ungroup", "/\\c(?:A)/"), "/\\c(?:A)/");
        assert_eq!(only("ungroup", "/\\u00(?:41)/"), "/\\u00(?:41)/");
        assert_eq!(only("ungroup", "/\\x4(?:1)*/"), "/\\x4(?:1)*/");
        assert_eq!(only("char-class-to-single-char", "/\\x4[1]/"), "/\\x4[1]/");
        assert_eq!(only("char-code-to-simple-char", "/\\x4\\x31/"), "/\\x4\\x31/");
        assert_eq!(only("ungroup", "/\\x4(?:z)/"), "/\\x4z/");
    }

    #[test]
    fn test_rule_output_must_read_back() {
        let mut ast = parse("/(a)\\1x/").unwrap();
        let last = *ast.expressions(ast.body().unwrap()).last().unwrap();
        *ast.kind_mut(last) = NodeKind::Char(Char::simple('0'));
        let source = generate(&ast);
        assert_eq!(source, "/(a)\\10/");
        assert!(!reads_back(&ast, &source));

        let ast = parse("/(?:a|b)c{2}(?<x>y)\\k<x>[^\\d]/").unwrap();
        assert!(reads_back(&ast, &generate(&ast)));
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        for source in [
            "/aa{4294967295}/",
            "/a{4294967295}a{4294967295}/",
            "/a{4294967295}a/",
            "/a{1,4294967295}a{1,2}/",
        ] {
            assert_eq!(optimized(source), source);
        }
    }

    #[test]
    fn test_extended_whitespace_kept() {
        assert_eq!(optimized("/a[ ]b/x"), "/a[ ]b/x");
        assert_eq!(optimized("/\\x20/x"), "/\\x20/x");
    }
}
