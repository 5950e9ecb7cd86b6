//! Rules rewriting character classes

use crate::ast::{Ast, Char, CharKind, NodeId, NodeKind};
use crate::traverse::{Handler, NodePath, Visit};

use super::{follows_numeric_escape, fuses_tokens, plain_char, precedes_digit};

fn class_items(ast: &Ast, path: NodePath) -> Option<(bool, Vec<NodeId>)> {
    match path.node(ast) {
        NodeKind::CharacterClass {
            negative,
            expressions,
        } => Some((*negative, expressions.clone())),
        _ => None,
    }
}

fn char_of(ast: &Ast, id: NodeId) -> Option<&Char> {
    ast.kind(id).as_char()
}

fn code_point_of(ast: &Ast, id: NodeId) -> Option<u32> {
    char_of(ast, id).and_then(|c| c.code_point)
}

fn range_of(ast: &Ast, id: NodeId) -> Option<(u32, u32)> {
    match ast.kind(id) {
        NodeKind::ClassRange { from, to } => Some((from.code_point?, to.code_point?)),
        _ => None,
    }
}

/// An unescaped `-` taken out of a range must not start a new one
fn literal_in_class(c: &Char) -> Char {
    if c.kind == CharKind::Simple && c.symbol == Some('-') {
        return Char::escaped('-');
    }
    c.clone()
}

/// `[aba]` to `[ab]`
pub(super) struct RemoveDuplicates;

impl Handler for RemoveDuplicates {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let Some((_, items)) = class_items(ast, path) else {
            return Visit::Continue;
        };
        let mut kept: Vec<NodeId> = Vec::with_capacity(items.len());
        for item in &items {
            if !kept.iter().any(|k| ast.same_source(*k, *item)) {
                kept.push(*item);
            }
        }
        if kept.len() != items.len() {
            ast.set_expressions(path.id(), kept);
        }
        Visit::Continue
    }
}

/// `[a-a]` to `[a]`, `[a-b]` to `[ab]`
pub(super) struct ClassRangesToChars;

impl Handler for ClassRangesToChars {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let NodeKind::ClassRange { from, to } = path.node(ast) else {
            return Visit::Continue;
        };
        let (Some(start), Some(end)) = (from.code_point, to.code_point) else {
            return Visit::Continue;
        };
        let (from, to) = (literal_in_class(from), literal_in_class(to));
        if start == end {
            path.replace(ast, NodeKind::Char(from));
        } else if end == start + 1
            && let (Some(parent), Some(index)) = (path.parent(ast), path.index(ast))
        {
            path.replace(ast, NodeKind::Char(from));
            let second = ast.alloc_char(to);
            parent.insert_child_at(ast, index + 1, second);
        }
        Visit::Continue
    }
}

const DIGITS: &[(u32, u32)] = &[(0x30, 0x39)];

const WORD: &[(u32, u32)] = &[(0x30, 0x39), (0x41, 0x5a), (0x5f, 0x5f), (0x61, 0x7a)];

/// Under `iu`, `\w` also folds in `ſ` and the Kelvin sign
const WORD_FOLDED: &[(u32, u32)] = &[
    (0x30, 0x39),
    (0x41, 0x5a),
    (0x5f, 0x5f),
    (0x61, 0x7a),
    (0x17f, 0x17f),
    (0x212a, 0x212a),
];

const WHITESPACE: &[(u32, u32)] = &[
    (0x09, 0x0d),
    (0x20, 0x20),
    (0xa0, 0xa0),
    (0x1680, 0x1680),
    (0x2000, 0x200a),
    (0x2028, 0x2029),
    (0x202f, 0x202f),
    (0x205f, 0x205f),
    (0x3000, 0x3000),
    (0xfeff, 0xfeff),
];

/// Single chars and ranges making up `\s`, in the order they are searched
const WHITESPACE_PARTS: &[(u32, u32)] = &[
    (0x20, 0x20),
    (0x0c, 0x0c),
    (0x0a, 0x0a),
    (0x0d, 0x0d),
    (0x09, 0x09),
    (0x0b, 0x0b),
    (0xa0, 0xa0),
    (0x1680, 0x1680),
    (0x2000, 0x200a),
    (0x2028, 0x2028),
    (0x2029, 0x2029),
    (0x202f, 0x202f),
    (0x205f, 0x205f),
    (0x3000, 0x3000),
    (0xfeff, 0xfeff),
];

fn covers(set: &[(u32, u32)], lo: u32, hi: u32) -> bool {
    set.iter().any(|&(a, b)| a <= lo && hi <= b)
}

fn overlaps(set: &[(u32, u32)], lo: u32, hi: u32) -> bool {
    set.iter().any(|&(a, b)| a <= hi && lo <= b)
}

/// `[0-9]` to `[\d]`, `[\da-zA-Z_]` to `[\w]`, the whitespace set to `[\s]`
#[derive(Default)]
pub(super) struct ClassToMeta {
    ignore_case: bool,
    unicode: bool,
}

impl ClassToMeta {
    fn digits_to_meta(ast: &mut Ast, items: &mut [NodeId]) {
        for item in items.iter_mut() {
            if range_of(ast, *item) == Some((0x30, 0x39)) {
                *item = ast.alloc_char(Char::meta("\\d"));
            }
        }
    }

    fn word_ranges(&self, ast: &mut Ast, items: &mut Vec<NodeId>) {
        let folded = self.ignore_case && self.unicode;
        let (mut digits, mut lower, mut upper, mut underscore) = (None, None, None, None);
        let (mut long_s, mut kelvin) = (None, None);
        for (i, item) in items.iter().enumerate() {
            if char_of(ast, *item).is_some_and(|c| c.is_meta("\\d")) {
                digits = Some(i);
            } else if range_of(ast, *item) == Some((0x61, 0x7a)) {
                lower = Some(i);
            } else if range_of(ast, *item) == Some((0x41, 0x5a)) {
                upper = Some(i);
            } else if code_point_of(ast, *item) == Some(0x5f) {
                underscore = Some(i);
            } else if folded && code_point_of(ast, *item) == Some(0x17f) {
                long_s = Some(i);
            } else if folded && code_point_of(ast, *item) == Some(0x212a) {
                kelvin = Some(i);
            }
        }
        let letters = (lower.is_some() && upper.is_some())
            || (self.ignore_case && (lower.is_some() || upper.is_some()));
        let folds = !folded || (long_s.is_some() && kelvin.is_some());
        let (Some(digits), Some(underscore)) = (digits, underscore) else {
            return;
        };
        if !letters || !folds {
            return;
        }
        let drop = [lower, upper, Some(underscore), long_s, kelvin];
        items[digits] = ast.alloc_char(Char::meta("\\w"));
        let mut i = 0;
        items.retain(|_| {
            let keep = !drop.contains(&Some(i));
            i += 1;
            keep
        });
    }

    fn whitespace(ast: &mut Ast, items: &mut Vec<NodeId>) {
        let mut found = Vec::with_capacity(WHITESPACE_PARTS.len());
        for &(lo, hi) in WHITESPACE_PARTS {
            let position = items.iter().position(|item| {
                if lo == hi {
                    code_point_of(ast, *item) == Some(lo)
                } else {
                    range_of(ast, *item) == Some((lo, hi))
                }
            });
            match position {
                Some(position) => found.push(position),
                None => return,
            }
        }
        let Some(&first) = found.iter().min() else {
            return;
        };
        items[first] = ast.alloc_char(Char::meta("\\s"));
        let mut i = 0;
        items.retain(|_| {
            let keep = i == first || !found.contains(&i);
            i += 1;
            keep
        });
    }
}

impl Handler for ClassToMeta {
    fn init(&mut self, ast: &Ast) {
        self.ignore_case = ast.flags().has('i');
        self.unicode = ast.flags().has('u');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let Some((_, mut items)) = class_items(ast, path) else {
            return Visit::Continue;
        };
        let before = items.clone();
        Self::digits_to_meta(ast, &mut items);
        self.word_ranges(ast, &mut items);
        Self::whitespace(ast, &mut items);
        if items != before {
            ast.set_expressions(path.id(), items);
        }
        Visit::Continue
    }
}

/// `[a]` to `a`, `[\d]` to `\d`, `[^\d]` to `\D`
#[derive(Default)]
pub(super) struct ClassToSingleChar {
    unicode: bool,
    extended: bool,
}

impl ClassToSingleChar {
    fn outside(&self, ast: &Ast, path: NodePath, c: &Char, negative: bool) -> Option<Char> {
        if negative {
            if !c.is_meta_class() {
                return None;
            }
            let flipped: String = c
                .value
                .chars()
                .map(|ch| {
                    if ch.is_ascii_lowercase() {
                        ch.to_ascii_uppercase()
                    } else {
                        ch.to_ascii_lowercase()
                    }
                })
                .collect();
            return Some(Char::meta(&flipped));
        }
        match c.kind {
            // outside a class `\b` is an assertion
            CharKind::Meta if c.value == "\\b" => None,
            CharKind::Meta | CharKind::Hex | CharKind::Unicode | CharKind::Control => {
                Some(c.clone())
            }
            CharKind::Oct => (!precedes_digit(ast, path)).then(|| c.clone()),
            // `\1` outside a class may be a backreference
            CharKind::Decimal => {
                (c.value == "\\0" && !precedes_digit(ast, path)).then(|| c.clone())
            }
            CharKind::Simple => {
                let symbol = c.symbol?;
                if self.extended && (symbol.is_whitespace() || symbol == '#') {
                    return None;
                }
                if symbol.is_ascii_digit() && follows_numeric_escape(ast, path) {
                    return None;
                }
                Some(plain_char(symbol, false, self.unicode))
            }
        }
    }
}

impl Handler for ClassToSingleChar {
    fn init(&mut self, ast: &Ast) {
        self.unicode = ast.flags().has('u');
        self.extended = ast.flags().has('x');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let Some((negative, items)) = class_items(ast, path) else {
            return Visit::Continue;
        };
        let [item] = items.as_slice() else {
            return Visit::Continue;
        };
        let kind = match ast.kind(*item) {
            NodeKind::Char(c) => self.outside(ast, path, c, negative).map(NodeKind::Char),
            NodeKind::UnicodeProperty(property) => {
                let mut property = property.clone();
                property.negative ^= negative;
                Some(NodeKind::UnicodeProperty(property))
            }
            _ => None,
        };
        if let Some(kind) = kind {
            // `\x4[1]` must not become `\x41`, nor `a{[2]}` become `a{2}`
            let replacement = ast.alloc(kind);
            if !fuses_tokens(ast, path, Some(replacement)) {
                path.replace_with(ast, replacement);
            }
        }
        Visit::Continue
    }
}

#[derive(Debug, Clone)]
enum Item {
    Char(Char),
    Range(Char, Char),
    Other(NodeId),
}

impl Item {
    /// Code point interval, `None` for items that never merge
    fn interval(&self) -> Option<(u32, u32)> {
        match self {
            Item::Char(c) if c.kind != CharKind::Control => c.code_point.map(|cp| (cp, cp)),
            Item::Range(from, to) => Some((from.code_point?, to.code_point?)),
            _ => None,
        }
    }

    fn code_point(&self) -> Option<u32> {
        match self {
            Item::Char(c) if c.kind != CharKind::Control => c.code_point,
            _ => None,
        }
    }

    fn sort_key(&self) -> (i64, u8, i64, &str) {
        match self {
            Item::Char(c) => {
                let value = if c.kind == CharKind::Simple && c.symbol == Some('-') {
                    i64::MAX
                } else if c.kind == CharKind::Control {
                    i64::MAX
                } else {
                    c.code_point.map_or(-1, i64::from)
                };
                (value, 1, 0, c.value.as_str())
            }
            Item::Range(from, to) => (
                from.code_point.map_or(-1, i64::from),
                0,
                to.code_point.map_or(-1, i64::from),
                "",
            ),
            Item::Other(_) => (-1, 2, 0, ""),
        }
    }

    /// Word chars and chars spelled as codes, merged into ranges when 3+ are consecutive
    fn is_word_or_code(&self) -> bool {
        match self {
            Item::Char(c) if c.kind != CharKind::Control => c.code_point.is_some_and(|cp| {
                covers(WORD, cp, cp)
                    || matches!(
                        c.kind,
                        CharKind::Unicode | CharKind::Hex | CharKind::Oct | CharKind::Decimal
                    )
            }),
            _ => false,
        }
    }
}

fn fits_in_meta(item: &Item, meta: &str, folded: bool) -> bool {
    if let Item::Char(c) = item {
        let contained = match meta {
            "\\S" => c.is_meta("\\w") || c.is_meta("\\d"),
            "\\D" => c.is_meta("\\W") || c.is_meta("\\s"),
            "\\w" => c.is_meta("\\d"),
            "\\W" => c.is_meta("\\s"),
            _ => false,
        };
        if contained {
            return true;
        }
    }
    let Some((lo, hi)) = item.interval() else {
        return false;
    };
    let word = if folded { WORD_FOLDED } else { WORD };
    match meta {
        "\\d" => covers(DIGITS, lo, hi),
        "\\D" => !overlaps(DIGITS, lo, hi),
        "\\w" => covers(word, lo, hi),
        "\\W" => !overlaps(word, lo, hi),
        "\\s" => covers(WHITESPACE, lo, hi),
        "\\S" => !overlaps(WHITESPACE, lo, hi),
        _ => false,
    }
}

fn combines_with_preceding(item: &Item, previous: &mut Item) -> bool {
    let Item::Range(from, to) = previous else {
        return false;
    };
    let (Some((lo, hi)), Some(start), Some(end)) = (item.interval(), from.code_point, to.code_point)
    else {
        return false;
    };
    if lo >= start && hi <= end {
        return true;
    }
    match item {
        Item::Char(c) if lo == end + 1 => {
            *to = c.clone();
            true
        }
        Item::Range(item_from, item_to)
            if i64::from(lo) <= i64::from(end) + 1 && i64::from(hi) >= i64::from(start) - 1 =>
        {
            if lo < start {
                *from = item_from.clone();
            }
            if hi > end {
                *to = item_to.clone();
            }
            true
        }
        _ => false,
    }
}

fn combines_with_following(item: &Item, next: &mut Item) -> bool {
    let (Item::Char(c), Item::Range(from, _)) = (item, next) else {
        return false;
    };
    match (item.code_point(), from.code_point) {
        (Some(cp), Some(start)) if cp + 1 == start => {
            *from = c.clone();
            true
        }
        _ => false,
    }
}

/// Number of chars before `index` that run consecutively into it; a run
/// of three or more becomes a range in place of its first char
fn combines_with_preceding_chars(items: &mut [Item], index: usize) -> usize {
    if !items[index].is_word_or_code() {
        return 0;
    }
    let mut merged = 0;
    let mut i = index;
    while i > 0 {
        let (previous, current) = (&items[i - 1], &items[i]);
        match (previous.code_point(), current.code_point()) {
            (Some(p), Some(c)) if previous.is_word_or_code() && p + 1 == c => {
                merged += 1;
                i -= 1;
            }
            _ => break,
        }
    }
    if merged < 2 {
        return 0;
    }
    if let (Item::Char(first), Item::Char(last)) = (&items[i], &items[index]) {
        items[i] = Item::Range(first.clone(), last.clone());
        merged
    } else {
        0
    }
}

fn merge(items: &mut Vec<Item>, metas: &[String], folded: bool) {
    let mut i = 0;
    while i < items.len() {
        let item = items[i].clone();
        let absorbed = metas.iter().any(|meta| fits_in_meta(&item, meta, folded))
            || (i > 0 && combines_with_preceding(&item, &mut items[i - 1]))
            || (i + 1 < items.len() && combines_with_following(&item, &mut items[i + 1]));
        if absorbed {
            items.remove(i);
            continue;
        }
        let merged = combines_with_preceding_chars(items, i);
        if merged > 0 {
            items.drain(i + 1 - merged..=i);
            i = i + 1 - merged;
        } else {
            i += 1;
        }
    }
}

fn bare(c: &Char, symbol: char) -> bool {
    c.kind == CharKind::Simple && !c.escaped && c.symbol == Some(symbol)
}

/// Keep the sorted class meaning what it did: no leading `^`, no bare `-`
/// between items
fn fix_escapes(items: &mut [Item], negative: bool) {
    let len = items.len();
    for (k, item) in items.iter_mut().enumerate() {
        match item {
            Item::Char(c) => {
                if (bare(c, '-') && k != 0 && k + 1 != len) || (bare(c, '^') && k == 0 && !negative)
                {
                    c.escaped = true;
                }
            }
            Item::Range(from, to) => {
                if bare(from, '-') || (bare(from, '^') && k == 0 && !negative) {
                    from.escaped = true;
                }
                if bare(to, '-') {
                    to.escaped = true;
                }
            }
            Item::Other(_) => {}
        }
    }
}

/// Sort class items, drop those another item already covers and join
/// adjacent ones into ranges: `[a-fc-k\dx5]` to `[\da-kx]`
#[derive(Default)]
pub(super) struct ClassRangesMerge {
    folded: bool,
}

impl Handler for ClassRangesMerge {
    fn init(&mut self, ast: &Ast) {
        let flags = ast.flags();
        self.folded = flags.has('i') && flags.has('u');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let Some((negative, ids)) = class_items(ast, path) else {
            return Visit::Continue;
        };
        let mut items: Vec<Item> = ids
            .iter()
            .map(|id| match ast.kind(*id) {
                NodeKind::Char(c) => Item::Char(c.clone()),
                NodeKind::ClassRange { from, to } => Item::Range(from.clone(), to.clone()),
                _ => Item::Other(*id),
            })
            .collect();

        // `[\12]` would turn into an octal escape once sorted
        let numeric = items.iter().any(|item| {
            matches!(item, Item::Char(c) if matches!(c.kind, CharKind::Decimal | CharKind::Oct))
        });
        let digit = items.iter().any(|item| match item {
            Item::Char(c) => c.kind == CharKind::Simple && c.symbol.is_some_and(|s| s.is_ascii_digit()),
            Item::Range(from, _) => {
                from.kind == CharKind::Simple && from.symbol.is_some_and(|s| s.is_ascii_digit())
            }
            Item::Other(_) => false,
        });
        if numeric && digit {
            return Visit::Continue;
        }

        let metas: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Item::Char(c) if c.is_meta_class() => Some(c.value.clone()),
                _ => None,
            })
            .collect();

        items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        merge(&mut items, &metas, self.folded);
        fix_escapes(&mut items, negative);

        let new_ids = items
            .into_iter()
            .map(|item| match item {
                Item::Char(c) => ast.alloc_char(c),
                Item::Range(from, to) => ast.alloc(NodeKind::ClassRange { from, to }),
                Item::Other(id) => id,
            })
            .collect();
        ast.set_expressions(path.id(), new_ids);
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
    fn test_remove_duplicates() {
        assert_eq!(run(&mut RemoveDuplicates, "/[aba-ca-c\\d\\d]/"), "/[aba-c\\d]/");
    }

    #[test]
    fn test_ranges_to_chars() {
        assert_eq!(run(&mut ClassRangesToChars, "/[a-ab-cx-z]/"), "/[abcx-z]/");
        assert_eq!(run(&mut ClassRangesToChars, "/[,--x]/"), "/[,\\-x]/");
    }

    #[test]
    fn test_class_to_meta() {
        let mut rule = ClassToMeta::default();
        assert_eq!(run(&mut rule, "/[0-9]/"), "/[\\d]/");
        assert_eq!(run(&mut rule, "/[a-zA-Z_0-9]/"), "/[\\w]/");
        assert_eq!(run(&mut rule, "/[A-Z_0-9]/i"), "/[\\w]/i");
        assert_eq!(run(&mut rule, "/[A-Z_0-9]/"), "/[A-Z_\\d]/");
        assert_eq!(run(&mut rule, "/[a-z_0-9]/iu"), "/[a-z_\\d]/iu");
        assert_eq!(
            run(
                &mut rule,
                "/[ \\f\\n\\r\\t\\v\\u00a0\\u1680\\u2000-\\u200a\\u2028\\u2029\\u202f\\u205f\\u3000\\ufeff]/"
            ),
            "/[\\s]/"
        );
    }

    #[test]
    fn test_class_to_single_char() {
        let mut rule = ClassToSingleChar::default();
        assert_eq!(run(&mut rule, "/[a][\\d][^\\d][.]/"), "/a\\d\\D\\./");
        assert_eq!(run(&mut rule, "/[^a][\\b][ab]/"), "/[^a][\\b][ab]/");
        assert_eq!(run(&mut rule, "/[\\]][\\-][\\B]/"), "/]-B/");
        assert_eq!(run(&mut rule, "/[\\p{L}][^\\p{L}]/u"), "/\\p{L}\\P{L}/u");
    }

    #[test]
    fn test_class_to_single_char_guards() {
        let mut rule = ClassToSingleChar::default();
        assert_eq!(run(&mut rule, "/(a)\\1[0]/"), "/(a)\\1[0]/");
        assert_eq!(run(&mut rule, "/[\\1]/"), "/[\\1]/");
        assert_eq!(run(&mut rule, "/[\\0]1/"), "/[\\0]1/");
        assert_eq!(run(&mut rule, "/a[ ]/x"), "/a[ ]/x");
    }

    #[test]
    fn test_ranges_merge() {
        let mut rule = ClassRangesMerge::default();
        assert_eq!(run(&mut rule, "/[a-fc-kx]/"), "/[a-kx]/");
        assert_eq!(run(&mut rule, "/[\\w\\d5a_]/"), "/[\\w]/");
        assert_eq!(run(&mut rule, "/[fedcba]/"), "/[a-f]/");
        assert_eq!(run(&mut rule, "/[b-da]/"), "/[a-d]/");
        assert_eq!(run(&mut rule, "/[ab]/"), "/[ab]/");
        assert_eq!(run(&mut rule, "/[\\S\\w\\d]/"), "/[\\S]/");
    }

    #[test]
    fn test_ranges_merge_negated_meta_uses_whole_interval() {
        let mut rule = ClassRangesMerge::default();
        // the range holds a space, so `\S` does not cover it
        assert_eq!(run(&mut rule, "/[\\S\\x00-\\x7f]/"), "/[\\S\\x00-\\x7f]/");
        assert_eq!(run(&mut rule, "/[\\Da-z]/"), "/[\\D]/");
    }

    #[test]
    fn test_ranges_merge_escapes() {
        let mut rule = ClassRangesMerge::default();
        assert_eq!(run(&mut rule, "/[a^]/"), "/[\\^a]/");
        assert_eq!(run(&mut rule, "/[-a\\cA]/"), "/[a\\-\\cA]/");
    }
}
