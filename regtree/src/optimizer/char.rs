//! Rules rewriting single chars

use crate::ast::{Ast, Char, CharKind, NodeKind};
use crate::traverse::{Handler, NodePath, Visit};

use super::{fuses_tokens, in_class, needs_escape_outside, plain_char};

/// `\ud83d\ude80` to `\u{1f680}` under the `u` flag
pub(super) struct SurrogatePairToSingleUnicode;

impl Handler for SurrogatePairToSingleUnicode {
    fn should_run(&self, ast: &Ast) -> bool {
        ast.flags().has('u')
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        match ast.kind_mut(path.id()) {
            NodeKind::Char(c) => merge_pair(c),
            NodeKind::ClassRange { from, to } => {
                merge_pair(from);
                merge_pair(to);
            }
            _ => {}
        }
        Visit::Continue
    }
}

fn merge_pair(c: &mut Char) {
    if c.kind == CharKind::Unicode
        && c.value.len() == 12
        && c.value[6..].starts_with("\\u")
        && let Some(code_point) = c.code_point.filter(|cp| *cp > 0xFFFF)
    {
        c.value = format!("\\u{{{:x}}}", code_point);
    }
}

/// `\x41` to `A` for printable ASCII
#[derive(Default)]
pub(super) struct CharCodeToSimpleChar {
    unicode: bool,
    extended: bool,
}

impl CharCodeToSimpleChar {
    fn convert(&self, c: &Char, in_class: bool) -> Option<Char> {
        if !matches!(c.kind, CharKind::Hex | CharKind::Unicode | CharKind::Oct) {
            return None;
        }
        let symbol = c
            .code_point
            .filter(|cp| (0x20..=0x7e).contains(cp))
            .and_then(char::from_u32)?;
        if self.extended && !in_class && (symbol == ' ' || symbol == '#') {
            return None;
        }
        Some(plain_char(symbol, in_class, self.unicode))
    }
}

impl Handler for CharCodeToSimpleChar {
    fn init(&mut self, ast: &Ast) {
        self.unicode = ast.flags().has('u');
        self.extended = ast.flags().has('x');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let replacement = match path.node(ast) {
            NodeKind::Char(c) => self.convert(c, in_class(ast, path)).map(NodeKind::Char),
            NodeKind::ClassRange { from, to } => {
                let (new_from, new_to) = (self.convert(from, true), self.convert(to, true));
                (new_from.is_some() || new_to.is_some()).then(|| NodeKind::ClassRange {
                    from: new_from.unwrap_or_else(|| from.clone()),
                    to: new_to.unwrap_or_else(|| to.clone()),
                })
            }
            _ => None,
        };
        // `\1\x30` must not become `\10`, nor `\x4\x31` become `\x41`
        if let Some(kind) = replacement {
            let replacement = ast.alloc(kind);
            if !fuses_tokens(ast, path, Some(replacement)) {
                path.replace_with(ast, replacement);
            }
        }
        Visit::Continue
    }
}

/// Lowercase uppercase class members under the `i` flag, so that
/// duplicates like `[aA]` collapse
#[derive(Default)]
pub(super) struct CaseInsensitiveLowercaseRanges {
    unicode: bool,
}

impl CaseInsensitiveLowercaseRanges {
    /// The lowercase partner of `c`, if case folding maps them onto each other
    fn lower(&self, c: char) -> Option<char> {
        if (c as u32) >= 0x1000 && !self.unicode {
            return None;
        }
        if !c.is_uppercase() {
            return None;
        }
        let mut lower = c.to_lowercase();
        let l = lower.next()?;
        if lower.next().is_some() {
            return None;
        }
        let mut upper = l.to_uppercase();
        (upper.next() == Some(c) && upper.next().is_none()).then_some(l)
    }

    fn lower_char(&self, c: &Char) -> Option<Char> {
        if c.kind != CharKind::Simple {
            return None;
        }
        self.lower(c.symbol?).map(Char::simple)
    }

    fn lower_range(&self, from: &Char, to: &Char) -> Option<(Char, Char)> {
        if from.kind != CharKind::Simple || to.kind != CharKind::Simple {
            return None;
        }
        let (start, end) = (from.code_point?, to.code_point?);
        if end.saturating_sub(start) > 0x400 {
            return None;
        }
        let low_start = self.lower(from.symbol?)?;
        let delta = i64::from(low_start as u32) - i64::from(start);
        for cp in start..=end {
            let c = char::from_u32(cp)?;
            if i64::from(self.lower(c)? as u32) != i64::from(cp) + delta {
                return None;
            }
        }
        let low_end = u32::try_from(i64::from(end) + delta)
            .ok()
            .and_then(char::from_u32)?;
        Some((Char::simple(low_start), Char::simple(low_end)))
    }
}

impl Handler for CaseInsensitiveLowercaseRanges {
    fn should_run(&self, ast: &Ast) -> bool {
        ast.flags().has('i')
    }

    fn init(&mut self, ast: &Ast) {
        self.unicode = ast.flags().has('u');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let kind = match path.node(ast) {
            NodeKind::Char(c) if in_class(ast, path) => self.lower_char(c).map(NodeKind::Char),
            NodeKind::ClassRange { from, to } => self
                .lower_range(from, to)
                .map(|(from, to)| NodeKind::ClassRange { from, to }),
            _ => None,
        };
        if let Some(kind) = kind {
            *ast.kind_mut(path.id()) = kind;
        }
        Visit::Continue
    }
}

/// Drop backslashes that carry no meaning: `\e` to `e`, `[\(]` to `[(]`
///
/// Escapes of `{` and `}` always stay, as do `]` under `u` and whitespace
/// and `#` under `x`.
#[derive(Default)]
pub(super) struct EscapeUnescape {
    unicode: bool,
    extended: bool,
}

impl EscapeUnescape {
    fn keeps_outside(&self, symbol: char) -> bool {
        needs_escape_outside(symbol, self.unicode)
            || (self.extended && (symbol.is_whitespace() || symbol == '#'))
    }
}

fn keeps_in_class(symbol: char, index: usize, len: usize, negative: bool) -> bool {
    match symbol {
        '^' => index == 0 && !negative,
        '-' => index != 0 && index + 1 != len,
        ']' | '\\' => true,
        _ => false,
    }
}

fn escaped_symbol(c: &Char) -> Option<char> {
    (c.kind == CharKind::Simple && c.escaped)
        .then_some(c.symbol)
        .flatten()
}

impl Handler for EscapeUnescape {
    fn init(&mut self, ast: &Ast) {
        self.unicode = ast.flags().has('u');
        self.extended = ast.flags().has('x');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        let class = path.parent(ast).and_then(|parent| match parent.node(ast) {
            NodeKind::CharacterClass {
                negative,
                expressions,
            } => Some((*negative, expressions.len())),
            _ => None,
        });
        let index = path.index(ast).unwrap_or(0);

        match ast.kind_mut(path.id()) {
            NodeKind::Char(c) => {
                if let Some(symbol) = escaped_symbol(c) {
                    let keep = match class {
                        Some((negative, len)) => keeps_in_class(symbol, index, len, negative),
                        None => self.keeps_outside(symbol),
                    };
                    if !keep {
                        c.escaped = false;
                    }
                }
            }
            NodeKind::ClassRange { from, to } => {
                let negative = class.is_some_and(|(negative, _)| negative);
                if let Some(symbol) = escaped_symbol(from)
                    && !matches!(symbol, ']' | '\\' | '-')
                    && !(symbol == '^' && index == 0 && !negative)
                {
                    from.escaped = false;
                }
                if let Some(symbol) = escaped_symbol(to)
                    && !matches!(symbol, ']' | '\\' | '-' | '^')
                {
                    to.escaped = false;
                }
            }
            _ => {}
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
    fn test_surrogate_pair_only_under_unicode() {
        assert_eq!(
            run(&mut SurrogatePairToSingleUnicode, "/\\ud83d\\ude80/u"),
            "/\\u{1f680}/u"
        );
        assert_eq!(
            run(&mut SurrogatePairToSingleUnicode, "/\\ud83d\\ude80/"),
            "/\\ud83d\\ude80/"
        );
    }

    #[test]
    fn test_char_code_to_simple_char() {
        let mut rule = CharCodeToSimpleChar::default();
        assert_eq!(run(&mut rule, "/\\x41\\u0062\\x7e\\x1f/"), "/Ab~\\x1f/");
        assert_eq!(run(&mut rule, "/\\x2a[\\x2a\\x5d\\x2d]/"), "/\\*[*\\]\\-]/");
        assert_eq!(run(&mut rule, "/[\\x41-\\x5a]/"), "/[A-Z]/");
    }

    #[test]
    fn test_char_code_guards() {
        let mut rule = CharCodeToSimpleChar::default();
        assert_eq!(run(&mut rule, "/(a)\\1\\x30/"), "/(a)\\1\\x30/");
        assert_eq!(run(&mut rule, "/\\x20\\x23/x"), "/\\x20\\x23/x");
        assert_eq!(run(&mut rule, "/\\65/"), "/\\65/");
    }

    #[test]
    fn test_lowercase_ranges() {
        let mut rule = CaseInsensitiveLowercaseRanges::default();
        assert_eq!(run(&mut rule, "/[A-Z]B/i"), "/[a-z]B/i");
        assert_eq!(run(&mut rule, "/[XY-Z]/i"), "/[xy-z]/i");
        assert_eq!(run(&mut rule, "/[A-Z]/"), "/[A-Z]/");
        // the range crosses non letters
        assert_eq!(run(&mut rule, "/[A-c]/i"), "/[A-c]/i");
    }

    #[test]
    fn test_lowercase_skips_kelvin_without_unicode() {
        let mut rule = CaseInsensitiveLowercaseRanges::default();
        assert_eq!(run(&mut rule, "/[\u{212a}]/i"), "/[\u{212a}]/i");
    }

    #[test]
    fn test_escape_unescape() {
        let mut rule = EscapeUnescape::default();
        assert_eq!(run(&mut rule, "/\\e\\*\\{\\}/"), "/e\\*\\{\\}/");
        assert_eq!(run(&mut rule, "/[\\^\\(\\-a\\]]/"), "/[\\^(\\-a\\]]/");
        assert_eq!(run(&mut rule, "/[a\\^\\-]/"), "/[a^-]/");
        assert_eq!(run(&mut rule, "/[^\\^]/"), "/[^^]/");
        assert_eq!(run(&mut rule, "/\\ \\#/x"), "/\\ \\#/x");
    }
}
