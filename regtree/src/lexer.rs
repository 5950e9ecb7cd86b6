//! Lexer for tokenizing regex patterns
//!
//! The lexer runs over the body of a `/body/flags` source and keeps a stack
//! of states. The flags select the bottom state (`u` and `x` change which
//! escapes exist and whether whitespace is significant); entering a
//! character class pushes a class state and leaving it pops. Rules for each
//! state are tried in a fixed priority order and the first match wins.

use std::fmt;
use std::ops::Range;

use crate::ast::{Char, CharKind, Flags, Position};
use crate::error::{ParseError, RegexError, Result, render_snippet};

/// A token in a regex pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Any single character atom: literal, escape or meta char
    Char(Char),
    /// `\N` with `N >= 1`; a backreference if that many groups were opened
    DecimalEscape {
        /// The number
        number: u32,
        /// Source text
        raw: String,
    },
    /// `\k<name>`
    NamedReference {
        /// Decoded name
        name: String,
        /// Name as written
        raw: String,
    },
    /// `\p{...}` / `\P{...}` (Unicode mode only)
    UnicodeProperty {
        /// `\P`
        negative: bool,
        /// Text between the braces
        body: String,
    },
    /// `^` (start anchor)
    Caret,
    /// `$` (end anchor)
    Dollar,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `(?=` / `(?!`
    Lookahead {
        /// `(?!`
        negative: bool,
    },
    /// `(?<=` / `(?<!`
    Lookbehind {
        /// `(?<!`
        negative: bool,
    },
    /// `(?:`
    NonCapturing,
    /// `(?<name>`
    NamedGroupOpen {
        /// Decoded name
        name: String,
        /// Name as written
        raw: String,
    },
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `|`
    Pipe,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
    /// `{n}`, `{n,}` or `{n,m}`
    Range {
        /// Lower bound
        from: u32,
        /// Upper bound, `None` when open
        to: Option<u32>,
    },
    /// `[` or `[^`
    ClassOpen {
        /// `[^`
        negative: bool,
    },
    /// `]` closing a class
    ClassClose,
    /// `-` inside a class
    Dash,
    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Char(c) if c.kind == CharKind::Simple && c.escaped => {
                write!(f, "`\\{}`", c.value)
            }
            Token::Char(c) => write!(f, "`{}`", c.value),
            Token::DecimalEscape { raw, .. } => write!(f, "`{}`", raw),
            Token::NamedReference { raw, .. } => write!(f, "`\\k<{}>`", raw),
            Token::UnicodeProperty { negative, body } => {
                write!(f, "`\\{}{{{}}}`", if *negative { 'P' } else { 'p' }, body)
            }
            Token::Caret => write!(f, "`^`"),
            Token::Dollar => write!(f, "`$`"),
            Token::WordBoundary => write!(f, "`\\b`"),
            Token::NonWordBoundary => write!(f, "`\\B`"),
            Token::Lookahead { negative } => write!(f, "`(?{}`", if *negative { '!' } else { '=' }),
            Token::Lookbehind { negative } => {
                write!(f, "`(?<{}`", if *negative { '!' } else { '=' })
            }
            Token::NonCapturing => write!(f, "`(?:`"),
            Token::NamedGroupOpen { raw, .. } => write!(f, "`(?<{}>`", raw),
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
            Token::Pipe => write!(f, "`|`"),
            Token::Star => write!(f, "`*`"),
            Token::Plus => write!(f, "`+`"),
            Token::Question => write!(f, "`?`"),
            Token::Range { from, to: None } => write!(f, "`{{{},}}`", from),
            Token::Range { from, to: Some(to) } => write!(f, "`{{{},{}}}`", from, to),
            Token::ClassOpen { negative } => write!(f, "`[{}`", if *negative { "^" } else { "" }),
            Token::ClassClose => write!(f, "`]`"),
            Token::Dash => write!(f, "`-`"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its source range (char offsets into the full source)
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token
    pub token: Token,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

/// Lexer states, one rule set each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// No flags that change lexing
    Initial,
    /// `u` flag
    Unicode,
    /// `x` flag
    Extended,
    /// `x` and `u` flags
    ExtendedUnicode,
    /// Inside a class without `u`
    Class,
    /// Inside a class with `u`
    UnicodeClass,
}

impl LexState {
    fn is_unicode(self) -> bool {
        matches!(
            self,
            LexState::Unicode | LexState::ExtendedUnicode | LexState::UnicodeClass
        )
    }

    fn is_extended(self) -> bool {
        matches!(self, LexState::Extended | LexState::ExtendedUnicode)
    }

    fn is_class(self) -> bool {
        matches!(self, LexState::Class | LexState::UnicodeClass)
    }
}

/// Lexer for tokenizing regex patterns
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    end: usize,
    line_starts: Vec<usize>,
    states: Vec<LexState>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `body` (char offsets into `source`)
    pub fn new(source: &'a str, body: Range<usize>, flags: &Flags) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        for (i, c) in chars.iter().enumerate() {
            if *c == '\n' {
                line_starts.push(i + 1);
            }
        }
        let initial = match (flags.has('x'), flags.has('u')) {
            (true, true) => LexState::ExtendedUnicode,
            (true, false) => LexState::Extended,
            (false, true) => LexState::Unicode,
            (false, false) => LexState::Initial,
        };
        Lexer {
            source,
            chars,
            pos: body.start,
            end: body.end,
            line_starts,
            states: vec![initial],
        }
    }

    /// The state on top of the stack
    pub fn state(&self) -> LexState {
        self.states.last().copied().unwrap_or(LexState::Initial)
    }

    /// Line and column of a char offset
    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            offset,
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    /// Source text between two char offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end.min(self.chars.len())].iter().collect()
    }

    /// Depth of the state stack
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Continue lexing from `pos` with the state stack cut back to `depth`
    pub fn rewind(&mut self, pos: usize, depth: usize) {
        self.pos = pos;
        self.states.truncate(depth.max(1));
    }

    /// Lex the next token
    pub fn next_token(&mut self) -> Result<Spanned> {
        let state = self.state();
        if state.is_extended() {
            self.skip_extended_whitespace();
        }
        let start = self.pos;
        let Some(c) = self.peek(0) else {
            return Ok(Spanned {
                token: Token::Eof,
                start,
                end: start,
            });
        };

        let token = if state.is_class() {
            self.class_token(c)?
        } else {
            self.default_token(c)?
        };
        Ok(Spanned {
            token,
            start,
            end: self.pos,
        })
    }

    fn default_token(&mut self, c: char) -> Result<Token> {
        let token = match c {
            '\\' => return self.escape(false),
            '^' => self.take(1, Token::Caret),
            '$' => self.take(1, Token::Dollar),
            '|' => self.take(1, Token::Pipe),
            ')' => self.take(1, Token::RightParen),
            '*' => self.take(1, Token::Star),
            '+' => self.take(1, Token::Plus),
            '?' => self.take(1, Token::Question),
            '.' => self.take(1, Token::Char(Char::meta("."))),
            '(' => return self.group_open(),
            '[' => {
                let negative = self.peek(1) == Some('^');
                let state = if self.state().is_unicode() {
                    LexState::UnicodeClass
                } else {
                    LexState::Class
                };
                self.states.push(state);
                self.take(if negative { 2 } else { 1 }, Token::ClassOpen { negative })
            }
            '{' => match self.range_quantifier() {
                Some((len, from, to)) => self.take(len, Token::Range { from, to }),
                None => self.take(1, Token::Char(Char::simple('{'))),
            },
            other => self.take(1, Token::Char(Char::simple(other))),
        };
        Ok(token)
    }

    fn class_token(&mut self, c: char) -> Result<Token> {
        let token = match c {
            '\\' => return self.escape(true),
            ']' => {
                self.states.pop();
                self.take(1, Token::ClassClose)
            }
            '-' => self.take(1, Token::Dash),
            other => self.take(1, Token::Char(Char::simple(other))),
        };
        Ok(token)
    }

    fn group_open(&mut self) -> Result<Token> {
        if self.peek(1) != Some('?') {
            return Ok(self.take(1, Token::LeftParen));
        }
        let token = match (self.peek(2), self.peek(3)) {
            (Some(':'), _) => self.take(3, Token::NonCapturing),
            (Some('='), _) => self.take(3, Token::Lookahead { negative: false }),
            (Some('!'), _) => self.take(3, Token::Lookahead { negative: true }),
            (Some('<'), Some('=')) => self.take(4, Token::Lookbehind { negative: false }),
            (Some('<'), Some('!')) => self.take(4, Token::Lookbehind { negative: true }),
            (Some('<'), _) => {
                let start = self.pos;
                self.pos += 3;
                let (name, raw) = self.group_name(start)?;
                Token::NamedGroupOpen { name, raw }
            }
            // `(` followed by a bare `?` is a quantifier with nothing to repeat
            _ => self.take(1, Token::LeftParen),
        };
        Ok(token)
    }

    /// Read `name>` after `<`, decoding `\u` escapes in the name
    fn group_name(&mut self, start: usize) -> Result<(String, String)> {
        let name_start = self.pos;
        let mut name = String::new();
        loop {
            match self.peek(0) {
                Some('>') => break,
                Some('\\') => {
                    let escape_start = self.pos;
                    if self.peek(1) != Some('u') {
                        return Err(self.invalid_group_name(start));
                    }
                    self.pos += 2;
                    let decoded = if self.peek(0) == Some('{') {
                        if !self.state().is_unicode() {
                            return Err(self.error_at(escape_start));
                        }
                        self.braced_code_point().and_then(char::from_u32)
                    } else {
                        self.code_unit_escape()
                    };
                    match decoded {
                        Some(c) => name.push(c),
                        None => return Err(self.invalid_group_name(start)),
                    }
                }
                Some(c) if c != ')' && c != '\n' => {
                    name.push(c);
                    self.pos += 1;
                }
                _ => return Err(self.invalid_group_name(start)),
            }
        }
        let raw = self.slice(name_start, self.pos);
        self.pos += 1;
        if !is_identifier(&name) {
            return Err(ParseError::InvalidGroupName(raw).into());
        }
        Ok((name, raw))
    }

    fn invalid_group_name(&self, start: usize) -> RegexError {
        let end = (self.pos + 1).min(self.end);
        ParseError::InvalidGroupName(self.slice(start, end)).into()
    }

    fn escape(&mut self, in_class: bool) -> Result<Token> {
        let start = self.pos;
        let Some(next) = self.peek(1) else {
            return Err(self.error_at(start));
        };
        let unicode = self.state().is_unicode();
        let token = match next {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'n' | 'r' | 't' | 'v' | 'f' => {
                self.pos += 2;
                Token::Char(Char::meta(&self.slice(start, self.pos)))
            }
            'b' if in_class => {
                self.pos += 2;
                Token::Char(Char::meta("\\b"))
            }
            'b' => self.take(2, Token::WordBoundary),
            'B' if !in_class => self.take(2, Token::NonWordBoundary),
            '0' => {
                self.pos += 2;
                let mut digits = 0;
                while digits < 2 && matches!(self.peek(0), Some('0'..='7')) {
                    self.pos += 1;
                    digits += 1;
                }
                let raw = self.slice(start, self.pos);
                if digits == 0 {
                    Token::Char(Char::coded(raw, CharKind::Decimal, 0))
                } else {
                    let code = u32::from_str_radix(&raw[1..], 8).unwrap_or(0);
                    Token::Char(Char::coded(raw, CharKind::Oct, code))
                }
            }
            '1'..='9' => {
                self.pos += 1;
                while matches!(self.peek(0), Some('0'..='9')) {
                    self.pos += 1;
                }
                let raw = self.slice(start, self.pos);
                match raw[1..].parse::<u32>() {
                    Ok(number) if !in_class => Token::DecimalEscape { number, raw },
                    Ok(number) => Token::Char(Char::coded(raw, CharKind::Decimal, number)),
                    Err(_) => return Err(self.error_at(start)),
                }
            }
            'x' => match self.hex_digits(2, 2) {
                Some(code) => {
                    self.pos += 4;
                    Token::Char(Char::coded(self.slice(start, self.pos), CharKind::Hex, code))
                }
                None => self.take(2, Token::Char(Char::escaped('x'))),
            },
            'u' => self.unicode_escape(start, unicode),
            'c' => match self.peek(2) {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 3;
                    Token::Char(Char::coded(
                        self.slice(start, self.pos),
                        CharKind::Control,
                        letter as u32 % 32,
                    ))
                }
                _ => self.take(2, Token::Char(Char::escaped('c'))),
            },
            'k' if !in_class && self.peek(2) == Some('<') => {
                let saved = self.pos;
                self.pos += 3;
                match self.group_name(start) {
                    Ok((name, raw)) => Token::NamedReference { name, raw },
                    Err(err @ RegexError::Lexer { .. }) => return Err(err),
                    Err(_) => {
                        self.pos = saved;
                        self.take(2, Token::Char(Char::escaped('k')))
                    }
                }
            }
            'p' | 'P' if unicode => {
                if self.peek(2) != Some('{') {
                    return Err(self.error_at(start));
                }
                let body_start = self.pos + 3;
                let mut end = body_start;
                while end < self.end && self.chars[end] != '}' {
                    end += 1;
                }
                if end >= self.end {
                    return Err(self.error_at(start));
                }
                let body = self.slice(body_start, end);
                self.pos = end + 1;
                Token::UnicodeProperty {
                    negative: next == 'P',
                    body,
                }
            }
            other => self.take(2, Token::Char(Char::escaped(other))),
        };
        Ok(token)
    }

    fn unicode_escape(&mut self, start: usize, unicode: bool) -> Token {
        self.pos += 2;
        if unicode && self.peek(0) == Some('{') {
            let saved = self.pos;
            if let Some(code) = self.braced_code_point() {
                return Token::Char(Char::coded(
                    self.slice(start, self.pos),
                    CharKind::Unicode,
                    code,
                ));
            }
            self.pos = saved;
        }
        let Some(lead) = self.hex_digits(0, 4) else {
            return Token::Char(Char::escaped('u'));
        };
        self.pos += 4;
        let mut code = lead;
        if unicode
            && (0xD800..=0xDBFF).contains(&lead)
            && self.peek(0) == Some('\\')
            && self.peek(1) == Some('u')
            && let Some(trail) = self.hex_digits(2, 4)
            && (0xDC00..=0xDFFF).contains(&trail)
        {
            self.pos += 6;
            code = 0x10000 + ((lead - 0xD800) << 10) + (trail - 0xDC00);
        }
        Token::Char(Char::coded(
            self.slice(start, self.pos),
            CharKind::Unicode,
            code,
        ))
    }

    /// `\uXXXX` after the `\u` has been consumed
    fn code_unit_escape(&mut self) -> Option<char> {
        let code = self.hex_digits(0, 4)?;
        self.pos += 4;
        char::from_u32(code)
    }

    /// `{X..}` after `\u`; leaves `pos` after the `}` on success
    fn braced_code_point(&mut self) -> Option<u32> {
        let mut end = self.pos + 1;
        while end < self.end && self.chars[end].is_ascii_hexdigit() {
            end += 1;
        }
        if end == self.pos + 1 || end >= self.end || self.chars[end] != '}' {
            return None;
        }
        let digits = self.slice(self.pos + 1, end);
        let code = u32::from_str_radix(&digits, 16).ok()?;
        if code > 0x10FFFF {
            return None;
        }
        self.pos = end + 1;
        Some(code)
    }

    /// Parse exactly `len` hex digits starting `offset` chars ahead
    fn hex_digits(&self, offset: usize, len: usize) -> Option<u32> {
        let start = self.pos + offset;
        if start + len > self.end {
            return None;
        }
        let digits: String = self.chars[start..start + len].iter().collect();
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(&digits, 16).ok()
    }

    /// Match `{n}`, `{n,}` or `{n,m}` at the cursor: (length, from, to)
    fn range_quantifier(&self) -> Option<(usize, u32, Option<u32>)> {
        let mut i = self.pos + 1;
        let from_start = i;
        while i < self.end && self.chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == from_start || i >= self.end {
            return None;
        }
        let from: u32 = self.slice(from_start, i).parse().ok()?;
        match self.chars[i] {
            '}' => Some((i + 1 - self.pos, from, Some(from))),
            ',' => {
                i += 1;
                let to_start = i;
                while i < self.end && self.chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i >= self.end || self.chars[i] != '}' {
                    return None;
                }
                let to = if i == to_start {
                    None
                } else {
                    Some(self.slice(to_start, i).parse().ok()?)
                };
                Some((i + 1 - self.pos, from, to))
            }
            _ => None,
        }
    }

    fn skip_extended_whitespace(&mut self) {
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek(0) {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        let i = self.pos + ahead;
        if i < self.end { Some(self.chars[i]) } else { None }
    }

    fn take(&mut self, len: usize, token: Token) -> Token {
        self.pos += len;
        token
    }

    fn error_at(&self, offset: usize) -> RegexError {
        let position = self.position(offset);
        let symbol = self.chars.get(offset).map(|c| c.to_string()).unwrap_or_default();
        RegexError::Lexer {
            symbol,
            line: position.line,
            column: position.column,
            snippet: render_snippet(self.source, position.line, position.column),
        }
    }
}

/// Identifier check for group names
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '$' || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '$' | '_' | '\u{200c}' | '\u{200d}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(body: &str, flags: &str) -> Vec<Token> {
        let source = format!("/{}/{}", body, flags);
        let len = body.chars().count();
        let flags = Flags::parse(flags).unwrap();
        let mut lexer = Lexer::new(&source, 1..1 + len, &flags);
        let mut tokens = Vec::new();
        loop {
            let spanned = lexer.next_token().unwrap();
            if spanned.token == Token::Eof {
                break;
            }
            tokens.push(spanned.token);
        }
        tokens
    }

    #[test]
    fn test_literal_sequence() {
        assert_eq!(
            tokenize("ab", ""),
            vec![
                Token::Char(Char::simple('a')),
                Token::Char(Char::simple('b'))
            ]
        );
    }

    #[test]
    fn test_quantifier_braces() {
        assert_eq!(
            tokenize("a{2,}", "")[1],
            Token::Range { from: 2, to: None }
        );
        assert_eq!(
            tokenize("a{2,3}", "")[1],
            Token::Range {
                from: 2,
                to: Some(3)
            }
        );
        assert_eq!(tokenize("a{x}", "")[1], Token::Char(Char::simple('{')));
    }

    #[test]
    fn test_group_openers() {
        assert_eq!(tokenize("(?:", ""), vec![Token::NonCapturing]);
        assert_eq!(tokenize("(?<!", ""), vec![Token::Lookbehind { negative: true }]);
        assert_eq!(
            tokenize("(?<year>", ""),
            vec![Token::NamedGroupOpen {
                name: "year".to_string(),
                raw: "year".to_string()
            }]
        );
    }

    #[test]
    fn test_group_name_with_escape() {
        assert_eq!(
            tokenize("(?<\\u0061b>", ""),
            vec![Token::NamedGroupOpen {
                name: "ab".to_string(),
                raw: "\\u0061b".to_string()
            }]
        );
    }

    #[test]
    fn test_group_name_braced_escape_requires_unicode() {
        let source = "/(?<\\u{61}>)/";
        let mut lexer = Lexer::new(source, 1..11, &Flags::default());
        assert!(matches!(
            lexer.next_token(),
            Err(RegexError::Lexer { .. })
        ));
    }

    #[test]
    fn test_escapes() {
        let tokens = tokenize("\\d\\x41\\u0042\\cJ\\0\\012", "");
        assert_eq!(tokens[0], Token::Char(Char::meta("\\d")));
        assert_eq!(tokens[1], Token::Char(Char::coded("\\x41", CharKind::Hex, 0x41)));
        assert_eq!(
            tokens[2],
            Token::Char(Char::coded("\\u0042", CharKind::Unicode, 0x42))
        );
        assert_eq!(tokens[3], Token::Char(Char::coded("\\cJ", CharKind::Control, 10)));
        assert_eq!(tokens[4], Token::Char(Char::coded("\\0", CharKind::Decimal, 0)));
        assert_eq!(tokens[5], Token::Char(Char::coded("\\012", CharKind::Oct, 10)));
    }

    #[test]
    fn test_surrogate_pair_in_unicode_mode() {
        let tokens = tokenize("\\ud83d\\ude80", "u");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0],
            Token::Char(Char::coded("\\ud83d\\ude80", CharKind::Unicode, 0x1F680))
        );
        assert_eq!(tokenize("\\ud83d\\ude80", "").len(), 2);
    }

    #[test]
    fn test_class_state() {
        let tokens = tokenize("[^a-\\b]]", "");
        assert_eq!(
            tokens,
            vec![
                Token::ClassOpen { negative: true },
                Token::Char(Char::simple('a')),
                Token::Dash,
                Token::Char(Char::meta("\\b")),
                Token::ClassClose,
                Token::Char(Char::simple(']')),
            ]
        );
    }

    #[test]
    fn test_extended_skips_whitespace_and_comments() {
        let tokens = tokenize("a b # comment\n[ ]", "x");
        assert_eq!(
            tokens,
            vec![
                Token::Char(Char::simple('a')),
                Token::Char(Char::simple('b')),
                Token::ClassOpen { negative: false },
                Token::Char(Char::simple(' ')),
                Token::ClassClose,
            ]
        );
    }

    #[test]
    fn test_unicode_property_only_in_unicode_mode() {
        assert_eq!(
            tokenize("\\p{L}", "u"),
            vec![Token::UnicodeProperty {
                negative: false,
                body: "L".to_string()
            }]
        );
        assert_eq!(tokenize("\\p{L}", "")[0], Token::Char(Char::escaped('p')));
    }

    #[test]
    fn test_trailing_backslash_is_lexer_error() {
        let source = "/a\\/";
        let mut lexer = Lexer::new(source, 1..3, &Flags::default());
        lexer.next_token().unwrap();
        match lexer.next_token() {
            Err(RegexError::Lexer { symbol, line, column, .. }) => {
                assert_eq!(symbol, "\\");
                assert_eq!((line, column), (1, 3));
            }
            other => panic!("expected lexer error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("year"));
        assert!(is_identifier("$_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
    }
}
