//! Parser for regex patterns
//!
//! This module provides a recursive descent parser that converts a
//! `/pattern/flags` source into an [`Ast`].
//!
//! Grammar (in order of precedence, lowest to highest):
//!   regexp      := '/' disjunction '/' flags
//!   disjunction := alternative ( '|' alternative )*
//!   alternative := term*
//!   term        := assertion | atom quantifier?
//!   quantifier  := ( '*' | '+' | '?' | '{' n (',' m?)? '}' ) '?'?
//!   atom        := char | class | group | backreference | property
//!   class       := '[' '^'? ( class_atom ( '-' class_atom )? )* ']'
//!
//! Disjunctions lean left: `a|b|c` is `((a|b)|c)`. Alternatives with a
//! single term are never built; the term stands on its own.

use tracing::trace;

use crate::ast::{
    AssertionKind, Ast, Backreference, BackreferenceKind, Char, CharKind, Flags, Group, Loc,
    NodeId, NodeKind, Quantifier, QuantifierKind, UnicodeProperty,
};
use crate::error::{ParseError, Result};
use crate::groups::GroupRegistry;
use crate::lexer::{Lexer, Spanned, Token};
use crate::unicode;

/// Parser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach a [`Loc`] with the exact source text to every node
    pub capture_locations: bool,
    /// Accept repeated group names; the first group keeps the name
    pub allow_group_name_duplicates: bool,
}

/// Parser for regex patterns
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned,
    peeked: Option<Spanned>,
    last_end: usize,
    ast: Ast,
    groups: GroupRegistry,
    capture_locations: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser for a `/pattern/flags` source
    pub fn new(source: &'a str, options: &ParseOptions) -> Result<Self> {
        let chars: Vec<char> = source.chars().collect();
        let last_slash = chars.iter().rposition(|c| *c == '/');
        let (Some('/'), Some(last_slash)) = (chars.first().copied(), last_slash) else {
            return Err(ParseError::MissingDelimiters.into());
        };
        if last_slash == 0 {
            return Err(ParseError::MissingDelimiters.into());
        }
        let raw_flags: String = chars[last_slash + 1..].iter().collect();
        let flags =
            Flags::parse(&raw_flags).ok_or_else(|| ParseError::InvalidFlags(raw_flags.clone()))?;

        let mut lexer = Lexer::new(source, 1..last_slash, &flags);
        let current = lexer.next_token()?;
        let mut ast = Ast::new(flags);
        if options.capture_locations {
            let root = ast.root();
            let loc = Loc {
                source: source.to_string(),
                start: lexer.position(0),
                end: lexer.position(chars.len()),
            };
            ast.set_loc(root, Some(loc));
        }

        Ok(Parser {
            lexer,
            current,
            peeked: None,
            last_end: 1,
            ast,
            groups: GroupRegistry::new(options.allow_group_name_duplicates),
            capture_locations: options.capture_locations,
        })
    }

    /// Parse the whole source
    pub fn parse(mut self) -> Result<Ast> {
        let body = self.parse_disjunction()?;
        if self.current.token != Token::Eof {
            return Err(self.unexpected());
        }
        self.ast.set_body(body);
        trace!(groups = self.groups.group_count(), "parsed regexp");
        Ok(self.ast)
    }

    fn advance(&mut self) -> Result<Spanned> {
        let next = match self.peeked.take() {
            Some(next) => next,
            None => self.lexer.next_token()?,
        };
        let previous = std::mem::replace(&mut self.current, next);
        self.last_end = previous.end;
        Ok(previous)
    }

    /// Whether the token after the current one closes a class
    fn next_closes_class(&mut self) -> Result<bool> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(matches!(
            self.peeked.as_ref().map(|s| &s.token),
            Some(Token::ClassClose | Token::Eof) | None
        ))
    }

    fn expect_right_paren(&mut self) -> Result<()> {
        match self.current.token {
            Token::RightParen => {
                self.advance()?;
                Ok(())
            }
            Token::Eof => Err(ParseError::UnexpectedEof.into()),
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> crate::error::RegexError {
        if self.current.token == Token::Eof {
            return ParseError::UnexpectedEof.into();
        }
        let position = self.lexer.position(self.current.start);
        ParseError::UnexpectedToken {
            found: self.current.token.to_string(),
            line: position.line,
            column: position.column,
        }
        .into()
    }

    fn node(&mut self, kind: NodeKind, start: usize) -> NodeId {
        let loc = self.capture_locations.then(|| Loc {
            source: self.lexer.slice(start, self.last_end),
            start: self.lexer.position(start),
            end: self.lexer.position(self.last_end),
        });
        self.ast.alloc_with_loc(kind, loc)
    }

    fn parse_disjunction(&mut self) -> Result<Option<NodeId>> {
        let start = self.current.start;
        let mut left = self.parse_alternative()?;
        while self.current.token == Token::Pipe {
            self.advance()?;
            let right = self.parse_alternative()?;
            left = Some(self.node(NodeKind::Disjunction { left, right }, start));
        }
        Ok(left)
    }

    fn parse_alternative(&mut self) -> Result<Option<NodeId>> {
        let start = self.current.start;
        let mut terms = Vec::new();
        while !matches!(
            self.current.token,
            Token::Pipe | Token::RightParen | Token::Eof
        ) {
            terms.push(self.parse_term()?);
        }
        Ok(match terms.len() {
            0 => None,
            1 => Some(terms[0]),
            _ => Some(self.node(NodeKind::Alternative { expressions: terms }, start)),
        })
    }

    fn parse_term(&mut self) -> Result<NodeId> {
        let start = self.current.start;
        let simple_assertion = match self.current.token {
            Token::Caret => Some(AssertionKind::Start),
            Token::Dollar => Some(AssertionKind::End),
            Token::WordBoundary => Some(AssertionKind::WordBoundary),
            Token::NonWordBoundary => Some(AssertionKind::NonWordBoundary),
            _ => None,
        };
        if let Some(kind) = simple_assertion {
            self.advance()?;
            let node = self.node(
                NodeKind::Assertion {
                    kind,
                    negative: false,
                    assertion: None,
                },
                start,
            );
            if self.at_quantifier() {
                return Err(ParseError::NothingToRepeat.into());
            }
            return Ok(node);
        }

        let atom = match self.current.token.clone() {
            Token::Lookahead { negative } | Token::Lookbehind { negative } => {
                let kind = if matches!(self.current.token, Token::Lookahead { .. }) {
                    AssertionKind::Lookahead
                } else {
                    AssertionKind::Lookbehind
                };
                self.advance()?;
                let assertion = self.parse_disjunction()?;
                self.expect_right_paren()?;
                let node = self.node(
                    NodeKind::Assertion {
                        kind,
                        negative,
                        assertion,
                    },
                    start,
                );
                if kind == AssertionKind::Lookbehind && self.at_quantifier() {
                    return Err(ParseError::NothingToRepeat.into());
                }
                node
            }
            Token::Star | Token::Plus | Token::Question | Token::Range { .. } => {
                return Err(ParseError::NothingToRepeat.into());
            }
            _ => self.parse_atom()?,
        };

        if let Some(quantifier) = self.parse_quantifier()? {
            let repetition_start = self
                .ast
                .node(atom)
                .loc
                .as_ref()
                .map_or(start, |loc| loc.start.offset);
            let repetition = self.node(
                NodeKind::Repetition {
                    expression: atom,
                    quantifier,
                },
                repetition_start,
            );
            if self.at_quantifier() {
                return Err(ParseError::NothingToRepeat.into());
            }
            return Ok(repetition);
        }
        Ok(atom)
    }

    fn at_quantifier(&self) -> bool {
        matches!(
            self.current.token,
            Token::Star | Token::Plus | Token::Question | Token::Range { .. }
        )
    }

    fn parse_quantifier(&mut self) -> Result<Option<Quantifier>> {
        let kind = match self.current.token {
            Token::Star => QuantifierKind::ZeroOrMore,
            Token::Plus => QuantifierKind::OneOrMore,
            Token::Question => QuantifierKind::ZeroOrOne,
            Token::Range { from, to } => {
                if let Some(to) = to
                    && from > to
                {
                    return Err(ParseError::QuantifierOutOfOrder { from, to }.into());
                }
                QuantifierKind::Range { from, to }
            }
            _ => return Ok(None),
        };
        self.advance()?;
        let greedy = if self.current.token == Token::Question {
            self.advance()?;
            false
        } else {
            true
        };
        Ok(Some(Quantifier { kind, greedy }))
    }

    fn parse_atom(&mut self) -> Result<NodeId> {
        let start = self.current.start;
        let depth = self.lexer.depth();
        let spanned = self.advance()?;
        let node = match spanned.token {
            Token::Char(c) => self.node(NodeKind::Char(c), start),
            Token::DecimalEscape { number, raw } => {
                if number <= self.groups.group_count() {
                    self.node(
                        NodeKind::Backreference(Backreference {
                            kind: BackreferenceKind::Number,
                            number,
                            reference: number.to_string(),
                            reference_raw: None,
                        }),
                        start,
                    )
                } else {
                    self.node(
                        NodeKind::Char(Char::coded(raw, CharKind::Decimal, number)),
                        start,
                    )
                }
            }
            Token::NamedReference { name, raw } => match self.groups.get_by_name(&name) {
                Some(number) => self.node(
                    NodeKind::Backreference(Backreference {
                        kind: BackreferenceKind::Name,
                        number,
                        reference_raw: (raw != name).then_some(raw),
                        reference: name,
                    }),
                    start,
                ),
                // an unresolved `\k<name>` is an escaped `k`; the rest lexes again as text
                None => {
                    self.lexer.rewind(start + 2, depth);
                    self.peeked = None;
                    self.current = self.lexer.next_token()?;
                    self.last_end = start + 2;
                    self.node(NodeKind::Char(Char::escaped('k')), start)
                }
            },
            Token::UnicodeProperty { negative, body } => {
                let node = self.unicode_property(negative, &body)?;
                self.node(node, start)
            }
            Token::LeftParen => {
                let number = self.groups.register_group(None)?;
                self.parse_group(Some(number), None, None, start)?
            }
            Token::NamedGroupOpen { name, raw } => {
                let number = self.groups.register_group(Some(&name))?;
                let name_raw = (raw != name).then_some(raw);
                self.parse_group(Some(number), Some(name), name_raw, start)?
            }
            Token::NonCapturing => self.parse_group(None, None, None, start)?,
            Token::ClassOpen { negative } => self.parse_class(negative, start)?,
            Token::Eof => return Err(ParseError::UnexpectedEof.into()),
            token => {
                let position = self.lexer.position(start);
                return Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    line: position.line,
                    column: position.column,
                }
                .into());
            }
        };
        Ok(node)
    }

    fn unicode_property(&self, negative: bool, body: &str) -> Result<NodeKind> {
        let resolved = unicode::resolve(body)
            .ok_or_else(|| ParseError::UnknownUnicodeProperty(body.to_string()))?;
        Ok(NodeKind::UnicodeProperty(UnicodeProperty {
            name: resolved.name,
            value: resolved.value,
            negative,
            shorthand: resolved.shorthand,
            binary: resolved.binary,
            canonical_name: resolved.canonical_name,
            canonical_value: resolved.canonical_value,
        }))
    }

    fn parse_group(
        &mut self,
        number: Option<u32>,
        name: Option<String>,
        name_raw: Option<String>,
        start: usize,
    ) -> Result<NodeId> {
        let expression = self.parse_disjunction()?;
        self.expect_right_paren()?;
        Ok(self.node(
            NodeKind::Group(Group {
                capturing: number.is_some(),
                name,
                name_raw,
                number,
                expression,
            }),
            start,
        ))
    }

    fn parse_class(&mut self, negative: bool, start: usize) -> Result<NodeId> {
        let mut expressions = Vec::new();
        loop {
            match self.current.token {
                Token::ClassClose => {
                    self.advance()?;
                    break;
                }
                Token::Eof => return Err(ParseError::UnexpectedEof.into()),
                _ => {}
            }

            let item_start = self.current.start;
            let from = self.parse_class_atom()?;
            let forms_range = self.current.token == Token::Dash && !self.next_closes_class()?;
            if !forms_range {
                expressions.push(from);
                continue;
            }

            let dash_start = self.current.start;
            self.advance()?;
            let to = self.parse_class_atom()?;
            let endpoints = match (self.ast.kind(from), self.ast.kind(to)) {
                (NodeKind::Char(a), NodeKind::Char(b))
                    if a.code_point.is_some() && b.code_point.is_some() =>
                {
                    Some((a.clone(), b.clone()))
                }
                _ => None,
            };
            match endpoints {
                Some((a, b)) => {
                    if a.kind == CharKind::Control
                        || b.kind == CharKind::Control
                        || a.code_point > b.code_point
                    {
                        return Err(ParseError::RangeOutOfOrder {
                            from: a.value,
                            to: b.value,
                        }
                        .into());
                    }
                    expressions.push(self.node(NodeKind::ClassRange { from: a, to: b }, item_start));
                }
                None => {
                    // A class escape on either side makes the dash literal
                    let dash = self.ast.alloc_char(Char::simple('-'));
                    if self.capture_locations {
                        let loc = Loc {
                            source: "-".to_string(),
                            start: self.lexer.position(dash_start),
                            end: self.lexer.position(dash_start + 1),
                        };
                        self.ast.set_loc(dash, Some(loc));
                    }
                    expressions.extend([from, dash, to]);
                }
            }
        }
        Ok(self.node(
            NodeKind::CharacterClass {
                negative,
                expressions,
            },
            start,
        ))
    }

    fn parse_class_atom(&mut self) -> Result<NodeId> {
        let start = self.current.start;
        let spanned = self.advance()?;
        match spanned.token {
            Token::Char(c) => Ok(self.node(NodeKind::Char(c), start)),
            Token::Dash => Ok(self.node(NodeKind::Char(Char::simple('-')), start)),
            Token::UnicodeProperty { negative, body } => {
                let kind = self.unicode_property(negative, &body)?;
                Ok(self.node(kind, start))
            }
            Token::Eof => Err(ParseError::UnexpectedEof.into()),
            token => {
                let position = self.lexer.position(start);
                Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    line: position.line,
                    column: position.column,
                }
                .into())
            }
        }
    }
}

/// Parse a `/pattern/flags` source with default options
pub fn parse(source: &str) -> Result<Ast> {
    parse_with(source, &ParseOptions::default())
}

/// Parse a `/pattern/flags` source
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Ast> {
    Parser::new(source, options)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegexError;

    fn body_kind(ast: &Ast) -> &NodeKind {
        ast.kind(ast.body().unwrap())
    }

    #[test]
    fn test_parse_literal() {
        let ast = parse("/ab/").unwrap();
        match body_kind(&ast) {
            NodeKind::Alternative { expressions } => assert_eq!(expressions.len(), 2),
            other => panic!("expected alternative, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_single_term_is_not_wrapped() {
        let ast = parse("/a/").unwrap();
        assert!(matches!(body_kind(&ast), NodeKind::Char(_)));
    }

    #[test]
    fn test_parse_empty() {
        let ast = parse("//").unwrap();
        assert!(ast.body().is_none());
    }

    #[test]
    fn test_parse_flags_sorted() {
        let ast = parse("/a/ymg").unwrap();
        assert_eq!(ast.flags().as_str(), "gmy");
        assert_eq!(parse("/a|a|a/").unwrap().flags().as_str(), "");
    }

    #[test]
    fn test_parse_invalid_flags() {
        assert_eq!(
            parse("/a/gg").unwrap_err(),
            RegexError::Parse(ParseError::InvalidFlags("gg".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_delimiters() {
        assert_eq!(
            parse("abc").unwrap_err(),
            RegexError::Parse(ParseError::MissingDelimiters)
        );
    }

    #[test]
    fn test_parse_disjunction_leans_left() {
        let ast = parse("/a|b|c/").unwrap();
        match body_kind(&ast) {
            NodeKind::Disjunction {
                left: Some(left),
                right: Some(_),
            } => assert!(matches!(ast.kind(*left), NodeKind::Disjunction { .. })),
            other => panic!("expected disjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_group_numbers_in_open_order() {
        let ast = parse("/((a)(b))/").unwrap();
        let outer = ast.body().unwrap();
        let NodeKind::Group(group) = ast.kind(outer) else {
            panic!("expected group");
        };
        assert_eq!(group.number, Some(1));
        let inner = ast.expressions(group.expression.unwrap()).to_vec();
        let numbers: Vec<Option<u32>> = inner
            .iter()
            .map(|id| match ast.kind(*id) {
                NodeKind::Group(g) => g.number,
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![Some(2), Some(3)]);
    }

    #[test]
    fn test_parse_backreference_number() {
        let ast = parse("/(a)\\1/").unwrap();
        let second = ast.expressions(ast.body().unwrap())[1];
        assert!(matches!(
            ast.kind(second),
            NodeKind::Backreference(Backreference { number: 1, .. })
        ));
    }

    #[test]
    fn test_parse_decimal_escape_without_group() {
        let ast = parse("/\\1(a)/").unwrap();
        let first = ast.expressions(ast.body().unwrap())[0];
        let NodeKind::Char(c) = ast.kind(first) else {
            panic!("expected char");
        };
        assert_eq!(c.kind, CharKind::Decimal);
        assert_eq!(c.code_point, Some(1));
    }

    #[test]
    fn test_parse_named_backreference() {
        let ast = parse("/(?<year>\\d{4})-\\k<year>/").unwrap();
        let last = *ast.expressions(ast.body().unwrap()).last().unwrap();
        match ast.kind(last) {
            NodeKind::Backreference(backref) => {
                assert_eq!(backref.kind, BackreferenceKind::Name);
                assert_eq!(backref.reference, "year");
                assert_eq!(backref.number, 1);
            }
            other => panic!("expected backreference, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_named_reference_is_chars() {
        let ast = parse("/\\k<missing>/").unwrap();
        let items = ast.expressions(ast.body().unwrap());
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|id| matches!(ast.kind(*id), NodeKind::Char(_))));
    }

    #[test]
    fn test_parse_missing_named_reference_keeps_escapes() {
        let options = ParseOptions {
            capture_locations: true,
            ..ParseOptions::default()
        };
        let ast = parse_with("/\\k<\\u0061>+/", &options).unwrap();
        assert_eq!(crate::generator::generate(&ast), "/\\k<\\u0061>+/");

        let items = ast.expressions(ast.body().unwrap()).to_vec();
        assert_eq!(items.len(), 4);
        let sources: Vec<&str> = items
            .iter()
            .map(|id| ast.node(*id).loc.as_ref().unwrap().source.as_str())
            .collect();
        assert_eq!(sources, ["\\k", "<", "\\u0061", ">+"]);
        match ast.kind(items[2]) {
            NodeKind::Char(c) => assert_eq!(c.code_point, Some(0x61)),
            other => panic!("expected char, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_duplicate_group_name() {
        assert_eq!(
            parse("/(?<a>x)(?<a>y)/").unwrap_err(),
            RegexError::Parse(ParseError::DuplicateGroupName("a".to_string()))
        );
        let options = ParseOptions {
            allow_group_name_duplicates: true,
            ..ParseOptions::default()
        };
        assert!(parse_with("/(?<a>x)(?<a>y)/", &options).is_ok());
    }

    #[test]
    fn test_parse_quantifier_lazy() {
        let ast = parse("/a{2,}?/").unwrap();
        match body_kind(&ast) {
            NodeKind::Repetition { quantifier, .. } => {
                assert_eq!(quantifier.bounds(), (2, None));
                assert!(!quantifier.greedy);
            }
            other => panic!("expected repetition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_quantifier_out_of_order() {
        assert_eq!(
            parse("/a{3,2}/").unwrap_err(),
            RegexError::Parse(ParseError::QuantifierOutOfOrder { from: 3, to: 2 })
        );
    }

    #[test]
    fn test_parse_nothing_to_repeat() {
        assert_eq!(
            parse("/*a/").unwrap_err(),
            RegexError::Parse(ParseError::NothingToRepeat)
        );
        assert_eq!(
            parse("/^*/").unwrap_err(),
            RegexError::Parse(ParseError::NothingToRepeat)
        );
        assert!(parse("/(?=a)*/").is_ok());
    }

    #[test]
    fn test_parse_class_range_out_of_order() {
        assert_eq!(
            parse("/[z-a]/").unwrap_err(),
            RegexError::Parse(ParseError::RangeOutOfOrder {
                from: "z".to_string(),
                to: "a".to_string()
            })
        );
        assert!(parse("/[\\cA-\\cZ]/").is_err());
    }

    #[test]
    fn test_parse_class_dash_literal() {
        let ast = parse("/[\\d-z-]/").unwrap();
        assert_eq!(ast.expressions(ast.body().unwrap()).len(), 4);
    }

    #[test]
    fn test_parse_unclosed_group() {
        assert_eq!(
            parse("/(a/").unwrap_err(),
            RegexError::Parse(ParseError::UnexpectedEof)
        );
    }

    #[test]
    fn test_parse_stray_paren() {
        assert!(matches!(
            parse("/a)/").unwrap_err(),
            RegexError::Parse(ParseError::UnexpectedToken { column: 3, .. })
        ));
    }

    #[test]
    fn test_parse_unicode_property() {
        let ast = parse("/\\p{Script=Greek}/u").unwrap();
        match body_kind(&ast) {
            NodeKind::UnicodeProperty(prop) => {
                assert_eq!(prop.canonical_name, "Script");
                assert!(!prop.shorthand);
            }
            other => panic!("expected property, got {:?}", other),
        }
        assert_eq!(
            parse("/\\p{Foo}/u").unwrap_err(),
            RegexError::Parse(ParseError::UnknownUnicodeProperty("Foo".to_string()))
        );
    }

    #[test]
    fn test_parse_locations() {
        let options = ParseOptions {
            capture_locations: true,
            ..ParseOptions::default()
        };
        let ast = parse_with("/a(bc)+/", &options).unwrap();
        let repetition = ast.expressions(ast.body().unwrap())[1];
        let loc = ast.node(repetition).loc.clone().unwrap();
        assert_eq!(loc.source, "(bc)+");
        assert_eq!(loc.start.column, 3);
        assert_eq!(loc.end.offset, 7);
    }
}
