//! Error types for the regex toolkit
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: lexing, parsing, automaton
//! construction, transform selection, or native execution.

use thiserror::Error;

/// The main error type for the toolkit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegexError {
    /// Input the lexer has no rule for in its current state
    #[error("unexpected token: \"{symbol}\" at {line}:{column}\n\n{snippet}")]
    Lexer {
        /// The offending character (or escape sequence start)
        symbol: String,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
        /// The source line with a `^` pointer under the offending column
        snippet: String,
    },

    /// Grammar violations
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// AST features outside the subset the automaton interpreter models
    #[error("{0} is not supported in NFA/DFA interpreter")]
    Unsupported(String),

    /// A transform name that is not registered
    #[error("unknown transform: {name}. Available transforms are: {available}")]
    UnknownTransform {
        /// The requested name
        name: String,
        /// Comma separated list of valid names
        available: String,
    },

    /// The execution engine rejected the pattern
    #[error("native regex error: {0}")]
    Native(String),
}

/// Errors that occur during parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token encountered
    #[error("unexpected token {found} at {line}:{column}")]
    UnexpectedToken {
        /// What was actually found
        found: String,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Unexpected end of input
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Source is not of the form `/body/flags`
    #[error("regular expression must be delimited as /pattern/flags")]
    MissingDelimiters,

    /// Unknown or repeated flag
    #[error("invalid flags '{0}'")]
    InvalidFlags(String),

    /// Duplicate group name
    #[error("duplicate capturing group name '{0}'")]
    DuplicateGroupName(String),

    /// Group name that is not an identifier
    #[error("invalid capturing group name '{0}'")]
    InvalidGroupName(String),

    /// Class range whose bounds are reversed or not ordinary characters
    #[error("range {from}-{to} out of order in character class")]
    RangeOutOfOrder {
        /// Source of the lower bound
        from: String,
        /// Source of the upper bound
        to: String,
    },

    /// `{n,m}` with `n > m`
    #[error("numbers out of order in {{{from},{to}}} quantifier")]
    QuantifierOutOfOrder {
        /// Lower bound
        from: u32,
        /// Upper bound
        to: u32,
    },

    /// Quantifier with nothing (or an assertion) in front of it
    #[error("nothing to repeat")]
    NothingToRepeat,

    /// `\p{..}` with an unknown property name or value
    #[error("unknown unicode property '{0}'")]
    UnknownUnicodeProperty(String),
}

/// Result type alias for toolkit operations
pub type Result<T> = std::result::Result<T, RegexError>;

/// Render the line containing `line` with a caret under `column`
pub(crate) fn render_snippet(source: &str, line: usize, column: usize) -> String {
    let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    format!("{}\n{}^\n", text, " ".repeat(column.saturating_sub(1)))
}
