//! Regtree Core Library
//!
//! A regular expression processor for ECMAScript-style `/pattern/flags`
//! literals: parse to an AST, generate source back, traverse and rewrite
//! the tree, optimize it, transpile newer syntax for older engines, build
//! finite automata for the regular subset and run patterns natively.
//!
//! ```
//! let optimized = regtree::optimize("/[0-9]/").unwrap();
//! assert_eq!(optimized.to_string(), "/\\d/");
//!
//! assert!(regtree::test("/ab*c/", "abbbc").unwrap());
//! ```

pub mod ast;
pub mod compat;
pub mod error;
pub mod fa;
pub mod generator;
pub mod groups;
pub mod lexer;
pub mod native;
pub mod optimizer;
pub mod parser;
pub mod transform;
pub mod traverse;
pub mod unicode;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::{Ast, Char, CharKind, Flags, NodeId, NodeKind};
pub use compat::{
    COMPAT_TRANSFORMS, CompatOptions, compat_transpile, compat_transpile_ast,
    compat_transpile_with,
};
pub use error::{ParseError, RegexError, Result};
pub use fa::{Dfa, Nfa, to_dfa, to_nfa};
pub use generator::generate;
pub use native::{ExecMatch, NativeRegex, exec, to_regexp};
pub use optimizer::{OptimizeOptions, TRANSFORMS, optimize, optimize_ast, optimize_with};
pub use parser::{ParseOptions, Parser, parse, parse_with};
pub use transform::{GroupMap, TransformResult, transform, transform_ast};
pub use traverse::{Handler, NodePath, Visit, traverse};

/// Whether the minimized DFA for `source` accepts the whole of `input`
///
/// Only the regular subset is supported; see [`fa`].
pub fn test(source: &str, input: &str) -> Result<bool> {
    fa::test(source, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        let ast = parse("/a{1,}(?<x>b)\\k<x>/").unwrap();
        assert_eq!(generate(&ast), "/a{1,}(?<x>b)\\k<x>/");

        let optimized = optimize_ast(&ast, &OptimizeOptions::default()).unwrap();
        assert_eq!(optimized.to_string(), "/a+(?<x>b)\\k<x>/");

        let transpiled = compat_transpile(optimized.as_str()).unwrap();
        assert_eq!(transpiled.to_string(), "/a+(b)\\1/");

        let found = exec("/a+(?<x>b)\\k<x>/", "xaabb").unwrap().unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.named["x"].as_deref(), Some("b"));
        assert_eq!(found.groups[0].as_deref(), Some("aabb"));
    }

    #[test]
    fn test_automata_entry() {
        assert!(test("/ab*c/", "ac").unwrap());
        assert!(!test("/ab*c/", "abd").unwrap());
    }
}
