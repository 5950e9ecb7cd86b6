//! Generic traversal-based rewriting and its result wrapper

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

use crate::ast::{Ast, Flags};
use crate::error::Result;
use crate::generator::{generate, generate_node};
use crate::compat::compat_transpile_ast;
use crate::native::NativeRegex;
use crate::parser::parse;
use crate::traverse::{Handler, traverse};

/// Capturing group name to number
pub type GroupMap = BTreeMap<String, u32>;

/// A transformed expression with lazily generated text
#[derive(Debug, Clone)]
pub struct TransformResult {
    ast: Ast,
    extra: Option<GroupMap>,
    string: OnceCell<String>,
    source: OnceCell<String>,
}

impl TransformResult {
    /// Wrap an AST
    pub fn new(ast: Ast) -> Self {
        TransformResult {
            ast,
            extra: None,
            string: OnceCell::new(),
            source: OnceCell::new(),
        }
    }

    /// Wrap an AST with side-channel data from the transform
    pub fn with_extra(ast: Ast, extra: GroupMap) -> Self {
        TransformResult {
            extra: Some(extra),
            ..TransformResult::new(ast)
        }
    }

    /// The transformed AST
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Take the AST out
    pub fn into_ast(self) -> Ast {
        self.ast
    }

    /// The pattern body without slashes and flags
    pub fn source(&self) -> &str {
        self.source.get_or_init(|| match self.ast.body() {
            Some(body) => generate_node(&self.ast, body),
            None => String::new(),
        })
    }

    /// The flags
    pub fn flags(&self) -> &Flags {
        self.ast.flags()
    }

    /// Data the transform reported (the group map for compat transpiling)
    pub fn extra(&self) -> Option<&GroupMap> {
        self.extra.as_ref()
    }

    /// Compile the result with the native engine; group names already
    /// compiled away by an earlier compat pass stay queryable
    pub fn to_regexp(&self) -> Result<NativeRegex> {
        let compat = compat_transpile_ast(self.ast.clone(), &[]);
        let mut groups = self.extra.clone().unwrap_or_default();
        groups.extend(compat.extra().cloned().unwrap_or_default());
        NativeRegex::compile(compat.source(), compat.flags().as_str(), groups)
    }

    /// The `/pattern/flags` text
    pub fn as_str(&self) -> &str {
        self.string.get_or_init(|| generate(&self.ast))
    }
}

impl fmt::Display for TransformResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `source` and run `handlers` over it
pub fn transform(source: &str, handlers: &mut [&mut dyn Handler]) -> Result<TransformResult> {
    let ast = parse(source)?;
    Ok(transform_ast(ast, handlers))
}

/// Run `handlers` over an already parsed expression
pub fn transform_ast(mut ast: Ast, handlers: &mut [&mut dyn Handler]) -> TransformResult {
    traverse(&mut ast, handlers);
    TransformResult::new(ast)
}
