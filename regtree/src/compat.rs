//! Compat transpiler
//!
//! Rewrites newer syntax into forms older engines accept:
//! - `dotAll`: under `s`, every `.` becomes a class matching any code unit
//!   (any code point under `u`) and the flag is dropped
//! - `namedCapturingGroups`: names are stripped from groups and named
//!   backreferences become numeric; the name to number map is reported
//!   as the result's extra data
//! - `xFlag`: the flag is dropped; whitespace and comments never reached
//!   the AST

use tracing::debug;

use crate::ast::{Ast, BackreferenceKind, Char, CharKind, NodeKind};
use crate::error::{RegexError, Result};
use crate::parser::parse;
use crate::transform::{GroupMap, TransformResult};
use crate::traverse::{Handler, NodePath, Visit, traverse};

/// Names of the compat transforms, in application order
pub const COMPAT_TRANSFORMS: &[&str] = &["dotAll", "namedCapturingGroups", "xFlag"];

/// Compat transpiler configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatOptions {
    /// Transforms to apply; empty means all
    pub whitelist: Vec<String>,
}

#[derive(Default)]
struct DotAll {
    unicode: bool,
}

impl Handler for DotAll {
    fn should_run(&self, ast: &Ast) -> bool {
        ast.flags().has('s')
    }

    fn init(&mut self, ast: &Ast) {
        self.unicode = ast.flags().has('u');
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        match path.node(ast) {
            NodeKind::RegExp { .. } => ast.flags_mut().remove('s'),
            NodeKind::Char(c) if c.is_dot() => {
                let to = if self.unicode {
                    Char::coded("\\u{10FFFF}", CharKind::Unicode, 0x10FFFF)
                } else {
                    Char::coded("\\uFFFF", CharKind::Unicode, 0xFFFF)
                };
                let range = ast.alloc(NodeKind::ClassRange {
                    from: Char::coded("\\0", CharKind::Decimal, 0),
                    to,
                });
                path.replace(
                    ast,
                    NodeKind::CharacterClass {
                        negative: false,
                        expressions: vec![range],
                    },
                );
            }
            _ => {}
        }
        Visit::Continue
    }
}

#[derive(Default)]
struct NamedCapturingGroups {
    groups: GroupMap,
}

impl Handler for NamedCapturingGroups {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        match ast.kind_mut(path.id()) {
            NodeKind::Group(group) => {
                if let (Some(name), Some(number)) = (group.name.take(), group.number) {
                    self.groups.entry(name).or_insert(number);
                    group.name_raw = None;
                }
            }
            NodeKind::Backreference(backref) if backref.kind == BackreferenceKind::Name => {
                backref.kind = BackreferenceKind::Number;
                backref.reference = backref.number.to_string();
                backref.reference_raw = None;
            }
            _ => {}
        }
        Visit::Continue
    }
}

struct XFlag;

impl Handler for XFlag {
    fn should_run(&self, ast: &Ast) -> bool {
        ast.flags().has('x')
    }

    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        if matches!(path.node(ast), NodeKind::RegExp { .. }) {
            ast.flags_mut().remove('x');
        }
        Visit::Skip
    }
}

fn check_names(names: &[String]) -> Result<()> {
    for name in names {
        if !COMPAT_TRANSFORMS.contains(&name.as_str()) {
            return Err(RegexError::UnknownTransform {
                name: name.clone(),
                available: COMPAT_TRANSFORMS.join(", "),
            });
        }
    }
    Ok(())
}

/// Apply every compat transform to `source`
pub fn compat_transpile(source: &str) -> Result<TransformResult> {
    compat_transpile_with(source, &CompatOptions::default())
}

/// Apply the selected compat transforms to `source`
pub fn compat_transpile_with(source: &str, options: &CompatOptions) -> Result<TransformResult> {
    check_names(&options.whitelist)?;
    let ast = parse(source)?;
    Ok(compat_transpile_ast(ast, &options.whitelist))
}

/// Apply compat transforms to a parsed expression; an empty list means all
pub fn compat_transpile_ast(mut ast: Ast, whitelist: &[String]) -> TransformResult {
    let enabled = |name: &str| whitelist.is_empty() || whitelist.iter().any(|w| w == name);

    let mut dot_all = DotAll::default();
    let mut named = NamedCapturingGroups::default();
    let mut x_flag = XFlag;

    let mut handlers: Vec<&mut dyn Handler> = Vec::new();
    if enabled("dotAll") {
        handlers.push(&mut dot_all);
    }
    if enabled("namedCapturingGroups") {
        handlers.push(&mut named);
    }
    if enabled("xFlag") {
        handlers.push(&mut x_flag);
    }
    // `XFlag` skips everything below the root, so each transform walks on its own
    for handler in handlers {
        traverse(&mut ast, &mut [handler]);
    }

    debug!(groups = named.groups.len(), "compat transpiled");
    TransformResult::with_extra(ast, named.groups)
}
