//! JavaScript bindings for the regtree toolkit
//!
//! Exposes `parse` (AST as plain objects), `optimize`, `compatTranspile`
//! and `test` to JavaScript. Built only with the `wasm` feature.

use wasm_bindgen::prelude::*;

use crate::ast::{Ast, NodeId, NodeKind, QuantifierKind};
use crate::optimizer::OptimizeOptions;

fn to_js_error(e: crate::RegexError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn set(object: &js_sys::Object, key: &str, value: impl Into<JsValue>) -> Result<(), JsValue> {
    js_sys::Reflect::set(object, &JsValue::from_str(key), &value.into()).map(|_| ())
}

fn optional_node(ast: &Ast, id: Option<NodeId>) -> Result<JsValue, JsValue> {
    match id {
        Some(id) => Ok(node_to_js(ast, id)?.into()),
        None => Ok(JsValue::NULL),
    }
}

fn node_list(ast: &Ast, ids: &[NodeId]) -> Result<js_sys::Array, JsValue> {
    let array = js_sys::Array::new();
    for id in ids {
        array.push(&node_to_js(ast, *id)?.into());
    }
    Ok(array)
}

/// Plain JS object mirroring the AST node `id`
fn node_to_js(ast: &Ast, id: NodeId) -> Result<js_sys::Object, JsValue> {
    let object = js_sys::Object::new();
    let kind = ast.kind(id);
    set(&object, "type", kind.type_name())?;
    match kind {
        NodeKind::RegExp { body, flags } => {
            set(&object, "body", optional_node(ast, *body)?)?;
            set(&object, "flags", flags.as_str())?;
        }
        NodeKind::Disjunction { left, right } => {
            set(&object, "left", optional_node(ast, *left)?)?;
            set(&object, "right", optional_node(ast, *right)?)?;
        }
        NodeKind::Alternative { expressions } => {
            set(&object, "expressions", node_list(ast, expressions)?)?;
        }
        NodeKind::Assertion {
            kind,
            negative,
            assertion,
        } => {
            set(&object, "kind", format!("{kind:?}"))?;
            set(&object, "negative", *negative)?;
            set(&object, "assertion", optional_node(ast, *assertion)?)?;
        }
        NodeKind::Char(c) => {
            set(&object, "value", c.value.as_str())?;
            set(&object, "kind", format!("{:?}", c.kind))?;
            set(&object, "escaped", c.escaped)?;
            if let Some(code_point) = c.code_point {
                set(&object, "codePoint", code_point)?;
            }
        }
        NodeKind::CharacterClass {
            negative,
            expressions,
        } => {
            set(&object, "negative", *negative)?;
            set(&object, "expressions", node_list(ast, expressions)?)?;
        }
        NodeKind::ClassRange { from, to } => {
            set(&object, "from", from.value.as_str())?;
            set(&object, "to", to.value.as_str())?;
        }
        NodeKind::Backreference(reference) => {
            set(&object, "kind", format!("{:?}", reference.kind))?;
            set(&object, "number", reference.number)?;
            set(&object, "reference", reference.reference.as_str())?;
        }
        NodeKind::Group(group) => {
            set(&object, "capturing", group.capturing)?;
            if let Some(name) = &group.name {
                set(&object, "name", name.as_str())?;
            }
            if let Some(number) = group.number {
                set(&object, "number", number)?;
            }
            set(&object, "expression", optional_node(ast, group.expression)?)?;
        }
        NodeKind::Repetition {
            expression,
            quantifier,
        } => {
            let js_quantifier = js_sys::Object::new();
            let (from, to) = quantifier.bounds();
            let name = match quantifier.kind {
                QuantifierKind::ZeroOrMore => "*",
                QuantifierKind::OneOrMore => "+",
                QuantifierKind::ZeroOrOne => "?",
                QuantifierKind::Range { .. } => "Range",
            };
            set(&js_quantifier, "kind", name)?;
            set(&js_quantifier, "from", from)?;
            if let Some(to) = to {
                set(&js_quantifier, "to", to)?;
            }
            set(&js_quantifier, "greedy", quantifier.greedy)?;
            set(&object, "quantifier", js_quantifier)?;
            set(&object, "expression", node_to_js(ast, *expression)?)?;
        }
        NodeKind::UnicodeProperty(property) => {
            set(&object, "name", property.canonical_name.as_str())?;
            set(&object, "value", property.canonical_value.as_str())?;
            set(&object, "negative", property.negative)?;
        }
    }
    Ok(object)
}

/// Parse `/pattern/flags` into a plain AST object
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<js_sys::Object, JsValue> {
    let ast = crate::parse(source).map_err(to_js_error)?;
    node_to_js(&ast, ast.root())
}

/// Optimize a regex, returning the `/pattern/flags` source
#[wasm_bindgen]
pub fn optimize(source: &str, blacklist: Option<Vec<String>>) -> Result<String, JsValue> {
    let options = OptimizeOptions {
        blacklist: blacklist.unwrap_or_default(),
        ..OptimizeOptions::default()
    };
    crate::optimize_with(source, &options)
        .map(|result| result.to_string())
        .map_err(to_js_error)
}

/// Rewrite newer syntax for older engines
#[wasm_bindgen(js_name = compatTranspile)]
pub fn compat_transpile(source: &str) -> Result<String, JsValue> {
    crate::compat_transpile(source)
        .map(|result| result.to_string())
        .map_err(to_js_error)
}

/// Whether the minimized DFA for `source` accepts the whole of `input`
#[wasm_bindgen]
pub fn test(source: &str, input: &str) -> Result<bool, JsValue> {
    crate::test(source, input).map_err(to_js_error)
}

/// Route Rust panics to the browser console
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_share_library_results() {
        assert_eq!(optimize("/(?:a)+/", None).ok().as_deref(), Some("/a+/"));
        assert_eq!(
            optimize("/(?:a)+/", Some(vec!["ungroup".to_string()])).ok().as_deref(),
            Some("/(?:a)+/")
        );
        assert_eq!(
            compat_transpile("/(?<y>a)\\k<y>/").ok().as_deref(),
            Some("/(a)\\1/")
        );
        assert_eq!(test("/ab*/", "abb").ok(), Some(true));
        assert_eq!(test("/ab*/", "ba").ok(), Some(false));
    }
}
