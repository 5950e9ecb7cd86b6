//! Depth-first traversal with safe mutation
//!
//! Handlers receive a [`NodePath`] for every node, before (`pre`) and after
//! (`post`) its children. They may replace, remove or insert nodes while the
//! walk is in progress:
//! - every collection being iterated has an index cursor on a stack inside
//!   the [`Ast`]; removing an item at or before the cursor moves it back,
//!   inserting at or before it moves it forward, so no sibling is skipped
//!   or visited twice
//! - a node replaced during `pre` is followed to its replacement, whose
//!   children are then visited
//! - a removed node gets no further callbacks

use tracing::trace;

use crate::ast::{Ast, Cursor, NodeId, NodeKind, Property};

/// What to do after a `pre` callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Keep going: remaining handlers, then children
    #[default]
    Continue,
    /// Skip the remaining handlers and the children of this node
    Skip,
}

/// A traversal handler
///
/// Handlers match on [`NodeKind`] themselves; the default methods do nothing.
pub trait Handler {
    /// Whether the handler applies to this expression at all
    fn should_run(&self, _ast: &Ast) -> bool {
        true
    }

    /// Called once before the walk starts
    fn init(&mut self, _ast: &Ast) {}

    /// Called before the children of a node
    fn pre(&mut self, _ast: &mut Ast, _path: NodePath) -> Visit {
        Visit::Continue
    }

    /// Called after the children of a node
    fn post(&mut self, _ast: &mut Ast, _path: NodePath) {}
}

/// A node plus the operations that need its position in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodePath {
    id: NodeId,
}

impl NodePath {
    /// Path of `id`
    pub fn new(id: NodeId) -> Self {
        NodePath { id }
    }

    /// The node id
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The node payload
    pub fn node(self, ast: &Ast) -> &NodeKind {
        ast.kind(self.id)
    }

    /// Path of the parent
    pub fn parent(self, ast: &Ast) -> Option<NodePath> {
        ast.parent(self.id).map(NodePath::new)
    }

    /// Property of the parent holding this node
    pub fn property(self, ast: &Ast) -> Option<Property> {
        ast.link(self.id).map(|link| link.property)
    }

    /// Index within the parent collection
    pub fn index(self, ast: &Ast) -> Option<usize> {
        ast.link(self.id).and_then(|link| link.index)
    }

    /// The `n`-th child, in traversal order
    pub fn child(self, ast: &Ast, n: usize) -> Option<NodePath> {
        ast.children(self.id).get(n).copied().map(NodePath::new)
    }

    /// The sibling before this node in its collection
    pub fn previous_sibling(self, ast: &Ast) -> Option<NodePath> {
        let link = ast.link(self.id)?;
        let index = link.index?.checked_sub(1)?;
        ast.expressions(link.parent).get(index).copied().map(NodePath::new)
    }

    /// The sibling after this node in its collection
    pub fn next_sibling(self, ast: &Ast) -> Option<NodePath> {
        let link = ast.link(self.id)?;
        let index = link.index? + 1;
        ast.expressions(link.parent).get(index).copied().map(NodePath::new)
    }

    /// Replace the node with a new one; this path becomes removed
    pub fn replace(self, ast: &mut Ast, kind: NodeKind) -> NodePath {
        NodePath::new(ast.replace(self.id, kind))
    }

    /// Replace the node with an existing node
    pub fn replace_with(self, ast: &mut Ast, id: NodeId) -> NodePath {
        NodePath::new(ast.replace_with(self.id, id))
    }

    /// Detach the node
    pub fn remove(self, ast: &mut Ast) {
        ast.remove(self.id);
    }

    /// Insert a child into this node's collection
    pub fn insert_child_at(self, ast: &mut Ast, index: usize, child: NodeId) {
        ast.insert_child_at(self.id, index, child);
    }

    /// Append a child to this node's collection
    pub fn append_child(self, ast: &mut Ast, child: NodeId) {
        ast.append_child(self.id, child);
    }

    /// Structural equality with another subtree
    pub fn has_equal_source(self, ast: &Ast, other: NodePath) -> bool {
        ast.same_source(self.id, other.id)
    }

    /// Whether the node was replaced or removed
    pub fn is_removed(self, ast: &Ast) -> bool {
        ast.is_removed(self.id)
    }
}

/// Walk `ast` with each handler whose `should_run` accepts it
pub fn traverse(ast: &mut Ast, handlers: &mut [&mut dyn Handler]) {
    ast.relink_all();
    ast.cursors.clear();

    let view: &Ast = ast;
    let active: Vec<usize> = (0..handlers.len())
        .filter(|&i| handlers[i].should_run(view))
        .collect();
    if active.is_empty() {
        return;
    }
    for &i in &active {
        handlers[i].init(ast);
    }
    trace!(handlers = active.len(), "traversal started");

    let root = ast.root();
    visit(ast, root, handlers, &active);
    ast.cursors.clear();
}

fn resolve(ast: &Ast, mut id: NodeId) -> NodeId {
    while let Some(next) = ast.replacement(id) {
        id = next;
    }
    id
}

fn visit(ast: &mut Ast, id: NodeId, handlers: &mut [&mut dyn Handler], active: &[usize]) {
    let mut skip = false;
    for &i in active {
        if ast.is_removed(id) {
            break;
        }
        if handlers[i].pre(ast, NodePath::new(id)) == Visit::Skip {
            skip = true;
            break;
        }
    }

    let id = resolve(ast, id);
    if ast.is_removed(id) {
        return;
    }

    if !skip {
        for &property in ast.kind(id).properties() {
            if property == Property::Expressions {
                visit_collection(ast, id, handlers, active);
            } else if let Some(child) = ast.single(id, property) {
                visit(ast, child, handlers, active);
            }
            if ast.is_removed(id) {
                return;
            }
        }
    }

    for &i in active {
        if ast.is_removed(id) {
            return;
        }
        handlers[i].post(ast, NodePath::new(id));
    }
}

fn visit_collection(
    ast: &mut Ast,
    parent: NodeId,
    handlers: &mut [&mut dyn Handler],
    active: &[usize],
) {
    ast.cursors.push(Cursor { parent, index: 0 });
    let depth = ast.cursors.len() - 1;
    loop {
        let index = ast.cursors[depth].index;
        let Some(&child) = usize::try_from(index)
            .ok()
            .and_then(|i| ast.expressions(parent).get(i))
        else {
            break;
        };
        visit(ast, child, handlers, active);
        if ast.is_removed(parent) {
            break;
        }
        ast.cursors[depth].index += 1;
    }
    ast.cursors.truncate(depth);
}
