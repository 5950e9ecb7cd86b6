//! Abstract Syntax Tree (AST) for regex patterns
//!
//! Nodes live in an arena owned by [`Ast`] and are addressed by [`NodeId`].
//! Every node knows where it is attached (parent, property and index) through
//! a side table, so rewrite rules can replace, remove and insert nodes while a
//! traversal is in progress. Supported syntax:
//! - Chars of every escape form, character classes and class ranges
//! - Quantifiers (`*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`, lazy variants)
//! - Groups (capturing, non-capturing, named)
//! - Disjunction (`|`), anchors, word boundaries, lookaround
//! - Numbered and named backreferences
//! - Unicode property escapes

use std::fmt;

/// Index of a node inside its [`Ast`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Offset in chars from the start of the source
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

/// Source range of a node, captured when `capture_locations` is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    /// The exact source text of the node
    pub source: String,
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

/// Validated regex flags, kept deduplicated and sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags(String);

impl Flags {
    /// Every flag character the parser accepts
    pub const VALID: &'static str = "gimsuxy";

    /// Validate and canonicalize a flags string
    pub fn parse(raw: &str) -> Option<Flags> {
        let mut seen: Vec<char> = Vec::with_capacity(raw.len());
        for c in raw.chars() {
            if !Self::VALID.contains(c) || seen.contains(&c) {
                return None;
            }
            seen.push(c);
        }
        seen.sort_unstable();
        Some(Flags(seen.into_iter().collect()))
    }

    /// Whether `flag` is set
    pub fn has(&self, flag: char) -> bool {
        self.0.contains(flag)
    }

    /// Clear `flag`
    pub fn remove(&mut self, flag: char) {
        self.0.retain(|c| c != flag);
    }

    /// Set `flag`, keeping the canonical order
    pub fn insert(&mut self, flag: char) {
        if Self::VALID.contains(flag) && !self.has(flag) {
            let mut chars: Vec<char> = self.0.chars().chain(std::iter::once(flag)).collect();
            chars.sort_unstable();
            self.0 = chars.into_iter().collect();
        }
    }

    /// The canonical flags string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no flag is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a char was spelled in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharKind {
    /// A literal character, possibly escaped (`a`, `\.`)
    Simple,
    /// `\uXXXX`, `\u{X..}` or a surrogate pair
    Unicode,
    /// `\xXX`
    Hex,
    /// `\0` followed by octal digits
    Oct,
    /// `\0` or a `\N` that does not name a group
    Decimal,
    /// `\cX`
    Control,
    /// `.`, class escapes and control escapes (`\n`, `\t`, ...)
    Meta,
}

/// A single character atom
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Char {
    /// Source text; for `Simple` chars the character itself without the backslash
    pub value: String,
    /// Spelling of the char
    pub kind: CharKind,
    /// The realized character, if it has one
    pub symbol: Option<char>,
    /// Code point, `None` for chars without a fixed one (`.`, `\d`, ...)
    pub code_point: Option<u32>,
    /// Whether a `Simple` char is written with a backslash
    pub escaped: bool,
}

impl Char {
    /// A literal unescaped character
    pub fn simple(c: char) -> Self {
        Char {
            value: c.to_string(),
            kind: CharKind::Simple,
            symbol: Some(c),
            code_point: Some(c as u32),
            escaped: false,
        }
    }

    /// A literal character written with a backslash
    pub fn escaped(c: char) -> Self {
        Char {
            escaped: true,
            ..Char::simple(c)
        }
    }

    /// A char spelled with an escape form that carries a code point
    pub fn coded(value: impl Into<String>, kind: CharKind, code_point: u32) -> Self {
        Char {
            value: value.into(),
            kind,
            symbol: char::from_u32(code_point),
            code_point: Some(code_point),
            escaped: false,
        }
    }

    /// A meta char such as `.`, `\d` or `\n`
    pub fn meta(value: &str) -> Self {
        let code_point = match value {
            "\\n" => Some(0x0a),
            "\\r" => Some(0x0d),
            "\\t" => Some(0x09),
            "\\v" => Some(0x0b),
            "\\f" => Some(0x0c),
            "\\b" => Some(0x08),
            _ => None,
        };
        Char {
            value: value.to_string(),
            kind: CharKind::Meta,
            symbol: code_point.and_then(char::from_u32),
            code_point,
            escaped: false,
        }
    }

    /// Whether this is the meta char spelled `value`
    pub fn is_meta(&self, value: &str) -> bool {
        self.kind == CharKind::Meta && self.value == value
    }

    /// Whether this is one of `\d \D \w \W \s \S`
    pub fn is_meta_class(&self) -> bool {
        self.kind == CharKind::Meta
            && matches!(
                self.value.as_str(),
                "\\d" | "\\D" | "\\w" | "\\W" | "\\s" | "\\S"
            )
    }

    /// Whether this is the `.` meta char
    pub fn is_dot(&self) -> bool {
        self.is_meta(".")
    }
}

/// Kind of an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionKind {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `(?=...)` / `(?!...)`
    Lookahead,
    /// `(?<=...)` / `(?<!...)`
    Lookbehind,
}

/// How a backreference names its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackreferenceKind {
    /// `\N`
    Number,
    /// `\k<name>`
    Name,
}

/// A resolved backreference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backreference {
    /// Spelling of the reference
    pub kind: BackreferenceKind,
    /// Number of the referenced group
    pub number: u32,
    /// Group name for `Name` references, the number otherwise
    pub reference: String,
    /// Name as written, when it contained escapes
    pub reference_raw: Option<String>,
}

/// A group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    /// Whether the group captures
    pub capturing: bool,
    /// Decoded group name
    pub name: Option<String>,
    /// Name as written, when it contained escapes
    pub name_raw: Option<String>,
    /// Capture number, assigned left to right
    pub number: Option<u32>,
    /// Body of the group, `None` for `()`
    pub expression: Option<NodeId>,
}

/// The repetition operator of a quantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    ZeroOrOne,
    /// `{from}`, `{from,}` or `{from,to}`
    Range {
        /// Lower bound
        from: u32,
        /// Upper bound, `None` when open
        to: Option<u32>,
    },
}

/// A quantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantifier {
    /// The operator
    pub kind: QuantifierKind,
    /// `false` for lazy quantifiers (`*?`, `{2,}?`)
    pub greedy: bool,
}

impl Quantifier {
    /// A greedy quantifier of `kind`
    pub fn greedy(kind: QuantifierKind) -> Self {
        Quantifier { kind, greedy: true }
    }

    /// The `{n}` quantifier
    pub fn exactly(n: u32) -> Self {
        Quantifier::greedy(QuantifierKind::Range {
            from: n,
            to: Some(n),
        })
    }

    /// Lower and upper bound of the repetition count
    pub fn bounds(&self) -> (u32, Option<u32>) {
        match self.kind {
            QuantifierKind::ZeroOrMore => (0, None),
            QuantifierKind::OneOrMore => (1, None),
            QuantifierKind::ZeroOrOne => (0, Some(1)),
            QuantifierKind::Range { from, to } => (from, to),
        }
    }

    /// Greedy and without upper bound
    pub fn is_greedy_open_range(&self) -> bool {
        self.greedy && self.bounds().1.is_none()
    }

    /// Accept one more repetition: `a*a` is `a+`, `a?a` is `a{1,2}`;
    /// `None` when a bound would overflow
    pub fn incremented(self) -> Option<Quantifier> {
        let kind = match self.kind {
            QuantifierKind::ZeroOrMore => QuantifierKind::OneOrMore,
            QuantifierKind::OneOrMore => QuantifierKind::Range { from: 2, to: None },
            QuantifierKind::ZeroOrOne => QuantifierKind::Range {
                from: 1,
                to: Some(2),
            },
            QuantifierKind::Range { from, to } => QuantifierKind::Range {
                from: from.checked_add(1)?,
                to: match to {
                    Some(to) => Some(to.checked_add(1)?),
                    None => None,
                },
            },
        };
        Some(Quantifier { kind, ..self })
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QuantifierKind::ZeroOrMore => f.write_str("*")?,
            QuantifierKind::OneOrMore => f.write_str("+")?,
            QuantifierKind::ZeroOrOne => f.write_str("?")?,
            QuantifierKind::Range { from, to: Some(to) } if from == to => write!(f, "{{{}}}", from)?,
            QuantifierKind::Range { from, to: None } => write!(f, "{{{},}}", from)?,
            QuantifierKind::Range { from, to: Some(to) } => write!(f, "{{{},{}}}", from, to)?,
        }
        if !self.greedy {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// A `\p{...}` / `\P{...}` escape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnicodeProperty {
    /// Property name as written (or `General_Category` for shorthands)
    pub name: String,
    /// Property value as written
    pub value: String,
    /// `\P{...}`
    pub negative: bool,
    /// General category written without `gc=`
    pub shorthand: bool,
    /// Binary property
    pub binary: bool,
    /// Canonical property name
    pub canonical_name: String,
    /// Canonical property value
    pub canonical_value: String,
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root: `/body/flags`
    RegExp {
        /// Pattern body, `None` when empty
        body: Option<NodeId>,
        /// Canonical flags
        flags: Flags,
    },
    /// `left|right`, chains lean left
    Disjunction {
        /// Left alternative
        left: Option<NodeId>,
        /// Right alternative
        right: Option<NodeId>,
    },
    /// Concatenation of two or more terms
    Alternative {
        /// Terms in order
        expressions: Vec<NodeId>,
    },
    /// Anchors, boundaries and lookaround
    Assertion {
        /// Which assertion
        kind: AssertionKind,
        /// Negative lookaround
        negative: bool,
        /// Lookaround body
        assertion: Option<NodeId>,
    },
    /// A character atom
    Char(Char),
    /// `[...]`
    CharacterClass {
        /// `[^...]`
        negative: bool,
        /// Chars, ranges and property escapes
        expressions: Vec<NodeId>,
    },
    /// `from-to` inside a class
    ClassRange {
        /// Lower bound
        from: Char,
        /// Upper bound
        to: Char,
    },
    /// `\N` or `\k<name>`
    Backreference(Backreference),
    /// `(...)`, `(?:...)`, `(?<name>...)`
    Group(Group),
    /// A quantified expression
    Repetition {
        /// Repeated expression
        expression: NodeId,
        /// The quantifier
        quantifier: Quantifier,
    },
    /// `\p{...}`
    UnicodeProperty(UnicodeProperty),
}

impl NodeKind {
    /// Name of the node type
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::RegExp { .. } => "RegExp",
            NodeKind::Disjunction { .. } => "Disjunction",
            NodeKind::Alternative { .. } => "Alternative",
            NodeKind::Assertion { .. } => "Assertion",
            NodeKind::Char(_) => "Char",
            NodeKind::CharacterClass { .. } => "CharacterClass",
            NodeKind::ClassRange { .. } => "ClassRange",
            NodeKind::Backreference(_) => "Backreference",
            NodeKind::Group(_) => "Group",
            NodeKind::Repetition { .. } => "Repetition",
            NodeKind::UnicodeProperty(_) => "UnicodeProperty",
        }
    }

    /// Child-bearing properties, in traversal order
    pub fn properties(&self) -> &'static [Property] {
        match self {
            NodeKind::RegExp { .. } => &[Property::Body],
            NodeKind::Disjunction { .. } => &[Property::Left, Property::Right],
            NodeKind::Alternative { .. } | NodeKind::CharacterClass { .. } => {
                &[Property::Expressions]
            }
            NodeKind::Assertion { .. } => &[Property::Assertion],
            NodeKind::Group(_) | NodeKind::Repetition { .. } => &[Property::Expression],
            NodeKind::Char(_)
            | NodeKind::ClassRange { .. }
            | NodeKind::Backreference(_)
            | NodeKind::UnicodeProperty(_) => &[],
        }
    }

    /// The char payload, if this is a `Char`
    pub fn as_char(&self) -> Option<&Char> {
        match self {
            NodeKind::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// An arena entry
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Payload
    pub kind: NodeKind,
    /// Source range, if captured
    pub loc: Option<Loc>,
}

/// Property of a parent under which a child is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `RegExp.body`
    Body,
    /// `Disjunction.left`
    Left,
    /// `Disjunction.right`
    Right,
    /// `Alternative.expressions` / `CharacterClass.expressions`
    Expressions,
    /// `Assertion.assertion`
    Assertion,
    /// `Group.expression` / `Repetition.expression`
    Expression,
}

/// Where a node is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Parent node
    pub parent: NodeId,
    /// Property of the parent holding the node
    pub property: Property,
    /// Index for collection properties
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Root,
    Child(Link),
    Replaced(NodeId),
    Detached,
}

/// Index cursor of a collection being traversed
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor {
    pub(crate) parent: NodeId,
    pub(crate) index: isize,
}

/// A parsed regular expression
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    attachments: Vec<Attachment>,
    root: NodeId,
    pub(crate) cursors: Vec<Cursor>,
}

impl Ast {
    /// An empty `//flags` expression
    pub fn new(flags: Flags) -> Self {
        Ast {
            nodes: vec![Node {
                kind: NodeKind::RegExp { body: None, flags },
                loc: None,
            }],
            attachments: vec![Attachment::Root],
            root: NodeId(0),
            cursors: Vec::new(),
        }
    }

    /// The `RegExp` node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Pattern body
    pub fn body(&self) -> Option<NodeId> {
        self.single(self.root, Property::Body)
    }

    /// Attach a new body
    pub fn set_body(&mut self, body: Option<NodeId>) {
        let root = self.root;
        self.set_single(root, Property::Body, body);
    }

    /// Flags of the expression
    pub fn flags(&self) -> &Flags {
        match &self.nodes[self.root.0].kind {
            NodeKind::RegExp { flags, .. } => flags,
            _ => unreachable!("root is always a RegExp node"),
        }
    }

    /// Mutable flags of the expression
    pub fn flags_mut(&mut self) -> &mut Flags {
        match &mut self.nodes[self.root.0].kind {
            NodeKind::RegExp { flags, .. } => flags,
            _ => unreachable!("root is always a RegExp node"),
        }
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Payload by id
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Mutable payload by id
    ///
    /// Only non-structural fields may be edited through this; use
    /// [`Ast::set_single`] and [`Ast::set_expressions`] to change children.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// Attach a source range to a node
    pub fn set_loc(&mut self, id: NodeId, loc: Option<Loc>) {
        self.nodes[id.0].loc = loc;
    }

    /// Allocate a detached node; its children are linked to it
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.alloc_with_loc(kind, None)
    }

    /// Allocate a detached node with a source range
    pub fn alloc_with_loc(&mut self, kind: NodeKind, loc: Option<Loc>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { kind, loc });
        self.attachments.push(Attachment::Detached);
        self.adopt(id);
        id
    }

    /// Allocate a `Char` node
    pub fn alloc_char(&mut self, c: Char) -> NodeId {
        self.alloc(NodeKind::Char(c))
    }

    /// Child stored under a single-valued property
    pub fn single(&self, id: NodeId, property: Property) -> Option<NodeId> {
        match (self.kind(id), property) {
            (NodeKind::RegExp { body, .. }, Property::Body) => *body,
            (NodeKind::Disjunction { left, .. }, Property::Left) => *left,
            (NodeKind::Disjunction { right, .. }, Property::Right) => *right,
            (NodeKind::Assertion { assertion, .. }, Property::Assertion) => *assertion,
            (NodeKind::Group(group), Property::Expression) => group.expression,
            (NodeKind::Repetition { expression, .. }, Property::Expression) => Some(*expression),
            _ => None,
        }
    }

    /// Items of a collection node (`Alternative`, `CharacterClass`)
    pub fn expressions(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::Alternative { expressions }
            | NodeKind::CharacterClass { expressions, .. } => expressions,
            _ => &[],
        }
    }

    fn expressions_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Alternative { expressions }
            | NodeKind::CharacterClass { expressions, .. } => Some(expressions),
            _ => None,
        }
    }

    /// All children, in traversal order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        for &property in self.kind(id).properties() {
            if property == Property::Expressions {
                children.extend_from_slice(self.expressions(id));
            } else if let Some(child) = self.single(id, property) {
                children.push(child);
            }
        }
        children
    }

    /// Where `id` is attached, `None` for the root and detached nodes
    pub fn link(&self, id: NodeId) -> Option<Link> {
        match self.attachments[id.0] {
            Attachment::Child(link) => Some(link),
            _ => None,
        }
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).map(|link| link.parent)
    }

    /// Whether `id` was replaced or removed
    pub fn is_removed(&self, id: NodeId) -> bool {
        matches!(
            self.attachments[id.0],
            Attachment::Replaced(_) | Attachment::Detached
        )
    }

    /// The node that took the place of a replaced node
    pub fn replacement(&self, id: NodeId) -> Option<NodeId> {
        match self.attachments[id.0] {
            Attachment::Replaced(new) => Some(new),
            _ => None,
        }
    }

    /// Set a single-valued child, detaching the previous one
    pub fn set_single(&mut self, parent: NodeId, property: Property, child: Option<NodeId>) {
        let previous = self.single(parent, property);
        self.assign_single(parent, property, child);
        let link = Link {
            parent,
            property,
            index: None,
        };
        if let Some(previous) = previous
            && Some(previous) != child
            && self.attachments[previous.0] == Attachment::Child(link)
        {
            self.attachments[previous.0] = Attachment::Detached;
        }
        if let Some(child) = child {
            self.attachments[child.0] = Attachment::Child(link);
        }
    }

    /// Replace the whole item list of a collection node
    pub fn set_expressions(&mut self, parent: NodeId, items: Vec<NodeId>) {
        let previous = self.expressions(parent).to_vec();
        match self.expressions_mut(parent) {
            Some(expressions) => *expressions = items,
            None => return,
        }
        for id in previous {
            if matches!(self.attachments[id.0], Attachment::Child(link) if link.parent == parent) {
                self.attachments[id.0] = Attachment::Detached;
            }
        }
        self.relink_collection(parent);
    }

    /// Replace `id` with a freshly allocated node
    ///
    /// `kind` may contain `id` itself, which wraps it.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let attachment = self.attachments[id.0];
        let new = self.alloc(kind);
        self.place(id, attachment, new);
        new
    }

    /// Replace `id` with an existing node, typically one of its descendants
    pub fn replace_with(&mut self, id: NodeId, new: NodeId) -> NodeId {
        if id == new {
            return new;
        }
        let attachment = self.attachments[id.0];
        self.place(id, attachment, new);
        new
    }

    fn place(&mut self, old: NodeId, attachment: Attachment, new: NodeId) {
        match attachment {
            Attachment::Root => {
                self.root = new;
                self.attachments[new.0] = Attachment::Root;
            }
            Attachment::Child(link) => {
                match link.index {
                    Some(index) => {
                        if let Some(list) = self.expressions_mut(link.parent)
                            && index < list.len()
                        {
                            list[index] = new;
                        }
                    }
                    None => self.assign_single(link.parent, link.property, Some(new)),
                }
                self.attachments[new.0] = Attachment::Child(link);
            }
            Attachment::Replaced(_) | Attachment::Detached => return,
        }
        if self.attachments[old.0] == attachment {
            self.attachments[old.0] = Attachment::Replaced(new);
        }
    }

    /// Detach `id` from its parent
    ///
    /// Removing the body of a `Repetition` removes the repetition.
    pub fn remove(&mut self, id: NodeId) {
        let Attachment::Child(link) = self.attachments[id.0] else {
            return;
        };
        match link.index {
            Some(index) => {
                if let Some(list) = self.expressions_mut(link.parent)
                    && list.get(index) == Some(&id)
                {
                    list.remove(index);
                }
                self.relink_collection(link.parent);
                for cursor in &mut self.cursors {
                    if cursor.parent == link.parent && index as isize <= cursor.index {
                        cursor.index -= 1;
                    }
                }
            }
            None => {
                if matches!(self.kind(link.parent), NodeKind::Repetition { .. }) {
                    self.attachments[id.0] = Attachment::Detached;
                    self.remove(link.parent);
                    return;
                }
                self.assign_single(link.parent, link.property, None);
            }
        }
        self.attachments[id.0] = Attachment::Detached;
    }

    /// Insert `child` into the collection of `parent` at `index`
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let Some(list) = self.expressions_mut(parent) else {
            return;
        };
        let index = index.min(list.len());
        list.insert(index, child);
        self.relink_collection(parent);
        for cursor in &mut self.cursors {
            if cursor.parent == parent && index as isize <= cursor.index {
                cursor.index += 1;
            }
        }
    }

    /// Append `child` to the collection of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.expressions(parent).len();
        self.insert_child_at(parent, len, child);
    }

    /// Collapse an `Alternative` holding one term (or none) into that term
    pub fn normalize_alternative(&mut self, id: NodeId) -> Option<NodeId> {
        if !matches!(self.kind(id), NodeKind::Alternative { .. }) {
            return Some(id);
        }
        match self.expressions(id) {
            [] => {
                self.remove(id);
                None
            }
            [only] => {
                let only = *only;
                Some(self.replace_with(id, only))
            }
            _ => Some(id),
        }
    }

    /// Rebuild the attachment table from the root down
    pub fn relink_all(&mut self) {
        for attachment in &mut self.attachments {
            *attachment = Attachment::Detached;
        }
        self.attachments[self.root.0] = Attachment::Root;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            self.adopt(id);
            stack.extend(self.children(id));
        }
    }

    /// Structural equality of two subtrees, ignoring source locations
    pub fn same_source(&self, a: NodeId, b: NodeId) -> bool {
        match (self.kind(a), self.kind(b)) {
            (
                NodeKind::RegExp { body: x, flags: f },
                NodeKind::RegExp { body: y, flags: g },
            ) => f == g && self.same_optional(*x, *y),
            (
                NodeKind::Disjunction { left: l1, right: r1 },
                NodeKind::Disjunction { left: l2, right: r2 },
            ) => self.same_optional(*l1, *l2) && self.same_optional(*r1, *r2),
            (NodeKind::Alternative { expressions: x }, NodeKind::Alternative { expressions: y }) => {
                self.same_sequence(x, y)
            }
            (
                NodeKind::Assertion { kind: k1, negative: n1, assertion: a1 },
                NodeKind::Assertion { kind: k2, negative: n2, assertion: a2 },
            ) => k1 == k2 && n1 == n2 && self.same_optional(*a1, *a2),
            (NodeKind::Char(x), NodeKind::Char(y)) => x == y,
            (
                NodeKind::CharacterClass { negative: n1, expressions: x },
                NodeKind::CharacterClass { negative: n2, expressions: y },
            ) => n1 == n2 && self.same_sequence(x, y),
            (
                NodeKind::ClassRange { from: f1, to: t1 },
                NodeKind::ClassRange { from: f2, to: t2 },
            ) => f1 == f2 && t1 == t2,
            (NodeKind::Backreference(x), NodeKind::Backreference(y)) => x == y,
            (NodeKind::Group(x), NodeKind::Group(y)) => {
                x.capturing == y.capturing
                    && x.name == y.name
                    && x.name_raw == y.name_raw
                    && x.number == y.number
                    && self.same_optional(x.expression, y.expression)
            }
            (
                NodeKind::Repetition { expression: e1, quantifier: q1 },
                NodeKind::Repetition { expression: e2, quantifier: q2 },
            ) => q1 == q2 && self.same_source(*e1, *e2),
            (NodeKind::UnicodeProperty(x), NodeKind::UnicodeProperty(y)) => x == y,
            _ => false,
        }
    }

    /// Element-wise [`Ast::same_source`]
    pub fn same_sequence(&self, a: &[NodeId], b: &[NodeId]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.same_source(*x, *y))
    }

    fn same_optional(&self, a: Option<NodeId>, b: Option<NodeId>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.same_source(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// A copy holding only the nodes reachable from the root
    pub fn compacted(&self) -> Ast {
        let mut out = Ast::new(self.flags().clone());
        out.nodes[0].loc = self.node(self.root).loc.clone();
        let body = self.body().map(|body| self.copy_into(body, &mut out));
        out.set_body(body);
        out
    }

    fn copy_into(&self, id: NodeId, out: &mut Ast) -> NodeId {
        let node = self.node(id);
        let mut copy = |child: NodeId| self.copy_into(child, out);
        let kind = match &node.kind {
            NodeKind::RegExp { body, flags } => NodeKind::RegExp {
                body: body.map(&mut copy),
                flags: flags.clone(),
            },
            NodeKind::Disjunction { left, right } => NodeKind::Disjunction {
                left: left.map(&mut copy),
                right: right.map(&mut copy),
            },
            NodeKind::Alternative { expressions } => NodeKind::Alternative {
                expressions: expressions.iter().map(|e| copy(*e)).collect(),
            },
            NodeKind::Assertion {
                kind,
                negative,
                assertion,
            } => NodeKind::Assertion {
                kind: *kind,
                negative: *negative,
                assertion: assertion.map(&mut copy),
            },
            NodeKind::CharacterClass {
                negative,
                expressions,
            } => NodeKind::CharacterClass {
                negative: *negative,
                expressions: expressions.iter().map(|e| copy(*e)).collect(),
            },
            NodeKind::Group(group) => NodeKind::Group(Group {
                expression: group.expression.map(&mut copy),
                ..group.clone()
            }),
            NodeKind::Repetition {
                expression,
                quantifier,
            } => NodeKind::Repetition {
                expression: copy(*expression),
                quantifier: *quantifier,
            },
            leaf => leaf.clone(),
        };
        out.alloc_with_loc(kind, node.loc.clone())
    }

    fn assign_single(&mut self, parent: NodeId, property: Property, child: Option<NodeId>) {
        match (&mut self.nodes[parent.0].kind, property) {
            (NodeKind::RegExp { body, .. }, Property::Body) => *body = child,
            (NodeKind::Disjunction { left, .. }, Property::Left) => *left = child,
            (NodeKind::Disjunction { right, .. }, Property::Right) => *right = child,
            (NodeKind::Assertion { assertion, .. }, Property::Assertion) => *assertion = child,
            (NodeKind::Group(group), Property::Expression) => group.expression = child,
            (NodeKind::Repetition { expression, .. }, Property::Expression) => {
                if let Some(child) = child {
                    *expression = child;
                }
            }
            _ => {}
        }
    }

    fn adopt(&mut self, id: NodeId) {
        for &property in self.kind(id).properties() {
            if property == Property::Expressions {
                self.relink_collection(id);
            } else if let Some(child) = self.single(id, property) {
                self.attachments[child.0] = Attachment::Child(Link {
                    parent: id,
                    property,
                    index: None,
                });
            }
        }
    }

    fn relink_collection(&mut self, parent: NodeId) {
        let items = self.expressions(parent).to_vec();
        for (index, id) in items.into_iter().enumerate() {
            self.attachments[id.0] = Attachment::Child(Link {
                parent,
                property: Property::Expressions,
                index: Some(index),
            });
        }
    }
}
