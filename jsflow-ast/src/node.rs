//! AST nodes.
//!
//! A [`Node`] is a handle to a [`NodeContent`] in the [`Context`].  The shape of a node is given by
//! its [`NodeKind`] plus an ordered list of children.  Child layouts follow a fixed convention per
//! kind, e.g. a `Function` always has exactly three children: its name, its `ParamList` and its
//! body `Block`.

use std::fmt;

use crate::context::Context;

/// A wrapper around an [ECS](https://github.com/orlp/slotmap) handle into the [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Node(pub slotmap::DefaultKey);

#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct NodeContent {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub parent: Option<Node>,
}

/// Every syntactic construct the model knows about.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Root,
    Script,
    Block,
    /// Children: name (`Name("")` when anonymous), `ParamList`, body `Block`.
    Function,
    ParamList,

    /// Children: one `Name` per declared binding, the initializer hangs off the `Name`.
    Var,
    Let,
    Const,

    /// Children: condition, then-block and an optional else-block.
    If,
    /// Children: condition, body.
    While,
    /// Children: body, condition.
    Do,
    /// Children: initializer, condition, increment, body.  Missing parts are `Empty`.
    For,
    /// Children: target, iterated object, body.
    ForIn,
    ForOf,

    /// Children: try-block, `Catch` or `Empty`, and an optional finally-block.
    Try,
    /// Children: the bound `Name`, the catch-block.
    Catch,
    Return,
    Throw,
    ExprResult,
    Empty,

    And,
    Or,
    /// The `cond ? a : b` expression.
    Hook,
    Assign(AssignOp),
    Name(String),
    Call,
    New,
    GetProp(String),
    GetElem,
    Binary(BinaryOp),
    Unary(UnaryOp),

    Number(f64),
    Str(String),
    True,
    False,
    Null,
    This,
    ArrayLit,
    ObjectLit,
    StringKey(String),
    ArrayPattern,
    ObjectPattern,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitAnd,
    BitXor,
    Lsh,
    Rsh,
    Ursh,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    BitOr,
    BitAnd,
    BitXor,
    In,
    InstanceOf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    BitNot,
    TypeOf,
    Void,
    Inc,
    Dec,
}

impl NodeKind {
    /// Is this an assignment, plain or compound?
    pub fn is_assignment_op(&self) -> bool {
        matches!(self, NodeKind::Assign(_))
    }

    /// Is this a `var`, `let` or `const` declaration?
    pub fn is_name_declaration(&self) -> bool {
        matches!(self, NodeKind::Var | NodeKind::Let | NodeKind::Const)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "ROOT"),
            NodeKind::Script => write!(f, "SCRIPT"),
            NodeKind::Block => write!(f, "BLOCK"),
            NodeKind::Function => write!(f, "FUNCTION"),
            NodeKind::ParamList => write!(f, "PARAM_LIST"),
            NodeKind::Var => write!(f, "VAR"),
            NodeKind::Let => write!(f, "LET"),
            NodeKind::Const => write!(f, "CONST"),
            NodeKind::If => write!(f, "IF"),
            NodeKind::While => write!(f, "WHILE"),
            NodeKind::Do => write!(f, "DO"),
            NodeKind::For => write!(f, "FOR"),
            NodeKind::ForIn => write!(f, "FOR_IN"),
            NodeKind::ForOf => write!(f, "FOR_OF"),
            NodeKind::Try => write!(f, "TRY"),
            NodeKind::Catch => write!(f, "CATCH"),
            NodeKind::Return => write!(f, "RETURN"),
            NodeKind::Throw => write!(f, "THROW"),
            NodeKind::ExprResult => write!(f, "EXPR_RESULT"),
            NodeKind::Empty => write!(f, "EMPTY"),
            NodeKind::And => write!(f, "AND"),
            NodeKind::Or => write!(f, "OR"),
            NodeKind::Hook => write!(f, "HOOK"),
            NodeKind::Assign(AssignOp::Assign) => write!(f, "ASSIGN"),
            NodeKind::Assign(op) => write!(f, "ASSIGN_{}", format!("{op:?}").to_uppercase()),
            NodeKind::Name(name) => write!(f, "NAME {name}"),
            NodeKind::Call => write!(f, "CALL"),
            NodeKind::New => write!(f, "NEW"),
            NodeKind::GetProp(prop) => write!(f, "GETPROP {prop}"),
            NodeKind::GetElem => write!(f, "GETELEM"),
            NodeKind::Binary(op) => write!(f, "{}", format!("{op:?}").to_uppercase()),
            NodeKind::Unary(op) => write!(f, "{}", format!("{op:?}").to_uppercase()),
            NodeKind::Number(n) => write!(f, "NUMBER {n}"),
            NodeKind::Str(s) => write!(f, "STRING {s}"),
            NodeKind::True => write!(f, "TRUE"),
            NodeKind::False => write!(f, "FALSE"),
            NodeKind::Null => write!(f, "NULL"),
            NodeKind::This => write!(f, "THIS"),
            NodeKind::ArrayLit => write!(f, "ARRAYLIT"),
            NodeKind::ObjectLit => write!(f, "OBJECTLIT"),
            NodeKind::StringKey(key) => write!(f, "STRING_KEY {key}"),
            NodeKind::ArrayPattern => write!(f, "ARRAY_PATTERN"),
            NodeKind::ObjectPattern => write!(f, "OBJECT_PATTERN"),
        }
    }
}

impl Node {
    /// Return a new node handle.
    ///
    /// Creates a node of `kind` owning `children` and makes it their parent.
    pub fn new(context: &mut Context, kind: NodeKind, children: Vec<Node>) -> Node {
        let node = Node(context.nodes.insert(NodeContent {
            kind,
            children: children.clone(),
            parent: None,
        }));
        for child in children {
            context.nodes[child.0].parent = Some(node);
        }
        node
    }

    /// Append `child` to this node's children, reparenting it.
    pub fn add_child(&self, context: &mut Context, child: Node) {
        context.nodes[self.0].children.push(child);
        context.nodes[child.0].parent = Some(*self);
    }

    pub fn kind<'a>(&self, context: &'a Context) -> &'a NodeKind {
        &context.nodes[self.0].kind
    }

    pub fn parent(&self, context: &Context) -> Option<Node> {
        context.nodes[self.0].parent
    }

    pub fn children<'a>(&self, context: &'a Context) -> &'a [Node] {
        &context.nodes[self.0].children
    }

    pub fn child(&self, context: &Context, idx: usize) -> Option<Node> {
        context.nodes[self.0].children.get(idx).copied()
    }

    pub fn first_child(&self, context: &Context) -> Option<Node> {
        context.nodes[self.0].children.first().copied()
    }

    pub fn last_child(&self, context: &Context) -> Option<Node> {
        context.nodes[self.0].children.last().copied()
    }

    pub fn num_children(&self, context: &Context) -> usize {
        context.nodes[self.0].children.len()
    }

    pub fn has_children(&self, context: &Context) -> bool {
        !context.nodes[self.0].children.is_empty()
    }

    pub fn is_name(&self, context: &Context) -> bool {
        matches!(self.kind(context), NodeKind::Name(_))
    }

    pub fn is_function(&self, context: &Context) -> bool {
        matches!(self.kind(context), NodeKind::Function)
    }

    /// Return the identifier if this is a `Name` node.
    pub fn name<'a>(&self, context: &'a Context) -> Option<&'a str> {
        match self.kind(context) {
            NodeKind::Name(name) => Some(name.as_str()),
            _ => None,
        }
    }
}
