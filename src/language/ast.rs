use crate::language::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
}

/// The expression shapes the checker understands. Everything else arrives as
/// `Unsupported` and is typed without analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Begin(Vec<Node>),
    LocalAssign {
        name: String,
        value: Box<Node>,
    },
    LocalVar(String),
    Nil,
    Int(i64),
    Str(String),
    Sym(String),
    Send {
        receiver: Option<Box<Node>>,
        method: String,
        args: Vec<Node>,
    },
    Hash(Vec<Node>),
    Pair {
        key: Box<Node>,
        value: Box<Node>,
    },
    Unsupported {
        kind: String,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn is_hash(&self) -> bool {
        matches!(self.kind, NodeKind::Hash(_))
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Hands out fresh node ids so every constructed node has its own identity.
#[derive(Debug, Default)]
pub struct NodeFactory {
    next_id: u32,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&mut self, kind: NodeKind) -> Node {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node {
            id,
            span: Span::default(),
            kind,
        }
    }

    pub fn begin(&mut self, children: Vec<Node>) -> Node {
        self.node(NodeKind::Begin(children))
    }

    pub fn lvasgn(&mut self, name: &str, value: Node) -> Node {
        self.node(NodeKind::LocalAssign {
            name: name.to_string(),
            value: Box::new(value),
        })
    }

    pub fn lvar(&mut self, name: &str) -> Node {
        self.node(NodeKind::LocalVar(name.to_string()))
    }

    pub fn nil(&mut self) -> Node {
        self.node(NodeKind::Nil)
    }

    pub fn int(&mut self, value: i64) -> Node {
        self.node(NodeKind::Int(value))
    }

    pub fn str(&mut self, value: &str) -> Node {
        self.node(NodeKind::Str(value.to_string()))
    }

    pub fn sym(&mut self, value: &str) -> Node {
        self.node(NodeKind::Sym(value.to_string()))
    }

    pub fn send(&mut self, receiver: Option<Node>, method: &str, args: Vec<Node>) -> Node {
        self.node(NodeKind::Send {
            receiver: receiver.map(Box::new),
            method: method.to_string(),
            args,
        })
    }

    pub fn hash(&mut self, elements: Vec<Node>) -> Node {
        self.node(NodeKind::Hash(elements))
    }

    pub fn pair(&mut self, key: Node, value: Node) -> Node {
        self.node(NodeKind::Pair {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// Shorthand for a `key: value` pair with a symbol key.
    pub fn keyword(&mut self, name: &str, value: Node) -> Node {
        let key = self.sym(name);
        self.pair(key, value)
    }

    pub fn unsupported(&mut self, kind: &str, children: Vec<Node>) -> Node {
        self.node(NodeKind::Unsupported {
            kind: kind.to_string(),
            children,
        })
    }
}
