mod arguments;
mod construction;
mod subtyping;

pub use arguments::argument_typing_pairs;
pub use construction::TypeConstruction;
pub use subtyping::Subtyping;

use crate::{
    interface::MethodType,
    language::{
        ast::{Node, NodeId},
        span::Span,
        types::TypeExpr,
    },
};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Subtype test and method lookup used by the checker.
pub trait Assignability {
    fn test(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool;

    /// The selected overload of `method` on `receiver`, instantiated for that
    /// receiver, or `None` when the method does not exist.
    fn method_type(&mut self, receiver: &TypeExpr, method: &str) -> Option<MethodType>;
}

#[derive(Clone, Debug)]
pub struct TypecheckOptions {
    /// Type of the implicit receiver for calls written without one.
    pub self_type: TypeExpr,
}

impl Default for TypecheckOptions {
    fn default() -> Self {
        Self {
            self_type: TypeExpr::Any,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind}")]
pub struct TypeError {
    pub node: NodeId,
    pub span: Span,
    pub kind: TypeErrorKind,
}

impl TypeError {
    pub fn new(node: &Node, kind: TypeErrorKind) -> Self {
        Self {
            node: node.id,
            span: node.span,
            kind,
        }
    }

    pub fn display_message(&self) -> String {
        format!("[{}] {}", self.kind.code(), self.kind)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TypeErrorKind {
    #[error("Cannot assign a value of type `{rhs_type}` to a variable of type `{lhs_type}`")]
    IncompatibleAssignment {
        lhs_type: TypeExpr,
        rhs_type: TypeExpr,
    },
    #[error("Type `{receiver_type}` does not have method `{method}`")]
    NoMethod {
        method: String,
        receiver_type: TypeExpr,
    },
    #[error("Expected argument at position {index} is missing")]
    ExpectedArgumentMissing { index: usize },
    #[error("Extra argument given at position {index}")]
    ExtraArgumentGiven { index: usize },
    #[error("Expected keyword `{keyword}` is missing")]
    ExpectedKeywordMissing { keyword: String },
    #[error("Unexpected keyword `{keyword}` given")]
    ExtraKeywordGiven { keyword: String },
    #[error("Expected `{expected}` but given `{actual}`")]
    InvalidArgument {
        expected: TypeExpr,
        actual: TypeExpr,
    },
}

impl TypeErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            TypeErrorKind::IncompatibleAssignment { .. } => "incompatible-assignment",
            TypeErrorKind::NoMethod { .. } => "no-method",
            TypeErrorKind::ExpectedArgumentMissing { .. } => "argument-missing",
            TypeErrorKind::ExtraArgumentGiven { .. } => "extra-argument",
            TypeErrorKind::ExpectedKeywordMissing { .. } => "keyword-missing",
            TypeErrorKind::ExtraKeywordGiven { .. } => "extra-keyword",
            TypeErrorKind::InvalidArgument { .. } => "invalid-argument",
        }
    }

    pub fn label(&self) -> String {
        match self {
            TypeErrorKind::IncompatibleAssignment { lhs_type, .. } => {
                format!("expected `{lhs_type}`")
            }
            TypeErrorKind::NoMethod { method, .. } => format!("`{method}` is not defined here"),
            TypeErrorKind::InvalidArgument { actual, .. } => format!("this is `{actual}`"),
            other => other.to_string(),
        }
    }
}

/// Types inferred for each node plus the errors found, in order, for one run.
#[derive(Debug, Default)]
pub struct Typing {
    types: FxHashMap<NodeId, TypeExpr>,
    errors: Vec<TypeError>,
}

impl Typing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_typing(&mut self, node: &Node, ty: TypeExpr) -> TypeExpr {
        self.types.insert(node.id, ty.clone());
        ty
    }

    pub fn type_of(&self, node: &Node) -> Option<&TypeExpr> {
        self.types.get(&node.id)
    }

    pub fn add_error(&mut self, error: TypeError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Local variable types for one checking pass.
#[derive(Debug, Default)]
pub struct TypeEnv {
    locals: FxHashMap<String, TypeExpr>,
}

impl TypeEnv {
    pub fn lookup(&self, name: &str) -> Option<&TypeExpr> {
        self.locals.get(name)
    }

    pub fn add(&mut self, name: &str, ty: TypeExpr) {
        self.locals.insert(name.to_string(), ty);
    }
}

/// Types `node` from scratch and returns the finished side table.
pub fn check_node<A: Assignability + ?Sized>(
    assignability: &mut A,
    node: &Node,
    options: &TypecheckOptions,
) -> Typing {
    let mut construction = TypeConstruction::with_options(assignability, options.clone());
    construction.run(node);
    construction.into_typing()
}
