use crate::language::{names::TypeName, registry::LookupError};
use miette::Diagnostic;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum BuildError {
    /// An inheritance or mixin cycle; `chain` runs outermost first and
    /// closes on the repeated name.
    #[error("Recursive inheritance/mixin {}", render_chain(.chain))]
    #[diagnostic(
        code(sigcheck::recursive_definition),
        help("break the cycle between these declarations")
    )]
    RecursiveDefinition { chain: Vec<TypeName> },
    #[error("Cannot build interface for `{type_name}`: {source}")]
    #[diagnostic(code(sigcheck::unknown_type))]
    UnknownType {
        type_name: TypeName,
        #[source]
        source: LookupError,
    },
}

impl BuildError {
    pub fn recursive(type_name: TypeName) -> Self {
        BuildError::RecursiveDefinition {
            chain: vec![type_name],
        }
    }

    /// Prepends the enclosing frame's name to a cycle chain; other errors pass
    /// through unchanged.
    pub fn within(self, type_name: &TypeName) -> Self {
        match self {
            BuildError::RecursiveDefinition { mut chain } => {
                chain.insert(0, type_name.clone());
                BuildError::RecursiveDefinition { chain }
            }
            other => other,
        }
    }

    pub fn chain(&self) -> Option<&[TypeName]> {
        match self {
            BuildError::RecursiveDefinition { chain } => Some(chain),
            BuildError::UnknownType { .. } => None,
        }
    }
}

fn render_chain(chain: &[TypeName]) -> String {
    chain
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<_>>()
        .join(" ~> ")
}
