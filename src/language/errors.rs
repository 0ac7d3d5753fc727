use crate::language::span::Span;
use miette::SourceSpan;
use thiserror::Error;

/// Failure to read signature text; `span` covers the unparsed remainder.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message} at {}..{}", .span.start, .span.end)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn to_source_span(&self) -> SourceSpan {
        self.span.into()
    }
}
