use crate::{
    interface::BuildError,
    language::errors::SyntaxError,
    typecheck::TypeError,
};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

/// A signature text that failed to parse, pointing at where parsing stopped.
#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(sigcheck::syntax_error))]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parsing stopped here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: &SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: err.message.clone(),
        }
    }
}

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct TypeDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
    #[help]
    help: Option<String>,
}

impl TypeDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: &TypeError) -> Self {
        Self {
            src,
            span: err.span.into(),
            message: err.display_message(),
            label: err.kind.label(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

pub fn syntax_reports(name: &str, source: &str, errors: &[SyntaxError]) -> Vec<Report> {
    let src = NamedSource::new(name, source.to_string());
    errors
        .iter()
        .map(|err| Report::new(SyntaxDiagnostic::from_error(src.clone(), err)))
        .collect()
}

pub fn type_reports(name: &str, source: &str, errors: &[TypeError]) -> Vec<Report> {
    let src = NamedSource::new(name, source.to_string());
    errors
        .iter()
        .map(|err| Report::new(TypeDiagnostic::from_error(src.clone(), err)))
        .collect()
}

pub fn build_error_report(error: BuildError) -> Report {
    Report::new(error)
}

pub fn emit_syntax_errors(name: &str, source: &str, errors: &[SyntaxError]) {
    for report in syntax_reports(name, source, errors) {
        eprintln!("{report:?}");
    }
}

pub fn emit_type_errors(name: &str, source: &str, errors: &[TypeError]) {
    for report in type_reports(name, source, errors) {
        eprintln!("{report:?}");
    }
}

pub fn report_build_error(error: BuildError) {
    eprintln!("{:?}", build_error_report(error));
}
