//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure raised while parsing or evaluating input
///
/// Every variant aborts the current `parse` call; statements committed
/// earlier in the same call stay in the environment.
#[derive(Debug, Error)]
pub enum Error {
    /// The source text does not lex or parse under the host grammar
    #[error("syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    /// The tree parses but contains a shape outside the restricted grammar
    #[error("grammar violation at {span}: {message}")]
    Grammar { message: String, span: Span },

    /// Input stream could not be read
    #[error("cannot read input: {message}")]
    Io { message: String },

    /// Evaluation failure (see [`RuntimeError`] for the taxonomy)
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn grammar(message: impl Into<String>, span: Span) -> Self {
        Self::Grammar {
            message: message.into(),
            span,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => Some(*span),
            Self::Grammar { span, .. } => Some(*span),
            Self::Io { .. } | Self::Runtime(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Syntax { message, .. } => message.clone(),
            Self::Grammar { message, .. } => message.clone(),
            Self::Io { message } => message.clone(),
            Self::Runtime(err) => err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Report error with ariadne
pub fn report(filename: &str, source: &str, error: &Error) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        Error::Syntax { .. } => "Syntax",
        Error::Grammar { .. } => "Grammar",
        Error::Io { .. } => "IO",
        Error::Runtime(_) => "Runtime",
    };

    if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .print((filename, Source::from(source)))
            .unwrap();
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .print((filename, Source::from(source)))
            .unwrap();
    }
}
