use sketchflow_core::LayoutError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Maximum text size in diagram exceeded ({size} > {limit} bytes)")]
    TextTooLarge { size: usize, limit: usize },

    #[error("Edge limit exceeded ({count} > {limit})")]
    TooManyEdges { count: usize, limit: usize },

    #[error("no built-in layout for `{kind}` diagrams")]
    NoBuiltinLayout { kind: String },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<Error> for LayoutError {
    fn from(err: Error) -> Self {
        LayoutError::new(err.to_string())
    }
}
