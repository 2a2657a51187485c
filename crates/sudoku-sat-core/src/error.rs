use thiserror::Error;

/// Recoverable failures surfaced at the public boundary.
///
/// Structural problems inside a puzzle (impossible cage sums, degenerate
/// inequalities) are not errors; the encoder turns them into unsatisfiable
/// formulas so they come back as unsolved results.
#[derive(Debug, Error)]
pub enum Error {
    /// Input text that could not be understood.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A puzzle file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The SAT engine reported an internal failure.
    #[error("SAT engine failure: {0}")]
    Engine(String),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
