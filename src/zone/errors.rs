use thiserror::Error;

/// Why a single zone-file line could not be turned into a record.
///
/// These never abort a run; the driver logs them and counts the line as
/// skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Fewer than three tokens
    #[error("Skipping malformed line {line}: {text}")]
    Malformed { line: usize, text: String },

    /// Three tokens where the layout needs at least four
    #[error("Skipping incomplete line {line}: {text}")]
    Incomplete { line: usize, text: String },

    /// `$ORIGIN` or `$TTL` without an argument
    #[error("Skipping {directive} directive without a value on line {line}: {text}")]
    MissingDirectiveValue {
        directive: &'static str,
        line: usize,
        text: String,
    },
}

impl LineError {
    /// Source line the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. }
            | Self::Incomplete { line, .. }
            | Self::MissingDirectiveValue { line, .. } => *line,
        }
    }
}
