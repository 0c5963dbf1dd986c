/// Errors raised while resolving a payload or assembling a statement
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("No fields to update")]
    EmptyPatch,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("statement has {placeholders} placeholders but {args} arguments: {text}")]
    AssemblyInvariantViolation {
        placeholders: usize,
        args: usize,
        text: String,
    },
}

impl PatchError {
    /// Whether the caller can fix this by correcting the request.
    ///
    /// Only [`PatchError::AssemblyInvariantViolation`] is a server-side fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PatchError::AssemblyInvariantViolation { .. })
    }
}
