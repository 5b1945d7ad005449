/// Failure kinds surfaced by core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Bad input: empty or oversized text, self-follow.
    #[error("{0}")]
    Validation(String),

    /// The acting user may not do this.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Structurally impossible request, e.g. a thread with yourself.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("user is not a participant of this thread")]
    NotParticipant,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
