use thiserror::Error;

/// Errors returned by the plot service.
///
/// The first three variants carry the message shown to the caller. `Store`
/// wraps any failure of the database itself.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl PlotError {
    pub(crate) fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
