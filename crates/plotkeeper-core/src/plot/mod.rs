//! Plot management: request input, validation, the service operations and
//! their error type.

pub mod error;
pub mod input;
pub mod service;

use serde::Serialize;

pub use error::PlotError;
pub use input::{PlotIdInput, PlotInput, ValidPlot};
pub use service::{create, delete, get_by_id, list_all, update};

/// Result of a plot operation: a human-readable message plus the payload,
/// if any. Serializes as `{ "message": ..., "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}
