//! Error taxonomy for the InsightHub core.
//!
//! Every failure a caller can act on has its own variant, so the views can
//! tell a cold backend apart from a dead network or a rejected upload.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Debug, Error)]
pub enum InsightError {
    /// Rejected before any side effect took place (bad file type, oversized
    /// upload, missing selection).
    #[error("{0}")]
    Validation(String),

    /// The backend exceeded the allotted wait. Shown as "backend is waking
    /// up" rather than a generic network failure.
    #[error("the backend did not respond within {0}s; it may still be waking up, try again")]
    Timeout(u64),

    /// Non-2xx backend reply. The message prefers the server-supplied error
    /// field over the HTTP status text.
    #[error("{0}")]
    Backend(String),

    /// Transport-level failure before any HTTP status was received.
    #[error("network error: {0}; check your connection and retry")]
    Network(String),

    /// Corrupt persisted state or an unparseable PDF.
    #[error("{0}")]
    Parse(String),

    /// A generation for the same document and operation is already in flight.
    #[error("{operation} is already running for this document")]
    Busy { operation: &'static str },
}
