//! Error types for the commute pipeline.
//!
//! Every fallible core operation returns [`Result`]. Parse ambiguity in
//! free-text fields is deliberately *not* represented here — an unmatched
//! duration or distance degrades to a default/absent value at the parse
//! layer instead of failing the whole query.

/// All errors that can occur in the commute core.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The browser could not reach or render the directions page.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The readiness selector never appeared or row extraction yielded
    /// nothing usable.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// A JSON API answered with a network error or a non-2xx status.
    #[error("provider request failed: {0}")]
    ProviderRequest(String),

    /// A JSON API answered 2xx but the body was missing the expected
    /// route/alternative shape.
    #[error("provider response shape mismatch: {0}")]
    ProviderShape(String),

    /// A suspending operation exceeded its deadline.
    #[error("timed out after {0}ms: {1}")]
    Timeout(u64, String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap any scrape-stage failure with the fixed prefix callers key on.
    pub fn scrape_wrap(self) -> Error {
        match self {
            Error::Navigation(msg) => Error::Navigation(format!("scrape parsing failed: {msg}")),
            Error::Extraction(msg) => Error::Extraction(format!("scrape parsing failed: {msg}")),
            other => other,
        }
    }
}
