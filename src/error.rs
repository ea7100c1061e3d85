//! Caller-visible error type for the enrichment surface.
//!
//! The enrichment pipeline itself never surfaces provider or parser failures
//! to the caller; those degrade to heuristic fallback results. The only
//! errors that escape are genuinely invalid input on the outer request.
//! Provider-level and parser-level errors live next to their modules
//! ([`crate::provider::ProviderError`], [`crate::response::ResponseError`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// The request carried no usable text (missing/blank title or input).
    #[error("request has no usable text: {field} is empty")]
    EmptyInput { field: &'static str },
}
