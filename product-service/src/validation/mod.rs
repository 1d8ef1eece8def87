//! Request guards for the write and list paths.
//!
//! Every guard yields either a normalized value or a [`Rejection`]; nothing
//! here touches the store.

pub mod create;
pub mod extract;
pub mod pagination;

pub use create::{round_price, validate_create};
pub use extract::{payload_size_guard, ValidatedPagination, ValidatedProduct, MAX_BODY_BYTES};
pub use pagination::{validate_pagination, Pagination};

use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A rule failed; the message names the field and rule.
    #[error("{0}")]
    Field(&'static str),
    /// Something unexpected while reading the request; detail is logged, not returned.
    #[error("invalid request body")]
    Malformed,
    /// The query string could not be read at all (e.g. a repeated key).
    #[error("invalid query string")]
    MalformedQuery,
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::Validation(rejection.to_string())
    }
}
