//! FIX-MATE API endpoint implementations.
//!
//! One module per resource; each maps its domain errors onto the structured
//! [`ApiError`] so status codes and error codes stay consistent across the
//! surface. Internal storage failures are logged server-side and returned
//! as a generic 500 without the backend detail.

pub mod admin;
pub mod catalog;
pub mod service;
pub mod supply;

use fixmate_types::ApiError;

/// Maps request-body validation failures onto a 400 with field details.
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> ApiError {
	ApiError::bad_request("Invalid request body", serde_json::to_value(&errors).ok())
}
