//! Bearer-token authentication middleware.
//!
//! Every `/api` route runs through [`authenticate`], which resolves the
//! Authorization header to an [`Identity`] via the engine's auth service
//! and stores it as a request extension for handlers to pick up. Role
//! checks happen at the handlers, ownership checks in the engine.

use crate::server::AppState;
use axum::{
	extract::{Request, State},
	http::header::AUTHORIZATION,
	http::HeaderMap,
	middleware::Next,
	response::Response,
};
use fixmate_auth::AuthError;
use fixmate_types::ApiError;

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
}

/// Resolves the caller's identity and attaches it to the request.
pub async fn authenticate(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	let token = bearer_token(request.headers())
		.ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

	let identity = state
		.engine
		.auth()
		.resolve(token)
		.await
		.map_err(|e| match e {
			AuthError::UnknownToken => ApiError::unauthorized("Unknown token"),
			other => ApiError::internal(other.to_string()),
		})?;

	request.extensions_mut().insert(identity);
	Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	#[test]
	fn bearer_token_parsing() {
		let mut headers = HeaderMap::new();
		assert!(bearer_token(&headers).is_none());

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t-123"));
		assert_eq!(bearer_token(&headers), Some("t-123"));

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
		assert!(bearer_token(&headers).is_none());
	}
}
