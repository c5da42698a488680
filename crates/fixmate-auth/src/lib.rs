//! Authentication module for the FIX-MATE backend.
//!
//! This module provides abstractions for resolving bearer tokens to caller
//! identities. It defines the interface and service used by the API layer;
//! token issuance and verification against an external identity provider
//! stay behind the same seam, so a JWT-verifying implementation can be
//! slotted in without touching the handlers.

use async_trait::async_trait;
use fixmate_types::{ConfigSchema, Identity, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod static_tokens;
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Error that occurs when a token is unknown or malformed.
	#[error("Unknown token")]
	UnknownToken,
	/// Error that occurs when interacting with the auth implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Trait defining the interface for authentication implementations.
///
/// This trait must be implemented by any auth backend that wants to
/// integrate with the marketplace system. It resolves opaque bearer tokens
/// to caller identities.
#[async_trait]
pub trait AuthInterface: Send + Sync {
	/// Returns the configuration schema for this auth implementation.
	///
	/// The schema is used to validate TOML configuration before
	/// initializing the implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Resolves a bearer token to the identity it represents.
	///
	/// Returns [`AuthError::UnknownToken`] when the token does not map to
	/// any known caller.
	async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Type alias for auth factory functions.
pub type AuthFactory = fn(&toml::Value) -> Result<Box<dyn AuthInterface>, AuthError>;

/// Registry trait for auth implementations.
pub trait AuthRegistry: ImplementationRegistry<Factory = AuthFactory> {}

/// Get all registered auth implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AuthFactory)> {
	use implementations::static_tokens;

	vec![(static_tokens::Registry::NAME, static_tokens::Registry::factory())]
}

/// Service that manages authentication.
///
/// Provides a high-level interface for identity resolution, wrapping an
/// underlying auth implementation.
pub struct AuthService {
	/// The underlying auth implementation.
	implementation: Box<dyn AuthInterface>,
}

impl AuthService {
	/// Creates a new AuthService with the specified implementation.
	pub fn new(implementation: Box<dyn AuthInterface>) -> Self {
		Self { implementation }
	}

	/// Resolves a bearer token to the identity it represents.
	pub async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
		self.implementation.resolve(token).await
	}
}
