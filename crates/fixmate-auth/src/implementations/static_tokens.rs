//! Static token table auth implementation.
//!
//! Resolves bearer tokens against a table declared in the configuration
//! file. Suitable for development, testing, and small closed deployments;
//! production deployments would slot a JWT-verifying implementation in
//! behind the same interface.

use crate::{AuthError, AuthFactory, AuthInterface};
use async_trait::async_trait;
use fixmate_types::{
	ConfigSchema, Field, FieldType, Identity, ImplementationRegistry, Role, Schema, ValidationError,
};
use std::collections::HashMap;

/// Auth implementation backed by a static token table.
pub struct StaticTokenAuth {
	/// Token -> identity map built from configuration.
	tokens: HashMap<String, Identity>,
}

impl StaticTokenAuth {
	/// Creates a new StaticTokenAuth from a prebuilt token map.
	pub fn new(tokens: HashMap<String, Identity>) -> Self {
		Self { tokens }
	}
}

#[async_trait]
impl AuthInterface for StaticTokenAuth {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StaticTokenSchema)
	}

	async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
		self.tokens
			.get(token)
			.cloned()
			.ok_or(AuthError::UnknownToken)
	}
}

/// Configuration schema for StaticTokenAuth.
pub struct StaticTokenSchema;

impl ConfigSchema for StaticTokenSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let entry = Schema::new(
			vec![
				Field::new("token", FieldType::String),
				Field::new("user_id", FieldType::String),
				Field::new("name", FieldType::String),
				Field::new("role", FieldType::String),
			],
			vec![Field::new("phone", FieldType::String)],
		);
		let schema = Schema::new(
			vec![Field::new(
				"tokens",
				FieldType::Array(Box::new(FieldType::Table(entry))),
			)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry for the static token auth implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = AuthFactory;

	fn factory() -> Self::Factory {
		create_auth
	}
}

impl crate::AuthRegistry for Registry {}

fn parse_role(s: &str) -> Result<Role, AuthError> {
	match s {
		"customer" => Ok(Role::Customer),
		"vendor" => Ok(Role::Vendor),
		"supplier" => Ok(Role::Supplier),
		"driver" => Ok(Role::Driver),
		"admin" => Ok(Role::Admin),
		other => Err(AuthError::Implementation(format!(
			"Unknown role '{}' in token table",
			other
		))),
	}
}

/// Factory function to create a static token auth backend from configuration.
///
/// Configuration parameters:
/// - `tokens`: array of `{token, user_id, name, role, phone?}` tables
pub fn create_auth(config: &toml::Value) -> Result<Box<dyn AuthInterface>, AuthError> {
	let entries = config
		.get("tokens")
		.and_then(|v| v.as_array())
		.ok_or_else(|| AuthError::Implementation("Missing 'tokens' array".into()))?;

	let mut tokens = HashMap::with_capacity(entries.len());
	for entry in entries {
		let get_str = |key: &str| -> Result<String, AuthError> {
			entry
				.get(key)
				.and_then(|v| v.as_str())
				.map(str::to_string)
				.ok_or_else(|| {
					AuthError::Implementation(format!("Token entry missing '{}'", key))
				})
		};

		let token = get_str("token")?;
		let identity = Identity {
			user_id: get_str("user_id")?,
			name: get_str("name")?,
			phone: entry
				.get("phone")
				.and_then(|v| v.as_str())
				.map(str::to_string),
			role: parse_role(&get_str("role")?)?,
		};

		if tokens.insert(token.clone(), identity).is_some() {
			return Err(AuthError::Implementation(format!(
				"Duplicate token entry '{}'",
				fixmate_types::truncate_id(&token)
			)));
		}
	}

	Ok(Box::new(StaticTokenAuth::new(tokens)))
}
