//! Engine builder wiring pluggable implementations from configuration.
//!
//! The service binary hands the builder a factory map per infrastructure
//! concern; the builder instantiates the configured implementations,
//! validates each one's configuration against its declared schema, and
//! assembles the [`MarketEngine`].

use crate::engine::MarketEngine;
use crate::event_bus::EventBus;
use fixmate_auth::{AuthError, AuthFactory, AuthService};
use fixmate_config::Config;
use fixmate_notify::{NotifierFactory, NotifierInterface, NotifierService, NotifyError};
use fixmate_storage::{StorageError, StorageFactory, StorageService};
use fixmate_types::ValidationError;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Auth error: {0}")]
	Auth(#[from] AuthError),
	#[error("Notifier error: {0}")]
	Notify(#[from] NotifyError),
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),
}

/// Factory maps for every pluggable concern.
pub struct MarketFactories {
	pub storage_factories: HashMap<String, StorageFactory>,
	pub auth_factories: HashMap<String, AuthFactory>,
	pub notifier_factories: HashMap<String, NotifierFactory>,
}

/// Builds a [`MarketEngine`] from configuration and factories.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new builder for the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Instantiates the configured implementations and assembles the engine.
	pub async fn build(self, factories: MarketFactories) -> Result<MarketEngine, BuilderError> {
		let config = self.config;

		// Storage: the configured primary implementation.
		let storage_name = &config.storage.primary;
		let storage_config = config
			.storage
			.implementations
			.get(storage_name)
			.ok_or_else(|| {
				BuilderError::Config(format!("No configuration for storage '{}'", storage_name))
			})?;
		let storage_factory = factories.storage_factories.get(storage_name).ok_or_else(|| {
			BuilderError::Config(format!("Unknown storage implementation '{}'", storage_name))
		})?;
		let storage_backend = storage_factory(storage_config)?;
		storage_backend.config_schema().validate(storage_config)?;
		let storage = Arc::new(StorageService::new(storage_backend));

		// Auth: the configured primary implementation.
		let auth_name = &config.auth.primary;
		let auth_config = config.auth.implementations.get(auth_name).ok_or_else(|| {
			BuilderError::Config(format!("No configuration for auth '{}'", auth_name))
		})?;
		let auth_factory = factories.auth_factories.get(auth_name).ok_or_else(|| {
			BuilderError::Config(format!("Unknown auth implementation '{}'", auth_name))
		})?;
		let auth_backend = auth_factory(auth_config)?;
		auth_backend.config_schema().validate(auth_config)?;
		let auth = Arc::new(AuthService::new(auth_backend));

		// Notifications: every configured channel is active.
		let mut channels: HashMap<String, Box<dyn NotifierInterface>> = HashMap::new();
		for (name, channel_config) in &config.notify.implementations {
			let factory = factories.notifier_factories.get(name).ok_or_else(|| {
				BuilderError::Config(format!("Unknown notifier implementation '{}'", name))
			})?;
			let channel = factory(channel_config)?;
			channel.config_schema().validate(channel_config)?;
			channels.insert(name.clone(), channel);
		}
		let notifier = Arc::new(NotifierService::new(channels));

		Ok(MarketEngine::new(
			config,
			storage,
			auth,
			notifier,
			EventBus::default(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_config() -> Config {
		r#"
[service]
id = "fixmate-builder-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[auth]
primary = "static"
[auth.implementations.static]
[[auth.implementations.static.tokens]]
token = "t-admin"
user_id = "u-admin"
name = "Root"
role = "admin"

[notify.implementations.log]
"#
		.parse()
		.unwrap()
	}

	fn test_factories() -> MarketFactories {
		MarketFactories {
			storage_factories: fixmate_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			auth_factories: fixmate_auth::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			notifier_factories: fixmate_notify::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn builds_with_registered_implementations() {
		let engine = EngineBuilder::new(test_config())
			.build(test_factories())
			.await
			.unwrap();

		assert_eq!(engine.config().service.id, "fixmate-builder-test");
		let identity = engine.auth().resolve("t-admin").await.unwrap();
		assert_eq!(identity.user_id, "u-admin");
	}

	#[tokio::test]
	async fn unknown_storage_implementation_fails_the_build() {
		let mut config = test_config();
		config.storage.primary = "redis".to_string();
		config
			.storage
			.implementations
			.insert("redis".to_string(), toml::Value::Table(Default::default()));

		let result = EngineBuilder::new(config).build(test_factories()).await;
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}

	#[tokio::test]
	async fn unknown_notifier_fails_the_build() {
		let mut config = test_config();
		config
			.notify
			.implementations
			.insert("pigeon".to_string(), toml::Value::Table(Default::default()));

		let result = EngineBuilder::new(config).build(test_factories()).await;
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
