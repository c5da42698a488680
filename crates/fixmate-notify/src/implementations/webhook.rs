//! Webhook notifier implementation.
//!
//! POSTs every lifecycle event as JSON to a configured URL. This is the
//! integration point for external messaging (mail gateways, chat bots,
//! mobile push relays) without the backend knowing about any of them.

use crate::{NotifierFactory, NotifierInterface, NotifyError};
use async_trait::async_trait;
use fixmate_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, MarketEvent, Schema, ValidationError,
};
use std::time::Duration;

/// Notifier that forwards events to an HTTP endpoint.
pub struct WebhookNotifier {
	/// Shared HTTP client with connection pooling.
	client: reqwest::Client,
	/// Target endpoint receiving event payloads.
	url: String,
}

impl WebhookNotifier {
	/// Creates a new WebhookNotifier for the given URL.
	pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(timeout)
			.build()
			.map_err(|e| NotifyError::Configuration(e.to_string()))?;
		Ok(Self { client, url })
	}
}

#[async_trait]
impl NotifierInterface for WebhookNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WebhookNotifierSchema)
	}

	async fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
		let response = self
			.client
			.post(&self.url)
			.json(event)
			.send()
			.await
			.map_err(|e| NotifyError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(NotifyError::Network(format!(
				"Webhook endpoint returned {}",
				response.status()
			)));
		}
		Ok(())
	}
}

/// Configuration schema for WebhookNotifier.
pub struct WebhookNotifierSchema;

impl ConfigSchema for WebhookNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String)],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Registry for the webhook notifier implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = NotifierFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifierRegistry for Registry {}

/// Factory function to create a webhook notifier from configuration.
///
/// Configuration parameters:
/// - `url`: endpoint receiving event payloads (required)
/// - `timeout_seconds`: request timeout (default: 10)
pub fn create_notifier(config: &toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Configuration("Missing 'url' for webhook notifier".into()))?
		.to_string();

	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(10) as u64;

	let notifier = WebhookNotifier::new(url, Duration::from_secs(timeout_seconds))?;
	Ok(Box::new(notifier))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn factory_requires_url() {
		let config: toml::Value = toml::from_str("timeout_seconds = 5").unwrap();
		assert!(matches!(
			create_notifier(&config),
			Err(NotifyError::Configuration(_))
		));
	}

	#[test]
	fn schema_rejects_missing_url() {
		let config: toml::Value = toml::from_str("timeout_seconds = 5").unwrap();
		let schema = WebhookNotifierSchema;
		assert!(schema.validate(&config).is_err());
	}

	#[test]
	fn schema_accepts_url_and_timeout() {
		let config: toml::Value =
			toml::from_str("url = \"http://localhost:9000/hook\"\ntimeout_seconds = 5").unwrap();
		let schema = WebhookNotifierSchema;
		assert!(schema.validate(&config).is_ok());
	}
}
