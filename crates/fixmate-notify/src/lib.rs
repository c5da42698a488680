//! Notification module for the FIX-MATE backend.
//!
//! This module delivers lifecycle events to interested parties. It provides
//! abstractions over different notification channels; the shipped backends
//! log events or POST them to a configured webhook, and a mail backend
//! would be one more implementation of the same trait. Notification
//! delivery is best-effort by design: a failed notification never fails
//! the request that triggered it.

use async_trait::async_trait;
use fixmate_types::{ConfigSchema, ImplementationRegistry, MarketEvent};
use std::collections::HashMap;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs during configuration handling.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for notification channels.
#[async_trait]
pub trait NotifierInterface: Send + Sync {
	/// Returns the configuration schema for this notifier implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Delivers one lifecycle event through this channel.
	async fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError>;
}

/// Type alias for notifier factory functions.
pub type NotifierFactory = fn(&toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError>;

/// Registry trait for notifier implementations.
pub trait NotifierRegistry: ImplementationRegistry<Factory = NotifierFactory> {}

/// Get all registered notifier implementations.
pub fn get_all_implementations() -> Vec<(&'static str, NotifierFactory)> {
	use implementations::{log, webhook};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service that fans lifecycle events out to every configured channel.
///
/// Channels are independent: one failing is logged and does not stop the
/// others, and nothing propagates back to the originating request.
pub struct NotifierService {
	/// Configured channels by implementation name.
	channels: HashMap<String, Box<dyn NotifierInterface>>,
}

impl NotifierService {
	/// Creates a new NotifierService with the given channels.
	pub fn new(channels: HashMap<String, Box<dyn NotifierInterface>>) -> Self {
		Self { channels }
	}

	/// Returns true when no channels are configured.
	pub fn is_empty(&self) -> bool {
		self.channels.is_empty()
	}

	/// Delivers an event to every channel, best-effort.
	pub async fn dispatch(&self, event: &MarketEvent) {
		for (name, channel) in &self.channels {
			if let Err(e) = channel.notify(event).await {
				tracing::warn!("Notification channel '{}' failed: {}", name, e);
			}
		}
	}
}
