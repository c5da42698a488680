//! Log-based notifier implementation.
//!
//! Writes every lifecycle event to the tracing log. Always configured in
//! development; in production it doubles as an audit trail next to
//! whatever outward-facing channel is active.

use crate::{NotifierFactory, NotifierInterface, NotifyError};
use async_trait::async_trait;
use fixmate_types::{
	ConfigSchema, ImplementationRegistry, MarketEvent, RevenueEvent, Schema, ServiceEvent,
	SupplyEvent, ValidationError,
};

/// Notifier that records events in the service log.
pub struct LogNotifier;

/// One-line human summary of a lifecycle event.
fn summarize(event: &MarketEvent) -> String {
	match event {
		MarketEvent::Supply(e) => match e {
			SupplyEvent::Placed { order } => {
				format!("supply order {} placed ({} units)", order.id, order.amount)
			},
			SupplyEvent::StatusChanged { order_id, from, to } => {
				format!("supply order {} moved {} -> {}", order_id, from, to)
			},
			SupplyEvent::DeliveryAssigned { order_id, driver } => {
				format!("supply order {} assigned to driver {}", order_id, driver.name)
			},
			SupplyEvent::DeliveryCancelled { order_id } => {
				format!("supply order {} assignment revoked", order_id)
			},
			SupplyEvent::DeliveryAccepted { order_id, driver_id } => {
				format!("supply order {} accepted by driver {}", order_id, driver_id)
			},
			SupplyEvent::Delivered { order_id } => {
				format!("supply order {} delivered", order_id)
			},
			SupplyEvent::Deleted { order_id } => format!("supply order {} deleted", order_id),
		},
		MarketEvent::Service(e) => match e {
			ServiceEvent::Booked { order } => {
				format!("service booking {} placed for {}", order.id, order.service_name)
			},
			ServiceEvent::StatusChanged { order_id, from, to } => {
				format!("service booking {} moved {} -> {}", order_id, from, to)
			},
			ServiceEvent::Deleted { order_id } => {
				format!("service booking {} deleted", order_id)
			},
		},
		MarketEvent::Revenue(e) => match e {
			RevenueEvent::SupplyRecorded {
				order_id,
				total,
				platform_fee,
				..
			} => format!(
				"revenue recorded for supply order {}: total {} fee {}",
				order_id, total, platform_fee
			),
			RevenueEvent::ServiceRecorded {
				order_id,
				total,
				service_fee,
				..
			} => format!(
				"revenue recorded for service booking {}: total {} fee {}",
				order_id, total, service_fee
			),
		},
	}
}

#[async_trait]
impl NotifierInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
		tracing::info!(target: "fixmate::notify", "{}", summarize(event));
		Ok(())
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The log channel has no required configuration
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry for the log notifier implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = NotifierFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifierRegistry for Registry {}

/// Factory function to create a log notifier from configuration.
pub fn create_notifier(_config: &toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError> {
	Ok(Box::new(LogNotifier))
}
