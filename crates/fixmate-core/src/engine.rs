//! Market engine orchestrating the marketplace lifecycles.
//!
//! The engine owns the shared services (storage, auth, notifications), the
//! lifecycle handlers, and the event bus. Its run loop forwards lifecycle
//! events to the notification channels and periodically sweeps expired
//! storage entries.

use crate::event_bus::EventBus;
use crate::handlers::{
	CatalogHandler, RevenueReportHandler, ServiceOrderHandler, SupplyOrderHandler,
};
use crate::state::{ServiceOrderStateMachine, SupplyOrderStateMachine};
use fixmate_auth::AuthService;
use fixmate_config::Config;
use fixmate_notify::NotifierService;
use fixmate_revenue::SplitRates;
use fixmate_storage::StorageService;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from one of the engine's services.
	#[error("Service error: {0}")]
	Service(String),
}

/// Main engine coordinating the marketplace services.
pub struct MarketEngine {
	/// Backend configuration.
	config: Config,
	/// Storage service for persisting documents.
	storage: Arc<StorageService>,
	/// Auth service resolving bearer tokens.
	auth: Arc<AuthService>,
	/// Notification fan-out.
	notifier: Arc<NotifierService>,
	/// Event bus for lifecycle events.
	event_bus: EventBus,
	/// Supply-order lifecycle handler.
	supply: Arc<SupplyOrderHandler>,
	/// Service-booking lifecycle handler.
	service: Arc<ServiceOrderHandler>,
	/// Catalog handler.
	catalog: Arc<CatalogHandler>,
	/// Admin revenue report handler.
	report: Arc<RevenueReportHandler>,
}

impl MarketEngine {
	/// Creates a new engine, wiring the handlers onto the shared services.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		auth: Arc<AuthService>,
		notifier: Arc<NotifierService>,
		event_bus: EventBus,
	) -> Self {
		let rates = SplitRates::new(
			config.revenue.platform_fee_rate,
			config.revenue.delivery_pool_rate,
			config.revenue.driver_share,
		);

		let supply_machine = Arc::new(SupplyOrderStateMachine::new(storage.clone()));
		let service_machine = Arc::new(ServiceOrderStateMachine::new(storage.clone()));

		let supply = Arc::new(SupplyOrderHandler::new(
			storage.clone(),
			supply_machine,
			rates,
			event_bus.clone(),
		));
		let service = Arc::new(ServiceOrderHandler::new(
			storage.clone(),
			service_machine,
			rates,
			event_bus.clone(),
		));
		let catalog = Arc::new(CatalogHandler::new(storage.clone()));
		let report = Arc::new(RevenueReportHandler::new(storage.clone(), rates));

		Self {
			config,
			storage,
			auth,
			notifier,
			event_bus,
			supply,
			service,
			catalog,
			report,
		}
	}

	/// Returns the engine's configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns the auth service.
	pub fn auth(&self) -> &AuthService {
		&self.auth
	}

	/// Returns the supply-order lifecycle handler.
	pub fn supply_orders(&self) -> &SupplyOrderHandler {
		&self.supply
	}

	/// Returns the service-booking lifecycle handler.
	pub fn service_orders(&self) -> &ServiceOrderHandler {
		&self.service
	}

	/// Returns the catalog handler.
	pub fn catalog(&self) -> &CatalogHandler {
		&self.catalog
	}

	/// Returns the revenue report handler.
	pub fn reports(&self) -> &RevenueReportHandler {
		&self.report
	}

	/// Main background loop: relays lifecycle events to the notification
	/// channels and sweeps expired storage entries.
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut events = self.event_bus.subscribe();
		let mut cleanup = tokio::time::interval(Duration::from_secs(
			self.config.storage.cleanup_interval_seconds,
		));

		if self.notifier.is_empty() {
			tracing::warn!("No notification channels configured - lifecycle events are dropped");
		}

		loop {
			tokio::select! {
				_ = cleanup.tick() => {
					match self.storage.cleanup_expired().await {
						Ok(count) if count > 0 => {
							tracing::debug!("Storage cleanup: removed {} expired entries", count);
						},
						Err(e) => {
							tracing::warn!("Storage cleanup failed: {}", e);
						},
						_ => {}, // No expired entries
					}
				}

				event = events.recv() => {
					match event {
						Ok(event) => self.notifier.dispatch(&event).await,
						Err(RecvError::Lagged(missed)) => {
							tracing::warn!("Notification relay lagged, dropped {} events", missed);
						},
						// The engine holds the sender, so this only happens
						// at shutdown.
						Err(RecvError::Closed) => return Ok(()),
					}
				}
			}
		}
	}
}
