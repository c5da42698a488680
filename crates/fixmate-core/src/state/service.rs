//! Service booking state machine.
//!
//! Manages service-order state transitions with validation:
//! pending -> ongoing -> done, or pending -> rejected. Both `done` and
//! `rejected` are terminal.

use fixmate_storage::{StorageError, StorageService};
use fixmate_types::{unix_now, ServiceOrder, ServiceOrderStatus, StoreNamespace};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during service-order state management.
#[derive(Debug, Error)]
pub enum ServiceStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition {
		from: ServiceOrderStatus,
		to: ServiceOrderStatus,
	},
	#[error("Service order not found: {0}")]
	OrderNotFound(String),
}

/// Static transition table - each state maps to its allowed next states.
static TRANSITIONS: Lazy<HashMap<ServiceOrderStatus, HashSet<ServiceOrderStatus>>> =
	Lazy::new(|| {
		use ServiceOrderStatus::*;
		let mut m = HashMap::new();
		m.insert(Pending, HashSet::from([Ongoing, Rejected]));
		m.insert(Ongoing, HashSet::from([Done]));
		m.insert(Done, HashSet::new()); // terminal
		m.insert(Rejected, HashSet::new()); // terminal
		m
	});

/// Manages service-order state transitions and persistence.
pub struct ServiceOrderStateMachine {
	storage: Arc<StorageService>,
}

impl ServiceOrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks if a state transition is valid. Self-transitions stay legal so
	/// re-applied patches are idempotent.
	pub fn is_valid_transition(from: &ServiceOrderStatus, to: &ServiceOrderStatus) -> bool {
		if from == to {
			return true;
		}
		TRANSITIONS.get(from).is_some_and(|set| set.contains(to))
	}

	/// Gets a booking by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<ServiceOrder, ServiceStateError> {
		self.storage
			.retrieve(StoreNamespace::ServiceOrders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => ServiceStateError::OrderNotFound(order_id.to_string()),
				other => ServiceStateError::Storage(other.to_string()),
			})
	}

	/// Stores a new booking.
	pub async fn store_order(&self, order: &ServiceOrder) -> Result<(), ServiceStateError> {
		self.storage
			.store(StoreNamespace::ServiceOrders.as_str(), &order.id, order)
			.await
			.map_err(|e| ServiceStateError::Storage(e.to_string()))
	}

	/// Removes a booking.
	pub async fn remove_order(&self, order_id: &str) -> Result<(), ServiceStateError> {
		self.storage
			.remove(StoreNamespace::ServiceOrders.as_str(), order_id)
			.await
			.map_err(|e| ServiceStateError::Storage(e.to_string()))
	}

	/// Lists every stored booking.
	pub async fn list_orders(&self) -> Result<Vec<ServiceOrder>, ServiceStateError> {
		self.storage
			.retrieve_all(StoreNamespace::ServiceOrders.as_str())
			.await
			.map_err(|e| ServiceStateError::Storage(e.to_string()))
	}

	/// Updates a booking with a closure and persists it, stamping `updated_at`.
	pub async fn update_order_with<F>(
		&self,
		order_id: &str,
		updater: F,
	) -> Result<ServiceOrder, ServiceStateError>
	where
		F: FnOnce(&mut ServiceOrder),
	{
		let mut order = self.get_order(order_id).await?;

		updater(&mut order);
		order.updated_at = unix_now();

		self.storage
			.update(StoreNamespace::ServiceOrders.as_str(), order_id, &order)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => ServiceStateError::OrderNotFound(order_id.to_string()),
				other => ServiceStateError::Storage(other.to_string()),
			})?;

		Ok(order)
	}

	/// Transitions a booking to a new status with validation, applying
	/// transition side effects in the same write.
	pub async fn transition_with<F>(
		&self,
		order_id: &str,
		new_status: ServiceOrderStatus,
		effects: F,
	) -> Result<ServiceOrder, ServiceStateError>
	where
		F: FnOnce(&mut ServiceOrder),
	{
		let order = self.get_order(order_id).await?;

		if !Self::is_valid_transition(&order.status, &new_status) {
			return Err(ServiceStateError::InvalidTransition {
				from: order.status,
				to: new_status,
			});
		}

		self.update_order_with(order_id, |o| {
			o.status = new_status;
			effects(o);
		})
		.await
	}
}
