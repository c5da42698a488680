//! Supply order state machine.
//!
//! Manages supply-order state transitions with validation, ensuring orders
//! move through the delivery lifecycle:
//! Pending -> Confirmed -> Waiting for Delivery -> Out for Delivery -> Delivered,
//! with Cancelled reachable before the delivery starts and an explicit
//! back-edge Waiting for Delivery -> Confirmed when a supplier revokes an
//! assignment. Also provides utilities for updating order fields with an
//! automatic `updated_at` stamp.

use fixmate_storage::{StorageError, StorageService};
use fixmate_types::{unix_now, StoreNamespace, SupplyOrder, SupplyOrderStatus};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during supply-order state management.
#[derive(Debug, Error)]
pub enum SupplyStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition {
		from: SupplyOrderStatus,
		to: SupplyOrderStatus,
	},
	#[error("Supply order not found: {0}")]
	OrderNotFound(String),
}

/// Static transition table - each state maps to its allowed next states.
///
/// `Pending -> Waiting for Delivery` is legal so a supplier can assign a
/// driver without an explicit confirm step.
static TRANSITIONS: Lazy<HashMap<SupplyOrderStatus, HashSet<SupplyOrderStatus>>> =
	Lazy::new(|| {
		use SupplyOrderStatus::*;
		let mut m = HashMap::new();
		m.insert(
			Pending,
			HashSet::from([Confirmed, WaitingForDelivery, Cancelled]),
		);
		m.insert(Confirmed, HashSet::from([WaitingForDelivery, Cancelled]));
		m.insert(
			WaitingForDelivery,
			HashSet::from([OutForDelivery, Confirmed, Cancelled]),
		);
		m.insert(OutForDelivery, HashSet::from([Delivered]));
		m.insert(Delivered, HashSet::new()); // terminal
		m.insert(Cancelled, HashSet::new()); // terminal
		m
	});

/// Manages supply-order state transitions and persistence.
pub struct SupplyOrderStateMachine {
	storage: Arc<StorageService>,
}

impl SupplyOrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks if a state transition is valid.
	///
	/// Re-applying the current status is always legal, which keeps status
	/// patches idempotent.
	pub fn is_valid_transition(from: &SupplyOrderStatus, to: &SupplyOrderStatus) -> bool {
		if from == to {
			return true;
		}
		TRANSITIONS.get(from).is_some_and(|set| set.contains(to))
	}

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<SupplyOrder, SupplyStateError> {
		self.storage
			.retrieve(StoreNamespace::SupplyOrders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => SupplyStateError::OrderNotFound(order_id.to_string()),
				other => SupplyStateError::Storage(other.to_string()),
			})
	}

	/// Stores a new order.
	pub async fn store_order(&self, order: &SupplyOrder) -> Result<(), SupplyStateError> {
		self.storage
			.store(StoreNamespace::SupplyOrders.as_str(), &order.id, order)
			.await
			.map_err(|e| SupplyStateError::Storage(e.to_string()))
	}

	/// Removes an order.
	pub async fn remove_order(&self, order_id: &str) -> Result<(), SupplyStateError> {
		self.storage
			.remove(StoreNamespace::SupplyOrders.as_str(), order_id)
			.await
			.map_err(|e| SupplyStateError::Storage(e.to_string()))
	}

	/// Lists every stored order.
	pub async fn list_orders(&self) -> Result<Vec<SupplyOrder>, SupplyStateError> {
		self.storage
			.retrieve_all(StoreNamespace::SupplyOrders.as_str())
			.await
			.map_err(|e| SupplyStateError::Storage(e.to_string()))
	}

	/// Updates an order with a closure and persists it.
	///
	/// `updated_at` is stamped automatically on every write.
	pub async fn update_order_with<F>(
		&self,
		order_id: &str,
		updater: F,
	) -> Result<SupplyOrder, SupplyStateError>
	where
		F: FnOnce(&mut SupplyOrder),
	{
		let mut order = self.get_order(order_id).await?;

		updater(&mut order);
		order.updated_at = unix_now();

		self.storage
			.update(StoreNamespace::SupplyOrders.as_str(), order_id, &order)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => SupplyStateError::OrderNotFound(order_id.to_string()),
				other => SupplyStateError::Storage(other.to_string()),
			})?;

		Ok(order)
	}

	/// Transitions an order to a new status with validation, applying
	/// transition side effects in the same write.
	pub async fn transition_with<F>(
		&self,
		order_id: &str,
		new_status: SupplyOrderStatus,
		effects: F,
	) -> Result<SupplyOrder, SupplyStateError>
	where
		F: FnOnce(&mut SupplyOrder),
	{
		let order = self.get_order(order_id).await?;

		if !Self::is_valid_transition(&order.status, &new_status) {
			return Err(SupplyStateError::InvalidTransition {
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
