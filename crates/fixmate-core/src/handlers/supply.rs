//! Supply order lifecycle handler.
//!
//! Implements checkout, the delivery transitions (assign, cancel, accept,
//! complete), the generic status patch, detail edits, deletion, and the
//! list queries. All status changes run through the validated state
//! machine, and completion amounts are computed server-side from the
//! order's price snapshot through the shared revenue calculator.

use crate::event_bus::EventBus;
use crate::state::{SupplyOrderStateMachine, SupplyStateError};
use fixmate_revenue::SplitRates;
use fixmate_storage::{StorageError, StorageService};
use fixmate_types::{
	truncate_id, unix_now, CreateSupplyOrderRequest, ContactInfo, DriverSnapshot, Identity,
	MarketEvent, PaymentMethod, PaymentStatus, Product, RevenueEvent, Role, StoreNamespace,
	SupplyEvent, SupplyOrder, SupplyOrderStatus, UpdateSupplyOrderRequest,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Errors that can occur during supply-order processing.
#[derive(Debug, Error)]
pub enum SupplyOrderError {
	#[error("Supply order not found: {0}")]
	NotFound(String),
	#[error("Product not found: {0}")]
	ProductNotFound(String),
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	Forbidden(String),
	#[error("Invalid state transition from {from} to {to}")]
	IllegalTransition {
		from: SupplyOrderStatus,
		to: SupplyOrderStatus,
	},
	#[error("Order is not editable in status {0}")]
	NotEditable(SupplyOrderStatus),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<SupplyStateError> for SupplyOrderError {
	fn from(e: SupplyStateError) -> Self {
		match e {
			SupplyStateError::OrderNotFound(id) => SupplyOrderError::NotFound(id),
			SupplyStateError::InvalidTransition { from, to } => {
				SupplyOrderError::IllegalTransition { from, to }
			},
			SupplyStateError::Storage(m) => SupplyOrderError::Storage(m),
		}
	}
}

/// Handler for the supply-order delivery lifecycle.
pub struct SupplyOrderHandler {
	storage: Arc<StorageService>,
	state_machine: Arc<SupplyOrderStateMachine>,
	rates: SplitRates,
	event_bus: EventBus,
}

impl SupplyOrderHandler {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<SupplyOrderStateMachine>,
		rates: SplitRates,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			state_machine,
			rates,
			event_bus,
		}
	}

	/// Creates a new supply order from a customer checkout.
	///
	/// The supplier and unit price are snapshotted from the product; payment
	/// status defaults to paid unless the method is Cash on Delivery.
	#[instrument(skip_all, fields(product_id = %truncate_id(&request.product_id)))]
	pub async fn create(
		&self,
		caller: &Identity,
		request: CreateSupplyOrderRequest,
	) -> Result<SupplyOrder, SupplyOrderError> {
		if !caller.has_role(Role::Customer) {
			return Err(SupplyOrderError::Forbidden(
				"Only customers can place supply orders".into(),
			));
		}
		if request.amount < 1 {
			return Err(SupplyOrderError::Validation(
				"Order amount must be at least 1".into(),
			));
		}

		let product: Product = self
			.storage
			.retrieve(StoreNamespace::Products.as_str(), &request.product_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					SupplyOrderError::ProductNotFound(request.product_id.clone())
				},
				other => SupplyOrderError::Storage(other.to_string()),
			})?;

		let payment_status = match request.payment_method {
			PaymentMethod::CashOnDelivery => PaymentStatus::Pending,
			PaymentMethod::CardPayment => PaymentStatus::Paid,
		};

		let now = unix_now();
		let order = SupplyOrder {
			id: Uuid::new_v4().to_string(),
			product_id: product.id.clone(),
			product_name: product.name.clone(),
			supplier_id: product.supplier_id.clone(),
			customer_id: caller.user_id.clone(),
			contact: ContactInfo {
				name: request.name,
				phone: request.phone,
				address: request.address,
			},
			date: request.date,
			amount: request.amount,
			unit_price: product.unit_price,
			notes: request.notes,
			payment_method: request.payment_method,
			payment_status,
			status: SupplyOrderStatus::Pending,
			assigned_delivery_driver: None,
			delivery_assigned_at: None,
			delivery_accepted_at: None,
			delivery_completed_at: None,
			total_amount: None,
			supplier_revenue: None,
			service_fee: None,
			created_at: now,
			updated_at: now,
		};

		self.state_machine.store_order(&order).await?;
		self.event_bus.publish(MarketEvent::Supply(SupplyEvent::Placed {
			order: order.clone(),
		}));

		Ok(order)
	}

	/// Gets one order by id.
	pub async fn get(&self, order_id: &str) -> Result<SupplyOrder, SupplyOrderError> {
		Ok(self.state_machine.get_order(order_id).await?)
	}

	/// Lists every order, newest first.
	pub async fn list_all(&self) -> Result<Vec<SupplyOrder>, SupplyOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Lists a customer's orders, newest first.
	pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<SupplyOrder>, SupplyOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.retain(|o| o.customer_id == user_id);
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Lists a supplier's orders, newest first.
	pub async fn list_for_supplier(
		&self,
		supplier_id: &str,
	) -> Result<Vec<SupplyOrder>, SupplyOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.retain(|o| o.supplier_id == supplier_id);
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Assigns a driver: the order moves to Waiting for Delivery and the
	/// driver snapshot plus assignment timestamp are stored.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn assign_delivery(
		&self,
		caller: &Identity,
		order_id: &str,
		driver: DriverSnapshot,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_supplier(caller, &order)?;

		let updated = self
			.state_machine
			.transition_with(order_id, SupplyOrderStatus::WaitingForDelivery, |o| {
				o.assigned_delivery_driver = Some(driver.clone());
				o.delivery_assigned_at = Some(unix_now());
			})
			.await?;

		self.publish_status_change(&order, &updated);
		self.event_bus
			.publish(MarketEvent::Supply(SupplyEvent::DeliveryAssigned {
				order_id: order_id.to_string(),
				driver,
			}));

		Ok(updated)
	}

	/// Revokes a driver assignment: the order returns to Confirmed and the
	/// driver snapshot and assignment/acceptance timestamps are cleared.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn cancel_delivery(
		&self,
		caller: &Identity,
		order_id: &str,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_supplier(caller, &order)?;

		let updated = self
			.state_machine
			.transition_with(order_id, SupplyOrderStatus::Confirmed, |o| {
				o.clear_delivery_assignment();
			})
			.await?;

		self.publish_status_change(&order, &updated);
		self.event_bus
			.publish(MarketEvent::Supply(SupplyEvent::DeliveryCancelled {
				order_id: order_id.to_string(),
			}));

		Ok(updated)
	}

	/// The assigned driver accepts: the order moves to Out for Delivery.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn accept_delivery(
		&self,
		caller: &Identity,
		order_id: &str,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_assigned_driver(caller, &order)?;

		let updated = self
			.state_machine
			.transition_with(order_id, SupplyOrderStatus::OutForDelivery, |o| {
				o.delivery_accepted_at = Some(unix_now());
			})
			.await?;

		self.publish_status_change(&order, &updated);
		self.event_bus
			.publish(MarketEvent::Supply(SupplyEvent::DeliveryAccepted {
				order_id: order_id.to_string(),
				driver_id: caller.user_id.clone(),
			}));

		Ok(updated)
	}

	/// The assigned driver completes the delivery: the order moves to
	/// Delivered and the financial fields are recorded.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn complete_delivery(
		&self,
		caller: &Identity,
		order_id: &str,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_assigned_driver(caller, &order)?;
		self.finalize_delivery(&order).await
	}

	/// Generic status patch, validated against the transition table.
	///
	/// A patch to Delivered runs the same completion logic as
	/// complete-delivery, so revenue can never bypass the calculator.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), status = %status))]
	pub async fn patch_status(
		&self,
		caller: &Identity,
		order_id: &str,
		status: SupplyOrderStatus,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_supplier(caller, &order)?;

		if status == SupplyOrderStatus::Delivered {
			// Surface an illegal transition before computing anything.
			if !SupplyOrderStateMachine::is_valid_transition(&order.status, &status) {
				return Err(SupplyOrderError::IllegalTransition {
					from: order.status,
					to: status,
				});
			}
			return self.finalize_delivery(&order).await;
		}

		// A delivery status needs a driver on record; assignment happens
		// through assign-delivery, not the generic patch.
		if status.has_driver() && order.assigned_delivery_driver.is_none() {
			return Err(SupplyOrderError::Validation(format!(
				"Cannot set status {} without an assigned driver",
				status
			)));
		}

		let updated = self
			.state_machine
			.transition_with(order_id, status, |o| {
				if !status.has_driver() {
					o.clear_delivery_assignment();
				}
			})
			.await?;

		self.publish_status_change(&order, &updated);
		Ok(updated)
	}

	/// Edits the customer-editable fields while the order is still Pending.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn update_details(
		&self,
		caller: &Identity,
		order_id: &str,
		request: UpdateSupplyOrderRequest,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_customer(caller, &order)?;

		if order.status != SupplyOrderStatus::Pending {
			return Err(SupplyOrderError::NotEditable(order.status));
		}
		if let Some(amount) = request.amount {
			if amount < 1 {
				return Err(SupplyOrderError::Validation(
					"Order amount must be at least 1".into(),
				));
			}
		}

		let updated = self
			.state_machine
			.update_order_with(order_id, |o| {
				if let Some(address) = request.address {
					o.contact.address = address;
				}
				if let Some(notes) = request.notes {
					o.notes = Some(notes);
				}
				if let Some(amount) = request.amount {
					o.amount = amount;
				}
				if let Some(date) = request.date {
					o.date = date;
				}
			})
			.await?;

		Ok(updated)
	}

	/// Hard-removes an order.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn delete(
		&self,
		caller: &Identity,
		order_id: &str,
	) -> Result<(), SupplyOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_customer(caller, &order)?;

		self.state_machine.remove_order(order_id).await?;
		self.event_bus
			.publish(MarketEvent::Supply(SupplyEvent::Deleted {
				order_id: order.id,
			}));
		Ok(())
	}

	/// Completion shared by complete-delivery and the generic patch: stamps
	/// the completion timestamp, records the server-computed split, and
	/// settles Cash-on-Delivery payments.
	async fn finalize_delivery(
		&self,
		order: &SupplyOrder,
	) -> Result<SupplyOrder, SupplyOrderError> {
		let split = self
			.rates
			.split_supply_units(order.unit_price, order.amount)
			.map_err(|e| SupplyOrderError::Validation(e.to_string()))?;

		let updated = self
			.state_machine
			.transition_with(&order.id, SupplyOrderStatus::Delivered, |o| {
				o.delivery_completed_at = Some(unix_now());
				o.total_amount = Some(split.total);
				o.supplier_revenue = Some(split.supplier_net);
				o.service_fee = Some(split.platform_fee);
				// Cash is collected at the door
				if o.payment_method == PaymentMethod::CashOnDelivery
					&& o.payment_status == PaymentStatus::Pending
				{
					o.payment_status = PaymentStatus::Paid;
				}
			})
			.await?;

		self.publish_status_change(order, &updated);
		self.event_bus
			.publish(MarketEvent::Supply(SupplyEvent::Delivered {
				order_id: order.id.clone(),
			}));
		self.event_bus
			.publish(MarketEvent::Revenue(RevenueEvent::SupplyRecorded {
				order_id: order.id.clone(),
				total: split.total,
				supplier_net: split.supplier_net,
				platform_fee: split.platform_fee,
				driver_net: split.driver_net,
				admin_delivery_cut: split.admin_delivery_cut,
			}));

		Ok(updated)
	}

	fn publish_status_change(&self, before: &SupplyOrder, after: &SupplyOrder) {
		if before.status != after.status {
			self.event_bus
				.publish(MarketEvent::Supply(SupplyEvent::StatusChanged {
					order_id: after.id.clone(),
					from: before.status,
					to: after.status,
				}));
		}
	}

	fn ensure_supplier(
		&self,
		caller: &Identity,
		order: &SupplyOrder,
	) -> Result<(), SupplyOrderError> {
		if caller.is_admin()
			|| (caller.role == Role::Supplier && caller.user_id == order.supplier_id)
		{
			Ok(())
		} else {
			Err(SupplyOrderError::Forbidden(
				"Only the order's supplier can do this".into(),
			))
		}
	}

	fn ensure_customer(
		&self,
		caller: &Identity,
		order: &SupplyOrder,
	) -> Result<(), SupplyOrderError> {
		if caller.is_admin() || caller.user_id == order.customer_id {
			Ok(())
		} else {
			Err(SupplyOrderError::Forbidden(
				"Only the order's customer can do this".into(),
			))
		}
	}

	fn ensure_assigned_driver(
		&self,
		caller: &Identity,
		order: &SupplyOrder,
	) -> Result<(), SupplyOrderError> {
		match order.assigned_delivery_driver.as_ref() {
			Some(driver) if caller.is_admin() || driver.id == caller.user_id => Ok(()),
			Some(_) => Err(SupplyOrderError::Forbidden(
				"Only the assigned driver can do this".into(),
			)),
			None => Err(SupplyOrderError::Validation(
				"No driver is assigned to this order".into(),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use fixmate_storage::implementations::memory::MemoryStorage;
	use rust_decimal::Decimal;

	fn identity(user_id: &str, role: Role) -> Identity {
		Identity {
			user_id: user_id.into(),
			name: format!("{} name", user_id),
			phone: None,
			role,
		}
	}

	fn driver_snapshot() -> DriverSnapshot {
		DriverSnapshot {
			id: "u-drv".into(),
			name: "Bo".into(),
			phone: "0711".into(),
		}
	}

	fn request(amount: u32, method: PaymentMethod) -> CreateSupplyOrderRequest {
		CreateSupplyOrderRequest {
			product_id: "p-1".into(),
			name: "Ava".into(),
			phone: "0100".into(),
			address: "12 Side St".into(),
			date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
			amount,
			payment_method: method,
			notes: None,
		}
	}

	async fn fixture() -> (SupplyOrderHandler, Arc<StorageService>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let machine = Arc::new(SupplyOrderStateMachine::new(storage.clone()));
		let handler = SupplyOrderHandler::new(
			storage.clone(),
			machine,
			SplitRates::default(),
			EventBus::default(),
		);

		let product = Product {
			id: "p-1".into(),
			supplier_id: "u-sup".into(),
			supplier_name: "Supply Co".into(),
			name: "Cement bag".into(),
			description: None,
			unit_price: Decimal::from(500),
			created_at: 1,
			updated_at: 1,
		};
		storage
			.store(StoreNamespace::Products.as_str(), &product.id, &product)
			.await
			.unwrap();

		(handler, storage)
	}

	#[tokio::test]
	async fn checkout_snapshots_product_and_defaults_payment() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);

		let cod = handler
			.create(&customer, request(2, PaymentMethod::CashOnDelivery))
			.await
			.unwrap();
		assert_eq!(cod.status, SupplyOrderStatus::Pending);
		assert_eq!(cod.payment_status, PaymentStatus::Pending);
		assert_eq!(cod.supplier_id, "u-sup");
		assert_eq!(cod.unit_price, Decimal::from(500));
		assert!(cod.total_amount.is_none());
		assert!(cod.assigned_delivery_driver.is_none());

		let card = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();
		assert_eq!(card.payment_status, PaymentStatus::Paid);
	}

	#[tokio::test]
	async fn checkout_rejects_zero_amount() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let result = handler
			.create(&customer, request(0, PaymentMethod::CardPayment))
			.await;
		assert!(matches!(result, Err(SupplyOrderError::Validation(_))));
	}

	#[tokio::test]
	async fn checkout_requires_an_existing_product() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let mut req = request(1, PaymentMethod::CardPayment);
		req.product_id = "p-missing".into();
		assert!(matches!(
			handler.create(&customer, req).await,
			Err(SupplyOrderError::ProductNotFound(_))
		));
	}

	#[tokio::test]
	async fn full_delivery_lifecycle_records_server_computed_revenue() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);
		let driver = identity("u-drv", Role::Driver);

		let order = handler
			.create(&customer, request(2, PaymentMethod::CashOnDelivery))
			.await
			.unwrap();

		let order = handler
			.assign_delivery(&supplier, &order.id, driver_snapshot())
			.await
			.unwrap();
		assert_eq!(order.status, SupplyOrderStatus::WaitingForDelivery);
		assert!(order.delivery_assigned_at.is_some());
		assert_eq!(
			order.assigned_delivery_driver.as_ref().unwrap().id,
			"u-drv"
		);

		let order = handler.accept_delivery(&driver, &order.id).await.unwrap();
		assert_eq!(order.status, SupplyOrderStatus::OutForDelivery);
		assert!(order.delivery_accepted_at.is_some());

		let order = handler.complete_delivery(&driver, &order.id).await.unwrap();
		assert_eq!(order.status, SupplyOrderStatus::Delivered);
		assert!(order.delivery_completed_at.is_some());
		assert_eq!(order.total_amount, Some(Decimal::from(1000)));
		assert_eq!(order.supplier_revenue, Some(Decimal::from(800)));
		assert_eq!(order.service_fee, Some(Decimal::from(200)));
		// Cash was collected at the door
		assert_eq!(order.payment_status, PaymentStatus::Paid);
	}

	#[tokio::test]
	async fn cancel_assignment_returns_to_confirmed_and_clears_driver() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();
		let order = handler
			.assign_delivery(&supplier, &order.id, driver_snapshot())
			.await
			.unwrap();

		let order = handler.cancel_delivery(&supplier, &order.id).await.unwrap();
		assert_eq!(order.status, SupplyOrderStatus::Confirmed);
		assert!(order.assigned_delivery_driver.is_none());
		assert!(order.delivery_assigned_at.is_none());
		assert!(order.delivery_accepted_at.is_none());
	}

	#[tokio::test]
	async fn illegal_jumps_are_rejected() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();

		// Pending -> Delivered skips the whole delivery leg
		let result = handler
			.patch_status(&supplier, &order.id, SupplyOrderStatus::Delivered)
			.await;
		assert!(matches!(
			result,
			Err(SupplyOrderError::IllegalTransition {
				from: SupplyOrderStatus::Pending,
				to: SupplyOrderStatus::Delivered,
			})
		));

		// Pending -> Out for Delivery without a driver
		let result = handler
			.patch_status(&supplier, &order.id, SupplyOrderStatus::OutForDelivery)
			.await;
		assert!(matches!(result, Err(SupplyOrderError::Validation(_))));
	}

	#[tokio::test]
	async fn repeating_a_status_patch_is_idempotent() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();

		let first = handler
			.patch_status(&supplier, &order.id, SupplyOrderStatus::Confirmed)
			.await
			.unwrap();
		let second = handler
			.patch_status(&supplier, &order.id, SupplyOrderStatus::Confirmed)
			.await
			.unwrap();

		assert_eq!(first.status, second.status);
		assert_eq!(first.amount, second.amount);
		assert_eq!(first.payment_status, second.payment_status);
	}

	#[tokio::test]
	async fn only_the_assigned_driver_may_accept_or_complete() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);
		let stranger = identity("u-other", Role::Driver);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();
		let order = handler
			.assign_delivery(&supplier, &order.id, driver_snapshot())
			.await
			.unwrap();

		assert!(matches!(
			handler.accept_delivery(&stranger, &order.id).await,
			Err(SupplyOrderError::Forbidden(_))
		));
		assert!(matches!(
			handler.complete_delivery(&stranger, &order.id).await,
			Err(SupplyOrderError::Forbidden(_))
		));
	}

	#[tokio::test]
	async fn only_the_owning_supplier_may_assign() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let other_supplier = identity("u-sup2", Role::Supplier);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();
		assert!(matches!(
			handler
				.assign_delivery(&other_supplier, &order.id, driver_snapshot())
				.await,
			Err(SupplyOrderError::Forbidden(_))
		));
	}

	#[tokio::test]
	async fn details_are_editable_only_while_pending() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let supplier = identity("u-sup", Role::Supplier);

		let order = handler
			.create(&customer, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();

		let update = UpdateSupplyOrderRequest {
			address: Some("9 New Rd".into()),
			notes: Some("leave at the gate".into()),
			amount: Some(3),
			date: None,
		};
		let updated = handler
			.update_details(&customer, &order.id, update)
			.await
			.unwrap();
		assert_eq!(updated.contact.address, "9 New Rd");
		assert_eq!(updated.amount, 3);

		handler
			.patch_status(&supplier, &order.id, SupplyOrderStatus::Confirmed)
			.await
			.unwrap();
		let late_update = UpdateSupplyOrderRequest {
			address: Some("too late".into()),
			notes: None,
			amount: None,
			date: None,
		};
		assert!(matches!(
			handler.update_details(&customer, &order.id, late_update).await,
			Err(SupplyOrderError::NotEditable(SupplyOrderStatus::Confirmed))
		));
	}

	#[tokio::test]
	async fn deleting_a_missing_order_is_not_found() {
		let (handler, _) = fixture().await;
		let admin = identity("u-admin", Role::Admin);
		assert!(matches!(
			handler.delete(&admin, "so-missing").await,
			Err(SupplyOrderError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn lists_filter_by_customer_and_supplier() {
		let (handler, _) = fixture().await;
		let ava = identity("u-ava", Role::Customer);
		let bea = identity("u-bea", Role::Customer);

		handler
			.create(&ava, request(1, PaymentMethod::CardPayment))
			.await
			.unwrap();
		handler
			.create(&bea, request(2, PaymentMethod::CardPayment))
			.await
			.unwrap();

		assert_eq!(handler.list_for_user("u-ava").await.unwrap().len(), 1);
		assert_eq!(handler.list_for_user("u-bea").await.unwrap().len(), 1);
		assert_eq!(handler.list_for_supplier("u-sup").await.unwrap().len(), 2);
		assert_eq!(handler.list_all().await.unwrap().len(), 2);
	}
}
