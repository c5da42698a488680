//! Service booking lifecycle handler.
//!
//! Implements booking creation, the validated status patch (including the
//! completion path that records revenue from vendor-reported hours), detail
//! edits, deletion, and the list queries.

use crate::event_bus::EventBus;
use crate::state::{ServiceOrderStateMachine, ServiceStateError};
use fixmate_revenue::SplitRates;
use fixmate_storage::{StorageError, StorageService};
use fixmate_types::{
	truncate_id, unix_now, ContactInfo, CreateServiceOrderRequest, Identity, MarketEvent,
	RevenueEvent, Role, ServiceEvent, ServiceOffering, ServiceOrder, ServiceOrderStatus,
	ServiceStatusPatchRequest, StoreNamespace, UpdateServiceOrderRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Errors that can occur during service-booking processing.
#[derive(Debug, Error)]
pub enum ServiceOrderError {
	#[error("Service order not found: {0}")]
	NotFound(String),
	#[error("Service offering not found: {0}")]
	OfferingNotFound(String),
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	Forbidden(String),
	#[error("Invalid state transition from {from} to {to}")]
	IllegalTransition {
		from: ServiceOrderStatus,
		to: ServiceOrderStatus,
	},
	#[error("Booking is not editable in status {0}")]
	NotEditable(ServiceOrderStatus),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<ServiceStateError> for ServiceOrderError {
	fn from(e: ServiceStateError) -> Self {
		match e {
			ServiceStateError::OrderNotFound(id) => ServiceOrderError::NotFound(id),
			ServiceStateError::InvalidTransition { from, to } => {
				ServiceOrderError::IllegalTransition { from, to }
			},
			ServiceStateError::Storage(m) => ServiceOrderError::Storage(m),
		}
	}
}

/// Handler for the service-booking lifecycle.
pub struct ServiceOrderHandler {
	storage: Arc<StorageService>,
	state_machine: Arc<ServiceOrderStateMachine>,
	rates: SplitRates,
	event_bus: EventBus,
}

impl ServiceOrderHandler {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<ServiceOrderStateMachine>,
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

	/// Creates a new booking from a customer request.
	///
	/// The vendor and hourly rate are snapshotted from the offering.
	#[instrument(skip_all, fields(offering_id = %truncate_id(&request.offering_id)))]
	pub async fn create(
		&self,
		caller: &Identity,
		request: CreateServiceOrderRequest,
	) -> Result<ServiceOrder, ServiceOrderError> {
		if !caller.has_role(Role::Customer) {
			return Err(ServiceOrderError::Forbidden(
				"Only customers can book services".into(),
			));
		}

		let offering: ServiceOffering = self
			.storage
			.retrieve(StoreNamespace::ServiceOfferings.as_str(), &request.offering_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					ServiceOrderError::OfferingNotFound(request.offering_id.clone())
				},
				other => ServiceOrderError::Storage(other.to_string()),
			})?;

		let now = unix_now();
		let order = ServiceOrder {
			id: Uuid::new_v4().to_string(),
			offering_id: offering.id.clone(),
			service_name: offering.name.clone(),
			vendor_id: offering.vendor_id.clone(),
			vendor_name: offering.vendor_name.clone(),
			customer_id: caller.user_id.clone(),
			contact: ContactInfo {
				name: request.name,
				phone: request.phone,
				address: request.address,
			},
			date: request.date,
			notes: request.notes,
			payment_method: request.payment_method,
			hourly_rate: offering.hourly_rate,
			status: ServiceOrderStatus::Pending,
			hours_worked: None,
			total_amount: None,
			vendor_revenue: None,
			service_fee: None,
			created_at: now,
			updated_at: now,
		};

		self.state_machine.store_order(&order).await?;
		self.event_bus
			.publish(MarketEvent::Service(ServiceEvent::Booked {
				order: order.clone(),
			}));

		Ok(order)
	}

	/// Gets one booking by id.
	pub async fn get(&self, order_id: &str) -> Result<ServiceOrder, ServiceOrderError> {
		Ok(self.state_machine.get_order(order_id).await?)
	}

	/// Lists every booking, newest first.
	pub async fn list_all(&self) -> Result<Vec<ServiceOrder>, ServiceOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Lists a customer's bookings, newest first.
	pub async fn list_for_user(
		&self,
		user_id: &str,
	) -> Result<Vec<ServiceOrder>, ServiceOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.retain(|o| o.customer_id == user_id);
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Lists a vendor's bookings, newest first.
	pub async fn list_for_vendor(
		&self,
		vendor_id: &str,
	) -> Result<Vec<ServiceOrder>, ServiceOrderError> {
		let mut orders = self.state_machine.list_orders().await?;
		orders.retain(|o| o.vendor_id == vendor_id);
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Validated status patch.
	///
	/// A patch to `done` records revenue: the vendor reports hours worked,
	/// and the total, fee, and vendor net are computed server-side from the
	/// hourly-rate snapshot.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), status = %request.status))]
	pub async fn patch_status(
		&self,
		caller: &Identity,
		order_id: &str,
		request: ServiceStatusPatchRequest,
	) -> Result<ServiceOrder, ServiceOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_vendor(caller, &order)?;

		if request.status == ServiceOrderStatus::Done {
			return self.finalize(&order, request.hours_worked).await;
		}

		let updated = self
			.state_machine
			.transition_with(order_id, request.status, |_| {})
			.await?;

		self.publish_status_change(&order, &updated);
		Ok(updated)
	}

	/// Edits the customer-editable fields while the booking is still pending.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn update_details(
		&self,
		caller: &Identity,
		order_id: &str,
		request: UpdateServiceOrderRequest,
	) -> Result<ServiceOrder, ServiceOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_customer(caller, &order)?;

		if order.status != ServiceOrderStatus::Pending {
			return Err(ServiceOrderError::NotEditable(order.status));
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
				if let Some(date) = request.date {
					o.date = date;
				}
			})
			.await?;

		Ok(updated)
	}

	/// Hard-removes a booking.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn delete(
		&self,
		caller: &Identity,
		order_id: &str,
	) -> Result<(), ServiceOrderError> {
		let order = self.state_machine.get_order(order_id).await?;
		self.ensure_customer(caller, &order)?;

		self.state_machine.remove_order(order_id).await?;
		self.event_bus
			.publish(MarketEvent::Service(ServiceEvent::Deleted {
				order_id: order.id,
			}));
		Ok(())
	}

	/// Completion: validates the reported hours and records the split.
	async fn finalize(
		&self,
		order: &ServiceOrder,
		hours_worked: Option<Decimal>,
	) -> Result<ServiceOrder, ServiceOrderError> {
		// Idempotent re-completion keeps the recorded figures.
		let hours = match (hours_worked, order.hours_worked) {
			(Some(h), _) => h,
			(None, Some(recorded)) => recorded,
			(None, None) => {
				return Err(ServiceOrderError::Validation(
					"hoursWorked is required when completing a booking".into(),
				))
			},
		};

		let split = self
			.rates
			.split_service_hours(order.hourly_rate, hours)
			.map_err(|e| ServiceOrderError::Validation(e.to_string()))?;

		let updated = self
			.state_machine
			.transition_with(&order.id, ServiceOrderStatus::Done, |o| {
				o.hours_worked = Some(hours);
				o.total_amount = Some(split.total);
				o.vendor_revenue = Some(split.vendor_net);
				o.service_fee = Some(split.service_fee);
			})
			.await?;

		self.publish_status_change(order, &updated);
		self.event_bus
			.publish(MarketEvent::Revenue(RevenueEvent::ServiceRecorded {
				order_id: order.id.clone(),
				total: split.total,
				vendor_net: split.vendor_net,
				service_fee: split.service_fee,
			}));

		Ok(updated)
	}

	fn publish_status_change(&self, before: &ServiceOrder, after: &ServiceOrder) {
		if before.status != after.status {
			self.event_bus
				.publish(MarketEvent::Service(ServiceEvent::StatusChanged {
					order_id: after.id.clone(),
					from: before.status,
					to: after.status,
				}));
		}
	}

	fn ensure_vendor(
		&self,
		caller: &Identity,
		order: &ServiceOrder,
	) -> Result<(), ServiceOrderError> {
		if caller.is_admin() || (caller.role == Role::Vendor && caller.user_id == order.vendor_id)
		{
			Ok(())
		} else {
			Err(ServiceOrderError::Forbidden(
				"Only the booking's vendor can do this".into(),
			))
		}
	}

	fn ensure_customer(
		&self,
		caller: &Identity,
		order: &ServiceOrder,
	) -> Result<(), ServiceOrderError> {
		if caller.is_admin() || caller.user_id == order.customer_id {
			Ok(())
		} else {
			Err(ServiceOrderError::Forbidden(
				"Only the booking's customer can do this".into(),
			))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use fixmate_storage::implementations::memory::MemoryStorage;
	use fixmate_types::PaymentMethod;

	fn identity(user_id: &str, role: Role) -> Identity {
		Identity {
			user_id: user_id.into(),
			name: format!("{} name", user_id),
			phone: None,
			role,
		}
	}

	fn request() -> CreateServiceOrderRequest {
		CreateServiceOrderRequest {
			offering_id: "s-1".into(),
			name: "Ava".into(),
			phone: "0100".into(),
			address: "12 Side St".into(),
			date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
			payment_method: PaymentMethod::CardPayment,
			notes: Some("second floor".into()),
		}
	}

	fn patch(status: ServiceOrderStatus, hours: Option<i64>) -> ServiceStatusPatchRequest {
		ServiceStatusPatchRequest {
			status,
			hours_worked: hours.map(Decimal::from),
		}
	}

	async fn fixture() -> (ServiceOrderHandler, Arc<StorageService>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let machine = Arc::new(ServiceOrderStateMachine::new(storage.clone()));
		let handler = ServiceOrderHandler::new(
			storage.clone(),
			machine,
			SplitRates::default(),
			EventBus::default(),
		);

		let offering = ServiceOffering {
			id: "s-1".into(),
			vendor_id: "u-ven".into(),
			vendor_name: "Handy Habib".into(),
			name: "Pipe repair".into(),
			description: None,
			hourly_rate: Decimal::from(250),
			created_at: 1,
			updated_at: 1,
		};
		storage
			.store(
				StoreNamespace::ServiceOfferings.as_str(),
				&offering.id,
				&offering,
			)
			.await
			.unwrap();

		(handler, storage)
	}

	#[tokio::test]
	async fn booking_snapshots_the_offering() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);

		let order = handler.create(&customer, request()).await.unwrap();
		assert_eq!(order.status, ServiceOrderStatus::Pending);
		assert_eq!(order.vendor_id, "u-ven");
		assert_eq!(order.hourly_rate, Decimal::from(250));
		assert!(order.total_amount.is_none());
	}

	#[tokio::test]
	async fn completion_computes_revenue_from_reported_hours() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let vendor = identity("u-ven", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Ongoing, None))
			.await
			.unwrap();

		let done = handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Done, Some(2)))
			.await
			.unwrap();
		assert_eq!(done.status, ServiceOrderStatus::Done);
		assert_eq!(done.hours_worked, Some(Decimal::from(2)));
		assert_eq!(done.total_amount, Some(Decimal::from(500)));
		assert_eq!(done.service_fee, Some(Decimal::from(100)));
		assert_eq!(done.vendor_revenue, Some(Decimal::from(400)));
	}

	#[tokio::test]
	async fn completion_requires_hours() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let vendor = identity("u-ven", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Ongoing, None))
			.await
			.unwrap();

		let result = handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Done, None))
			.await;
		assert!(matches!(result, Err(ServiceOrderError::Validation(_))));
	}

	#[tokio::test]
	async fn pending_cannot_jump_to_done() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let vendor = identity("u-ven", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		let result = handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Done, Some(1)))
			.await;
		assert!(matches!(
			result,
			Err(ServiceOrderError::IllegalTransition {
				from: ServiceOrderStatus::Pending,
				to: ServiceOrderStatus::Done,
			})
		));
	}

	#[tokio::test]
	async fn rejection_is_terminal() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let vendor = identity("u-ven", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		let rejected = handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Rejected, None))
			.await
			.unwrap();
		assert_eq!(rejected.status, ServiceOrderStatus::Rejected);

		let result = handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Ongoing, None))
			.await;
		assert!(matches!(
			result,
			Err(ServiceOrderError::IllegalTransition { .. })
		));
	}

	#[tokio::test]
	async fn only_the_owning_vendor_may_patch() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let other_vendor = identity("u-ven2", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		let result = handler
			.patch_status(
				&other_vendor,
				&order.id,
				patch(ServiceOrderStatus::Ongoing, None),
			)
			.await;
		assert!(matches!(result, Err(ServiceOrderError::Forbidden(_))));
	}

	#[tokio::test]
	async fn edits_are_pending_only() {
		let (handler, _) = fixture().await;
		let customer = identity("u-cust", Role::Customer);
		let vendor = identity("u-ven", Role::Vendor);

		let order = handler.create(&customer, request()).await.unwrap();
		let updated = handler
			.update_details(
				&customer,
				&order.id,
				UpdateServiceOrderRequest {
					address: Some("9 New Rd".into()),
					notes: None,
					date: None,
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.contact.address, "9 New Rd");

		handler
			.patch_status(&vendor, &order.id, patch(ServiceOrderStatus::Ongoing, None))
			.await
			.unwrap();
		let result = handler
			.update_details(
				&customer,
				&order.id,
				UpdateServiceOrderRequest {
					address: Some("too late".into()),
					notes: None,
					date: None,
				},
			)
			.await;
		assert!(matches!(result, Err(ServiceOrderError::NotEditable(_))));
	}

	#[tokio::test]
	async fn deleting_a_missing_booking_is_not_found() {
		let (handler, _) = fixture().await;
		let admin = identity("u-admin", Role::Admin);
		assert!(matches!(
			handler.delete(&admin, "o-missing").await,
			Err(ServiceOrderError::NotFound(_))
		));
	}
}
