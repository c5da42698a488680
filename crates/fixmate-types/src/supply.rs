//! Supply order types for the delivery lifecycle.
//!
//! A supply order is one customer purchase of a supplier's product,
//! fulfilled by a delivery driver. The order carries a closed lifecycle
//! status, a driver snapshot while a delivery is in flight, and financial
//! fields that are only populated once the order reaches `Delivered`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a supply order.
///
/// Wire strings match the customer-facing labels, including the spaced
/// variants (`"Waiting for Delivery"`, `"Out for Delivery"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyOrderStatus {
	/// Order has been placed and not yet confirmed by the supplier.
	Pending,
	/// Supplier has confirmed the order.
	Confirmed,
	/// A driver has been assigned but has not yet accepted.
	#[serde(rename = "Waiting for Delivery")]
	WaitingForDelivery,
	/// The driver has accepted and the delivery is in flight.
	#[serde(rename = "Out for Delivery")]
	OutForDelivery,
	/// The delivery is complete; financial fields are recorded.
	Delivered,
	/// The order was cancelled before delivery.
	Cancelled,
}

impl SupplyOrderStatus {
	/// Returns true for statuses in which a driver snapshot must be present.
	pub fn has_driver(&self) -> bool {
		matches!(
			self,
			SupplyOrderStatus::WaitingForDelivery
				| SupplyOrderStatus::OutForDelivery
				| SupplyOrderStatus::Delivered
		)
	}

	/// Returns true when no further transitions are possible.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			SupplyOrderStatus::Delivered | SupplyOrderStatus::Cancelled
		)
	}
}

impl fmt::Display for SupplyOrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SupplyOrderStatus::Pending => write!(f, "Pending"),
			SupplyOrderStatus::Confirmed => write!(f, "Confirmed"),
			SupplyOrderStatus::WaitingForDelivery => write!(f, "Waiting for Delivery"),
			SupplyOrderStatus::OutForDelivery => write!(f, "Out for Delivery"),
			SupplyOrderStatus::Delivered => write!(f, "Delivered"),
			SupplyOrderStatus::Cancelled => write!(f, "Cancelled"),
		}
	}
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
	/// Cash handed to the driver at the door; payment stays pending until then.
	#[serde(rename = "Cash on Delivery")]
	CashOnDelivery,
	/// Card captured at checkout; payment is settled up front.
	#[serde(rename = "Card Payment")]
	CardPayment,
}

/// Settlement state of the order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	Pending,
	Paid,
	Failed,
}

/// Snapshot of the driver assigned to fulfill a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSnapshot {
	/// Driver's user id.
	pub id: String,
	/// Driver display name.
	pub name: String,
	/// Driver contact phone.
	pub phone: String,
}

/// Contact and address snapshot taken at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
	/// Recipient name.
	pub name: String,
	/// Recipient phone number.
	pub phone: String,
	/// Delivery address.
	pub address: String,
}

/// One customer purchase of a supplier's product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyOrder {
	/// Unique identifier for this order.
	pub id: String,
	/// Purchased product id.
	pub product_id: String,
	/// Product name snapshot.
	pub product_name: String,
	/// Selling supplier's user id.
	pub supplier_id: String,
	/// Purchasing customer's user id.
	pub customer_id: String,
	/// Contact and address snapshot.
	pub contact: ContactInfo,
	/// Requested delivery date.
	pub date: NaiveDate,
	/// Quantity ordered, at least 1.
	pub amount: u32,
	/// Unit price snapshotted from the product at checkout. Revenue is
	/// always derived from this value, never from client input.
	pub unit_price: Decimal,
	/// Optional free-form notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// How the order is paid.
	pub payment_method: PaymentMethod,
	/// Settlement state of the payment.
	pub payment_status: PaymentStatus,
	/// Current lifecycle status.
	pub status: SupplyOrderStatus,
	/// Assigned driver snapshot, present only while a delivery is in flight
	/// or complete.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub assigned_delivery_driver: Option<DriverSnapshot>,
	/// Timestamp when a driver was assigned.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_assigned_at: Option<u64>,
	/// Timestamp when the driver accepted.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_accepted_at: Option<u64>,
	/// Timestamp when the delivery completed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_completed_at: Option<u64>,
	/// Gross order value, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_amount: Option<Decimal>,
	/// Supplier's net share, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub supplier_revenue: Option<Decimal>,
	/// Platform fee, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service_fee: Option<Decimal>,
	/// Timestamp when this order was created.
	pub created_at: u64,
	/// Timestamp when this order was last updated.
	pub updated_at: u64,
}

impl SupplyOrder {
	/// Clears the driver snapshot and the assignment/acceptance timestamps.
	///
	/// Used when a supplier revokes an assignment; completion timestamps are
	/// untouched because a completed order never returns here.
	pub fn clear_delivery_assignment(&mut self) {
		self.assigned_delivery_driver = None;
		self.delivery_assigned_at = None;
		self.delivery_accepted_at = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_wire_strings_keep_spaces() {
		assert_eq!(
			serde_json::to_string(&SupplyOrderStatus::WaitingForDelivery).unwrap(),
			"\"Waiting for Delivery\""
		);
		let parsed: SupplyOrderStatus = serde_json::from_str("\"Out for Delivery\"").unwrap();
		assert_eq!(parsed, SupplyOrderStatus::OutForDelivery);
	}

	#[test]
	fn payment_method_wire_strings() {
		assert_eq!(
			serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
			"\"Cash on Delivery\""
		);
		let parsed: PaymentMethod = serde_json::from_str("\"Card Payment\"").unwrap();
		assert_eq!(parsed, PaymentMethod::CardPayment);
	}

	#[test]
	fn driver_presence_matches_status() {
		assert!(!SupplyOrderStatus::Pending.has_driver());
		assert!(!SupplyOrderStatus::Confirmed.has_driver());
		assert!(SupplyOrderStatus::WaitingForDelivery.has_driver());
		assert!(SupplyOrderStatus::OutForDelivery.has_driver());
		assert!(SupplyOrderStatus::Delivered.has_driver());
	}

	#[test]
	fn terminal_statuses() {
		assert!(SupplyOrderStatus::Delivered.is_terminal());
		assert!(SupplyOrderStatus::Cancelled.is_terminal());
		assert!(!SupplyOrderStatus::OutForDelivery.is_terminal());
	}
}
