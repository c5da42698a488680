//! Service booking types.
//!
//! A service order is one customer booking of a vendor's hourly labor
//! service. Financial fields are only meaningful once the order reaches
//! `done`, at which point they are computed from the hourly-rate snapshot
//! and the vendor-reported hours.

use crate::supply::{ContactInfo, PaymentMethod};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a service booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceOrderStatus {
	/// Booked, awaiting the vendor's decision.
	Pending,
	/// Vendor has accepted and work is underway.
	Ongoing,
	/// Work is finished; financial fields are recorded.
	Done,
	/// Vendor declined the booking.
	Rejected,
}

impl ServiceOrderStatus {
	/// Returns true when no further transitions are possible.
	pub fn is_terminal(&self) -> bool {
		matches!(self, ServiceOrderStatus::Done | ServiceOrderStatus::Rejected)
	}
}

impl fmt::Display for ServiceOrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ServiceOrderStatus::Pending => write!(f, "pending"),
			ServiceOrderStatus::Ongoing => write!(f, "ongoing"),
			ServiceOrderStatus::Done => write!(f, "done"),
			ServiceOrderStatus::Rejected => write!(f, "rejected"),
		}
	}
}

/// One customer booking of a vendor's hourly service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
	/// Unique identifier for this booking.
	pub id: String,
	/// Booked service offering id.
	pub offering_id: String,
	/// Service name snapshot.
	pub service_name: String,
	/// Vendor's user id.
	pub vendor_id: String,
	/// Vendor display name snapshot.
	pub vendor_name: String,
	/// Booking customer's user id.
	pub customer_id: String,
	/// Contact and address snapshot.
	pub contact: ContactInfo,
	/// Requested service date.
	pub date: NaiveDate,
	/// Optional free-form notes for the vendor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// How the booking is paid.
	pub payment_method: PaymentMethod,
	/// Hourly rate snapshotted from the offering at booking time.
	pub hourly_rate: Decimal,
	/// Current lifecycle status.
	pub status: ServiceOrderStatus,
	/// Hours the vendor worked, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hours_worked: Option<Decimal>,
	/// Gross booking value, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_amount: Option<Decimal>,
	/// Vendor's net share, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vendor_revenue: Option<Decimal>,
	/// Platform fee, recorded at completion.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service_fee: Option<Decimal>,
	/// Timestamp when this booking was created.
	pub created_at: u64,
	/// Timestamp when this booking was last updated.
	pub updated_at: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_wire_format_is_lowercase() {
		assert_eq!(
			serde_json::to_string(&ServiceOrderStatus::Ongoing).unwrap(),
			"\"ongoing\""
		);
		let parsed: ServiceOrderStatus = serde_json::from_str("\"rejected\"").unwrap();
		assert_eq!(parsed, ServiceOrderStatus::Rejected);
	}

	#[test]
	fn terminal_statuses() {
		assert!(ServiceOrderStatus::Done.is_terminal());
		assert!(ServiceOrderStatus::Rejected.is_terminal());
		assert!(!ServiceOrderStatus::Pending.is_terminal());
		assert!(!ServiceOrderStatus::Ongoing.is_terminal());
	}
}
