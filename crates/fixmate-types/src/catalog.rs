//! Catalog types: supplier products and vendor service offerings.
//!
//! The catalog exists so order completion can price orders from data the
//! server trusts. Checkout snapshots the unit price (or hourly rate) into
//! the order, and revenue is always derived from that snapshot rather than
//! from anything a client sends later.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A physical product sold by a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	/// Unique identifier for this product.
	pub id: String,
	/// Owning supplier's user id.
	pub supplier_id: String,
	/// Supplier display name snapshot.
	pub supplier_name: String,
	/// Product name.
	pub name: String,
	/// Optional free-form description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Price per unit.
	pub unit_price: Decimal,
	/// Timestamp when this product was created.
	pub created_at: u64,
	/// Timestamp when this product was last updated.
	pub updated_at: u64,
}

/// An hourly labor service offered by a vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
	/// Unique identifier for this offering.
	pub id: String,
	/// Owning vendor's user id.
	pub vendor_id: String,
	/// Vendor display name snapshot.
	pub vendor_name: String,
	/// Service name.
	pub name: String,
	/// Optional free-form description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Rate charged per hour worked.
	pub hourly_rate: Decimal,
	/// Timestamp when this offering was created.
	pub created_at: u64,
	/// Timestamp when this offering was last updated.
	pub updated_at: u64,
}
