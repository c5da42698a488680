//! Storage-related types for the marketplace backend.

use std::str::FromStr;

/// Storage namespaces for the different document collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreNamespace {
	/// Collection of supply orders.
	SupplyOrders,
	/// Collection of service bookings.
	ServiceOrders,
	/// Collection of supplier products.
	Products,
	/// Collection of vendor service offerings.
	ServiceOfferings,
}

impl StoreNamespace {
	/// Returns the string representation of the namespace.
	pub fn as_str(&self) -> &'static str {
		match self {
			StoreNamespace::SupplyOrders => "supply_orders",
			StoreNamespace::ServiceOrders => "service_orders",
			StoreNamespace::Products => "products",
			StoreNamespace::ServiceOfferings => "service_offerings",
		}
	}

	/// Returns an iterator over all namespace variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::SupplyOrders,
			Self::ServiceOrders,
			Self::Products,
			Self::ServiceOfferings,
		]
		.into_iter()
	}
}

impl FromStr for StoreNamespace {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"supply_orders" => Ok(Self::SupplyOrders),
			"service_orders" => Ok(Self::ServiceOrders),
			"products" => Ok(Self::Products),
			"service_offerings" => Ok(Self::ServiceOfferings),
			_ => Err(()),
		}
	}
}

impl From<StoreNamespace> for &'static str {
	fn from(ns: StoreNamespace) -> Self {
		ns.as_str()
	}
}
