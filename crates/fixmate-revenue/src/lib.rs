//! Revenue split arithmetic for the FIX-MATE marketplace.
//!
//! This crate is the single place where order value is divided between the
//! platform, suppliers, vendors, and delivery drivers. Every call site
//! (delivery completion, the generic status patch, the admin revenue
//! report) goes through [`SplitRates`], so the figures can never drift
//! between code paths.
//!
//! All arithmetic uses [`rust_decimal::Decimal`]; multiplicative results are
//! rounded to cents and the remaining shares are derived by subtraction, so
//! the split always sums back to the input total exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during split computation.
#[derive(Debug, Error, PartialEq)]
pub enum RevenueError {
	/// The order total was negative.
	#[error("Order total cannot be negative: {0}")]
	NegativeTotal(Decimal),
	/// Hours worked were negative.
	#[error("Hours worked cannot be negative: {0}")]
	NegativeHours(Decimal),
}

/// The platform's split rates.
///
/// Defaults: 20% platform fee on every order, a 10% delivery pool on supply
/// orders, and an 80% driver share of that pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRates {
	/// Fee taken from every order's gross value.
	pub platform_fee_rate: Decimal,
	/// Share of a supply order's gross value set aside for delivery.
	pub delivery_pool_rate: Decimal,
	/// The driver's share of the delivery pool.
	pub driver_share: Decimal,
}

impl Default for SplitRates {
	fn default() -> Self {
		Self {
			platform_fee_rate: Decimal::new(20, 2),
			delivery_pool_rate: Decimal::new(10, 2),
			driver_share: Decimal::new(80, 2),
		}
	}
}

/// The division of one supply order's gross value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplySplit {
	/// Gross order value.
	pub total: Decimal,
	/// The platform's fee.
	pub platform_fee: Decimal,
	/// What the supplier keeps: total minus the platform fee.
	pub supplier_net: Decimal,
	/// The delivery pool carved out of the gross value.
	pub delivery_fee: Decimal,
	/// The driver's share of the delivery pool.
	pub driver_net: Decimal,
	/// The platform's share of the delivery pool.
	pub admin_delivery_cut: Decimal,
}

impl SupplySplit {
	/// The platform's total take on this order.
	pub fn admin_total(&self) -> Decimal {
		self.platform_fee + self.admin_delivery_cut
	}
}

/// The division of one service booking's gross value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSplit {
	/// Gross booking value.
	pub total: Decimal,
	/// The platform's fee.
	pub service_fee: Decimal,
	/// What the vendor keeps: total minus the fee.
	pub vendor_net: Decimal,
}

/// Rounds a computed share to cents and strips trailing zeros, so money
/// serializes as "200" rather than "200.00".
fn money(value: Decimal) -> Decimal {
	value.round_dp(2).normalize()
}

impl SplitRates {
	/// Builds rates from explicit values.
	pub fn new(
		platform_fee_rate: Decimal,
		delivery_pool_rate: Decimal,
		driver_share: Decimal,
	) -> Self {
		Self {
			platform_fee_rate,
			delivery_pool_rate,
			driver_share,
		}
	}

	/// Splits a supply order's gross value.
	///
	/// Invariants for every non-negative total:
	/// `supplier_net + platform_fee == total` and
	/// `driver_net + admin_delivery_cut == delivery_fee`.
	pub fn split_supply(&self, total: Decimal) -> Result<SupplySplit, RevenueError> {
		if total.is_sign_negative() {
			return Err(RevenueError::NegativeTotal(total));
		}

		let platform_fee = money(total * self.platform_fee_rate);
		let delivery_fee = money(total * self.delivery_pool_rate);
		let driver_net = money(delivery_fee * self.driver_share);

		Ok(SupplySplit {
			total,
			platform_fee,
			supplier_net: total - platform_fee,
			delivery_fee,
			driver_net,
			admin_delivery_cut: delivery_fee - driver_net,
		})
	}

	/// Splits a supply order priced as `unit_price * quantity`.
	pub fn split_supply_units(
		&self,
		unit_price: Decimal,
		quantity: u32,
	) -> Result<SupplySplit, RevenueError> {
		self.split_supply(unit_price * Decimal::from(quantity))
	}

	/// Splits a service booking's gross value.
	pub fn split_service(&self, total: Decimal) -> Result<ServiceSplit, RevenueError> {
		if total.is_sign_negative() {
			return Err(RevenueError::NegativeTotal(total));
		}

		let service_fee = money(total * self.platform_fee_rate);
		Ok(ServiceSplit {
			total,
			service_fee,
			vendor_net: total - service_fee,
		})
	}

	/// Splits a service booking priced as `hourly_rate * hours_worked`.
	pub fn split_service_hours(
		&self,
		hourly_rate: Decimal,
		hours_worked: Decimal,
	) -> Result<ServiceSplit, RevenueError> {
		if hours_worked.is_sign_negative() {
			return Err(RevenueError::NegativeHours(hours_worked));
		}
		self.split_service(hourly_rate * hours_worked)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(n: i64) -> Decimal {
		Decimal::from(n)
	}

	#[test]
	fn standard_supply_split() {
		// 2 units at 500 each, the scenario every dashboard shows.
		let split = SplitRates::default().split_supply_units(dec(500), 2).unwrap();
		assert_eq!(split.total, dec(1000));
		assert_eq!(split.platform_fee, dec(200));
		assert_eq!(split.supplier_net, dec(800));
		assert_eq!(split.delivery_fee, dec(100));
		assert_eq!(split.driver_net, dec(80));
		assert_eq!(split.admin_delivery_cut, dec(20));
		assert_eq!(split.admin_total(), dec(220));
	}

	#[test]
	fn supply_split_invariants_hold_across_totals() {
		let rates = SplitRates::default();
		for total in [0i64, 1, 9, 333, 1000, 12_345, 999_999] {
			let split = rates.split_supply(dec(total)).unwrap();
			assert_eq!(split.supplier_net + split.platform_fee, split.total);
			assert_eq!(
				split.driver_net + split.admin_delivery_cut,
				split.delivery_fee
			);
		}
	}

	#[test]
	fn splits_sum_exactly_even_on_awkward_totals() {
		let rates = SplitRates::default();
		// 3-way odd cents
		let split = rates.split_supply(Decimal::new(10001, 2)).unwrap(); // 100.01
		assert_eq!(split.supplier_net + split.platform_fee, split.total);
		assert_eq!(
			split.driver_net + split.admin_delivery_cut,
			split.delivery_fee
		);
	}

	#[test]
	fn standard_service_split() {
		let split = SplitRates::default().split_service(dec(500)).unwrap();
		assert_eq!(split.service_fee, dec(100));
		assert_eq!(split.vendor_net, dec(400));
	}

	#[test]
	fn service_split_from_hours() {
		// 3.5 hours at 200/hour
		let split = SplitRates::default()
			.split_service_hours(dec(200), Decimal::new(35, 1))
			.unwrap();
		assert_eq!(split.total, dec(700));
		assert_eq!(split.service_fee, dec(140));
		assert_eq!(split.vendor_net, dec(560));
	}

	#[test]
	fn zero_total_is_a_zero_split() {
		let split = SplitRates::default().split_supply(Decimal::ZERO).unwrap();
		assert_eq!(split.platform_fee, Decimal::ZERO);
		assert_eq!(split.supplier_net, Decimal::ZERO);
		assert_eq!(split.driver_net, Decimal::ZERO);
	}

	#[test]
	fn negative_inputs_are_rejected() {
		let rates = SplitRates::default();
		assert_eq!(
			rates.split_supply(dec(-1)),
			Err(RevenueError::NegativeTotal(dec(-1)))
		);
		assert_eq!(
			rates.split_service_hours(dec(100), dec(-2)),
			Err(RevenueError::NegativeHours(dec(-2)))
		);
	}

	#[test]
	fn custom_rates_flow_through() {
		// 25% fee, 8% pool, 75% driver share
		let rates = SplitRates::new(
			Decimal::new(25, 2),
			Decimal::new(8, 2),
			Decimal::new(75, 2),
		);
		let split = rates.split_supply(dec(400)).unwrap();
		assert_eq!(split.platform_fee, dec(100));
		assert_eq!(split.supplier_net, dec(300));
		assert_eq!(split.delivery_fee, dec(32));
		assert_eq!(split.driver_net, dec(24));
		assert_eq!(split.admin_delivery_cut, dec(8));
	}
}
