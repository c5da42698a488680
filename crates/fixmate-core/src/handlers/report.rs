//! Admin revenue aggregation.
//!
//! Scans the terminal orders of both lifecycles and totals the platform's
//! take: fees from delivered supply orders, fees from completed service
//! bookings, and the platform's share of delivery pools. The report also
//! carries the ten most recent contributing orders as an activity feed.
//!
//! The scan is an in-process pass over full collections, which is fine at
//! the platform's current scale; at larger volume this would move into a
//! running ledger updated at each completion event.

use fixmate_revenue::SplitRates;
use fixmate_storage::StorageService;
use fixmate_types::{
	ActivityKind, RevenueActivity, RevenueReport, ServiceOrder, ServiceOrderStatus,
	StoreNamespace, SupplyOrder, SupplyOrderStatus,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Size of the recent-activity feed.
const ACTIVITY_FEED_LEN: usize = 10;

/// Errors that can occur while building the revenue report.
#[derive(Debug, Error)]
pub enum ReportError {
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Handler producing the admin revenue report.
pub struct RevenueReportHandler {
	storage: Arc<StorageService>,
	rates: SplitRates,
}

impl RevenueReportHandler {
	pub fn new(storage: Arc<StorageService>, rates: SplitRates) -> Self {
		Self { storage, rates }
	}

	/// Builds the revenue report from all terminal orders.
	///
	/// Persisted financial fields are used when present; orders completed
	/// before those fields existed fall back to recomputation at current
	/// rates.
	pub async fn revenue_report(&self) -> Result<RevenueReport, ReportError> {
		let supply_orders: Vec<SupplyOrder> = self
			.storage
			.retrieve_all(StoreNamespace::SupplyOrders.as_str())
			.await
			.map_err(|e| ReportError::Storage(e.to_string()))?;
		let service_orders: Vec<ServiceOrder> = self
			.storage
			.retrieve_all(StoreNamespace::ServiceOrders.as_str())
			.await
			.map_err(|e| ReportError::Storage(e.to_string()))?;

		let mut supplier_revenue = Decimal::ZERO;
		let mut vendor_revenue = Decimal::ZERO;
		let mut delivery_revenue = Decimal::ZERO;
		let mut activity = Vec::new();

		for order in supply_orders
			.iter()
			.filter(|o| o.status == SupplyOrderStatus::Delivered)
		{
			let total = order
				.total_amount
				.unwrap_or_else(|| order.unit_price * Decimal::from(order.amount));
			let Ok(split) = self.rates.split_supply(total) else {
				// A negative total can only come from hand-edited storage;
				// skip it rather than poisoning the whole report.
				tracing::warn!("Skipping supply order {} with invalid total", order.id);
				continue;
			};
			let fee = order.service_fee.unwrap_or(split.platform_fee);

			supplier_revenue += fee;
			delivery_revenue += split.admin_delivery_cut;
			activity.push(RevenueActivity {
				order_id: order.id.clone(),
				kind: ActivityKind::Supply,
				amount: fee + split.admin_delivery_cut,
				occurred_at: occurred_at(order.updated_at, order.created_at),
			});
		}

		for order in service_orders
			.iter()
			.filter(|o| o.status == ServiceOrderStatus::Done)
		{
			let total = order.total_amount.unwrap_or_else(|| {
				order.hourly_rate * order.hours_worked.unwrap_or(Decimal::ZERO)
			});
			let fee = match order.service_fee {
				Some(fee) => fee,
				None => match self.rates.split_service(total) {
					Ok(split) => split.service_fee,
					Err(_) => {
						tracing::warn!("Skipping service order {} with invalid total", order.id);
						continue;
					},
				},
			};

			vendor_revenue += fee;
			activity.push(RevenueActivity {
				order_id: order.id.clone(),
				kind: ActivityKind::Service,
				amount: fee,
				occurred_at: occurred_at(order.updated_at, order.created_at),
			});
		}

		activity.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
		activity.truncate(ACTIVITY_FEED_LEN);

		Ok(RevenueReport {
			supplier_revenue,
			vendor_revenue,
			delivery_revenue,
			total_revenue: supplier_revenue + vendor_revenue + delivery_revenue,
			recent_activity: activity,
		})
	}
}

fn occurred_at(updated_at: u64, created_at: u64) -> u64 {
	if updated_at > 0 {
		updated_at
	} else {
		created_at
	}
}
