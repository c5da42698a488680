//! Event types for inter-service communication.
//!
//! This module defines the event system used by the marketplace backend for
//! asynchronous communication between components. Events flow through an
//! event bus so that notification backends can react to lifecycle changes
//! without the originating request waiting on them.

use crate::order::{ServiceOrder, ServiceOrderStatus};
use crate::supply::{DriverSnapshot, SupplyOrder, SupplyOrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main event type encompassing all marketplace events.
///
/// Events are categorized by the lifecycle that produces them, allowing
/// consumers to filter and handle specific event kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketEvent {
	/// Events from the supply-order delivery lifecycle.
	Supply(SupplyEvent),
	/// Events from the service-booking lifecycle.
	Service(ServiceEvent),
	/// Events emitted when revenue is recorded at completion.
	Revenue(RevenueEvent),
}

/// Events related to the supply-order delivery lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SupplyEvent {
	/// A customer placed a new supply order.
	Placed { order: SupplyOrder },
	/// An order moved between lifecycle statuses.
	StatusChanged {
		order_id: String,
		from: SupplyOrderStatus,
		to: SupplyOrderStatus,
	},
	/// A supplier assigned a driver.
	DeliveryAssigned {
		order_id: String,
		driver: DriverSnapshot,
	},
	/// A supplier revoked a driver assignment.
	DeliveryCancelled { order_id: String },
	/// The assigned driver accepted the delivery.
	DeliveryAccepted {
		order_id: String,
		driver_id: String,
	},
	/// The delivery completed and the order is terminal.
	Delivered { order_id: String },
	/// An order was removed.
	Deleted { order_id: String },
}

/// Events related to the service-booking lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServiceEvent {
	/// A customer booked a service.
	Booked { order: ServiceOrder },
	/// A booking moved between lifecycle statuses.
	StatusChanged {
		order_id: String,
		from: ServiceOrderStatus,
		to: ServiceOrderStatus,
	},
	/// A booking was removed.
	Deleted { order_id: String },
}

/// Events emitted when revenue splits are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RevenueEvent {
	/// A delivered supply order had its split recorded.
	SupplyRecorded {
		order_id: String,
		total: Decimal,
		supplier_net: Decimal,
		platform_fee: Decimal,
		driver_net: Decimal,
		admin_delivery_cut: Decimal,
	},
	/// A completed service booking had its split recorded.
	ServiceRecorded {
		order_id: String,
		total: Decimal,
		vendor_net: Decimal,
		service_fee: Decimal,
	},
}
