//! Lifecycle handlers backing the HTTP API.
//!
//! Each handler owns one slice of the marketplace: the supply-order delivery
//! lifecycle, the service-booking lifecycle, the catalog, and the admin
//! revenue report. The API layer authenticates callers and delegates here;
//! handlers enforce ownership, drive the state machines, and publish
//! lifecycle events.

pub mod catalog;
pub mod report;
pub mod service;
pub mod supply;

pub use catalog::{CatalogError, CatalogHandler};
pub use report::{ReportError, RevenueReportHandler};
pub use service::{ServiceOrderError, ServiceOrderHandler};
pub use supply::{SupplyOrderError, SupplyOrderHandler};
