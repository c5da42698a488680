//! API types for the FIX-MATE HTTP API.
//!
//! This module defines the request and response types for the REST
//! endpoints, plus the structured [`ApiError`] that every handler maps
//! domain failures onto. Errors carry a stable machine-readable code so
//! clients can branch without parsing message strings.

use crate::catalog::{Product, ServiceOffering};
use crate::order::{ServiceOrder, ServiceOrderStatus};
use crate::supply::{DriverSnapshot, PaymentMethod, SupplyOrder, SupplyOrderStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Body for `POST /api/supply-orders`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplyOrderRequest {
	/// Product being purchased; the supplier and unit price come from it.
	#[validate(length(min = 1))]
	pub product_id: String,
	/// Recipient name.
	#[validate(length(min = 1))]
	pub name: String,
	/// Recipient phone.
	#[validate(length(min = 1))]
	pub phone: String,
	/// Delivery address.
	#[validate(length(min = 1))]
	pub address: String,
	/// Requested delivery date.
	pub date: NaiveDate,
	/// Quantity ordered.
	#[validate(range(min = 1))]
	pub amount: u32,
	/// How the order is paid.
	pub payment_method: PaymentMethod,
	/// Optional notes for the supplier.
	pub notes: Option<String>,
}

/// Body for `PUT /api/supply-orders/{id}`: the fields editable while pending.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplyOrderRequest {
	pub address: Option<String>,
	pub notes: Option<String>,
	#[validate(range(min = 1))]
	pub amount: Option<u32>,
	pub date: Option<NaiveDate>,
}

/// Body for `PATCH /api/supply-orders/{id}/status`.
///
/// Revenue figures are intentionally not part of this body: completion
/// amounts are computed server-side from the order's price snapshot, and
/// any extra fields a legacy caller sends are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplyStatusPatchRequest {
	pub status: SupplyOrderStatus,
}

/// Body for `PATCH /api/supply-orders/{id}/assign-delivery`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignDeliveryRequest {
	/// The driver the supplier picked.
	pub driver: DriverSnapshot,
}

/// Body for `POST /api/orders`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceOrderRequest {
	/// Service offering being booked; the vendor and rate come from it.
	#[validate(length(min = 1))]
	pub offering_id: String,
	#[validate(length(min = 1))]
	pub name: String,
	#[validate(length(min = 1))]
	pub phone: String,
	#[validate(length(min = 1))]
	pub address: String,
	/// Requested service date.
	pub date: NaiveDate,
	pub payment_method: PaymentMethod,
	pub notes: Option<String>,
}

/// Body for `PATCH /api/orders/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatusPatchRequest {
	pub status: ServiceOrderStatus,
	/// Hours the vendor worked; required when the target status is `done`.
	pub hours_worked: Option<Decimal>,
}

/// Body for `PUT /api/orders/{id}`: the fields editable while pending.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceOrderRequest {
	pub address: Option<String>,
	pub notes: Option<String>,
	pub date: Option<NaiveDate>,
}

/// Body for `POST /api/products`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
	#[validate(length(min = 1))]
	pub name: String,
	pub description: Option<String>,
	pub unit_price: Decimal,
}

/// Body for `POST /api/services`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceOfferingRequest {
	#[validate(length(min = 1))]
	pub name: String,
	pub description: Option<String>,
	pub hourly_rate: Decimal,
}

/// Response for list endpoints over supply orders.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyOrderList {
	pub orders: Vec<SupplyOrder>,
}

/// Response for list endpoints over service bookings.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOrderList {
	pub orders: Vec<ServiceOrder>,
}

/// Response for list endpoints over products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductList {
	pub products: Vec<Product>,
}

/// Response for list endpoints over service offerings.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOfferingList {
	pub services: Vec<ServiceOffering>,
}

/// Response for delete endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
	pub success: bool,
	pub message: String,
}

/// Which lifecycle a revenue activity entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
	Supply,
	Service,
}

/// One contributing order in the admin revenue feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueActivity {
	/// Order that produced the revenue.
	pub order_id: String,
	/// Supply delivery or service booking.
	pub kind: ActivityKind,
	/// The platform's cut from this order.
	pub amount: Decimal,
	/// Completion timestamp used for ordering the feed.
	pub occurred_at: u64,
}

/// Response for `GET /api/admin/revenue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
	/// Platform fees collected from delivered supply orders.
	pub supplier_revenue: Decimal,
	/// Platform fees collected from completed service bookings.
	pub vendor_revenue: Decimal,
	/// The platform's share of delivery fees.
	pub delivery_revenue: Decimal,
	/// Sum of the three components.
	pub total_revenue: Decimal,
	/// The ten most recent contributing orders, newest first.
	pub recent_activity: Vec<RevenueActivity>,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Always false; kept so existing clients keying on it still work.
	pub success: bool,
	/// Stable machine-readable error code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// Additional error context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or invalid request body (400).
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Missing or unknown credentials (401).
	Unauthorized { message: String },
	/// Authenticated but not allowed (403).
	Forbidden { message: String },
	/// The referenced document does not exist (404).
	NotFound { message: String },
	/// The requested lifecycle transition is illegal (409).
	Conflict {
		error_type: String,
		message: String,
	},
	/// Internal server error (500).
	InternalServerError { message: String },
}

impl ApiError {
	/// Builds a 400 with the generic validation code.
	pub fn bad_request(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
		ApiError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message: message.into(),
			details,
		}
	}

	/// Builds a 401.
	pub fn unauthorized(message: impl Into<String>) -> Self {
		ApiError::Unauthorized {
			message: message.into(),
		}
	}

	/// Builds a 403.
	pub fn forbidden(message: impl Into<String>) -> Self {
		ApiError::Forbidden {
			message: message.into(),
		}
	}

	/// Builds a 404.
	pub fn not_found(message: impl Into<String>) -> Self {
		ApiError::NotFound {
			message: message.into(),
		}
	}

	/// Builds a 409 for illegal lifecycle transitions.
	pub fn illegal_transition(message: impl Into<String>) -> Self {
		ApiError::Conflict {
			error_type: "ILLEGAL_TRANSITION".to_string(),
			message: message.into(),
		}
	}

	/// Builds a 500.
	pub fn internal(message: impl Into<String>) -> Self {
		ApiError::InternalServerError {
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Unauthorized { .. } => 401,
			ApiError::Forbidden { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message, details) = match self {
			ApiError::BadRequest {
				error_type,
				message,
				details,
			} => (error_type.clone(), message.clone(), details.clone()),
			ApiError::Unauthorized { message } => {
				("UNAUTHORIZED".to_string(), message.clone(), None)
			},
			ApiError::Forbidden { message } => ("FORBIDDEN".to_string(), message.clone(), None),
			ApiError::NotFound { message } => ("NOT_FOUND".to_string(), message.clone(), None),
			ApiError::Conflict {
				error_type,
				message,
			} => (error_type.clone(), message.clone(), None),
			ApiError::InternalServerError { message } => {
				("INTERNAL_ERROR".to_string(), message.clone(), None)
			},
		};
		ErrorResponse {
			success: false,
			error,
			message,
			details,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{
			http::StatusCode,
			response::{IntoResponse, Json},
		};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
