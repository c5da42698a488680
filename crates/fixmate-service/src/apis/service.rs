//! Service booking endpoints.

use crate::apis::validation_error;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
	Extension,
};
use fixmate_core::handlers::ServiceOrderError;
use fixmate_types::{
	ApiError, CreateServiceOrderRequest, DeleteResponse, Identity, ServiceOrder,
	ServiceOrderList, ServiceStatusPatchRequest, UpdateServiceOrderRequest,
};
use validator::Validate;

/// Maps lifecycle errors onto API errors.
fn map_err(e: ServiceOrderError) -> ApiError {
	match e {
		ServiceOrderError::NotFound(id) => {
			ApiError::not_found(format!("Service order {} not found", id))
		},
		ServiceOrderError::OfferingNotFound(id) => {
			ApiError::not_found(format!("Service offering {} not found", id))
		},
		ServiceOrderError::Validation(message) => ApiError::bad_request(message, None),
		ServiceOrderError::Forbidden(message) => ApiError::forbidden(message),
		ServiceOrderError::IllegalTransition { from, to } => ApiError::illegal_transition(
			format!("Cannot move service order from {} to {}", from, to),
		),
		ServiceOrderError::NotEditable(status) => ApiError::Conflict {
			error_type: "NOT_EDITABLE".to_string(),
			message: format!("Booking can no longer be edited in status {}", status),
		},
		ServiceOrderError::Storage(message) => {
			tracing::error!("Service order storage failure: {}", message);
			ApiError::internal("Storage failure")
		},
	}
}

/// Handles `POST /api/orders`.
pub async fn create(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Json(request): Json<CreateServiceOrderRequest>,
) -> Result<Json<ServiceOrder>, ApiError> {
	request.validate().map_err(validation_error)?;
	let order = state
		.engine
		.service_orders()
		.create(&identity, request)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Only participants of a booking (or an admin) may read it.
fn ensure_participant(identity: &Identity, order: &ServiceOrder) -> Result<(), ApiError> {
	if identity.is_admin()
		|| identity.user_id == order.customer_id
		|| identity.user_id == order.vendor_id
	{
		Ok(())
	} else {
		Err(ApiError::forbidden("Not a participant of this booking"))
	}
}

/// Handles `GET /api/orders/{id}`.
pub async fn get_by_id(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<ServiceOrder>, ApiError> {
	let order = state
		.engine
		.service_orders()
		.get(&id)
		.await
		.map_err(map_err)?;
	ensure_participant(&identity, &order)?;
	Ok(Json(order))
}

/// Handles `GET /api/orders` (admin only).
pub async fn list_all(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
) -> Result<Json<ServiceOrderList>, ApiError> {
	if !identity.is_admin() {
		return Err(ApiError::forbidden("Admin role required"));
	}
	let orders = state
		.engine
		.service_orders()
		.list_all()
		.await
		.map_err(map_err)?;
	Ok(Json(ServiceOrderList { orders }))
}

/// Handles `GET /api/orders/user/{user_id}`.
pub async fn list_for_user(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(user_id): Path<String>,
) -> Result<Json<ServiceOrderList>, ApiError> {
	if !identity.is_admin() && identity.user_id != user_id {
		return Err(ApiError::forbidden("Cannot read another user's bookings"));
	}
	let orders = state
		.engine
		.service_orders()
		.list_for_user(&user_id)
		.await
		.map_err(map_err)?;
	Ok(Json(ServiceOrderList { orders }))
}

/// Handles `GET /api/orders/vendor/{vendor_id}`.
pub async fn list_for_vendor(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(vendor_id): Path<String>,
) -> Result<Json<ServiceOrderList>, ApiError> {
	if !identity.is_admin() && identity.user_id != vendor_id {
		return Err(ApiError::forbidden("Cannot read another vendor's bookings"));
	}
	let orders = state
		.engine
		.service_orders()
		.list_for_vendor(&vendor_id)
		.await
		.map_err(map_err)?;
	Ok(Json(ServiceOrderList { orders }))
}

/// Handles `PATCH /api/orders/{id}/status`.
pub async fn patch_status(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	Json(request): Json<ServiceStatusPatchRequest>,
) -> Result<Json<ServiceOrder>, ApiError> {
	let order = state
		.engine
		.service_orders()
		.patch_status(&identity, &id, request)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PUT /api/orders/{id}`.
pub async fn update_details(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	Json(request): Json<UpdateServiceOrderRequest>,
) -> Result<Json<ServiceOrder>, ApiError> {
	request.validate().map_err(validation_error)?;
	let order = state
		.engine
		.service_orders()
		.update_details(&identity, &id, request)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `DELETE /api/orders/{id}`.
pub async fn remove(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
	state
		.engine
		.service_orders()
		.delete(&identity, &id)
		.await
		.map_err(map_err)?;
	Ok(Json(DeleteResponse {
		success: true,
		message: format!("Service order {} deleted", id),
	}))
}
