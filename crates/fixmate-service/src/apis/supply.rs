//! Supply order endpoints.
//!
//! Covers checkout, the lifecycle-specific delivery transitions, the
//! generic status patch, detail edits, deletion, and the list queries.

use crate::apis::validation_error;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
	Extension,
};
use fixmate_core::handlers::SupplyOrderError;
use fixmate_types::{
	ApiError, AssignDeliveryRequest, CreateSupplyOrderRequest, DeleteResponse, Identity,
	SupplyOrder, SupplyOrderList, SupplyStatusPatchRequest, UpdateSupplyOrderRequest,
};
use validator::Validate;

/// Maps lifecycle errors onto API errors.
fn map_err(e: SupplyOrderError) -> ApiError {
	match e {
		SupplyOrderError::NotFound(id) => {
			ApiError::not_found(format!("Supply order {} not found", id))
		},
		SupplyOrderError::ProductNotFound(id) => {
			ApiError::not_found(format!("Product {} not found", id))
		},
		SupplyOrderError::Validation(message) => ApiError::bad_request(message, None),
		SupplyOrderError::Forbidden(message) => ApiError::forbidden(message),
		SupplyOrderError::IllegalTransition { from, to } => ApiError::illegal_transition(
			format!("Cannot move supply order from {} to {}", from, to),
		),
		SupplyOrderError::NotEditable(status) => ApiError::Conflict {
			error_type: "NOT_EDITABLE".to_string(),
			message: format!("Order can no longer be edited in status {}", status),
		},
		SupplyOrderError::Storage(message) => {
			tracing::error!("Supply order storage failure: {}", message);
			ApiError::internal("Storage failure")
		},
	}
}

/// Only participants of an order (or an admin) may read it.
fn ensure_participant(identity: &Identity, order: &SupplyOrder) -> Result<(), ApiError> {
	let is_driver = order
		.assigned_delivery_driver
		.as_ref()
		.is_some_and(|d| d.id == identity.user_id);
	if identity.is_admin()
		|| identity.user_id == order.customer_id
		|| identity.user_id == order.supplier_id
		|| is_driver
	{
		Ok(())
	} else {
		Err(ApiError::forbidden("Not a participant of this order"))
	}
}

/// Handles `POST /api/supply-orders`.
pub async fn create(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Json(request): Json<CreateSupplyOrderRequest>,
) -> Result<Json<SupplyOrder>, ApiError> {
	request.validate().map_err(validation_error)?;
	let order = state
		.engine
		.supply_orders()
		.create(&identity, request)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `GET /api/supply-orders/{id}`.
pub async fn get_by_id(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state.engine.supply_orders().get(&id).await.map_err(map_err)?;
	ensure_participant(&identity, &order)?;
	Ok(Json(order))
}

/// Handles `GET /api/supply-orders` (admin only).
pub async fn list_all(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
) -> Result<Json<SupplyOrderList>, ApiError> {
	if !identity.is_admin() {
		return Err(ApiError::forbidden("Admin role required"));
	}
	let orders = state
		.engine
		.supply_orders()
		.list_all()
		.await
		.map_err(map_err)?;
	Ok(Json(SupplyOrderList { orders }))
}

/// Handles `GET /api/supply-orders/user/{user_id}`.
pub async fn list_for_user(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(user_id): Path<String>,
) -> Result<Json<SupplyOrderList>, ApiError> {
	if !identity.is_admin() && identity.user_id != user_id {
		return Err(ApiError::forbidden("Cannot read another user's orders"));
	}
	let orders = state
		.engine
		.supply_orders()
		.list_for_user(&user_id)
		.await
		.map_err(map_err)?;
	Ok(Json(SupplyOrderList { orders }))
}

/// Handles `GET /api/supply-orders/supplier/{supplier_id}`.
pub async fn list_for_supplier(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(supplier_id): Path<String>,
) -> Result<Json<SupplyOrderList>, ApiError> {
	if !identity.is_admin() && identity.user_id != supplier_id {
		return Err(ApiError::forbidden("Cannot read another supplier's orders"));
	}
	let orders = state
		.engine
		.supply_orders()
		.list_for_supplier(&supplier_id)
		.await
		.map_err(map_err)?;
	Ok(Json(SupplyOrderList { orders }))
}

/// Handles `PATCH /api/supply-orders/{id}/status`.
pub async fn patch_status(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	Json(request): Json<SupplyStatusPatchRequest>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state
		.engine
		.supply_orders()
		.patch_status(&identity, &id, request.status)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PATCH /api/supply-orders/{id}/assign-delivery`.
pub async fn assign_delivery(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	Json(request): Json<AssignDeliveryRequest>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state
		.engine
		.supply_orders()
		.assign_delivery(&identity, &id, request.driver)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PATCH /api/supply-orders/{id}/cancel-delivery`.
pub async fn cancel_delivery(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state
		.engine
		.supply_orders()
		.cancel_delivery(&identity, &id)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PATCH /api/supply-orders/{id}/accept-delivery`.
pub async fn accept_delivery(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state
		.engine
		.supply_orders()
		.accept_delivery(&identity, &id)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PATCH /api/supply-orders/{id}/complete-delivery`.
pub async fn complete_delivery(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<SupplyOrder>, ApiError> {
	let order = state
		.engine
		.supply_orders()
		.complete_delivery(&identity, &id)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `PUT /api/supply-orders/{id}`.
pub async fn update_details(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	Json(request): Json<UpdateSupplyOrderRequest>,
) -> Result<Json<SupplyOrder>, ApiError> {
	request.validate().map_err(validation_error)?;
	let order = state
		.engine
		.supply_orders()
		.update_details(&identity, &id, request)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

/// Handles `DELETE /api/supply-orders/{id}`.
pub async fn remove(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
	state
		.engine
		.supply_orders()
		.delete(&identity, &id)
		.await
		.map_err(map_err)?;
	Ok(Json(DeleteResponse {
		success: true,
		message: format!("Supply order {} deleted", id),
	}))
}
