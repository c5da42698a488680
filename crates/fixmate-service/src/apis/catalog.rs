//! Catalog endpoints: products and service offerings.

use crate::apis::validation_error;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
	Extension,
};
use fixmate_core::handlers::CatalogError;
use fixmate_types::{
	ApiError, CreateProductRequest, CreateServiceOfferingRequest, Identity, Product, ProductList,
	ServiceOffering, ServiceOfferingList,
};
use validator::Validate;

/// Maps catalog errors onto API errors.
fn map_err(e: CatalogError) -> ApiError {
	match e {
		CatalogError::ProductNotFound(id) => {
			ApiError::not_found(format!("Product {} not found", id))
		},
		CatalogError::OfferingNotFound(id) => {
			ApiError::not_found(format!("Service offering {} not found", id))
		},
		CatalogError::Validation(message) => ApiError::bad_request(message, None),
		CatalogError::Forbidden(message) => ApiError::forbidden(message),
		CatalogError::Storage(message) => {
			tracing::error!("Catalog storage failure: {}", message);
			ApiError::internal("Storage failure")
		},
	}
}

/// Handles `POST /api/products`.
pub async fn create_product(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
	request.validate().map_err(validation_error)?;
	let product = state
		.engine
		.catalog()
		.create_product(&identity, request)
		.await
		.map_err(map_err)?;
	Ok(Json(product))
}

/// Handles `GET /api/products/{id}`.
pub async fn get_product(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
	let product = state
		.engine
		.catalog()
		.get_product(&id)
		.await
		.map_err(map_err)?;
	Ok(Json(product))
}

/// Handles `GET /api/products`.
pub async fn list_products(
	State(state): State<AppState>,
) -> Result<Json<ProductList>, ApiError> {
	let products = state
		.engine
		.catalog()
		.list_products()
		.await
		.map_err(map_err)?;
	Ok(Json(ProductList { products }))
}

/// Handles `GET /api/products/supplier/{supplier_id}`.
pub async fn list_products_for_supplier(
	State(state): State<AppState>,
	Path(supplier_id): Path<String>,
) -> Result<Json<ProductList>, ApiError> {
	let products = state
		.engine
		.catalog()
		.list_products_for_supplier(&supplier_id)
		.await
		.map_err(map_err)?;
	Ok(Json(ProductList { products }))
}

/// Handles `POST /api/services`.
pub async fn create_offering(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Json(request): Json<CreateServiceOfferingRequest>,
) -> Result<Json<ServiceOffering>, ApiError> {
	request.validate().map_err(validation_error)?;
	let offering = state
		.engine
		.catalog()
		.create_offering(&identity, request)
		.await
		.map_err(map_err)?;
	Ok(Json(offering))
}

/// Handles `GET /api/services/{id}`.
pub async fn get_offering(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<ServiceOffering>, ApiError> {
	let offering = state
		.engine
		.catalog()
		.get_offering(&id)
		.await
		.map_err(map_err)?;
	Ok(Json(offering))
}

/// Handles `GET /api/services`.
pub async fn list_offerings(
	State(state): State<AppState>,
) -> Result<Json<ServiceOfferingList>, ApiError> {
	let services = state
		.engine
		.catalog()
		.list_offerings()
		.await
		.map_err(map_err)?;
	Ok(Json(ServiceOfferingList { services }))
}

/// Handles `GET /api/services/vendor/{vendor_id}`.
pub async fn list_offerings_for_vendor(
	State(state): State<AppState>,
	Path(vendor_id): Path<String>,
) -> Result<Json<ServiceOfferingList>, ApiError> {
	let services = state
		.engine
		.catalog()
		.list_offerings_for_vendor(&vendor_id)
		.await
		.map_err(map_err)?;
	Ok(Json(ServiceOfferingList { services }))
}
