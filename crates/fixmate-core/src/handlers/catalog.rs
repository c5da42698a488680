//! Catalog handler for products and service offerings.
//!
//! The catalog is the source of truth for prices: checkout snapshots the
//! unit price or hourly rate from here, and completion revenue is derived
//! from that snapshot.

use fixmate_storage::{StorageError, StorageService};
use fixmate_types::{
	unix_now, CreateProductRequest, CreateServiceOfferingRequest, Identity, Product, Role,
	ServiceOffering, StoreNamespace,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("Product not found: {0}")]
	ProductNotFound(String),
	#[error("Service offering not found: {0}")]
	OfferingNotFound(String),
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	Forbidden(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Handler for the product and service catalog.
pub struct CatalogHandler {
	storage: Arc<StorageService>,
}

impl CatalogHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Creates a product owned by the calling supplier.
	pub async fn create_product(
		&self,
		caller: &Identity,
		request: CreateProductRequest,
	) -> Result<Product, CatalogError> {
		if !caller.has_role(Role::Supplier) {
			return Err(CatalogError::Forbidden(
				"Only suppliers can list products".into(),
			));
		}
		if request.unit_price <= Decimal::ZERO {
			return Err(CatalogError::Validation(
				"Unit price must be positive".into(),
			));
		}

		let now = unix_now();
		let product = Product {
			id: Uuid::new_v4().to_string(),
			supplier_id: caller.user_id.clone(),
			supplier_name: caller.name.clone(),
			name: request.name,
			description: request.description,
			unit_price: request.unit_price,
			created_at: now,
			updated_at: now,
		};

		self.storage
			.store(StoreNamespace::Products.as_str(), &product.id, &product)
			.await
			.map_err(|e| CatalogError::Storage(e.to_string()))?;
		Ok(product)
	}

	/// Gets one product by id.
	pub async fn get_product(&self, product_id: &str) -> Result<Product, CatalogError> {
		self.storage
			.retrieve(StoreNamespace::Products.as_str(), product_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CatalogError::ProductNotFound(product_id.to_string()),
				other => CatalogError::Storage(other.to_string()),
			})
	}

	/// Lists every product, newest first.
	pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
		let mut products: Vec<Product> = self
			.storage
			.retrieve_all(StoreNamespace::Products.as_str())
			.await
			.map_err(|e| CatalogError::Storage(e.to_string()))?;
		products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(products)
	}

	/// Lists one supplier's products, newest first.
	pub async fn list_products_for_supplier(
		&self,
		supplier_id: &str,
	) -> Result<Vec<Product>, CatalogError> {
		let mut products = self.list_products().await?;
		products.retain(|p| p.supplier_id == supplier_id);
		Ok(products)
	}

	/// Creates a service offering owned by the calling vendor.
	pub async fn create_offering(
		&self,
		caller: &Identity,
		request: CreateServiceOfferingRequest,
	) -> Result<ServiceOffering, CatalogError> {
		if !caller.has_role(Role::Vendor) {
			return Err(CatalogError::Forbidden(
				"Only vendors can list services".into(),
			));
		}
		if request.hourly_rate <= Decimal::ZERO {
			return Err(CatalogError::Validation(
				"Hourly rate must be positive".into(),
			));
		}

		let now = unix_now();
		let offering = ServiceOffering {
			id: Uuid::new_v4().to_string(),
			vendor_id: caller.user_id.clone(),
			vendor_name: caller.name.clone(),
			name: request.name,
			description: request.description,
			hourly_rate: request.hourly_rate,
			created_at: now,
			updated_at: now,
		};

		self.storage
			.store(
				StoreNamespace::ServiceOfferings.as_str(),
				&offering.id,
				&offering,
			)
			.await
			.map_err(|e| CatalogError::Storage(e.to_string()))?;
		Ok(offering)
	}

	/// Gets one offering by id.
	pub async fn get_offering(&self, offering_id: &str) -> Result<ServiceOffering, CatalogError> {
		self.storage
			.retrieve(StoreNamespace::ServiceOfferings.as_str(), offering_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CatalogError::OfferingNotFound(offering_id.to_string()),
				other => CatalogError::Storage(other.to_string()),
			})
	}

	/// Lists every offering, newest first.
	pub async fn list_offerings(&self) -> Result<Vec<ServiceOffering>, CatalogError> {
		let mut offerings: Vec<ServiceOffering> = self
			.storage
			.retrieve_all(StoreNamespace::ServiceOfferings.as_str())
			.await
			.map_err(|e| CatalogError::Storage(e.to_string()))?;
		offerings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(offerings)
	}

	/// Lists one vendor's offerings, newest first.
	pub async fn list_offerings_for_vendor(
		&self,
		vendor_id: &str,
	) -> Result<Vec<ServiceOffering>, CatalogError> {
		let mut offerings = self.list_offerings().await?;
		offerings.retain(|o| o.vendor_id == vendor_id);
		Ok(offerings)
	}
}
