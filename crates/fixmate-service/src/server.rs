//! HTTP server for the FIX-MATE API.
//!
//! Builds the axum router for the REST surface described in the API
//! documentation and serves it with CORS enabled. All `/api` routes require
//! bearer-token authentication; role and ownership checks happen in the
//! handlers behind them.

use crate::{apis, auth};
use axum::{
	middleware,
	routing::{get, patch, post, put},
	Router,
};
use fixmate_config::ApiConfig;
use fixmate_core::MarketEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<MarketEngine>,
}

/// Builds the full application router.
pub fn build_router(engine: Arc<MarketEngine>) -> Router {
	let state = AppState { engine };

	let api = Router::new()
		// Supply orders
		.route(
			"/supply-orders",
			post(apis::supply::create).get(apis::supply::list_all),
		)
		.route(
			"/supply-orders/{id}",
			get(apis::supply::get_by_id)
				.put(apis::supply::update_details)
				.delete(apis::supply::remove),
		)
		.route(
			"/supply-orders/user/{user_id}",
			get(apis::supply::list_for_user),
		)
		.route(
			"/supply-orders/supplier/{supplier_id}",
			get(apis::supply::list_for_supplier),
		)
		.route("/supply-orders/{id}/status", patch(apis::supply::patch_status))
		.route(
			"/supply-orders/{id}/assign-delivery",
			patch(apis::supply::assign_delivery),
		)
		.route(
			"/supply-orders/{id}/cancel-delivery",
			patch(apis::supply::cancel_delivery),
		)
		.route(
			"/supply-orders/{id}/accept-delivery",
			patch(apis::supply::accept_delivery),
		)
		.route(
			"/supply-orders/{id}/complete-delivery",
			patch(apis::supply::complete_delivery),
		)
		// Service bookings
		.route(
			"/orders",
			post(apis::service::create).get(apis::service::list_all),
		)
		.route(
			"/orders/{id}",
			get(apis::service::get_by_id)
				.put(apis::service::update_details)
				.delete(apis::service::remove),
		)
		.route("/orders/user/{user_id}", get(apis::service::list_for_user))
		.route(
			"/orders/vendor/{vendor_id}",
			get(apis::service::list_for_vendor),
		)
		.route("/orders/{id}/status", patch(apis::service::patch_status))
		// Catalog
		.route(
			"/products",
			post(apis::catalog::create_product).get(apis::catalog::list_products),
		)
		.route("/products/{id}", get(apis::catalog::get_product))
		.route(
			"/products/supplier/{supplier_id}",
			get(apis::catalog::list_products_for_supplier),
		)
		.route(
			"/services",
			post(apis::catalog::create_offering).get(apis::catalog::list_offerings),
		)
		.route("/services/{id}", get(apis::catalog::get_offering))
		.route(
			"/services/vendor/{vendor_id}",
			get(apis::catalog::list_offerings_for_vendor),
		)
		// Admin
		.route("/admin/revenue", get(apis::admin::revenue))
		.layer(middleware::from_fn_with_state(
			state.clone(),
			auth::authenticate,
		));

	Router::new()
		.nest("/api", api)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<MarketEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("FIX-MATE API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{Method, Request, StatusCode};
	use fixmate_config::Config;
	use fixmate_core::{EngineBuilder, MarketFactories};
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const TEST_CONFIG: &str = r#"
[service]
id = "fixmate-server-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[auth]
primary = "static"
[auth.implementations.static]
[[auth.implementations.static.tokens]]
token = "t-admin"
user_id = "u-admin"
name = "Root"
role = "admin"
[[auth.implementations.static.tokens]]
token = "t-cust"
user_id = "u-cust"
name = "Ava"
role = "customer"
[[auth.implementations.static.tokens]]
token = "t-sup"
user_id = "u-sup"
name = "Supply Co"
role = "supplier"
[[auth.implementations.static.tokens]]
token = "t-drv"
user_id = "u-drv"
name = "Bo"
phone = "0711"
role = "driver"
[[auth.implementations.static.tokens]]
token = "t-ven"
user_id = "u-ven"
name = "Handy Habib"
role = "vendor"
"#;

	async fn test_router() -> Router {
		let config: Config = TEST_CONFIG.parse().unwrap();
		let factories = MarketFactories {
			storage_factories: fixmate_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			auth_factories: fixmate_auth::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			notifier_factories: fixmate_notify::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		};
		let engine = EngineBuilder::new(config).build(factories).await.unwrap();
		build_router(Arc::new(engine))
	}

	async fn call(
		app: &Router,
		method: Method,
		uri: &str,
		token: Option<&str>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header("authorization", format!("Bearer {}", token));
		}
		let request = match body {
			Some(value) => builder
				.header("content-type", "application/json")
				.body(Body::from(serde_json::to_vec(&value).unwrap()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		};

		let response = app.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, value)
	}

	/// Creates a product as the supplier and returns its id.
	async fn seed_product(app: &Router) -> String {
		let (status, body) = call(
			app,
			Method::POST,
			"/api/products",
			Some("t-sup"),
			Some(json!({"name": "Cement bag", "unitPrice": "500"})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		body["id"].as_str().unwrap().to_string()
	}

	fn checkout(product_id: &str) -> Value {
		json!({
			"productId": product_id,
			"name": "Ava",
			"phone": "0100",
			"address": "12 Side St",
			"date": "2025-06-01",
			"amount": 2,
			"paymentMethod": "Cash on Delivery",
		})
	}

	#[tokio::test]
	async fn requests_without_a_token_are_unauthorized() {
		let app = test_router().await;
		let (status, body) = call(&app, Method::GET, "/api/products", None, None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert_eq!(body["success"], json!(false));
		assert_eq!(body["error"], json!("UNAUTHORIZED"));
	}

	#[tokio::test]
	async fn checkout_rejects_zero_amount() {
		let app = test_router().await;
		let product_id = seed_product(&app).await;

		let mut body = checkout(&product_id);
		body["amount"] = json!(0);
		let (status, response) =
			call(&app, Method::POST, "/api/supply-orders", Some("t-cust"), Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(response["error"], json!("VALIDATION_ERROR"));
	}

	#[tokio::test]
	async fn full_delivery_lifecycle_over_http() {
		let app = test_router().await;
		let product_id = seed_product(&app).await;

		// Customer places the order: Pending, COD payment pending.
		let (status, order) = call(
			&app,
			Method::POST,
			"/api/supply-orders",
			Some("t-cust"),
			Some(checkout(&product_id)),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(order["status"], json!("Pending"));
		assert_eq!(order["paymentStatus"], json!("pending"));
		let id = order["id"].as_str().unwrap().to_string();

		// Supplier assigns a driver.
		let (status, order) = call(
			&app,
			Method::PATCH,
			&format!("/api/supply-orders/{}/assign-delivery", id),
			Some("t-sup"),
			Some(json!({"driver": {"id": "u-drv", "name": "Bo", "phone": "0711"}})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(order["status"], json!("Waiting for Delivery"));

		// The assigned driver accepts and completes.
		let (status, order) = call(
			&app,
			Method::PATCH,
			&format!("/api/supply-orders/{}/accept-delivery", id),
			Some("t-drv"),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(order["status"], json!("Out for Delivery"));

		let (status, order) = call(
			&app,
			Method::PATCH,
			&format!("/api/supply-orders/{}/complete-delivery", id),
			Some("t-drv"),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(order["status"], json!("Delivered"));
		assert_eq!(order["totalAmount"], json!("1000"));
		assert_eq!(order["supplierRevenue"], json!("800"));
		assert_eq!(order["serviceFee"], json!("200"));
		assert_eq!(order["paymentStatus"], json!("paid"));
	}

	#[tokio::test]
	async fn illegal_transitions_are_conflicts() {
		let app = test_router().await;
		let product_id = seed_product(&app).await;

		let (_, order) = call(
			&app,
			Method::POST,
			"/api/supply-orders",
			Some("t-cust"),
			Some(checkout(&product_id)),
		)
		.await;
		let id = order["id"].as_str().unwrap();

		let (status, body) = call(
			&app,
			Method::PATCH,
			&format!("/api/supply-orders/{}/status", id),
			Some("t-sup"),
			Some(json!({"status": "Delivered"})),
		)
		.await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], json!("ILLEGAL_TRANSITION"));
	}

	#[tokio::test]
	async fn customers_cannot_patch_status() {
		let app = test_router().await;
		let product_id = seed_product(&app).await;

		let (_, order) = call(
			&app,
			Method::POST,
			"/api/supply-orders",
			Some("t-cust"),
			Some(checkout(&product_id)),
		)
		.await;
		let id = order["id"].as_str().unwrap();

		let (status, _) = call(
			&app,
			Method::PATCH,
			&format!("/api/supply-orders/{}/status", id),
			Some("t-cust"),
			Some(json!({"status": "Confirmed"})),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn deleting_a_missing_order_is_a_structured_404() {
		let app = test_router().await;
		let (status, body) = call(
			&app,
			Method::DELETE,
			"/api/supply-orders/so-missing",
			Some("t-admin"),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["success"], json!(false));
		assert_eq!(body["error"], json!("NOT_FOUND"));
	}

	#[tokio::test]
	async fn admin_revenue_report_matches_the_aggregation_scenario() {
		let app = test_router().await;
		let product_id = seed_product(&app).await;

		// Delivered supply order worth 1000.
		let (_, order) = call(
			&app,
			Method::POST,
			"/api/supply-orders",
			Some("t-cust"),
			Some(checkout(&product_id)),
		)
		.await;
		let supply_id = order["id"].as_str().unwrap().to_string();
		for step in ["assign-delivery", "accept-delivery", "complete-delivery"] {
			let (token, body) = if step == "assign-delivery" {
				(
					"t-sup",
					Some(json!({"driver": {"id": "u-drv", "name": "Bo", "phone": "0711"}})),
				)
			} else {
				("t-drv", None)
			};
			let (status, _) = call(
				&app,
				Method::PATCH,
				&format!("/api/supply-orders/{}/{}", supply_id, step),
				Some(token),
				body,
			)
			.await;
			assert_eq!(status, StatusCode::OK);
		}

		// Done service order worth 500 (2 hours at 250).
		let (status, offering) = call(
			&app,
			Method::POST,
			"/api/services",
			Some("t-ven"),
			Some(json!({"name": "Pipe repair", "hourlyRate": "250"})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		let offering_id = offering["id"].as_str().unwrap();

		let (status, booking) = call(
			&app,
			Method::POST,
			"/api/orders",
			Some("t-cust"),
			Some(json!({
				"offeringId": offering_id,
				"name": "Ava",
				"phone": "0100",
				"address": "12 Side St",
				"date": "2025-06-02",
				"paymentMethod": "Card Payment",
			})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		let booking_id = booking["id"].as_str().unwrap().to_string();

		for patch in [json!({"status": "ongoing"}), json!({"status": "done", "hoursWorked": "2"})] {
			let (status, _) = call(
				&app,
				Method::PATCH,
				&format!("/api/orders/{}/status", booking_id),
				Some("t-ven"),
				Some(patch),
			)
			.await;
			assert_eq!(status, StatusCode::OK);
		}

		// Non-admins are turned away.
		let (status, _) = call(&app, Method::GET, "/api/admin/revenue", Some("t-cust"), None).await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, report) =
			call(&app, Method::GET, "/api/admin/revenue", Some("t-admin"), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(report["supplierRevenue"], json!("200"));
		assert_eq!(report["vendorRevenue"], json!("100"));
		assert_eq!(report["deliveryRevenue"], json!("20"));
		assert_eq!(report["totalRevenue"], json!("320"));
		assert_eq!(report["recentActivity"].as_array().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn users_cannot_read_each_others_order_lists() {
		let app = test_router().await;
		let (status, _) = call(
			&app,
			Method::GET,
			"/api/supply-orders/user/u-somebody-else",
			Some("t-cust"),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, _) = call(
			&app,
			Method::GET,
			"/api/supply-orders/user/u-cust",
			Some("t-admin"),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
	}
}
