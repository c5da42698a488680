//! Admin endpoints.

use crate::server::AppState;
use axum::{extract::State, response::Json, Extension};
use fixmate_core::handlers::ReportError;
use fixmate_types::{ApiError, Identity, RevenueReport};

/// Handles `GET /api/admin/revenue` (admin only).
pub async fn revenue(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
) -> Result<Json<RevenueReport>, ApiError> {
	if !identity.is_admin() {
		return Err(ApiError::forbidden("Admin role required"));
	}

	let report = state
		.engine
		.reports()
		.revenue_report()
		.await
		.map_err(|e| match e {
			ReportError::Storage(message) => {
				tracing::error!("Revenue report storage failure: {}", message);
				ApiError::internal("Storage failure")
			},
		})?;
	Ok(Json(report))
}
