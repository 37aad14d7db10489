use axum::Json;

use ember_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("ember-matching", env!("CARGO_PKG_VERSION")))
}
