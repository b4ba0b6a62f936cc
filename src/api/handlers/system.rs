use crate::api::models::{HealthResponse, HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;
use super::AppState;

/// Handler for GET /health - Liveness plus a database round trip
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let probe = state
        .db
        .execute(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
        .await;

    let status = match probe {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HealthStatus::Unhealthy
        }
    };

    Json(HealthResponse {
        status,
        version: crate::VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
