use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::StoreError;
use crate::AppState;

/// Liveness probe. Static payload; never touches the database.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "message": "🧠 Mood Vault API is running.",
        "docs": "Coming soon...",
        "status": "ok",
    }))
}

/// Readiness probe: one round trip to the database.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let probe = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .map_err(StoreError::from);

    match probe {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "database": "ok" },
            })),
        ),
        Err(err) => {
            let reason = if err.is_connectivity() {
                "unreachable"
            } else {
                "query_failed"
            };
            tracing::warn!(error = %err, reason, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "checks": { "database": "failed" },
                    "reason": reason,
                })),
            )
        }
    }
}
