/**
 * Health Routes
 * Liveness ping and store readiness
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::state::SharedState;
use crate::store::ProfileStore;

static SERVER_START: OnceLock<Instant> = OnceLock::new();

/// Records the start instant used for uptime. Later calls are no-ops.
pub fn init_start_time() {
    SERVER_START.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    SERVER_START.get_or_init(Instant::now).elapsed().as_secs()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
    pub uptime: u64,
}

/// Result of probing the backing store.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCheck {
    pub backend: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub store: StoreCheck,
}

/// GET /health
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
        uptime: uptime_secs(),
    })
}

async fn check_store(state: &SharedState) -> StoreCheck {
    let (backend, result): (&str, Result<Duration, String>) = match &state.pool {
        Some(pool) => (
            "postgres",
            crate::db::health_check(pool).await.map_err(|e| e.to_string()),
        ),
        None => {
            let started = Instant::now();
            let probe = state
                .store
                .is_username_available("health-probe")
                .await
                .map(|_| started.elapsed())
                .map_err(|e| e.to_string());
            ("memory", probe)
        }
    };

    match result {
        Ok(duration) => StoreCheck {
            backend: backend.to_string(),
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(error) => {
            tracing::warn!(backend, %error, "store health check failed");
            StoreCheck {
                backend: backend.to_string(),
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some(error),
            }
        }
    }
}

/// GET /health/ready
/// 503 until the store answers.
pub async fn health_ready(State(state): State<SharedState>) -> impl IntoResponse {
    let store = check_store(&state).await;
    let ready = store.status == "healthy";

    let response = ReadyResponse {
        status: if ready { "ready" } else { "not ready" }.to_string(),
        timestamp: Utc::now(),
        uptime: uptime_secs(),
        store,
    };

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
