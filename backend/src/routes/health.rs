//! Health endpoints for the process and the database
//!
//! `/health` and `/health/live` only prove the process is serving;
//! `/health/ready` also needs a PostgreSQL round trip.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseStatus>,
}

/// Outcome of the readiness query
#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn process(status: &'static str) -> Self {
        Self {
            status,
            version: VERSION,
            database: None,
        }
    }
}

pub async fn health_check() -> Json<HealthReport> {
    Json(HealthReport::process("healthy"))
}

pub async fn liveness_check() -> Json<HealthReport> {
    Json(HealthReport::process("alive"))
}

/// 200 once PostgreSQL answers, 503 with the driver error otherwise
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    // db::health_check already logs the failure.
    let database = match db::health_check(state.db()).await {
        Ok(()) => DatabaseStatus {
            reachable: true,
            error: None,
        },
        Err(e) => DatabaseStatus {
            reachable: false,
            error: Some(e.to_string()),
        },
    };

    let (code, status) = if database.reachable {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(HealthReport {
            status,
            version: VERSION,
            database: Some(database),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn test_process_checks_skip_database() {
        let Json(health) = health_check().await;
        let Json(live) = liveness_check().await;

        assert_eq!(health.status, "healthy");
        assert_eq!(live.status, "alive");
        assert_eq!(live.version, VERSION);
        assert!(live.database.is_none());
        assert_eq!(
            serde_json::to_value(&live).unwrap(),
            serde_json::json!({ "status": "alive", "version": VERSION })
        );
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://nobody@localhost:1/none")
            .unwrap();
        let state = AppState::new(pool, AppConfig::default());

        let (code, Json(body)) = readiness_check(State(state)).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not_ready");
        let database = body.database.unwrap();
        assert!(!database.reachable);
        assert!(database.error.is_some());
    }
}
