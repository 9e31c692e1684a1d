//! REST API handlers for the sync server
//!
//! Scheduler control (pause/resume/status), stored availability reads,
//! plus the health and metrics endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::FetchWindow;
use crate::scheduler::SchedulerStatus;
use crate::storage::{DatePrice, StoredSlot};

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response to a pause/resume action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncActionResponse {
    pub is_paused: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(export_metrics))
        // Scheduler control
        .route("/sync/pause", post(pause_sync))
        .route("/sync/resume", post(resume_sync))
        .route("/sync/status", get(sync_status))
        // Stored availability reads
        .route("/experience/{product_id}", get(get_slots))
        .route("/experience/{product_id}/dates", get(get_dates))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

async fn export_metrics() -> impl IntoResponse {
    crate::metrics::encode_metrics()
}

async fn pause_sync(State(state): State<AppState>) -> impl IntoResponse {
    let is_paused = state.scheduler.pause().await;
    Json(ApiResponse::success(SyncActionResponse { is_paused }))
}

async fn resume_sync(State(state): State<AppState>) -> impl IntoResponse {
    let is_paused = state.scheduler.resume().await;
    Json(ApiResponse::success(SyncActionResponse { is_paused }))
}

async fn sync_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::<SchedulerStatus>::success(
        state.scheduler.status().await,
    ))
}

async fn get_slots(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> impl IntoResponse {
    match state.store.slots_for_date(&product_id, query.date) {
        Ok(slots) => (StatusCode::OK, Json(ApiResponse::success(slots))).into_response(),
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to read slots");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<StoredSlot>>::error("Failed to read slots")),
            )
                .into_response()
        }
    }
}

async fn get_dates(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<DatesQuery>,
) -> impl IntoResponse {
    // default horizon: the next two months
    let today = chrono::Local::now().date_naive();
    let window = FetchWindow {
        start_date: query.start_date.unwrap_or(today),
        end_date: query
            .end_date
            .unwrap_or_else(|| today + chrono::Days::new(60)),
    };

    if window.start_date > window.end_date {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Vec<DatePrice>>::error(
                "startDate must not be after endDate",
            )),
        )
            .into_response();
    }

    match state.store.available_dates(&product_id, &window) {
        Ok(dates) => (StatusCode::OK, Json(ApiResponse::success(dates))).into_response(),
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to read dates");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<DatePrice>>::error("Failed to read dates")),
            )
                .into_response()
        }
    }
}
