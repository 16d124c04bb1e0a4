use crate::logging::TraceId;
use crate::state::AppState;
use crate::sync::jobs::JobView;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use nrega_storage::ReportRow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Error body returned by every failing endpoint.
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub trace_id: String,
}

pub fn error_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiError {
            error: msg.to_string(),
            trace_id: trace_id.to_string(),
        }),
    )
        .into_response()
}

/// A cached district report, serialized with the field names the report
/// viewer has always consumed: snake_case identity fields, camelCase
/// metrics. Inherited naming, kept as-is.
#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub state_name: String,
    pub district_name: String,
    pub fin_year: String,
    #[serde(rename = "familiesGivenWork")]
    pub families_given_work: i64,
    #[serde(rename = "totalWorkDays")]
    pub total_work_days: i64,
    #[serde(rename = "totalWagesPaid")]
    pub total_wages_paid: f64,
    #[serde(rename = "paymentsOnTimePercent")]
    pub payments_on_time_percent: f64,
    #[serde(rename = "rawApiRecord")]
    #[schema(value_type = Object)]
    pub raw_api_record: serde_json::Value,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_at: DateTime<Utc>,
}

impl From<ReportRow> for ReportResponse {
    fn from(row: ReportRow) -> Self {
        Self {
            state_name: row.state_name,
            district_name: row.district_name,
            fin_year: row.fin_year,
            families_given_work: row.families_given_work,
            total_work_days: row.total_work_days,
            total_wages_paid: row.total_wages_paid,
            payments_on_time_percent: row.payments_on_time_percent,
            raw_api_record: row.raw_api_record,
            last_updated_at: row.last_updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncTriggerRequest {
    /// Defaults to the configured state when absent.
    #[serde(default, rename = "stateName")]
    pub state_name: Option<String>,
    /// Defaults to the configured fiscal year when absent.
    #[serde(default, rename = "finYear")]
    pub fin_year: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SyncTriggerResponse {
    pub job_id: String,
    pub state_name: String,
    pub fin_year: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    version: String,
    uptime_secs: i64,
}

/// Service liveness and version.
#[utoipa::path(
    get,
    path = "/api/data/health",
    tag = "Health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
    })
}

/// All districts with cached data for a state, sorted.
#[utoipa::path(
    get,
    path = "/api/data/districts/{state}",
    tag = "Reports",
    params(("state" = String, Path, description = "State name, e.g. UTTAR PRADESH")),
    responses(
        (status = 200, description = "Sorted district names", body = Vec<String>),
        (status = 500, description = "Store error", body = ApiError)
    )
)]
async fn list_districts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> Response {
    match state.store.distinct_districts(&state_name).await {
        Ok(districts) => (StatusCode::OK, Json(districts)).into_response(),
        Err(e) => {
            tracing::error!(trace_id = %trace_id, state = %state_name, error = %e, "District listing failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "failed to list districts",
            )
        }
    }
}

/// Latest cached report for a district, pinned to the configured fiscal year.
#[utoipa::path(
    get,
    path = "/api/data/report/{state}/{district}",
    tag = "Reports",
    params(
        ("state" = String, Path, description = "State name"),
        ("district" = String, Path, description = "District name")
    ),
    responses(
        (status = 200, description = "Cached report", body = ReportResponse),
        (status = 404, description = "No cached data for this district", body = ApiError),
        (status = 500, description = "Store error", body = ApiError)
    )
)]
async fn get_report(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((state_name, district_name)): Path<(String, String)>,
) -> Response {
    let fin_year = &state.config.sync.report_fin_year;
    match state
        .store
        .find_report(&state_name, &district_name, fin_year)
        .await
    {
        Ok(Some(row)) => (StatusCode::OK, Json(ReportResponse::from(row))).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "No data found for this district in our cache.",
        ),
        Err(e) => {
            tracing::error!(
                trace_id = %trace_id,
                state = %state_name,
                district = %district_name,
                error = %e,
                "Report lookup failed"
            );
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "failed to load report",
            )
        }
    }
}

/// Trigger a sync. Returns 202 with a job id immediately; the sync runs
/// detached and can be polled via the job endpoint.
#[utoipa::path(
    post,
    path = "/api/data/sync",
    tag = "Sync",
    request_body(content = SyncTriggerRequest, description = "Optional state/year override"),
    responses(
        (status = 202, description = "Sync accepted", body = SyncTriggerResponse)
    )
)]
async fn trigger_sync(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    body: Option<Json<SyncTriggerRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let state_name = request
        .state_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.sync.default_state.clone());
    let fin_year = request
        .fin_year
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.sync.default_fin_year.clone());

    let job_id = state.jobs.start(
        Arc::clone(&state.source),
        Arc::clone(&state.store),
        state_name.clone(),
        fin_year.clone(),
        state.config.sync.max_concurrent,
    );

    tracing::info!(
        trace_id = %trace_id,
        job_id = %job_id,
        state = %state_name,
        fin_year = %fin_year,
        "Sync triggered"
    );

    (
        StatusCode::ACCEPTED,
        Json(SyncTriggerResponse {
            message: format!("Sync triggered for {state_name}, {fin_year}."),
            job_id,
            state_name,
            fin_year,
        }),
    )
        .into_response()
}

/// Status of a previously triggered sync job.
#[utoipa::path(
    get,
    path = "/api/data/sync/{job_id}",
    tag = "Sync",
    params(("job_id" = String, Path, description = "Job id returned by the trigger")),
    responses(
        (status = 200, description = "Job status", body = JobView),
        (status = 404, description = "Unknown job id", body = ApiError)
    )
)]
async fn sync_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    match state.jobs.get(&job_id) {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, &trace_id, "unknown sync job"),
    }
}

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(list_districts))
        .routes(routes!(get_report))
        .routes(routes!(trigger_sync))
        .routes(routes!(sync_status))
}
