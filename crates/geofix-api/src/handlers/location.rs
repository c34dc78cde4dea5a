//! Location read endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use tracing::error;

use geofix_core::TIMESTAMP_FORMAT;

use crate::models::{ErrorResponse, HistoryParams, HistoryResponse, LocationResponse};
use crate::AppState;

type BadRequest = (StatusCode, Json<ErrorResponse>);

/// `GET /api/location` - latest fix across all receivers.
///
/// Always `200`: an empty store and an unreachable store both degrade
/// to the sentinel payload. The failure itself goes to the server log,
/// not the client.
pub async fn get_location(State(state): State<AppState>) -> Json<LocationResponse> {
    match state.store.latest_fix().await {
        Ok(Some(record)) => Json(LocationResponse::from_record(&record)),
        Ok(None) => Json(LocationResponse::sentinel()),
        Err(e) => {
            error!(error = %e, "latest fix query failed, serving sentinel");
            Json(LocationResponse::sentinel())
        }
    }
}

/// `GET /api/location/history?start=..&end=..` - inclusive range,
/// ascending by datetime.
///
/// Missing or malformed bounds are the client's problem (`400`); a
/// storage failure degrades to an empty list, consistent with the
/// sentinel policy on `/api/location`.
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, BadRequest> {
    let start = parse_bound(params.start.as_deref(), "start")?;
    let end = parse_bound(params.end.as_deref(), "end")?;

    match state.store.history(start, end).await {
        Ok(records) => Ok(Json(HistoryResponse {
            locations: records.iter().map(LocationResponse::from_record).collect(),
        })),
        Err(e) => {
            error!(error = %e, "history query failed, serving empty list");
            Ok(Json(HistoryResponse { locations: vec![] }))
        }
    }
}

fn parse_bound(value: Option<&str>, name: &str) -> Result<NaiveDateTime, BadRequest> {
    let raw = value.ok_or_else(|| bad_request(format!("missing required parameter: {name}")))?;
    // Accept the wire format and its ISO-8601 "T" spelling.
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            bad_request(format!(
                "invalid {name}: expected YYYY-MM-DD HH:MM:SS, got {raw:?}"
            ))
        })
}

fn bad_request(message: String) -> BadRequest {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}
