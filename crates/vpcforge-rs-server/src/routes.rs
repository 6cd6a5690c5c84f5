//! Handlers for the `/vpc` resource.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use log::{debug, info};
use serde::Deserialize;
use vpcforge_rs_protocol::{
    ApiResponse, CreateNetworkRequest, DeletionResult, NetworkList, NetworkRecord,
};

use crate::error::ApiFailure;
use crate::middleware::RequestId;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiFailure>;

/// `POST /vpc`
pub(crate) async fn create_network(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ApiResponse<NetworkRecord>>)> {
    let request = parse_create_body(&body)?;
    let record = state
        .orchestrator
        .create_from_request(request.as_ref(), Some(request_id.as_str()))
        .await?;
    info!(
        "network created (vpc_id={}, name={}, request_id={request_id})",
        record.vpc_id, record.name
    );
    let message = format!("VPC '{}' created successfully", record.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(record).with_message(message)),
    ))
}

/// Empty and `null` bodies decode to `None` so validation can report a
/// missing body; anything else must be a JSON object.
fn parse_create_body(body: &[u8]) -> ApiResult<Option<CreateNetworkRequest>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<CreateNetworkRequest>>(body).map_err(|err| {
        debug!("rejected create body (err={err})");
        ApiFailure::validation("Invalid JSON in request body")
    })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    limit: Option<String>,
}

/// `GET /vpc`
pub(crate) async fn list_networks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ApiResponse<NetworkList>>> {
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|_| ApiFailure::validation("limit must be a positive integer"))?,
        ),
    };
    let records = state.orchestrator.list_networks(limit).await?;
    Ok(Json(ApiResponse::ok(NetworkList::from(records))))
}

/// `GET /vpc/{vpc_id}`
pub(crate) async fn get_network(
    State(state): State<AppState>,
    Path(vpc_id): Path<String>,
) -> ApiResult<Json<ApiResponse<NetworkRecord>>> {
    let record = state.orchestrator.get_network(&vpc_id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// `DELETE /vpc/{vpc_id}`
pub(crate) async fn delete_network(
    State(state): State<AppState>,
    Path(vpc_id): Path<String>,
) -> ApiResult<Json<ApiResponse<DeletionResult>>> {
    let result = state.orchestrator.delete_network(&vpc_id).await?;
    info!("network deleted (vpc_id={})", result.vpc_id);
    let message = format!(
        "VPC '{}' and all associated resources deleted successfully",
        result.vpc_id
    );
    Ok(Json(ApiResponse::ok(result).with_message(message)))
}

pub(crate) async fn fallback() -> ApiFailure {
    ApiFailure::not_found("Route not found")
}
