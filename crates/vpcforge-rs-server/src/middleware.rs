//! Request id and pre-shared key middleware.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{info, warn};
use uuid::Uuid;

use crate::error::ApiFailure;
use crate::state::AppState;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_CLIENT_REQUEST_ID_LEN: usize = 128;

/// Id of the current request, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuse the caller's `x-request-id` or mint a uuid, expose it to handlers,
/// echo it on the response and log the outcome.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_CLIENT_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    info!(
        "request finished (request_id={request_id}, method={method}, path={path}, status={})",
        response.status().as_u16()
    );
    response
}

/// Reject requests without the configured pre-shared key.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = req
            .headers()
            .get(&state.api_key_header)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected) {
            warn!(
                "rejected request with missing or invalid api key (method={}, path={})",
                req.method(),
                req.uri().path()
            );
            return ApiFailure::unauthorized().into_response();
        }
    }
    next.run(req).await
}
