//! HTTP request bodies and the response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NetworkRecord;

/// Machine-readable error class carried in failure envelopes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Unauthorized,
    ProviderError,
    PartialCleanup,
    InternalError,
}

/// Error payload of a failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// `{success, data}` envelope wrapping every response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Body of `POST /vpc`. Both fields are optional on the wire so that missing
/// values surface as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateNetworkRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cidr_block: Option<String>,
}

/// Body of `GET /vpc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkList {
    pub vpcs: Vec<NetworkRecord>,
    pub count: usize,
}

impl From<Vec<NetworkRecord>> for NetworkList {
    fn from(vpcs: Vec<NetworkRecord>) -> Self {
        let count = vpcs.len();
        Self { vpcs, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn failure_envelope_shape() {
        let body: ApiResponse<()> = ApiResponse::failure(
            ApiError::new(ErrorCode::NotFound, "VPC not found: vpc-12345678"),
        );
        let value = serde_json::to_value(body).expect("serialize");
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "message": "VPC not found: vpc-12345678", "code": "NOT_FOUND" }
            })
        );
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let request: CreateNetworkRequest = serde_json::from_str("{}").expect("decode");
        assert_eq!(request, CreateNetworkRequest::default());
    }
}
