//! Server errors and the mapping from orchestrator errors to responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::{Map, Value, json};
use vpcforge_rs_core::{ErrorKind, OrchestratorError, Step, TeardownStep};
use vpcforge_rs_protocol::{ApiError, ApiResponse, ErrorCode};
use vpcforge_rs_provider::ProviderError;

/// Errors raised while starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid server configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Orchestrator could not be constructed.
    #[error("setup error: {0}")]
    Setup(#[from] OrchestratorError),
    /// Listener or connection IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure response: status plus error envelope.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiFailure {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError::new(code, message),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            ErrorCode::Unauthorized,
            "Missing or invalid API key",
        )
    }

    fn with_details(mut self, details: Value) -> Self {
        self.error = self.error.with_details(details);
        self
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse::failure(self.error);
        (self.status, Json(body)).into_response()
    }
}

impl From<OrchestratorError> for ApiFailure {
    fn from(err: OrchestratorError) -> Self {
        match err.kind() {
            ErrorKind::Validation => ApiFailure::validation(err.to_string()),
            ErrorKind::NotFound => ApiFailure::not_found(err.to_string()),
            ErrorKind::Provider => provider_failure(&err),
            ErrorKind::PartialCleanup => {
                error!("partial cleanup, manual intervention required (err={err})");
                let mut details = provider_details(&err);
                let leaked = serde_json::to_value(err.leaked_resources()).unwrap_or(Value::Null);
                details.insert("leaked_resources".to_string(), leaked);
                ApiFailure::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::PartialCleanup,
                    err.to_string(),
                )
                .with_details(Value::Object(details))
            }
            ErrorKind::Store | ErrorKind::Setup => {
                error!("internal error (err={err})");
                ApiFailure::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "An internal server error occurred",
                )
                .with_details(json!({ "type": error_type(&err) }))
            }
        }
    }
}

/// Caller-correctable provider errors map to 400, the rest to 502.
fn provider_failure(err: &OrchestratorError) -> ApiFailure {
    let details = Value::Object(provider_details(err));
    let Some(provider_err) = err.provider_error() else {
        return ApiFailure::new(StatusCode::BAD_GATEWAY, ErrorCode::ProviderError, err.to_string())
            .with_details(details);
    };
    if !provider_err.is_client_error() {
        warn!("provider error (err={err})");
        return ApiFailure::new(StatusCode::BAD_GATEWAY, ErrorCode::ProviderError, err.to_string())
            .with_details(details);
    }
    let message = match provider_err {
        ProviderError::LimitExceeded(_) => {
            "VPC limit exceeded. Please delete unused VPCs or request a limit increase."
                .to_string()
        }
        ProviderError::InvalidRange { message, .. } => format!("Invalid CIDR block: {message}"),
        ProviderError::DependencyViolation(_)
            if err.step() == Some(Step::Teardown(TeardownStep::DeleteVpc)) =>
        {
            "Cannot delete VPC due to existing dependencies. \
             Please ensure all resources (instances, databases, etc.) are deleted first."
                .to_string()
        }
        other => other.to_string(),
    };
    ApiFailure::validation(message).with_details(details)
}

fn provider_details(err: &OrchestratorError) -> Map<String, Value> {
    let mut details = Map::new();
    if let Some(provider_err) = err.provider_error() {
        details.insert("provider_error".to_string(), json!(provider_err.code()));
    }
    if let Some(step) = err.step() {
        details.insert("step".to_string(), json!(step.label()));
    }
    if let OrchestratorError::Provider {
        resource: Some(resource),
        ..
    } = err
    {
        details.insert("resource".to_string(), json!(resource));
    }
    details
}

fn error_type(err: &OrchestratorError) -> &'static str {
    match err {
        OrchestratorError::Store(_) => "StoreError",
        _ => "SetupError",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vpcforge_rs_core::CreationStep;
    use vpcforge_rs_core::CleanupFailure;
    use vpcforge_rs_provider::ResourceKind;

    fn provider_err(step: Step, source: ProviderError) -> OrchestratorError {
        OrchestratorError::Provider {
            step,
            resource: Some("vpc-12345678".to_string()),
            source,
        }
    }

    #[test]
    fn client_provider_errors_are_bad_requests() {
        let failure = ApiFailure::from(provider_err(
            Step::Create(CreationStep::CreateVpc),
            ProviderError::LimitExceeded(5),
        ));
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
        assert_eq!(failure.error.code, Some(ErrorCode::ValidationError));
        assert_eq!(
            failure.error.details,
            Some(json!({
                "provider_error": "VpcLimitExceeded",
                "step": "create vpc",
                "resource": "vpc-12345678"
            }))
        );

        let failure = ApiFailure::from(provider_err(
            Step::Teardown(TeardownStep::DeleteVpc),
            ProviderError::DependencyViolation("busy".to_string()),
        ));
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
        assert!(failure.error.message.starts_with("Cannot delete VPC"));
    }

    #[test]
    fn other_provider_errors_are_bad_gateway() {
        let failure = ApiFailure::from(provider_err(
            Step::Create(CreationStep::CreatePrivateSubnet),
            ProviderError::Throttled("slow down".to_string()),
        ));
        assert_eq!(failure.status, StatusCode::BAD_GATEWAY);
        assert_eq!(failure.error.code, Some(ErrorCode::ProviderError));
        assert!(failure.error.message.contains("create private subnet"));
    }

    #[test]
    fn partial_cleanup_lists_leaked_resources() {
        let err = OrchestratorError::PartialCleanup {
            source: Box::new(provider_err(
                Step::Create(CreationStep::CreateInternetGateway),
                ProviderError::Unavailable("timeout".to_string()),
            )),
            failed: vec![CleanupFailure {
                resource_kind: ResourceKind::Subnet,
                resource_id: "subnet-1".to_string(),
                action: "delete subnet".to_string(),
                error: "request throttled".to_string(),
            }],
        };
        let failure = ApiFailure::from(err);
        assert_eq!(failure.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.error.code, Some(ErrorCode::PartialCleanup));
        let details = failure.error.details.expect("details");
        assert_eq!(details["provider_error"], json!("ServiceUnavailable"));
        assert_eq!(details["leaked_resources"][0]["resource_id"], json!("subnet-1"));
        assert_eq!(details["leaked_resources"][0]["resource_kind"], json!("subnet"));
    }
}
