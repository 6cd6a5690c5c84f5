//! Error types for the orchestrator.

use serde::Serialize;
use thiserror::Error;
use vpcforge_rs_provider::{ProviderError, ResourceKind};
use vpcforge_rs_store::StoreError;

use crate::orchestrator::Step;

/// A compensating or teardown action that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    /// Action that was attempted, e.g. `delete subnet`.
    pub action: String,
    pub error: String,
}

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Malformed input; no provider call was issued.
    #[error("{0}")]
    Validation(String),
    /// No stored record for the id.
    #[error("VPC not found: {0}")]
    NotFound(String),
    /// A provider call failed. During creation every resource made before
    /// the failure has been removed again.
    #[error("{step} failed: {source}")]
    Provider {
        step: Step,
        /// Resource the failing call targeted, when it had one.
        resource: Option<String>,
        #[source]
        source: ProviderError,
    },
    /// A step failed and rolling back the earlier steps failed too. The
    /// listed resources may still exist and need manual removal.
    #[error("{source}; cleanup also failed for {}", describe_failures(.failed))]
    PartialCleanup {
        #[source]
        source: Box<OrchestratorError>,
        failed: Vec<CleanupFailure>,
    },
    /// The metadata store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Collaborators could not be constructed from config.
    #[error("setup error: {0}")]
    Setup(String),
}

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Provider,
    PartialCleanup,
    Store,
    Setup,
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::Validation(_) => ErrorKind::Validation,
            OrchestratorError::NotFound(_) => ErrorKind::NotFound,
            OrchestratorError::Provider { .. } => ErrorKind::Provider,
            OrchestratorError::PartialCleanup { .. } => ErrorKind::PartialCleanup,
            OrchestratorError::Store(_) => ErrorKind::Store,
            OrchestratorError::Setup(_) => ErrorKind::Setup,
        }
    }

    /// Step that failed, if the error came from a plan step.
    pub fn step(&self) -> Option<Step> {
        match self {
            OrchestratorError::Provider { step, .. } => Some(*step),
            OrchestratorError::PartialCleanup { source, .. } => source.step(),
            _ => None,
        }
    }

    /// Provider error underlying this failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            OrchestratorError::Provider { source, .. } => Some(source),
            OrchestratorError::PartialCleanup { source, .. } => source.provider_error(),
            _ => None,
        }
    }

    /// Resources left behind by a failed rollback.
    pub fn leaked_resources(&self) -> &[CleanupFailure] {
        match self {
            OrchestratorError::PartialCleanup { failed, .. } => failed,
            _ => &[],
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        OrchestratorError::Validation(message.into())
    }
}

fn describe_failures(failed: &[CleanupFailure]) -> String {
    failed
        .iter()
        .map(|failure| format!("{} {}", failure.resource_kind, failure.resource_id))
        .collect::<Vec<_>>()
        .join(", ")
}
