//! Core orchestration for vpcforge.
//!
//! This crate owns request validation, subnet planning, and the orchestrator
//! that drives a [`NetworkProvider`](vpcforge_rs_provider::NetworkProvider)
//! through the creation and teardown plans while keeping the metadata table
//! consistent with what was actually provisioned.

pub mod error;
pub mod orchestrator;
pub mod planning;
pub mod tags;
pub mod validation;

/// Orchestrator error type and cleanup reports.
pub use error::{CleanupFailure, ErrorKind, OrchestratorError};
/// Orchestrator facade and plan steps.
pub use orchestrator::{CreationStep, Orchestrator, Step, TeardownStep, VPC_ALREADY_GONE_NOTE};
/// Subnet layout derived from a network block.
pub use planning::SubnetPlan;
