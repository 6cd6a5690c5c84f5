//! Teardown plan.

use chrono::Utc;
use log::{debug, error, info, warn};
use vpcforge_rs_protocol::{DeletionResult, NetworkRecord, NetworkStatus};
use vpcforge_rs_provider::ProviderError;

use super::Orchestrator;
use super::saga::is_already_undone;
use super::steps::TeardownStep;
use crate::error::OrchestratorError;
use crate::validation::validate_vpc_id;

/// Note attached to a deletion whose network the provider no longer knew.
pub const VPC_ALREADY_GONE_NOTE: &str =
    "VPC was not found in the provider (may have been manually deleted)";

/// Result of one teardown call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Removed,
    AlreadyGone,
}

impl Orchestrator {
    /// Run the teardown plan for a stored network.
    ///
    /// The record is marked `deleting` first and removed only after every
    /// resource is confirmed gone. Resources the provider no longer knows
    /// count as removed, so the plan can be re-run after a partial failure.
    pub async fn delete_network(&self, vpc_id: &str) -> Result<DeletionResult, OrchestratorError> {
        validate_vpc_id(vpc_id)?;
        let record = self
            .store
            .get(vpc_id)
            .await?
            .filter(|record| record.status != NetworkStatus::Deleted)
            .ok_or_else(|| OrchestratorError::NotFound(vpc_id.to_string()))?;

        if !self
            .store
            .update_status(vpc_id, NetworkStatus::Deleting)
            .await?
        {
            // Purged by a concurrent delete between the read and the update.
            return Err(OrchestratorError::NotFound(vpc_id.to_string()));
        }
        info!(
            "deleting network (vpc_id={vpc_id}, name={}, previous_status={})",
            record.name, record.status
        );

        let vpc_removal = self.tear_down(&record).await.inspect_err(|err| {
            error!("network teardown failed, record left deleting (vpc_id={vpc_id}, err={err})");
        })?;

        self.store.delete(vpc_id).await?;
        let note = match vpc_removal {
            Removal::Removed => None,
            Removal::AlreadyGone => {
                warn!("vpc not found in provider (already deleted) (vpc_id={vpc_id})");
                Some(VPC_ALREADY_GONE_NOTE.to_string())
            }
        };
        info!("network deleted (vpc_id={vpc_id})");
        Ok(DeletionResult {
            vpc_id: vpc_id.to_string(),
            status: NetworkStatus::Deleted,
            deleted_at: Utc::now(),
            note,
        })
    }

    /// Remove every provider resource named by the record, in reverse
    /// creation order. Returns how the network itself was removed.
    async fn tear_down(&self, record: &NetworkRecord) -> Result<Removal, OrchestratorError> {
        let provider = self.provider.as_ref();
        let vpc_id = record.vpc_id.as_str();

        for route_table_id in record.route_tables.values() {
            let associations = match provider.route_table_associations(route_table_id).await {
                Ok(associations) => associations,
                Err(err) if err.is_not_found() => Vec::new(),
                Err(err) => return Err(failed(TeardownStep::DisassociateRouteTable, route_table_id, err)),
            };
            for association_id in associations {
                removal(
                    TeardownStep::DisassociateRouteTable,
                    &association_id,
                    provider.disassociate_route_table(&association_id).await,
                )?;
            }
            removal(
                TeardownStep::DeleteRouteTable,
                route_table_id,
                provider.delete_route_table(route_table_id).await,
            )?;
        }

        if let Some(gateway_id) = &record.internet_gateway_id {
            removal(
                TeardownStep::DetachInternetGateway,
                gateway_id,
                provider.detach_internet_gateway(gateway_id, vpc_id).await,
            )?;
            removal(
                TeardownStep::DeleteInternetGateway,
                gateway_id,
                provider.delete_internet_gateway(gateway_id).await,
            )?;
        }

        // Subnets are stored public first; remove private first.
        for subnet in record.subnets.iter().rev() {
            removal(
                TeardownStep::DeleteSubnet,
                &subnet.subnet_id,
                provider.delete_subnet(&subnet.subnet_id).await,
            )?;
        }

        removal(
            TeardownStep::DeleteVpc,
            vpc_id,
            provider.delete_vpc(vpc_id).await,
        )
    }
}

/// Classify a teardown call, treating missing resources as removed.
fn removal(
    step: TeardownStep,
    resource_id: &str,
    result: Result<(), ProviderError>,
) -> Result<Removal, OrchestratorError> {
    match result {
        Ok(()) => {
            debug!("teardown step done (step={}, resource={resource_id})", step.label());
            Ok(Removal::Removed)
        }
        Err(err) if is_already_undone(&err) => {
            debug!(
                "teardown step already done (step={}, resource={resource_id}, code={})",
                step.label(),
                err.code()
            );
            Ok(Removal::AlreadyGone)
        }
        Err(err) => Err(failed(step, resource_id, err)),
    }
}

fn failed(step: TeardownStep, resource_id: &str, source: ProviderError) -> OrchestratorError {
    OrchestratorError::Provider {
        step: step.into(),
        resource: Some(resource_id.to_string()),
        source,
    }
}
