//! Compensation log for the creation plan.
//!
//! Each forward step that creates or links a resource records the action that
//! undoes it. On failure the log is unwound newest first, which yields the
//! teardown order: association, route table, gateway detach/delete, subnets,
//! network.

use log::{debug, warn};
use vpcforge_rs_provider::{NetworkProvider, ProviderError, ResourceKind};

use crate::error::CleanupFailure;

/// Action that undoes one forward step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Compensation {
    DeleteVpc(String),
    DeleteSubnet(String),
    DeleteInternetGateway(String),
    DetachInternetGateway { gateway_id: String, vpc_id: String },
    DeleteRouteTable(String),
    DisassociateRouteTable(String),
}

impl Compensation {
    fn resource_kind(&self) -> ResourceKind {
        match self {
            Compensation::DeleteVpc(_) => ResourceKind::Vpc,
            Compensation::DeleteSubnet(_) => ResourceKind::Subnet,
            Compensation::DeleteInternetGateway(_)
            | Compensation::DetachInternetGateway { .. } => ResourceKind::InternetGateway,
            Compensation::DeleteRouteTable(_) => ResourceKind::RouteTable,
            Compensation::DisassociateRouteTable(_) => ResourceKind::RouteTableAssociation,
        }
    }

    fn resource_id(&self) -> &str {
        match self {
            Compensation::DeleteVpc(id)
            | Compensation::DeleteSubnet(id)
            | Compensation::DeleteInternetGateway(id)
            | Compensation::DeleteRouteTable(id)
            | Compensation::DisassociateRouteTable(id) => id,
            Compensation::DetachInternetGateway { gateway_id, .. } => gateway_id,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            Compensation::DeleteVpc(_) => "delete vpc",
            Compensation::DeleteSubnet(_) => "delete subnet",
            Compensation::DeleteInternetGateway(_) => "delete internet gateway",
            Compensation::DetachInternetGateway { .. } => "detach internet gateway",
            Compensation::DeleteRouteTable(_) => "delete route table",
            Compensation::DisassociateRouteTable(_) => "disassociate route table",
        }
    }

    async fn run(&self, provider: &dyn NetworkProvider) -> Result<(), ProviderError> {
        match self {
            Compensation::DeleteVpc(id) => provider.delete_vpc(id).await,
            Compensation::DeleteSubnet(id) => provider.delete_subnet(id).await,
            Compensation::DeleteInternetGateway(id) => provider.delete_internet_gateway(id).await,
            Compensation::DetachInternetGateway { gateway_id, vpc_id } => {
                provider.detach_internet_gateway(gateway_id, vpc_id).await
            }
            Compensation::DeleteRouteTable(id) => provider.delete_route_table(id).await,
            Compensation::DisassociateRouteTable(id) => {
                provider.disassociate_route_table(id).await
            }
        }
    }
}

/// Ordered record of completed forward steps.
#[derive(Debug, Default)]
pub(crate) struct CompensationLog {
    entries: Vec<Compensation>,
}

impl CompensationLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, compensation: Compensation) {
        self.entries.push(compensation);
    }

    /// Run every compensation newest first. A resource the provider no longer
    /// knows counts as removed. Failures are collected and do not stop the
    /// remaining compensations.
    pub(crate) async fn unwind(self, provider: &dyn NetworkProvider) -> Vec<CleanupFailure> {
        let mut failed = Vec::new();
        for compensation in self.entries.into_iter().rev() {
            match compensation.run(provider).await {
                Ok(()) => debug!(
                    "rollback step done (action={}, resource={})",
                    compensation.action(),
                    compensation.resource_id()
                ),
                Err(err) if is_already_undone(&err) => debug!(
                    "rollback step already done (action={}, resource={}, code={})",
                    compensation.action(),
                    compensation.resource_id(),
                    err.code()
                ),
                Err(err) => {
                    warn!(
                        "rollback step failed (action={}, resource={}, err={err})",
                        compensation.action(),
                        compensation.resource_id()
                    );
                    failed.push(CleanupFailure {
                        resource_kind: compensation.resource_kind(),
                        resource_id: compensation.resource_id().to_string(),
                        action: compensation.action().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        failed
    }
}

/// Not-found and not-attached mean the compensation has nothing left to undo.
pub(crate) fn is_already_undone(err: &ProviderError) -> bool {
    err.is_not_found() || matches!(err, ProviderError::NotAttached(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vpcforge_rs_provider::LocalNetworkProvider;

    #[tokio::test]
    async fn unwinds_newest_first() {
        let provider = LocalNetworkProvider::new("us-east-2", vec!["us-east-2a".to_string()]);
        let vpc = provider.create_vpc("10.0.0.0/16").await.expect("vpc");
        let subnet = provider
            .create_subnet(&vpc, "10.0.1.0/24", "us-east-2a")
            .await
            .expect("subnet");
        let igw = provider.create_internet_gateway().await.expect("igw");
        provider
            .attach_internet_gateway(&igw, &vpc)
            .await
            .expect("attach");

        let mut log = CompensationLog::new();
        log.record(Compensation::DeleteVpc(vpc.clone()));
        log.record(Compensation::DeleteSubnet(subnet));
        log.record(Compensation::DeleteInternetGateway(igw.clone()));
        log.record(Compensation::DetachInternetGateway {
            gateway_id: igw,
            vpc_id: vpc,
        });

        let failed = log.unwind(&provider).await;
        assert_eq!(failed, Vec::new());
        assert!(provider.resource_counts().is_empty());
    }

    #[tokio::test]
    async fn missing_resources_are_not_failures() {
        let provider = LocalNetworkProvider::new("us-east-2", vec!["us-east-2a".to_string()]);
        let mut log = CompensationLog::new();
        log.record(Compensation::DeleteVpc("vpc-12345678".to_string()));
        log.record(Compensation::DisassociateRouteTable("rtbassoc-1".to_string()));
        assert!(log.unwind(&provider).await.is_empty());
    }

    #[tokio::test]
    async fn reports_every_failed_compensation() {
        let provider = LocalNetworkProvider::new("us-east-2", vec!["us-east-2a".to_string()]);
        let vpc = provider.create_vpc("10.0.0.0/16").await.expect("vpc");
        provider
            .create_subnet(&vpc, "10.0.1.0/24", "us-east-2a")
            .await
            .expect("subnet");

        // The subnet was never recorded, so the network cannot be deleted.
        let mut log = CompensationLog::new();
        log.record(Compensation::DeleteVpc(vpc.clone()));
        let failed = log.unwind(&provider).await;
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].resource_id, vpc);
        assert_eq!(failed[0].resource_kind, ResourceKind::Vpc);
        assert_eq!(failed[0].action, "delete vpc");
    }
}
