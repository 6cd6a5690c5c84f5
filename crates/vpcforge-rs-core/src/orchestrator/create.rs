//! Creation plan.

use chrono::Utc;
use log::{error, info, warn};
use std::collections::BTreeMap;
use vpcforge_rs_protocol::{
    NetworkRecord, NetworkStatus, PUBLIC_ROUTE_TABLE, SubnetKind, SubnetRecord,
};
use vpcforge_rs_provider::{DEFAULT_ROUTE_DESTINATION, ProviderError, VpcAttribute};
use vpcforge_rs_store::StoreError;

use super::Orchestrator;
use super::saga::{Compensation, CompensationLog};
use super::steps::CreationStep;
use crate::error::OrchestratorError;
use crate::planning::SubnetPlan;
use crate::tags::ResourceTags;
use crate::validation::{validate_cidr_block, validate_name};

/// Why a creation step failed.
enum StepCause {
    Provider(ProviderError),
    Store(StoreError),
}

/// Failure of one creation step before rollback.
struct StepFailure {
    step: CreationStep,
    resource: Option<String>,
    cause: StepCause,
}

impl StepFailure {
    fn provider(step: CreationStep, resource: Option<&str>, err: ProviderError) -> Self {
        Self {
            step,
            resource: resource.map(str::to_string),
            cause: StepCause::Provider(err),
        }
    }

    fn into_error(self) -> OrchestratorError {
        match self.cause {
            StepCause::Provider(source) => OrchestratorError::Provider {
                step: self.step.into(),
                resource: self.resource,
                source,
            },
            StepCause::Store(err) => OrchestratorError::Store(err),
        }
    }
}

impl Orchestrator {
    /// Run the creation plan for `name` over `cidr_block`.
    ///
    /// Steps run strictly in order. The record is persisted once, after every
    /// provider call succeeded; on any failure the resources created so far are
    /// removed newest first and no record is written.
    pub async fn create_network(
        &self,
        name: &str,
        cidr_block: &str,
        request_id: Option<&str>,
    ) -> Result<NetworkRecord, OrchestratorError> {
        validate_name(name)?;
        validate_cidr_block(cidr_block)?;
        let plan = SubnetPlan::for_block(cidr_block)?;

        info!(
            "creating network (name={name}, cidr={cidr_block}, request_id={})",
            request_id.unwrap_or("-")
        );
        let mut compensations = CompensationLog::new();
        match self
            .run_creation(name, cidr_block, &plan, request_id, &mut compensations)
            .await
        {
            Ok(record) => {
                info!(
                    "network created (vpc_id={}, name={}, region={})",
                    record.vpc_id, record.name, record.region
                );
                Ok(record)
            }
            Err(failure) => Err(self.roll_back(failure, compensations).await),
        }
    }

    async fn run_creation(
        &self,
        name: &str,
        cidr_block: &str,
        plan: &SubnetPlan,
        request_id: Option<&str>,
        compensations: &mut CompensationLog,
    ) -> Result<NetworkRecord, StepFailure> {
        let provider = self.provider.as_ref();

        // 1. network
        let vpc_id = provider
            .create_vpc(cidr_block)
            .await
            .map_err(|err| StepFailure::provider(CreationStep::CreateVpc, None, err))?;
        compensations.record(Compensation::DeleteVpc(vpc_id.clone()));
        info!("vpc created (vpc_id={vpc_id}, cidr={cidr_block})");

        if self.config.enable_dns {
            for attribute in [VpcAttribute::EnableDnsSupport, VpcAttribute::EnableDnsHostnames] {
                provider
                    .modify_vpc_attribute(&vpc_id, attribute, true)
                    .await
                    .map_err(|err| {
                        StepFailure::provider(CreationStep::EnableDns, Some(&vpc_id), err)
                    })?;
            }
        }

        // 2. zone
        let zone = provider
            .available_zones()
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::SelectAvailabilityZone, Some(&vpc_id), err)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StepFailure::provider(
                    CreationStep::SelectAvailabilityZone,
                    Some(&vpc_id),
                    ProviderError::Unavailable(format!(
                        "no availability zones reported in {}",
                        provider.region()
                    )),
                )
            })?;

        // 3. public subnet
        let public_block = plan.public.to_string();
        let public_subnet_id = provider
            .create_subnet(&vpc_id, &public_block, &zone)
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::CreatePublicSubnet, Some(&vpc_id), err)
            })?;
        compensations.record(Compensation::DeleteSubnet(public_subnet_id.clone()));
        provider
            .set_map_public_ip_on_launch(&public_subnet_id, true)
            .await
            .map_err(|err| {
                StepFailure::provider(
                    CreationStep::EnablePublicIpMapping,
                    Some(&public_subnet_id),
                    err,
                )
            })?;
        info!("public subnet created (vpc_id={vpc_id}, subnet_id={public_subnet_id}, cidr={public_block}, zone={zone})");

        // 4. private subnet
        let private_block = plan.private.to_string();
        let private_subnet_id = provider
            .create_subnet(&vpc_id, &private_block, &zone)
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::CreatePrivateSubnet, Some(&vpc_id), err)
            })?;
        compensations.record(Compensation::DeleteSubnet(private_subnet_id.clone()));
        info!("private subnet created (vpc_id={vpc_id}, subnet_id={private_subnet_id}, cidr={private_block}, zone={zone})");

        // 5. gateway
        let gateway_id = provider.create_internet_gateway().await.map_err(|err| {
            StepFailure::provider(CreationStep::CreateInternetGateway, Some(&vpc_id), err)
        })?;
        compensations.record(Compensation::DeleteInternetGateway(gateway_id.clone()));
        provider
            .attach_internet_gateway(&gateway_id, &vpc_id)
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::AttachInternetGateway, Some(&gateway_id), err)
            })?;
        compensations.record(Compensation::DetachInternetGateway {
            gateway_id: gateway_id.clone(),
            vpc_id: vpc_id.clone(),
        });
        info!("internet gateway attached (vpc_id={vpc_id}, gateway_id={gateway_id})");

        // 6. public routing
        let route_table_id = provider.create_route_table(&vpc_id).await.map_err(|err| {
            StepFailure::provider(CreationStep::CreateRouteTable, Some(&vpc_id), err)
        })?;
        compensations.record(Compensation::DeleteRouteTable(route_table_id.clone()));
        provider
            .create_route(&route_table_id, DEFAULT_ROUTE_DESTINATION, &gateway_id)
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::CreateDefaultRoute, Some(&route_table_id), err)
            })?;
        let association_id = provider
            .associate_route_table(&route_table_id, &public_subnet_id)
            .await
            .map_err(|err| {
                StepFailure::provider(CreationStep::AssociateRouteTable, Some(&route_table_id), err)
            })?;
        compensations.record(Compensation::DisassociateRouteTable(association_id));
        info!("public route table configured (vpc_id={vpc_id}, route_table_id={route_table_id})");

        // 7. tags
        let created_at = Utc::now();
        let tags = ResourceTags {
            name,
            managed_by: &self.config.managed_by,
            created_at,
            request_id,
        };
        let tagged = [
            (&vpc_id, tags.for_resource(None, "vpc")),
            (
                &public_subnet_id,
                tags.for_resource(Some("public-subnet"), SubnetKind::Public.as_str()),
            ),
            (
                &private_subnet_id,
                tags.for_resource(Some("private-subnet"), SubnetKind::Private.as_str()),
            ),
            (&gateway_id, tags.for_resource(Some("igw"), "internet-gateway")),
            (&route_table_id, tags.for_resource(Some("public-rt"), "route-table")),
        ];
        for (resource_id, resource_tags) in &tagged {
            provider
                .create_tags(std::slice::from_ref(*resource_id), resource_tags)
                .await
                .map_err(|err| {
                    StepFailure::provider(CreationStep::TagResources, Some(resource_id.as_str()), err)
                })?;
        }

        // 8. persist
        let record = NetworkRecord {
            vpc_id: vpc_id.clone(),
            name: name.to_string(),
            cidr_block: cidr_block.to_string(),
            region: provider.region().to_string(),
            subnets: vec![
                SubnetRecord {
                    subnet_id: public_subnet_id,
                    cidr_block: public_block,
                    availability_zone: zone.clone(),
                    kind: SubnetKind::Public,
                },
                SubnetRecord {
                    subnet_id: private_subnet_id,
                    cidr_block: private_block,
                    availability_zone: zone,
                    kind: SubnetKind::Private,
                },
            ],
            internet_gateway_id: Some(gateway_id),
            route_tables: BTreeMap::from([(PUBLIC_ROUTE_TABLE.to_string(), route_table_id)]),
            status: NetworkStatus::Available,
            created_at,
            deleted_at: None,
            created_by: self.config.managed_by.clone(),
        };
        self.store
            .put(record.clone())
            .await
            .map_err(|err| StepFailure {
                step: CreationStep::PersistRecord,
                resource: Some(vpc_id),
                cause: StepCause::Store(err),
            })?;
        Ok(record)
    }

    /// Unwind the compensation log and build the error reported to the caller.
    async fn roll_back(
        &self,
        failure: StepFailure,
        compensations: CompensationLog,
    ) -> OrchestratorError {
        warn!(
            "network creation failed, rolling back (step={}, resource={})",
            failure.step,
            failure.resource.as_deref().unwrap_or("-")
        );
        let failed = compensations.unwind(self.provider.as_ref()).await;
        let err = failure.into_error();
        if failed.is_empty() {
            info!("rollback complete (err={err})");
            return err;
        }
        let leaked = failed
            .iter()
            .map(|f| f.resource_id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        error!("rollback incomplete, manual cleanup required (resources={leaked}, err={err})");
        OrchestratorError::PartialCleanup {
            source: Box::new(err),
            failed,
        }
    }
}
