use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use vpcforge_rs_protocol::Tag;
use vpcforge_rs_provider::{
    LocalNetworkProvider, NetworkProvider, ProviderError, VpcAttribute, VpcDescription,
};

use crate::fixtures::local_provider;

/// Provider operations, used to target injected faults and read call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    AvailableZones,
    CreateVpc,
    ModifyVpcAttribute,
    DescribeVpc,
    DeleteVpc,
    CreateSubnet,
    SetMapPublicIp,
    DeleteSubnet,
    CreateInternetGateway,
    AttachInternetGateway,
    DetachInternetGateway,
    DeleteInternetGateway,
    CreateRouteTable,
    CreateRoute,
    AssociateRouteTable,
    RouteTableAssociations,
    DisassociateRouteTable,
    DeleteRouteTable,
    CreateTags,
}

#[derive(Debug)]
struct Fault {
    op: ProviderOp,
    error: ProviderError,
    /// Matching calls to let through before failing.
    skip: usize,
    /// Failures left; `None` fails forever.
    remaining: Option<usize>,
}

/// A provider call held at entry until the test releases it.
#[derive(Debug, Clone, Default)]
pub struct PausedCall {
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

impl PausedCall {
    /// Wait until the held call has arrived.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Let the held call run.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Wraps a [`LocalNetworkProvider`], recording every call and failing the
/// ones selected with [`FaultyProvider::fail_nth`] and friends.
#[derive(Debug)]
pub struct FaultyProvider {
    inner: LocalNetworkProvider,
    faults: Mutex<Vec<Fault>>,
    pauses: Mutex<Vec<(ProviderOp, PausedCall)>>,
    calls: Mutex<Vec<ProviderOp>>,
}

impl Default for FaultyProvider {
    fn default() -> Self {
        Self::new(local_provider())
    }
}

impl FaultyProvider {
    pub fn new(inner: LocalNetworkProvider) -> Self {
        Self {
            inner,
            faults: Mutex::new(Vec::new()),
            pauses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call of `op`.
    pub fn fail_always(&self, op: ProviderOp, error: ProviderError) {
        self.push(op, error, 0, None);
    }

    /// Fail only the `nth` (1-based) call of `op` from now on.
    pub fn fail_nth(&self, op: ProviderOp, nth: usize, error: ProviderError) {
        self.push(op, error, nth.saturating_sub(1), Some(1));
    }

    /// Fail the next call of `op`.
    pub fn fail_once(&self, op: ProviderOp, error: ProviderError) {
        self.fail_nth(op, 1, error);
    }

    /// Hold the next call of `op` until the returned handle releases it.
    pub fn pause_next(&self, op: ProviderOp) -> PausedCall {
        let pause = PausedCall::default();
        self.pauses.lock().push((op, pause.clone()));
        pause
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ProviderOp> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, op: ProviderOp) -> usize {
        self.calls.lock().iter().filter(|call| **call == op).count()
    }

    pub fn inner(&self) -> &LocalNetworkProvider {
        &self.inner
    }

    fn push(&self, op: ProviderOp, error: ProviderError, skip: usize, remaining: Option<usize>) {
        self.faults.lock().push(Fault {
            op,
            error,
            skip,
            remaining,
        });
    }

    async fn enter(&self, op: ProviderOp) -> Result<(), ProviderError> {
        let pause = {
            let mut pauses = self.pauses.lock();
            pauses
                .iter()
                .position(|(paused, _)| *paused == op)
                .map(|idx| pauses.remove(idx).1)
        };
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.release.notified().await;
        }
        self.check(op)
    }

    fn check(&self, op: ProviderOp) -> Result<(), ProviderError> {
        self.calls.lock().push(op);
        let mut faults = self.faults.lock();
        for fault in faults.iter_mut().filter(|fault| fault.op == op) {
            if fault.skip > 0 {
                fault.skip -= 1;
                continue;
            }
            match &mut fault.remaining {
                None => return Err(fault.error.clone()),
                Some(left) if *left == 0 => continue,
                Some(left) => {
                    *left -= 1;
                    return Err(fault.error.clone());
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkProvider for FaultyProvider {
    fn name(&self) -> &str {
        "faulty"
    }

    fn region(&self) -> &str {
        self.inner.region()
    }

    async fn available_zones(&self) -> Result<Vec<String>, ProviderError> {
        self.enter(ProviderOp::AvailableZones).await?;
        self.inner.available_zones().await
    }

    async fn create_vpc(&self, cidr_block: &str) -> Result<String, ProviderError> {
        self.enter(ProviderOp::CreateVpc).await?;
        self.inner.create_vpc(cidr_block).await
    }

    async fn modify_vpc_attribute(
        &self,
        vpc_id: &str,
        attribute: VpcAttribute,
        enabled: bool,
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::ModifyVpcAttribute).await?;
        self.inner
            .modify_vpc_attribute(vpc_id, attribute, enabled)
            .await
    }

    async fn describe_vpc(&self, vpc_id: &str) -> Result<VpcDescription, ProviderError> {
        self.enter(ProviderOp::DescribeVpc).await?;
        self.inner.describe_vpc(vpc_id).await
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DeleteVpc).await?;
        self.inner.delete_vpc(vpc_id).await
    }

    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String, ProviderError> {
        self.enter(ProviderOp::CreateSubnet).await?;
        self.inner
            .create_subnet(vpc_id, cidr_block, availability_zone)
            .await
    }

    async fn set_map_public_ip_on_launch(
        &self,
        subnet_id: &str,
        enabled: bool,
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::SetMapPublicIp).await?;
        self.inner.set_map_public_ip_on_launch(subnet_id, enabled).await
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DeleteSubnet).await?;
        self.inner.delete_subnet(subnet_id).await
    }

    async fn create_internet_gateway(&self) -> Result<String, ProviderError> {
        self.enter(ProviderOp::CreateInternetGateway).await?;
        self.inner.create_internet_gateway().await
    }

    async fn attach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::AttachInternetGateway).await?;
        self.inner.attach_internet_gateway(gateway_id, vpc_id).await
    }

    async fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DetachInternetGateway).await?;
        self.inner.detach_internet_gateway(gateway_id, vpc_id).await
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DeleteInternetGateway).await?;
        self.inner.delete_internet_gateway(gateway_id).await
    }

    async fn create_route_table(&self, vpc_id: &str) -> Result<String, ProviderError> {
        self.enter(ProviderOp::CreateRouteTable).await?;
        self.inner.create_route_table(vpc_id).await
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination: &str,
        gateway_id: &str,
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::CreateRoute).await?;
        self.inner
            .create_route(route_table_id, destination, gateway_id)
            .await
    }

    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, ProviderError> {
        self.enter(ProviderOp::AssociateRouteTable).await?;
        self.inner
            .associate_route_table(route_table_id, subnet_id)
            .await
    }

    async fn route_table_associations(
        &self,
        route_table_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.enter(ProviderOp::RouteTableAssociations).await?;
        self.inner.route_table_associations(route_table_id).await
    }

    async fn disassociate_route_table(&self, association_id: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DisassociateRouteTable).await?;
        self.inner.disassociate_route_table(association_id).await
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOp::DeleteRouteTable).await?;
        self.inner.delete_route_table(route_table_id).await
    }

    async fn create_tags(
        &self,
        resource_ids: &[String],
        tags: &[Tag],
    ) -> Result<(), ProviderError> {
        self.enter(ProviderOp::CreateTags).await?;
        self.inner.create_tags(resource_ids, tags).await
    }
}
