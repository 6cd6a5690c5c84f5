//! Named steps of the creation and teardown plans.

use std::fmt;

/// Steps of the creation plan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationStep {
    CreateVpc,
    EnableDns,
    SelectAvailabilityZone,
    CreatePublicSubnet,
    EnablePublicIpMapping,
    CreatePrivateSubnet,
    CreateInternetGateway,
    AttachInternetGateway,
    CreateRouteTable,
    CreateDefaultRoute,
    AssociateRouteTable,
    TagResources,
    PersistRecord,
}

impl CreationStep {
    /// Plan step number (1-8) this sub-step belongs to.
    pub fn number(self) -> u8 {
        match self {
            CreationStep::CreateVpc | CreationStep::EnableDns => 1,
            CreationStep::SelectAvailabilityZone => 2,
            CreationStep::CreatePublicSubnet | CreationStep::EnablePublicIpMapping => 3,
            CreationStep::CreatePrivateSubnet => 4,
            CreationStep::CreateInternetGateway | CreationStep::AttachInternetGateway => 5,
            CreationStep::CreateRouteTable
            | CreationStep::CreateDefaultRoute
            | CreationStep::AssociateRouteTable => 6,
            CreationStep::TagResources => 7,
            CreationStep::PersistRecord => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreationStep::CreateVpc => "create vpc",
            CreationStep::EnableDns => "enable dns",
            CreationStep::SelectAvailabilityZone => "select availability zone",
            CreationStep::CreatePublicSubnet => "create public subnet",
            CreationStep::EnablePublicIpMapping => "enable public ip mapping",
            CreationStep::CreatePrivateSubnet => "create private subnet",
            CreationStep::CreateInternetGateway => "create internet gateway",
            CreationStep::AttachInternetGateway => "attach internet gateway",
            CreationStep::CreateRouteTable => "create route table",
            CreationStep::CreateDefaultRoute => "create default route",
            CreationStep::AssociateRouteTable => "associate route table",
            CreationStep::TagResources => "tag resources",
            CreationStep::PersistRecord => "persist record",
        }
    }
}

impl fmt::Display for CreationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "creation step {} ({})", self.number(), self.label())
    }
}

/// Steps of the teardown plan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownStep {
    MarkDeleting,
    DisassociateRouteTable,
    DeleteRouteTable,
    DetachInternetGateway,
    DeleteInternetGateway,
    DeleteSubnet,
    DeleteVpc,
    RemoveRecord,
}

impl TeardownStep {
    pub fn label(self) -> &'static str {
        match self {
            TeardownStep::MarkDeleting => "mark deleting",
            TeardownStep::DisassociateRouteTable => "disassociate route table",
            TeardownStep::DeleteRouteTable => "delete route table",
            TeardownStep::DetachInternetGateway => "detach internet gateway",
            TeardownStep::DeleteInternetGateway => "delete internet gateway",
            TeardownStep::DeleteSubnet => "delete subnet",
            TeardownStep::DeleteVpc => "delete vpc",
            TeardownStep::RemoveRecord => "remove record",
        }
    }
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "teardown step ({})", self.label())
    }
}

/// Step of either plan, carried by errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Create(CreationStep),
    Teardown(TeardownStep),
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Create(step) => step.label(),
            Step::Teardown(step) => step.label(),
        }
    }
}

impl From<CreationStep> for Step {
    fn from(step: CreationStep) -> Self {
        Step::Create(step)
    }
}

impl From<TeardownStep> for Step {
    fn from(step: TeardownStep) -> Self {
        Step::Teardown(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Create(step) => step.fmt(f),
            Step::Teardown(step) => step.fmt(f),
        }
    }
}
