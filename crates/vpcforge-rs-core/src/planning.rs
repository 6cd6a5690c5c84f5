//! Subnet layout for a network block.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

use crate::error::OrchestratorError;

/// Every subnet is a /24 regardless of the parent block size.
pub const SUBNET_PREFIX: u8 = 24;
/// Index of the public /24 within the block.
pub const PUBLIC_SUBNET_INDEX: u32 = 1;
/// Index of the private /24 within the block.
pub const PRIVATE_SUBNET_INDEX: u32 = 2;

/// Address blocks of the two subnets created for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetPlan {
    pub network: Ipv4Network,
    pub public: Ipv4Network,
    pub private: Ipv4Network,
}

impl SubnetPlan {
    /// Plan subnets for a validated block, e.g. `10.0.0.0/16` yields
    /// `10.0.1.0/24` (public) and `10.0.2.0/24` (private).
    pub fn for_block(cidr_block: &str) -> Result<Self, OrchestratorError> {
        let parsed: Ipv4Network = cidr_block.trim().parse().map_err(|err| {
            OrchestratorError::Validation(format!("Invalid CIDR block format: {err}"))
        })?;
        let network = Ipv4Network::new(parsed.network(), parsed.prefix())
            .map_err(|err| OrchestratorError::Validation(err.to_string()))?;
        let public = nth_subnet(network, PUBLIC_SUBNET_INDEX)?;
        let private = nth_subnet(network, PRIVATE_SUBNET_INDEX)?;
        Ok(Self {
            network,
            public,
            private,
        })
    }
}

/// The `index`-th /24 inside `network`.
fn nth_subnet(network: Ipv4Network, index: u32) -> Result<Ipv4Network, OrchestratorError> {
    let too_small = || {
        OrchestratorError::Validation(format!(
            "CIDR block {network} is too small for /{SUBNET_PREFIX} subnets at index \
             {PUBLIC_SUBNET_INDEX} and {PRIVATE_SUBNET_INDEX} (use /22 or larger)"
        ))
    };
    if network.prefix() > SUBNET_PREFIX {
        return Err(too_small());
    }
    let available = 1u64 << (SUBNET_PREFIX - network.prefix());
    if u64::from(index) >= available {
        return Err(too_small());
    }
    let base = u32::from(network.network());
    let start = base + (index << (32 - u32::from(SUBNET_PREFIX)));
    Ipv4Network::new(Ipv4Addr::from(start), SUBNET_PREFIX)
        .map_err(|err| OrchestratorError::Validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plans_second_and_third_slash_24() {
        let plan = SubnetPlan::for_block("10.0.0.0/16").expect("plan");
        assert_eq!(plan.public.to_string(), "10.0.1.0/24");
        assert_eq!(plan.private.to_string(), "10.0.2.0/24");

        let plan = SubnetPlan::for_block("172.16.4.0/22").expect("plan");
        assert_eq!(plan.public.to_string(), "172.16.5.0/24");
        assert_eq!(plan.private.to_string(), "172.16.6.0/24");
    }

    #[test]
    fn normalises_host_bits() {
        let plan = SubnetPlan::for_block("10.20.30.40/16").expect("plan");
        assert_eq!(plan.network.to_string(), "10.20.0.0/16");
        assert_eq!(plan.public.to_string(), "10.20.1.0/24");
    }

    #[test]
    fn rejects_blocks_without_room() {
        for block in ["10.0.0.0/23", "10.0.0.0/24", "10.10.10.0/28"] {
            let err = SubnetPlan::for_block(block).unwrap_err();
            assert!(matches!(err, OrchestratorError::Validation(_)), "{block}");
            assert!(err.to_string().contains("too small"), "{block}");
        }
    }
}
