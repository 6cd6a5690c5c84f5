//! Test helpers shared across vpcforge crates.

pub mod fixtures;
pub mod provider;
pub mod store;

pub use fixtures::{TEST_REGION, local_provider, sample_record, test_zones};
pub use provider::{FaultyProvider, PausedCall, ProviderOp};
pub use store::{FailingStore, StoreOp};
