//! Public SDK surface for vpcforge.
//!
//! This crate re-exports the building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use vpcforge_rs_config as config;
pub use vpcforge_rs_core as core;
/// Re-export for convenience.
pub use vpcforge_rs_protocol as protocol;
pub use vpcforge_rs_provider as provider;
pub use vpcforge_rs_server as server;
pub use vpcforge_rs_store as store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Safe to call more than once.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
