//! Shared handler state.

use axum::http::HeaderName;
use std::sync::Arc;
use vpcforge_rs_config::ServerConfig;
use vpcforge_rs_core::Orchestrator;

use crate::error::ServerError;

/// State handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Expected pre-shared key; `None` disables the check.
    pub api_key: Option<Arc<str>>,
    pub api_key_header: HeaderName,
    pub cors: bool,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: &ServerConfig) -> Result<Self, ServerError> {
        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|_| {
                ServerError::Config(format!(
                    "invalid api key header name '{}'",
                    config.api_key_header
                ))
            })?;
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            api_key: config.api_key.as_deref().map(Arc::from),
            api_key_header,
            cors: config.cors,
        })
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
