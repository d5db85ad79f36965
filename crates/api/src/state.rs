use std::sync::Arc;

use infra::Store;

use crate::auth::{AuthConfig, JwtService};
use crate::chat::ChatHub;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    jwt_service: JwtService,
    pub chat: ChatHub,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let auth_config = AuthConfig::from_env()?;
        Ok(Self::with_config(store, &auth_config))
    }

    /// Used by tests to avoid reading process-wide environment state.
    pub fn with_config(store: Arc<dyn Store>, auth_config: &AuthConfig) -> Self {
        Self {
            store,
            jwt_service: JwtService::new(auth_config),
            chat: ChatHub::new(),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
