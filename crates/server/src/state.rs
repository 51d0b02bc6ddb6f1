//! Application state for dependency injection.

use std::sync::Arc;

use crate::cache::{CacheInvalidator, ViewCache};
use crate::clients::IdentityApi;
use crate::config::ServerConfig;
use crate::services::{ProfileRepository, RecordService, RoleResolver, SessionResolver};

/// Application state shared across handlers and the route guard.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub identity: Arc<dyn IdentityApi>,
    pub sessions: SessionResolver,
    pub profiles: Arc<dyn ProfileRepository>,
    pub roles: RoleResolver,
    pub records: Arc<dyn RecordService>,
    pub views: Arc<dyn ViewCache>,
    pub invalidator: Arc<dyn CacheInvalidator>,
}

impl AppState {
    /// Create new app state. Session and role resolvers are derived from the
    /// identity client and profile repository.
    pub fn new(
        config: ServerConfig,
        identity: Arc<dyn IdentityApi>,
        profiles: Arc<dyn ProfileRepository>,
        records: Arc<dyn RecordService>,
        views: Arc<dyn ViewCache>,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        let sessions = SessionResolver::new(identity.clone(), config.session.clone());
        let roles = RoleResolver::new(profiles.clone());
        Self {
            config: Arc::new(config),
            identity,
            sessions,
            profiles,
            roles,
            records,
            views,
            invalidator,
        }
    }
}
