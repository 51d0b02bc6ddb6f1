//! Role lookup for authenticated identities.

use std::sync::Arc;

use tracing::warn;

use domain::{Identity, UserProfile, UserRole};

use super::ProfileRepository;

/// Resolves the role of an identity from its profile row.
///
/// Never fails: a missing row or a failed lookup resolves to the base role.
#[derive(Clone)]
pub struct RoleResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl RoleResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Profile row for the identity, if one can be read.
    pub async fn profile(&self, identity: &Identity) -> Option<UserProfile> {
        match self.profiles.find(&identity.id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %identity.id, error = %e, "profile lookup failed");
                None
            }
        }
    }

    pub async fn resolve_role(&self, identity: &Identity) -> UserRole {
        self.profile(identity)
            .await
            .map(|profile| profile.role)
            .unwrap_or_default()
    }

    pub async fn is_super_admin(&self, identity: &Identity) -> bool {
        self.resolve_role(identity).await.is_super_admin()
    }
}
