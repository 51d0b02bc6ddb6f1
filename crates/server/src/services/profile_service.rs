//! Profile repository over the `profiles` table.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use common::{AppError, AppResult};
use domain::{UserProfile, UserRole, TABLE_PROFILES};

use crate::clients::{StoreClient, StoreQuery};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Profile repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Profile row for an identity id
    async fn find(&self, id: &str) -> AppResult<Option<UserProfile>>;

    /// Insert the profile created at signup
    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile>;

    /// Change the role of an existing profile
    async fn update_role(&self, id: &str, role: UserRole) -> AppResult<Option<UserProfile>>;
}

/// Concrete implementation of ProfileRepository.
pub struct ProfileStore {
    store: Arc<StoreClient>,
}

impl ProfileStore {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }
}

fn first_profile(rows: Vec<Value>) -> AppResult<Option<UserProfile>> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(AppError::from)
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find(&self, id: &str) -> AppResult<Option<UserProfile>> {
        let rows = self
            .store
            .select(TABLE_PROFILES, &StoreQuery::new().eq("id", id).limit(1))
            .await?;
        first_profile(rows)
    }

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let row = serde_json::to_value(&profile)?;
        let rows = self.store.insert(TABLE_PROFILES, &row).await?;
        Ok(first_profile(rows)?.unwrap_or(profile))
    }

    async fn update_role(&self, id: &str, role: UserRole) -> AppResult<Option<UserProfile>> {
        let rows = self
            .store
            .update_eq(TABLE_PROFILES, "id", id, &json!({ "role": role.as_str() }))
            .await?;
        first_profile(rows)
    }
}
