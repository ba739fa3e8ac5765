use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{AssetKind, Farm, NewFarm, NewProfile, Profile, ProfileFields};

/// Port for the `profiles` table. Rows are keyed by internal id with a unique
/// foreign key to the owning user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Equality lookup on `user_id`. Zero rows is `Ok(None)`, not an error.
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Insert and return the created row.
    async fn insert(&self, profile: NewProfile) -> anyhow::Result<Profile>;
    /// Insert-or-update keyed by `user_id`; returns the stored row.
    async fn upsert(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Profile>;
    /// Patch the column backing `kind` for the user's profile.
    async fn set_asset_url(&self, user_id: Uuid, kind: AssetKind, url: &str)
        -> anyhow::Result<()>;
}

/// Port for the `farms` table.
#[async_trait]
pub trait FarmRepository: Send + Sync {
    /// Farms owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Farm>>;
    /// Insert and return the created row with generated id and timestamps.
    async fn insert(&self, user_id: Uuid, farm: NewFarm) -> anyhow::Result<Farm>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}
