use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use super::client::{ApiError, SupabaseClient};
use super::dto::{FarmRow, NewFarmDto, NewProfileDto, ProfileRow, ProfileUpsertDto};
use crate::contract::model::{AssetKind, Farm, NewFarm, NewProfile, Profile, ProfileFields};
use crate::domain::ports::{FarmRepository, ProfileRepository};

const PROFILES: &str = "profiles";
const FARMS: &str = "farms";

fn table(client: &SupabaseClient, name: &str) -> Result<Url, ApiError> {
    client.endpoint(["rest", "v1", name])
}

/// PostgREST equality filter, e.g. `user_id=eq.<uuid>`.
fn eq(url: &mut Url, column: &str, value: impl std::fmt::Display) {
    url.query_pairs_mut()
        .append_pair(column, &format!("eq.{}", value));
}

/// Rows returned by a write with `return=representation`; exactly one is
/// expected.
fn single<R, T>(rows: Vec<R>, what: &str) -> anyhow::Result<T>
where
    R: Into<T>,
{
    rows.into_iter()
        .next()
        .map(Into::into)
        .with_context(|| format!("{} returned no row", what))
}

/// `profiles` table adapter.
pub struct SupabaseProfiles {
    client: Arc<SupabaseClient>,
}

impl SupabaseProfiles {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepository for SupabaseProfiles {
    #[instrument(name = "farm_dashboard.supabase.profiles.find_by_user", skip_all, fields(user_id = %user_id))]
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let mut url = table(&self.client, PROFILES)?;
        eq(&mut url, "user_id", user_id);
        url.query_pairs_mut().append_pair("select", "*");

        let rows: Vec<ProfileRow> = self
            .client
            .send_json(self.client.request(Method::GET, url))
            .await
            .with_context(|| format!("GET profiles for {}", user_id))?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    #[instrument(name = "farm_dashboard.supabase.profiles.insert", skip_all, fields(user_id = %profile.user_id))]
    async fn insert(&self, profile: NewProfile) -> anyhow::Result<Profile> {
        let url = table(&self.client, PROFILES)?;
        let rows: Vec<ProfileRow> = self
            .client
            .send_json(
                self.client
                    .request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(&NewProfileDto::from(profile)),
            )
            .await
            .context("POST profiles")?;
        single(rows, "profile insert")
    }

    #[instrument(name = "farm_dashboard.supabase.profiles.upsert", skip_all, fields(user_id = %user_id))]
    async fn upsert(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Profile> {
        let mut url = table(&self.client, PROFILES)?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");

        let rows: Vec<ProfileRow> = self
            .client
            .send_json(
                self.client
                    .request(Method::POST, url)
                    .header("Prefer", "resolution=merge-duplicates,return=representation")
                    .json(&ProfileUpsertDto::new(user_id, fields, updated_at)),
            )
            .await
            .context("upsert profiles")?;
        single(rows, "profile upsert")
    }

    #[instrument(
        name = "farm_dashboard.supabase.profiles.set_asset_url",
        skip_all,
        fields(user_id = %user_id, column = kind.profile_column())
    )]
    async fn set_asset_url(&self, user_id: Uuid, kind: AssetKind, url: &str) -> anyhow::Result<()> {
        let mut endpoint = table(&self.client, PROFILES)?;
        eq(&mut endpoint, "user_id", user_id);

        let mut body = serde_json::Map::new();
        body.insert(kind.profile_column().to_string(), url.into());

        self.client
            .send(
                self.client
                    .request(Method::PATCH, endpoint)
                    .header("Prefer", "return=minimal")
                    .json(&body),
            )
            .await
            .with_context(|| format!("PATCH profiles.{}", kind.profile_column()))?;
        Ok(())
    }
}

/// `farms` table adapter.
pub struct SupabaseFarms {
    client: Arc<SupabaseClient>,
}

impl SupabaseFarms {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FarmRepository for SupabaseFarms {
    #[instrument(name = "farm_dashboard.supabase.farms.list_by_owner", skip_all, fields(user_id = %user_id))]
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Farm>> {
        let mut url = table(&self.client, FARMS)?;
        eq(&mut url, "user_id", user_id);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let rows: Vec<FarmRow> = self
            .client
            .send_json(self.client.request(Method::GET, url))
            .await
            .context("GET farms")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(name = "farm_dashboard.supabase.farms.insert", skip_all, fields(user_id = %user_id))]
    async fn insert(&self, user_id: Uuid, farm: NewFarm) -> anyhow::Result<Farm> {
        let url = table(&self.client, FARMS)?;
        let rows: Vec<FarmRow> = self
            .client
            .send_json(
                self.client
                    .request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(&NewFarmDto::new(user_id, farm)),
            )
            .await
            .context("POST farms")?;
        single(rows, "farm insert")
    }

    #[instrument(name = "farm_dashboard.supabase.farms.delete", skip_all, fields(farm_id = %id))]
    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        let mut url = table(&self.client, FARMS)?;
        eq(&mut url, "id", id);

        self.client
            .send(self.client.request(Method::DELETE, url))
            .await
            .with_context(|| format!("DELETE farm {}", id))?;
        Ok(())
    }
}
