use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;

use super::client::SupabaseClient;
use crate::contract::model::AssetUpload;
use crate::domain::ports::ObjectStorage;

/// Object storage adapter bound to one bucket.
pub struct SupabaseStorage {
    client: Arc<SupabaseClient>,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(client: Arc<SupabaseClient>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn object_segments<'a>(&'a self, prefix: &'a [&'a str], path: &'a str) -> Vec<&'a str> {
        prefix
            .iter()
            .copied()
            .chain(std::iter::once(self.bucket.as_str()))
            .chain(path.split('/').filter(|s| !s.is_empty()))
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    #[instrument(
        name = "farm_dashboard.supabase.storage.upload",
        skip_all,
        fields(bucket = %self.bucket, path = %path, len = asset.bytes.len())
    )]
    async fn upload(&self, path: &str, asset: &AssetUpload) -> anyhow::Result<()> {
        let url = self
            .client
            .endpoint(self.object_segments(&["storage", "v1", "object"], path))?;
        let content_type = asset
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        self.client
            .send(
                self.client
                    .request(Method::POST, url)
                    .header("content-type", content_type)
                    .header("x-upsert", "false")
                    .body(asset.bytes.clone()),
            )
            .await
            .with_context(|| format!("upload {}/{}", self.bucket, path))?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> anyhow::Result<String> {
        let url = self
            .client
            .endpoint(self.object_segments(&["storage", "v1", "object", "public"], path))?;
        Ok(url.to_string())
    }
}
