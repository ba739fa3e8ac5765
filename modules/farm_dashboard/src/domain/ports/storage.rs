use async_trait::async_trait;

use crate::contract::model::AssetUpload;

/// Binary object storage under a single logical bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, asset: &AssetUpload) -> anyhow::Result<()>;
    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, path: &str) -> anyhow::Result<String>;
}
