use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    AssetKind, AssetUpload, AuthUser, Confirmation, DeleteOutcome, Farm, FarmDraft, NewFarm,
    NewProfile, NotificationPreferences, Profile, ProfileFields,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{FarmRepository, ObjectStorage, ProfileRepository};

/// Configuration for the record synchronizer
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Full name given to a synthesized profile when the account has no
    /// usable email local part.
    pub fallback_full_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fallback_full_name: "User".to_string(),
        }
    }
}

/// Issues remote CRUD calls for profiles and farms. No call is retried; every
/// failure is returned to the caller.
#[derive(Clone)]
pub struct RecordSynchronizer {
    profiles: Arc<dyn ProfileRepository>,
    farms: Arc<dyn FarmRepository>,
    storage: Arc<dyn ObjectStorage>,
    config: SyncConfig,
}

impl RecordSynchronizer {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        farms: Arc<dyn FarmRepository>,
        storage: Arc<dyn ObjectStorage>,
        config: SyncConfig,
    ) -> Self {
        Self {
            profiles,
            farms,
            storage,
            config,
        }
    }

    /// Load the user's profile, creating a default one when none exists yet.
    ///
    /// This is a read with a write side effect: the first call for a new user
    /// inserts a row, every later call finds it.
    #[instrument(
        name = "farm_dashboard.sync.fetch_or_create_profile",
        skip(self, user),
        fields(user_id = %user.id)
    )]
    pub async fn fetch_or_create_profile(&self, user: &AuthUser) -> Result<Profile, DomainError> {
        let existing = self
            .profiles
            .find_by_user(user.id)
            .await
            .map_err(|e| DomainError::fetch(e.to_string()))?;
        if let Some(profile) = existing {
            debug!("Profile found");
            return Ok(profile);
        }

        let new_profile = self.default_profile(user);
        info!(full_name = %new_profile.full_name, "No profile yet, creating default");
        self.profiles
            .insert(new_profile)
            .await
            .map_err(|e| DomainError::persist(e.to_string()))
    }

    #[instrument(
        name = "farm_dashboard.sync.save_profile",
        skip(self, fields),
        fields(user_id = %user_id)
    )]
    pub async fn save_profile(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> Result<Profile, DomainError> {
        validate_profile_fields(&fields)?;

        let profile = self
            .profiles
            .upsert(user_id, fields, Utc::now())
            .await
            .map_err(|e| DomainError::persist(e.to_string()))?;
        info!("Profile saved");
        Ok(profile)
    }

    /// Store `asset` and point the matching profile field at its public URL.
    ///
    /// A failed patch leaves the stored object in place; the error carries its
    /// path so it can be reported or cleaned up.
    #[instrument(
        name = "farm_dashboard.sync.upload_asset",
        skip(self, asset),
        fields(user_id = %user_id, kind = %kind, file_name = %asset.file_name)
    )]
    pub async fn upload_asset(
        &self,
        user_id: Uuid,
        asset: &AssetUpload,
        kind: AssetKind,
    ) -> Result<String, DomainError> {
        if asset.bytes.is_empty() {
            return Err(DomainError::validation("file", "file is empty"));
        }

        let path = asset_path(user_id, kind, &asset.file_name);
        self.storage
            .upload(&path, asset)
            .await
            .map_err(|e| DomainError::upload(e.to_string()))?;
        debug!(%path, "Object stored");

        let url = self
            .storage
            .public_url(&path)
            .map_err(|e| DomainError::upload(e.to_string()))?;

        if let Err(e) = self.profiles.set_asset_url(user_id, kind, &url).await {
            warn!(
                %path,
                "Profile patch failed after upload; stored object is orphaned: {}", e
            );
            return Err(DomainError::asset_patch(path, e.to_string()));
        }

        info!(%url, "Asset uploaded");
        Ok(url)
    }

    #[instrument(name = "farm_dashboard.sync.list_farms", skip(self), fields(user_id = %user_id))]
    pub async fn list_farms(&self, user_id: Uuid) -> Result<Vec<Farm>, DomainError> {
        let farms = self
            .farms
            .list_by_owner(user_id)
            .await
            .map_err(|e| DomainError::fetch(e.to_string()))?;
        debug!("Listed {} farms", farms.len());
        Ok(farms)
    }

    /// Validate the raw form input and insert the farm. Invalid input never
    /// reaches the backend.
    #[instrument(
        name = "farm_dashboard.sync.create_farm",
        skip(self, draft),
        fields(user_id = %user_id, name = %draft.name)
    )]
    pub async fn create_farm(&self, user_id: Uuid, draft: &FarmDraft) -> Result<Farm, DomainError> {
        let new_farm = parse_farm_draft(draft)?;

        let farm = self
            .farms
            .insert(user_id, new_farm)
            .await
            .map_err(|e| DomainError::persist(e.to_string()))?;
        info!(farm_id = %farm.id, "Farm created");
        Ok(farm)
    }

    #[instrument(name = "farm_dashboard.sync.delete_farm", skip(self), fields(farm_id = %farm_id))]
    pub async fn delete_farm(
        &self,
        farm_id: Uuid,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, DomainError> {
        if confirmation == Confirmation::Declined {
            debug!("Deletion declined");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.farms
            .delete(farm_id)
            .await
            .map_err(|e| DomainError::persist(e.to_string()))?;
        info!("Farm deleted");
        Ok(DeleteOutcome::Deleted)
    }

    fn default_profile(&self, user: &AuthUser) -> NewProfile {
        let full_name = user
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.config.fallback_full_name.clone());

        NewProfile {
            user_id: user.id,
            full_name,
            notification_preferences: NotificationPreferences::default(),
        }
    }
}

/// Turn raw form input into a validated insert.
pub fn parse_farm_draft(draft: &FarmDraft) -> Result<NewFarm, DomainError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name", "farm name cannot be empty"));
    }

    let raw_area = draft.area.trim();
    let area: f64 = raw_area
        .parse()
        .map_err(|_| DomainError::validation("area", format!("'{}' is not a number", raw_area)))?;
    if !area.is_finite() || area < 0.0 {
        return Err(DomainError::validation(
            "area",
            format!("'{}' must be a non-negative number of hectares", raw_area),
        ));
    }

    Ok(NewFarm {
        name: name.to_string(),
        area,
        location: draft.location.trim().to_string(),
    })
}

fn validate_profile_fields(fields: &ProfileFields) -> Result<(), DomainError> {
    if fields.full_name.trim().is_empty() {
        return Err(DomainError::validation("full_name", "full name cannot be empty"));
    }
    Ok(())
}

/// Storage path for an uploaded asset, unique per upload and scoped to the
/// owner and asset kind.
pub fn asset_path(user_id: Uuid, kind: AssetKind, file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());

    format!("{}/{}-{}.{}", user_id, kind.as_str(), Uuid::new_v4(), ext)
}
