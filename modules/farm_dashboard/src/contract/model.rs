use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// Authenticated account as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Authenticated identity context issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// True when the access token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .field("refresh_token_present", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
        }
    }
}

/// Profile row, one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub professional_title: Option<String>,
    pub company: Option<String>,
    pub area_of_expertise: Option<String>,
    pub bio: Option<String>,
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Editable copy of this profile.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            full_name: self.full_name.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            cover_image: self.cover_image.clone(),
            phone: self.phone.clone(),
            birth_date: self.birth_date,
            address: self.address.clone(),
            professional_title: self.professional_title.clone(),
            company: self.company.clone(),
            area_of_expertise: self.area_of_expertise.clone(),
            bio: self.bio.clone(),
            notification_preferences: self.notification_preferences,
        }
    }

    pub fn asset_url(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Avatar => self.avatar_url.as_deref(),
            AssetKind::Cover => self.cover_image.as_deref(),
        }
    }
}

/// Every caller-editable profile field. Used as the profile draft and as the
/// payload of a profile save.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFields {
    pub full_name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub professional_title: Option<String>,
    pub company: Option<String>,
    pub area_of_expertise: Option<String>,
    pub bio: Option<String>,
    pub notification_preferences: NotificationPreferences,
}

impl ProfileFields {
    pub fn set_asset_url(&mut self, kind: AssetKind, url: String) {
        match kind {
            AssetKind::Avatar => self.avatar_url = Some(url),
            AssetKind::Cover => self.cover_image = Some(url),
        }
    }
}

/// Data for synthesizing a profile on first access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub notification_preferences: NotificationPreferences,
}

/// Farm row owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Farm {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Hectares.
    pub area: f64,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a farm insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFarm {
    pub name: String,
    pub area: f64,
    pub location: String,
}

/// Raw new-farm form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FarmDraft {
    pub name: String,
    pub area: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Avatar,
    Cover,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Avatar => "avatar",
            AssetKind::Cover => "cover",
        }
    }

    /// Profile column patched with the public URL.
    pub fn profile_column(&self) -> &'static str {
        match self {
            AssetKind::Avatar => "avatar_url",
            AssetKind::Cover => "cover_image",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File picked by the user for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Outcome of a confirmation-guarded delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Explicit user answer to an irreversible-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardMetrics {
    pub total_area: f64,
    pub avg_productivity: f64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub weather_alerts: u32,
    pub active_projects: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rain_chance: f64,
}

/// Edit/view mode of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// Transient, dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only snapshot of everything a dashboard screen renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    pub profile_mode: FormMode,
    pub profile_draft: Option<ProfileFields>,
    pub farms: Vec<Farm>,
    pub farm_form_mode: FormMode,
    pub farm_draft: Option<FarmDraft>,
    pub loading: bool,
    pub notifications: Vec<Notification>,
}
