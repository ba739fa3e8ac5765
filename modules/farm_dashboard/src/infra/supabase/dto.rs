//! Wire shapes of the backend's JSON payloads and their mapping into contract
//! models.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{
    AuthUser, Farm, NewFarm, NewProfile, NotificationPreferences, Profile, ProfileFields, Session,
};

// --- auth ---

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserDto> for AuthUser {
    fn from(u: UserDto) -> Self {
        Self {
            id: u.id,
            email: u.email.filter(|e| !e.is_empty()),
        }
    }
}

/// Token grant response. Sign-up shares the shape but leaves the token fields
/// out while the account awaits email confirmation.
#[derive(Debug, Deserialize)]
pub struct TokenResponseDto {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds from now.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<UserDto>,
}

impl TokenResponseDto {
    /// `None` when the response carries no usable session.
    pub fn into_session(self, now: DateTime<Utc>) -> Option<Session> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let user = self.user?;
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });
        Some(Session {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at,
            user: user.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PasswordGrantDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrantDto<'a> {
    pub refresh_token: &'a str,
}

// --- profiles ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationPreferencesDto {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default = "enabled")]
    pub push: bool,
}

fn enabled() -> bool {
    true
}

impl From<NotificationPreferences> for NotificationPreferencesDto {
    fn from(p: NotificationPreferences) -> Self {
        Self {
            email: p.email,
            push: p.push,
        }
    }
}

impl From<NotificationPreferencesDto> for NotificationPreferences {
    fn from(p: NotificationPreferencesDto) -> Self {
        Self {
            email: p.email,
            push: p.push,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub area_of_expertise: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub notification_preferences: Option<NotificationPreferencesDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            full_name: r.full_name.unwrap_or_default(),
            display_name: r.display_name,
            avatar_url: r.avatar_url,
            cover_image: r.cover_image,
            phone: r.phone,
            birth_date: r.birth_date,
            address: r.address,
            professional_title: r.professional_title,
            company: r.company,
            area_of_expertise: r.area_of_expertise,
            bio: r.bio,
            notification_preferences: r
                .notification_preferences
                .map(Into::into)
                .unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewProfileDto {
    pub user_id: Uuid,
    pub full_name: String,
    pub notification_preferences: NotificationPreferencesDto,
}

impl From<NewProfile> for NewProfileDto {
    fn from(p: NewProfile) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name,
            notification_preferences: p.notification_preferences.into(),
        }
    }
}

/// Full-row upsert body. Every editable column is sent, including nulls, so
/// cleared fields are cleared remotely too.
#[derive(Debug, Serialize)]
pub struct ProfileUpsertDto {
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
    pub notification_preferences: NotificationPreferencesDto,
    pub updated_at: DateTime<Utc>,
}

impl ProfileUpsertDto {
    pub fn new(user_id: Uuid, f: ProfileFields, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            full_name: f.full_name,
            display_name: f.display_name,
            avatar_url: f.avatar_url,
            cover_image: f.cover_image,
            phone: f.phone,
            birth_date: f.birth_date,
            address: f.address,
            professional_title: f.professional_title,
            company: f.company,
            area_of_expertise: f.area_of_expertise,
            bio: f.bio,
            notification_preferences: f.notification_preferences.into(),
            updated_at,
        }
    }
}

// --- farms ---

#[derive(Debug, Deserialize)]
pub struct FarmRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub area: f64,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FarmRow> for Farm {
    fn from(r: FarmRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            area: r.area,
            location: r.location.unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewFarmDto {
    pub user_id: Uuid,
    pub name: String,
    pub area: f64,
    pub location: String,
}

impl NewFarmDto {
    pub fn new(user_id: Uuid, f: NewFarm) -> Self {
        Self {
            user_id,
            name: f.name,
            area: f.area,
            location: f.location,
        }
    }
}
