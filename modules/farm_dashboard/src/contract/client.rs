use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::DashboardError,
    model::{
        AssetKind, AssetUpload, DashboardMetrics, DashboardView, DeleteOutcome, Farm, FarmDraft,
        Profile, ProfileFields, Session, WeatherSnapshot,
    },
};

/// Public API of the farm dashboard that front ends drive.
///
/// Every failing call has already been reported as an error notification by
/// the time it returns; callers only need the result for control flow.
#[async_trait]
pub trait FarmDashboardApi: Send + Sync {
    /// Resolve the session the backend holds at startup and load its records.
    async fn start(&self) -> Result<Option<Session>, DashboardError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DashboardError>;

    /// `Ok(None)` means the account was created but must be confirmed by
    /// email before a session is issued.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<Session>, DashboardError>;

    async fn sign_out(&self) -> Result<(), DashboardError>;

    /// Asks for confirmation, then ends the session.
    async fn delete_account(&self) -> Result<DeleteOutcome, DashboardError>;

    async fn refresh_profile(&self) -> Result<Profile, DashboardError>;

    fn begin_profile_edit(&self) -> bool;

    /// Apply `f` to the profile draft. Returns `false` outside edit mode.
    fn edit_profile(&self, f: Box<dyn FnOnce(&mut ProfileFields) + Send>) -> bool;

    fn cancel_profile_edit(&self) -> bool;

    async fn save_profile(&self) -> Result<Profile, DashboardError>;

    /// Store an image and point the matching profile field at its public URL.
    async fn upload_asset(
        &self,
        kind: AssetKind,
        asset: AssetUpload,
    ) -> Result<String, DashboardError>;

    async fn refresh_farms(&self) -> Result<Vec<Farm>, DashboardError>;

    fn open_farm_form(&self) -> bool;

    fn edit_farm_form(&self, f: Box<dyn FnOnce(&mut FarmDraft) + Send>) -> bool;

    fn cancel_farm_form(&self) -> bool;

    async fn submit_farm(&self) -> Result<Farm, DashboardError>;

    /// Asks for confirmation, then deletes the farm.
    async fn delete_farm(&self, farm_id: Uuid) -> Result<DeleteOutcome, DashboardError>;

    fn metrics(&self) -> DashboardMetrics;

    fn farm_productivity(&self, farm_id: Uuid) -> Option<f64>;

    fn weather(&self) -> WeatherSnapshot;

    fn dismiss_notification(&self, id: u64) -> bool;

    fn view(&self) -> DashboardView;
}
