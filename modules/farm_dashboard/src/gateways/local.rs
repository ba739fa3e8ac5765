use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::FarmDashboardApi,
    error::DashboardError,
    model::{
        AssetKind, AssetUpload, DashboardMetrics, DashboardView, DeleteOutcome, Farm, FarmDraft,
        Profile, ProfileFields, Session, WeatherSnapshot,
    },
};
use crate::domain::dashboard::Dashboard;

/// Local implementation of the FarmDashboardApi trait that delegates to the dashboard context
pub struct FarmDashboardLocalClient {
    dashboard: Arc<Dashboard>,
}

impl FarmDashboardLocalClient {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }
}

#[async_trait]
impl FarmDashboardApi for FarmDashboardLocalClient {
    async fn start(&self) -> Result<Option<Session>, DashboardError> {
        self.dashboard.start().await.map_err(Into::into)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DashboardError> {
        self.dashboard
            .sign_in(email, password)
            .await
            .map_err(Into::into)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<Session>, DashboardError> {
        self.dashboard
            .sign_up(email, password, confirm_password)
            .await
            .map_err(Into::into)
    }

    async fn sign_out(&self) -> Result<(), DashboardError> {
        self.dashboard.sign_out().await.map_err(Into::into)
    }

    async fn delete_account(&self) -> Result<DeleteOutcome, DashboardError> {
        self.dashboard.delete_account().await.map_err(Into::into)
    }

    async fn refresh_profile(&self) -> Result<Profile, DashboardError> {
        self.dashboard.refresh_profile().await.map_err(Into::into)
    }

    fn begin_profile_edit(&self) -> bool {
        self.dashboard.begin_profile_edit()
    }

    fn edit_profile(&self, f: Box<dyn FnOnce(&mut ProfileFields) + Send>) -> bool {
        self.dashboard.edit_profile(f)
    }

    fn cancel_profile_edit(&self) -> bool {
        self.dashboard.cancel_profile_edit()
    }

    async fn save_profile(&self) -> Result<Profile, DashboardError> {
        self.dashboard.save_profile().await.map_err(Into::into)
    }

    async fn upload_asset(
        &self,
        kind: AssetKind,
        asset: AssetUpload,
    ) -> Result<String, DashboardError> {
        self.dashboard
            .upload_asset(kind, &asset)
            .await
            .map_err(Into::into)
    }

    async fn refresh_farms(&self) -> Result<Vec<Farm>, DashboardError> {
        self.dashboard.refresh_farms().await.map_err(Into::into)
    }

    fn open_farm_form(&self) -> bool {
        self.dashboard.open_farm_form()
    }

    fn edit_farm_form(&self, f: Box<dyn FnOnce(&mut FarmDraft) + Send>) -> bool {
        self.dashboard.edit_farm_form(f)
    }

    fn cancel_farm_form(&self) -> bool {
        self.dashboard.cancel_farm_form()
    }

    async fn submit_farm(&self) -> Result<Farm, DashboardError> {
        self.dashboard.submit_farm().await.map_err(Into::into)
    }

    async fn delete_farm(&self, farm_id: Uuid) -> Result<DeleteOutcome, DashboardError> {
        self.dashboard
            .delete_farm(farm_id)
            .await
            .map_err(Into::into)
    }

    fn metrics(&self) -> DashboardMetrics {
        self.dashboard.metrics()
    }

    fn farm_productivity(&self, farm_id: Uuid) -> Option<f64> {
        self.dashboard.farm_productivity(farm_id)
    }

    fn weather(&self) -> WeatherSnapshot {
        self.dashboard.weather()
    }

    fn dismiss_notification(&self, id: u64) -> bool {
        self.dashboard.notifications().dismiss(id)
    }

    fn view(&self) -> DashboardView {
        self.dashboard.snapshot()
    }
}
