use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use tracing::{debug, info};

use crate::config::FarmDashboardConfig;
use crate::contract::client::FarmDashboardApi;
use crate::domain::dashboard::Dashboard;
use crate::domain::metrics::{MetricsProvider, SimulatedMetrics};
use crate::domain::notifications::NotificationCenter;
use crate::domain::ports::ConfirmPort;
use crate::domain::session::SessionManager;
use crate::domain::sync::{RecordSynchronizer, SyncConfig};
use crate::gateways::local::FarmDashboardLocalClient;
use crate::infra::supabase::{
    SupabaseAuth, SupabaseClient, SupabaseFarms, SupabaseProfiles, SupabaseStorage,
};

/// Key of this module's section in the application's module bag.
pub const MODULE_NAME: &str = "farm_dashboard";

/// Read this module's configuration out of the per-module bag. A missing
/// section yields the defaults.
pub fn module_config(
    modules: &HashMap<String, serde_json::Value>,
) -> anyhow::Result<FarmDashboardConfig> {
    match modules.get(MODULE_NAME) {
        Some(raw) => serde_json::from_value(raw.clone())
            .with_context(|| format!("invalid `modules.{}` config", MODULE_NAME)),
        None => Ok(FarmDashboardConfig::default()),
    }
}

/// Module entry point: owns the wired dashboard and hands out API clients.
#[derive(Default)]
pub struct FarmDashboard {
    dashboard: ArcSwapOption<Dashboard>,
}

impl FarmDashboard {
    /// Wire the backend adapters into a dashboard context.
    pub fn init(
        &self,
        cfg: &FarmDashboardConfig,
        confirmer: Arc<dyn ConfirmPort>,
    ) -> anyhow::Result<()> {
        info!("Initializing farm_dashboard module");
        cfg.validate().context("farm_dashboard config")?;
        debug!(
            "Loaded farm_dashboard config: backend_url={}, asset_bucket={}, timeout={}s",
            cfg.backend_url, cfg.asset_bucket, cfg.request_timeout_secs
        );

        let client = Arc::new(SupabaseClient::from_config(cfg)?);
        let dashboard = build_dashboard(
            cfg,
            Arc::new(SupabaseAuth::new(client.clone())),
            RecordSynchronizer::new(
                Arc::new(SupabaseProfiles::new(client.clone())),
                Arc::new(SupabaseFarms::new(client.clone())),
                Arc::new(SupabaseStorage::new(client, cfg.asset_bucket.clone())),
                SyncConfig {
                    fallback_full_name: cfg.fallback_full_name.clone(),
                },
            ),
            confirmer,
            Arc::new(SimulatedMetrics),
        )?;

        self.dashboard.store(Some(dashboard));
        info!("farm_dashboard ready");
        Ok(())
    }

    pub fn dashboard(&self) -> anyhow::Result<Arc<Dashboard>> {
        self.dashboard
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("farm_dashboard not initialized"))
    }

    /// In-process API client over the initialized dashboard.
    pub fn client(&self) -> anyhow::Result<Arc<dyn FarmDashboardApi>> {
        Ok(Arc::new(FarmDashboardLocalClient::new(self.dashboard()?)))
    }
}

/// Assemble a dashboard from already-built ports.
pub fn build_dashboard(
    cfg: &FarmDashboardConfig,
    auth: Arc<dyn crate::domain::ports::AuthPort>,
    sync: RecordSynchronizer,
    confirmer: Arc<dyn ConfirmPort>,
    metrics: Arc<dyn MetricsProvider>,
) -> anyhow::Result<Arc<Dashboard>> {
    let notifications = Arc::new(NotificationCenter::new(
        cfg.notification_capacity,
        cfg.notification_ttl()?,
    ));
    Ok(Arc::new(Dashboard::new(
        Arc::new(SessionManager::new(auth)),
        sync,
        notifications,
        confirmer,
        metrics,
    )))
}
