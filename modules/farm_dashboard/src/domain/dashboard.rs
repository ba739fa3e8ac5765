use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    AssetKind, AssetUpload, AuthUser, Confirmation, DashboardMetrics, DashboardView,
    DeleteOutcome, Farm, FarmDraft, NotificationLevel, Profile, ProfileFields, Session,
    WeatherSnapshot,
};
use crate::domain::error::DomainError;
use crate::domain::events::AuthChange;
use crate::domain::metrics::MetricsProvider;
use crate::domain::notifications::NotificationCenter;
use crate::domain::ports::ConfirmPort;
use crate::domain::session::SessionManager;
use crate::domain::sync::RecordSynchronizer;
use crate::domain::view_state::FormController;

/// Record state scoped to the signed-in user. Reset whenever the owner
/// changes.
struct ViewState {
    owner: Option<AuthUser>,
    profile: Option<FormController<Profile>>,
    farms: Vec<Farm>,
    farm_form: FormController<FarmDraft>,
}

impl ViewState {
    fn empty() -> Self {
        Self {
            owner: None,
            profile: None,
            farms: Vec::new(),
            farm_form: FormController::new(FarmDraft::default()),
        }
    }

    fn owned_by(&self, user_id: Uuid) -> bool {
        self.owner.as_ref().map(|u| u.id) == Some(user_id)
    }
}

/// Counts a request as in flight until dropped, so every exit path clears the
/// loading indicator.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Dashboard context: session, record synchronization and form state for the
/// current user, with every outcome reported through notifications.
///
/// Remote calls are never made while holding the state lock, so overlapping
/// operations interleave; for the same record the last response wins.
pub struct Dashboard {
    session: Arc<SessionManager>,
    sync: RecordSynchronizer,
    notifications: Arc<NotificationCenter>,
    confirmer: Arc<dyn ConfirmPort>,
    metrics: Arc<dyn MetricsProvider>,
    state: Mutex<ViewState>,
    in_flight: AtomicUsize,
}

impl Dashboard {
    pub fn new(
        session: Arc<SessionManager>,
        sync: RecordSynchronizer,
        notifications: Arc<NotificationCenter>,
        confirmer: Arc<dyn ConfirmPort>,
        metrics: Arc<dyn MetricsProvider>,
    ) -> Self {
        Self {
            session,
            sync,
            notifications,
            confirmer,
            metrics,
            state: Mutex::new(ViewState::empty()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    // --- session ---

    /// Resolve the startup session and load its records.
    #[instrument(name = "farm_dashboard.dashboard.start", skip(self))]
    pub async fn start(&self) -> Result<Option<Session>, DomainError> {
        let _loading = InFlight::start(&self.in_flight);
        let session = self
            .session
            .get_current_session()
            .await
            .map_err(|e| self.report(e, "Failed to restore session"))?;
        self.on_session(session.as_ref()).await;
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let _loading = InFlight::start(&self.in_flight);
        let session = self
            .session
            .sign_in(email, password)
            .await
            .map_err(|e| self.report(e, "Sign-in failed"))?;
        self.notifications
            .push(NotificationLevel::Success, "Signed in successfully");
        self.on_session(Some(&session)).await;
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<Session>, DomainError> {
        let _loading = InFlight::start(&self.in_flight);
        let session = self
            .session
            .sign_up(email, password, confirm_password)
            .await
            .map_err(|e| self.report(e, "Sign-up failed"))?;
        let message = if session.is_some() {
            "Account created. You are signed in."
        } else {
            "Account created. Check your email to confirm it."
        };
        self.notifications.push(NotificationLevel::Success, message);
        if let Some(s) = &session {
            self.on_session(Some(s)).await;
        }
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), DomainError> {
        let _loading = InFlight::start(&self.in_flight);
        self.session
            .sign_out()
            .await
            .map_err(|e| self.report(e, "Sign-out failed"))?;
        self.clear();
        self.notifications
            .push(NotificationLevel::Success, "Signed out successfully");
        Ok(())
    }

    /// Ends the session after an explicit confirmation. Account data is left
    /// with the backend.
    pub async fn delete_account(&self) -> Result<DeleteOutcome, DomainError> {
        let confirmed = self
            .confirmer
            .confirm("Delete your account? This action cannot be undone.");
        if !confirmed {
            return Ok(DeleteOutcome::Cancelled);
        }

        let _loading = InFlight::start(&self.in_flight);
        self.session
            .sign_out()
            .await
            .map_err(|e| self.report(e, "Failed to delete account"))?;
        self.clear();
        self.notifications
            .push(NotificationLevel::Success, "Account deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Apply a session transition pushed by the backend.
    pub async fn apply_auth_event(&self, change: AuthChange, session: Option<Session>) {
        self.session.handle_auth_event(change, session.clone());
        match (change, session) {
            (AuthChange::SignedOut, _) | (_, None) => self.clear(),
            (_, Some(s)) => self.on_session(Some(&s)).await,
        }
    }

    async fn on_session(&self, session: Option<&Session>) {
        let Some(session) = session else {
            self.clear();
            return;
        };

        {
            let mut state = self.state.lock();
            if !state.owned_by(session.user_id()) {
                *state = ViewState::empty();
            }
            state.owner = Some(session.user.clone());
        }

        // Failures are already reported; the session itself stays valid.
        let _ = self.refresh_profile().await;
        let _ = self.refresh_farms().await;
    }

    fn clear(&self) {
        debug!("Clearing local record state");
        *self.state.lock() = ViewState::empty();
    }

    fn current_user(&self) -> Result<AuthUser, DomainError> {
        self.state
            .lock()
            .owner
            .clone()
            .ok_or_else(DomainError::not_authenticated)
    }

    // --- profile ---

    #[instrument(name = "farm_dashboard.dashboard.refresh_profile", skip(self))]
    pub async fn refresh_profile(&self) -> Result<Profile, DomainError> {
        let user = self.current_user()?;
        let _loading = InFlight::start(&self.in_flight);

        let profile = self
            .sync
            .fetch_or_create_profile(&user)
            .await
            .map_err(|e| self.report(e, "Failed to load profile"))?;

        let mut state = self.state.lock();
        if !state.owned_by(user.id) {
            debug!("Discarding profile for a previous session");
            return Ok(profile);
        }
        match state.profile.as_mut() {
            Some(form) => form.replace_committed(profile.clone()),
            None => state.profile = Some(FormController::new(profile.clone())),
        }
        Ok(profile)
    }

    pub fn begin_profile_edit(&self) -> bool {
        self.state
            .lock()
            .profile
            .as_mut()
            .is_some_and(|f| f.begin_edit())
    }

    pub fn edit_profile(&self, f: impl FnOnce(&mut ProfileFields)) -> bool {
        self.state
            .lock()
            .profile
            .as_mut()
            .is_some_and(|form| form.edit(f))
    }

    pub fn cancel_profile_edit(&self) -> bool {
        self.state
            .lock()
            .profile
            .as_mut()
            .is_some_and(|f| f.cancel())
    }

    #[instrument(name = "farm_dashboard.dashboard.save_profile", skip(self))]
    pub async fn save_profile(&self) -> Result<Profile, DomainError> {
        let user = self.current_user()?;
        let draft = self
            .state
            .lock()
            .profile
            .as_mut()
            .and_then(|f| f.begin_save())
            .ok_or_else(|| DomainError::validation("profile", "profile is not being edited"))?;

        let _loading = InFlight::start(&self.in_flight);
        let result = self.sync.save_profile(user.id, draft).await;

        {
            let mut state = self.state.lock();
            if state.owned_by(user.id) {
                if let Some(form) = state.profile.as_mut() {
                    match &result {
                        Ok(saved) => form.complete_save(saved.clone()),
                        Err(_) => form.fail_save(),
                    };
                }
            }
        }

        match result {
            Ok(saved) => {
                self.notifications
                    .push(NotificationLevel::Success, "Profile updated successfully");
                Ok(saved)
            }
            Err(e) => Err(self.report(e, "Failed to update profile")),
        }
    }

    #[instrument(name = "farm_dashboard.dashboard.upload_asset", skip(self, asset), fields(kind = %kind))]
    pub async fn upload_asset(
        &self,
        kind: AssetKind,
        asset: &AssetUpload,
    ) -> Result<String, DomainError> {
        let user = self.current_user()?;
        let _loading = InFlight::start(&self.in_flight);

        let (failure, success) = match kind {
            AssetKind::Avatar => (
                "Failed to update profile photo",
                "Profile photo updated successfully",
            ),
            AssetKind::Cover => (
                "Failed to update cover image",
                "Cover image updated successfully",
            ),
        };

        let url = self
            .sync
            .upload_asset(user.id, asset, kind)
            .await
            .map_err(|e| self.report(e, failure))?;

        {
            let mut state = self.state.lock();
            if state.owned_by(user.id) {
                if let Some(form) = state.profile.as_mut() {
                    form.reconcile(
                        |p| match kind {
                            AssetKind::Avatar => p.avatar_url = Some(url.clone()),
                            AssetKind::Cover => p.cover_image = Some(url.clone()),
                        },
                        |d| d.set_asset_url(kind, url.clone()),
                    );
                }
            }
        }

        self.notifications.push(NotificationLevel::Success, success);
        Ok(url)
    }

    // --- farms ---

    #[instrument(name = "farm_dashboard.dashboard.refresh_farms", skip(self))]
    pub async fn refresh_farms(&self) -> Result<Vec<Farm>, DomainError> {
        let user = self.current_user()?;
        let _loading = InFlight::start(&self.in_flight);

        let farms = self
            .sync
            .list_farms(user.id)
            .await
            .map_err(|e| self.report(e, "Failed to load farms"))?;

        let mut state = self.state.lock();
        if state.owned_by(user.id) {
            state.farms = farms.clone();
        }
        Ok(farms)
    }

    pub fn open_farm_form(&self) -> bool {
        self.state.lock().farm_form.begin_edit()
    }

    pub fn edit_farm_form(&self, f: impl FnOnce(&mut FarmDraft)) -> bool {
        self.state.lock().farm_form.edit(f)
    }

    pub fn cancel_farm_form(&self) -> bool {
        self.state.lock().farm_form.cancel()
    }

    #[instrument(name = "farm_dashboard.dashboard.submit_farm", skip(self))]
    pub async fn submit_farm(&self) -> Result<Farm, DomainError> {
        let user = self.current_user()?;
        let draft = self
            .state
            .lock()
            .farm_form
            .begin_save()
            .ok_or_else(|| DomainError::validation("farm", "farm form is not open"))?;

        let _loading = InFlight::start(&self.in_flight);
        let result = self.sync.create_farm(user.id, &draft).await;

        {
            let mut state = self.state.lock();
            if state.owned_by(user.id) {
                match &result {
                    Ok(farm) => {
                        state.farm_form.complete_save(FarmDraft::default());
                        state.farms.retain(|f| f.id != farm.id);
                        state.farms.push(farm.clone());
                        state
                            .farms
                            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    }
                    Err(_) => {
                        state.farm_form.fail_save();
                    }
                }
            }
        }

        match result {
            Ok(farm) => {
                self.notifications
                    .push(NotificationLevel::Success, "Farm added successfully");
                Ok(farm)
            }
            Err(e) => Err(self.report(e, "Failed to add farm")),
        }
    }

    #[instrument(name = "farm_dashboard.dashboard.delete_farm", skip(self), fields(farm_id = %farm_id))]
    pub async fn delete_farm(&self, farm_id: Uuid) -> Result<DeleteOutcome, DomainError> {
        let user = self.current_user()?;
        let confirmation =
            Confirmation::from(self.confirmer.confirm("Delete this farm? This cannot be undone."));

        let _loading = InFlight::start(&self.in_flight);
        let outcome = self
            .sync
            .delete_farm(farm_id, confirmation)
            .await
            .map_err(|e| self.report(e, "Failed to delete farm"))?;

        if outcome == DeleteOutcome::Deleted {
            let mut state = self.state.lock();
            if state.owned_by(user.id) {
                state.farms.retain(|f| f.id != farm_id);
            }
            drop(state);
            self.notifications
                .push(NotificationLevel::Success, "Farm deleted successfully");
        }
        Ok(outcome)
    }

    // --- read side ---

    pub fn metrics(&self) -> DashboardMetrics {
        let farms = self.state.lock().farms.clone();
        self.metrics.farm_metrics(&farms)
    }

    pub fn farm_productivity(&self, farm_id: Uuid) -> Option<f64> {
        let state = self.state.lock();
        let farm = state.farms.iter().find(|f| f.id == farm_id)?;
        Some(self.metrics.farm_productivity(farm))
    }

    pub fn weather(&self) -> WeatherSnapshot {
        self.metrics.weather()
    }

    /// Current view of the dashboard. Notifications past their time-to-live
    /// are dropped first.
    pub fn snapshot(&self) -> DashboardView {
        self.notifications.expire(Utc::now());
        let state = self.state.lock();
        DashboardView {
            user: state.owner.clone(),
            profile: state.profile.as_ref().map(|f| f.committed().clone()),
            profile_mode: state.profile.as_ref().map(|f| f.mode()).unwrap_or_default(),
            profile_draft: state.profile.as_ref().and_then(|f| f.draft().cloned()),
            farms: state.farms.clone(),
            farm_form_mode: state.farm_form.mode(),
            farm_draft: state.farm_form.draft().cloned(),
            loading: self.is_loading(),
            notifications: self.notifications.active(),
        }
    }

    /// Surface a failure to the user and hand it back for propagation.
    fn report(&self, error: DomainError, context: &str) -> DomainError {
        if error.is_local() {
            info!("{}: {}", context, error);
        } else {
            warn!("{}: {}", context, error);
        }
        self.notifications
            .push(NotificationLevel::Error, format!("{}: {}", context, error));
        error
    }
}
