#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use farm_dashboard::config::FarmDashboardConfig;
use farm_dashboard::contract::model::{
    AssetKind, AssetUpload, AuthUser, Farm, NewFarm, NewProfile, Profile, ProfileFields, Session,
};
use farm_dashboard::domain::dashboard::Dashboard;
use farm_dashboard::domain::error::DomainError;
use farm_dashboard::domain::metrics::SimulatedMetrics;
use farm_dashboard::domain::ports::{
    AuthPort, ConfirmPort, FarmRepository, ObjectStorage, ProfileRepository,
};
use farm_dashboard::domain::sync::{RecordSynchronizer, SyncConfig};
use farm_dashboard::module::build_dashboard;

/// Backend operations observable through call counters and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CurrentSession,
    SignIn,
    SignUp,
    Refresh,
    SignOut,
    FindProfile,
    InsertProfile,
    UpsertProfile,
    PatchProfile,
    ListFarms,
    InsertFarm,
    DeleteFarm,
    Upload,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, (String, Uuid)>,
    session: Option<Session>,
    profiles: HashMap<Uuid, Profile>,
    farms: Vec<Farm>,
    objects: HashMap<String, Vec<u8>>,
    calls: HashMap<Op, usize>,
    failing: HashSet<Op>,
}

/// In-memory stand-in for the managed backend.
pub struct FakeBackend {
    state: Mutex<State>,
    clock: AtomicI64,
    base: DateTime<Utc>,
    pub require_email_confirmation: AtomicBool,
    gate_list_farms: AtomicBool,
    pub list_entered: Notify,
    pub list_release: Notify,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            clock: AtomicI64::new(0),
            base: Utc::now() - Duration::hours(1),
            require_email_confirmation: AtomicBool::new(false),
            gate_list_farms: AtomicBool::new(false),
            list_entered: Notify::new(),
            list_release: Notify::new(),
        })
    }

    /// Strictly increasing timestamps, all in the past.
    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.base + Duration::milliseconds(n)
    }

    pub fn with_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .lock()
            .accounts
            .insert(email.to_string(), (password.to_string(), id));
        id
    }

    pub fn seed_session(&self, session: Session) {
        self.state.lock().session = Some(session);
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().failing.insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.state.lock().failing.remove(&op);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn profile_of(&self, user_id: Uuid) -> Option<Profile> {
        self.state.lock().profiles.get(&user_id).cloned()
    }

    pub fn farm_count(&self) -> usize {
        self.state.lock().farms.len()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    /// Make the next `list_by_owner` calls wait for `list_release` after
    /// signalling `list_entered`.
    pub fn gate_list_farms(&self, on: bool) {
        self.gate_list_farms.store(on, Ordering::SeqCst);
    }

    fn record(&self, op: Op) -> bool {
        let mut s = self.state.lock();
        *s.calls.entry(op).or_default() += 1;
        s.failing.contains(&op)
    }

    fn issue_session(&self, user_id: Uuid, email: &str) -> Session {
        let session = Session {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: Some(format!("refresh-{}", user_id)),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user: AuthUser {
                id: user_id,
                email: Some(email.to_string()),
            },
        };
        self.state.lock().session = Some(session.clone());
        session
    }
}

#[async_trait]
impl AuthPort for FakeBackend {
    async fn current_session(&self) -> Result<Option<Session>, DomainError> {
        if self.record(Op::CurrentSession) {
            return Err(DomainError::network("session store unavailable"));
        }
        Ok(self.state.lock().session.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        if self.record(Op::SignIn) {
            return Err(DomainError::network("connection refused"));
        }
        let account = self.state.lock().accounts.get(email).cloned();
        match account {
            Some((pw, id)) if pw == password => Ok(self.issue_session(id, email)),
            _ => Err(DomainError::invalid_credentials("Invalid login credentials")),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, DomainError> {
        if self.record(Op::SignUp) {
            return Err(DomainError::network("connection refused"));
        }
        if self.state.lock().accounts.contains_key(email) {
            return Err(DomainError::auth_rejected("User already registered"));
        }
        let id = self.with_account(email, password);
        if self.require_email_confirmation.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.issue_session(id, email)))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, DomainError> {
        if self.record(Op::Refresh) {
            return Err(DomainError::auth_rejected("Invalid Refresh Token"));
        }
        let account = self
            .state
            .lock()
            .accounts
            .iter()
            .find(|(_, (_, id))| refresh_token == format!("refresh-{}", id))
            .map(|(email, (_, id))| (email.clone(), *id));
        match account {
            Some((email, id)) => Ok(self.issue_session(id, &email)),
            None => Err(DomainError::auth_rejected("Invalid Refresh Token")),
        }
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), DomainError> {
        if self.record(Op::SignOut) {
            return Err(DomainError::network("connection reset"));
        }
        self.state.lock().session = None;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for FakeBackend {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        if self.record(Op::FindProfile) {
            anyhow::bail!("HTTP 500: profiles unavailable");
        }
        Ok(self.state.lock().profiles.get(&user_id).cloned())
    }

    async fn insert(&self, profile: NewProfile) -> anyhow::Result<Profile> {
        if self.record(Op::InsertProfile) {
            anyhow::bail!("HTTP 403: new row violates row-level security policy");
        }
        let now = self.tick();
        let mut s = self.state.lock();
        if s.profiles.contains_key(&profile.user_id) {
            anyhow::bail!("HTTP 409: duplicate key value violates unique constraint");
        }
        let row = Profile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            full_name: profile.full_name,
            display_name: None,
            avatar_url: None,
            cover_image: None,
            phone: None,
            birth_date: None,
            address: None,
            professional_title: None,
            company: None,
            area_of_expertise: None,
            bio: None,
            notification_preferences: profile.notification_preferences,
            created_at: now,
            updated_at: now,
        };
        s.profiles.insert(row.user_id, row.clone());
        Ok(row)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        f: ProfileFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Profile> {
        if self.record(Op::UpsertProfile) {
            anyhow::bail!("HTTP 400: value too long for type character varying(100)");
        }
        let now = self.tick();
        let mut s = self.state.lock();
        let (id, created_at) = s
            .profiles
            .get(&user_id)
            .map(|p| (p.id, p.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));
        let row = Profile {
            id,
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
            notification_preferences: f.notification_preferences,
            created_at,
            updated_at,
        };
        s.profiles.insert(user_id, row.clone());
        Ok(row)
    }

    async fn set_asset_url(&self, user_id: Uuid, kind: AssetKind, url: &str) -> anyhow::Result<()> {
        if self.record(Op::PatchProfile) {
            anyhow::bail!("HTTP 500: patch failed");
        }
        let mut s = self.state.lock();
        if let Some(p) = s.profiles.get_mut(&user_id) {
            match kind {
                AssetKind::Avatar => p.avatar_url = Some(url.to_string()),
                AssetKind::Cover => p.cover_image = Some(url.to_string()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FarmRepository for FakeBackend {
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Farm>> {
        if self.gate_list_farms.load(Ordering::SeqCst) {
            self.list_entered.notify_one();
            self.list_release.notified().await;
        }
        if self.record(Op::ListFarms) {
            anyhow::bail!("HTTP 503: service unavailable");
        }
        let mut farms: Vec<Farm> = self
            .state
            .lock()
            .farms
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        farms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(farms)
    }

    async fn insert(&self, user_id: Uuid, farm: NewFarm) -> anyhow::Result<Farm> {
        if self.record(Op::InsertFarm) {
            anyhow::bail!("HTTP 400: invalid input syntax for type numeric");
        }
        let now = self.tick();
        let row = Farm {
            id: Uuid::new_v4(),
            user_id,
            name: farm.name,
            area: farm.area,
            location: farm.location,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().farms.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        if self.record(Op::DeleteFarm) {
            anyhow::bail!("HTTP 500: delete failed");
        }
        self.state.lock().farms.retain(|f| f.id != id);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FakeBackend {
    async fn upload(&self, path: &str, asset: &AssetUpload) -> anyhow::Result<()> {
        if self.record(Op::Upload) {
            anyhow::bail!("HTTP 413: Payload too large");
        }
        self.state
            .lock()
            .objects
            .insert(path.to_string(), asset.bytes.clone());
        Ok(())
    }

    fn public_url(&self, path: &str) -> anyhow::Result<String> {
        Ok(format!("https://cdn.test/avatars/{}", path))
    }
}

/// Answers confirmation prompts from a script; `false` once it runs out.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl ConfirmPort for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

pub fn synchronizer(backend: &Arc<FakeBackend>) -> RecordSynchronizer {
    RecordSynchronizer::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        SyncConfig::default(),
    )
}

pub fn dashboard(backend: &Arc<FakeBackend>, confirm: Arc<ScriptedConfirm>) -> Arc<Dashboard> {
    build_dashboard(
        &FarmDashboardConfig::default(),
        backend.clone(),
        synchronizer(backend),
        confirm,
        Arc::new(SimulatedMetrics),
    )
    .expect("default config builds a dashboard")
}

pub fn user(email: Option<&str>) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: email.map(str::to_string),
    }
}

pub fn png(name: &str) -> AssetUpload {
    AssetUpload {
        file_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}
