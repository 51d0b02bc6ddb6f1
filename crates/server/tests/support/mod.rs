//! Shared fixtures: in-memory fakes for the remote collaborators and a
//! router wired the way `run_server` wires it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bakery_server::cache::{
    spawn_invalidation_worker, CacheInvalidator, ChannelInvalidator, MemoryViewCache,
};
use bakery_server::clients::{AuthSession, IdentityApi};
use bakery_server::config::ServerConfig;
use bakery_server::routes::create_router;
use bakery_server::services::{ListQuery, ProfileRepository, RecordService};
use bakery_server::state::AppState;
use common::{AppError, AppResult};
use domain::{EntityKind, Identity, ServiceResult, TagSet, UserProfile, UserRole};

/// Access token the fake identity API accepts.
pub const VALID_TOKEN: &str = "valid-token";
/// Access token that makes the fake identity API fail.
pub const FAULTY_TOKEN: &str = "faulty-token";
/// Refresh token the fake identity API exchanges.
pub const VALID_REFRESH: &str = "valid-refresh";
/// Code verifier the fake identity API pairs with `good-code`.
pub const GOOD_VERIFIER: &str = "good-verifier";
/// Provider sign-in page the fake identity API redirects to.
pub const AUTHORIZE_URL: &str = "https://identity.test/authorize";

pub fn baker() -> Identity {
    Identity::new("u-baker", Some("baker@example.com".to_string()))
}

pub fn owner() -> Identity {
    Identity::new("u-owner", Some("owner@example.com".to_string()))
}

pub fn session_for(identity: Identity, access: &str) -> AuthSession {
    AuthSession {
        access_token: access.to_string(),
        refresh_token: "rotated-refresh".to_string(),
        expires_in: 3600,
        expires_at: None,
        user: Some(identity),
    }
}

// =============================================================================
// Identity API
// =============================================================================

pub struct FakeIdentity {
    tokens: Mutex<HashMap<String, Identity>>,
    refreshes: Mutex<HashMap<String, AuthSession>>,
    pub lookups: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        let identity = Self {
            tokens: Mutex::new(HashMap::new()),
            refreshes: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
        };
        identity.accept_token(VALID_TOKEN, baker());
        identity.accept_refresh(VALID_REFRESH, session_for(baker(), "fresh-token"));
        identity
    }

    pub fn accept_token(&self, token: &str, identity: Identity) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }

    pub fn accept_refresh(&self, token: &str, session: AuthSession) {
        self.refreshes
            .lock()
            .unwrap()
            .insert(token.to_string(), session);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if access_token == FAULTY_TOKEN {
            return Err(AppError::upstream("identity API unreachable"));
        }
        Ok(self.tokens.lock().unwrap().get(access_token).cloned())
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<AuthSession>> {
        Ok(self.refreshes.lock().unwrap().get(refresh_token).cloned())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<Option<AuthSession>> {
        if email == "baker@example.com" && password == "correct-horse" {
            Ok(Some(session_for(baker(), VALID_TOKEN)))
        } else {
            Ok(None)
        }
    }

    fn authorize_url(
        &self,
        provider: &str,
        code_challenge: &str,
        redirect_to: &str,
    ) -> AppResult<String> {
        Ok(format!(
            "{}?provider={}&code_challenge={}&redirect_to={}",
            AUTHORIZE_URL, provider, code_challenge, redirect_to
        ))
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> AppResult<Option<AuthSession>> {
        if auth_code == "good-code" && code_verifier == GOOD_VERIFIER {
            Ok(Some(session_for(baker(), VALID_TOKEN)))
        } else {
            Ok(None)
        }
    }

    async fn sign_up(&self, email: &str, _password: &str, _metadata: Value) -> AppResult<Identity> {
        if email == "taken@example.com" {
            return Err(AppError::rejected("User already registered"));
        }
        Ok(Identity::new(format!("u-{}", email), Some(email.to_string())))
    }

    async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Default)]
pub struct FakeRecords {
    rows: Mutex<HashMap<EntityKind, Vec<Value>>>,
    rejection: Mutex<Option<String>>,
    fault: AtomicBool,
    pub delete_calls: Mutex<Vec<(EntityKind, String)>>,
    pub create_calls: Mutex<Vec<(EntityKind, Value)>>,
    pub list_calls: AtomicUsize,
}

impl FakeRecords {
    pub fn insert(&self, kind: EntityKind, row: Value) {
        self.rows.lock().unwrap().entry(kind).or_default().push(row);
    }

    /// Answer every mutation with a store rejection carrying `message`.
    pub fn reject_with(&self, message: &str) {
        *self.rejection.lock().unwrap() = Some(message.to_string());
    }

    /// Fail every call with a transport fault.
    pub fn fail(&self) {
        self.fault.store(true, Ordering::SeqCst);
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.lock().unwrap().len()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_fault(&self) -> AppResult<()> {
        if self.fault.load(Ordering::SeqCst) {
            Err(AppError::upstream("connection reset by peer"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordService for FakeRecords {
    async fn list(&self, query: ListQuery) -> AppResult<Vec<Value>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fault()?;
        let rows = self
            .rows
            .lock()
            .unwrap()
            .get(&query.kind)
            .cloned()
            .unwrap_or_default();
        Ok(match query.limit {
            Some(limit) => rows.into_iter().take(limit).collect(),
            None => rows,
        })
    }

    async fn create(&self, kind: EntityKind, row: Value) -> AppResult<ServiceResult> {
        self.create_calls.lock().unwrap().push((kind, row.clone()));
        self.check_fault()?;
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Ok(ServiceResult::error(message));
        }
        self.insert(kind, row);
        Ok(ServiceResult::success())
    }

    async fn delete(&self, kind: EntityKind, id: String) -> AppResult<ServiceResult> {
        self.delete_calls.lock().unwrap().push((kind, id.clone()));
        self.check_fault()?;
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Ok(ServiceResult::error(message));
        }

        let mut rows = self.rows.lock().unwrap();
        let table = rows.entry(kind).or_default();
        let before = table.len();
        table.retain(|row| row.get("id").and_then(Value::as_str) != Some(id.as_str()));

        if table.len() == before {
            Ok(ServiceResult::error(kind.not_found_message()))
        } else {
            Ok(ServiceResult::success())
        }
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_fault()
    }
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<String, UserProfile>>,
    fault: AtomicBool,
}

impl FakeProfiles {
    pub fn add(&self, identity: &Identity, role: UserRole) {
        let profile = UserProfile {
            role,
            ..UserProfile::for_signup(identity, None, None)
        };
        self.rows.lock().unwrap().insert(identity.id.clone(), profile);
    }

    pub fn get(&self, id: &str) -> Option<UserProfile> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn fail(&self) {
        self.fault.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileRepository for FakeProfiles {
    async fn find(&self, id: &str) -> AppResult<Option<UserProfile>> {
        if self.fault.load(Ordering::SeqCst) {
            return Err(AppError::upstream("profiles table unreachable"));
        }
        Ok(self.get(id))
    }

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile> {
        self.rows
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn update_role(&self, id: &str, role: UserRole) -> AppResult<Option<UserProfile>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(id).map(|profile| {
            profile.role = role;
            profile.clone()
        }))
    }
}

// =============================================================================
// Invalidation
// =============================================================================

/// Records every tag set and optionally forwards it to the purge worker.
#[derive(Default)]
pub struct RecordingInvalidator {
    seen: Mutex<Vec<TagSet>>,
    forward: Option<ChannelInvalidator>,
}

impl RecordingInvalidator {
    pub fn calls(&self) -> Vec<TagSet> {
        self.seen.lock().unwrap().clone()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, tags: TagSet) {
        self.seen.lock().unwrap().push(tags.clone());
        if let Some(forward) = &self.forward {
            forward.invalidate(tags);
        }
    }
}

// =============================================================================
// App
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub identity: Arc<FakeIdentity>,
    pub records: Arc<FakeRecords>,
    pub profiles: Arc<FakeProfiles>,
    pub views: Arc<MemoryViewCache>,
    pub invalidator: Arc<RecordingInvalidator>,
}

impl TestApp {
    /// App whose invalidations are only recorded.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// App whose invalidations also reach a running purge worker.
    pub fn with_purge_worker() -> Self {
        let views = Arc::new(MemoryViewCache::new());
        let (forward, _worker) = spawn_invalidation_worker(views.clone());
        Self::build(Some((views, forward)))
    }

    fn build(worker: Option<(Arc<MemoryViewCache>, ChannelInvalidator)>) -> Self {
        let (views, forward) = match worker {
            Some((views, forward)) => (views, Some(forward)),
            None => (Arc::new(MemoryViewCache::new()), None),
        };

        let identity = Arc::new(FakeIdentity::new());
        let records = Arc::new(FakeRecords::default());
        let profiles = Arc::new(FakeProfiles::default());
        let invalidator = Arc::new(RecordingInvalidator {
            seen: Mutex::new(Vec::new()),
            forward,
        });

        let state = AppState::new(
            ServerConfig::default(),
            identity.clone(),
            profiles.clone(),
            records.clone(),
            views.clone(),
            invalidator.clone(),
        );

        Self {
            router: create_router(state),
            identity,
            records,
            profiles,
            views,
            invalidator,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send and decode the JSON body.
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete_json(uri: &str, body: Value) -> Request<Body> {
    json_request("DELETE", uri, &body.to_string())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

/// Cookie header of a valid, unexpired session.
pub fn signed_in() -> String {
    format!("sb-access-token={}", VALID_TOKEN)
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn sale_row(id: &str, customer_id: &str, total: f64) -> Value {
    json!({
        "id": id,
        "customer_id": customer_id,
        "production_id": "p1",
        "quantity": 1.0,
        "total_amount": total,
        "sale_date": "2024-03-01",
    })
}
