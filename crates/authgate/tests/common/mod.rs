//! Test utilities and common setup.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use authgate::account::{Account, AccountStore};
use authgate::api::{AppState, create_router};
use authgate::auth::{AuthGate, GateConfig};
use authgate::observability::{AuthEvent, AuthEventSink};
use authgate::verifier::{TokenVerifier, VerifiedCredential, VerifyError, VerifyResult};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

/// Verifier returning a fixed outcome and counting calls.
pub struct StubVerifier {
    outcome: VerifyResult<VerifiedCredential>,
    calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

impl StubVerifier {
    pub fn valid(subject_id: &str, email: Option<&str>, phone_number: Option<&str>) -> Self {
        Self::with_outcome(Ok(VerifiedCredential {
            subject_id: subject_id.to_string(),
            email: email.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
        }))
    }

    pub fn invalid(reason: &str) -> Self {
        Self::with_outcome(Err(VerifyError::InvalidToken(reason.to_string())))
    }

    pub fn unavailable(detail: &str) -> Self {
        Self::with_outcome(Err(VerifyError::Unavailable(detail.to_string())))
    }

    fn with_outcome(outcome: VerifyResult<VerifiedCredential>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> VerifyResult<VerifiedCredential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());
        self.outcome.clone()
    }
}

/// In-memory account store counting lookups.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
    calls: AtomicUsize,
    failing: bool,
}

impl MemoryAccountStore {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::default();
        {
            let mut map = store.accounts.lock().unwrap();
            for account in accounts {
                map.insert(account.external_id.clone(), account);
            }
        }
        store
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, external_id: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(external_id).cloned()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Account>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(anyhow!("database is locked"));
        }
        Ok(self.get(external_id))
    }
}

/// Sink recording every event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuthEventSink for RecordingSink {
    fn emit(&self, event: &AuthEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn account(external_id: &str, is_active: bool) -> Account {
    Account {
        id: format!("acc-{external_id}"),
        external_id: external_id.to_string(),
        email: Some(format!("{external_id}@example.com")),
        display_name: Some("Test User".to_string()),
        is_active,
        created_at: "2026-01-01 00:00:00".to_string(),
        updated_at: "2026-01-01 00:00:00".to_string(),
    }
}

/// Collaborators wired into a test app.
pub struct Harness {
    pub verifier: Arc<StubVerifier>,
    pub accounts: Arc<MemoryAccountStore>,
    pub events: Arc<RecordingSink>,
    pub gate: AuthGate,
}

impl Harness {
    pub fn new(config: GateConfig, verifier: StubVerifier, accounts: MemoryAccountStore) -> Self {
        let verifier = Arc::new(verifier);
        let accounts = Arc::new(accounts);
        let events = Arc::new(RecordingSink::default());
        let gate = AuthGate::new(config, verifier.clone(), accounts.clone())
            .with_event_sink(events.clone());

        Self {
            verifier,
            accounts,
            events,
            gate,
        }
    }

    /// Production-like gate configuration (bypass ineligible).
    pub fn production(verifier: StubVerifier, accounts: MemoryAccountStore) -> Self {
        Self::new(GateConfig::new("production", false), verifier, accounts)
    }

    pub fn app(&self) -> Router {
        create_router(AppState::new(self.gate.clone()))
    }
}

/// GET `uri` with an optional bearer token; returns status and JSON body.
pub async fn get_json(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(Method::GET);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    (status, json)
}

/// Assert a rejection body matches the fixed error table.
pub fn assert_rejection(json: &Value, error_code: &str, message: &str) {
    assert_eq!(json["success"], false);
    assert_eq!(json["error_code"], error_code);
    assert_eq!(json["message"], message);
    assert_eq!(json.as_object().unwrap().len(), 3, "unexpected keys: {json}");
}
