//! Per-request identity context.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::AuthError;
use crate::account::Account;

/// Fixed identity used by the UI testing bypass.
const MOCK_EXTERNAL_ID: &str = "test-user-123";
const MOCK_EMAIL: &str = "test@scoutmena.com";
const MOCK_PHONE_NUMBER: &str = "+1234567890";

/// Identity attributes merged into the request on successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    pub external_id: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mock_auth: Option<bool>,
    /// ISO-8601 instant at which the mock identity was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_timestamp: Option<String>,
}

impl IdentityContext {
    /// Identity derived from a verified credential.
    pub fn verified(
        external_id: impl Into<String>,
        email: Option<String>,
        phone_number: Option<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            email,
            phone_number,
            is_mock_auth: None,
            mock_timestamp: None,
        }
    }

    /// The synthetic identity used by the UI testing bypass.
    pub fn mock(now: DateTime<Utc>) -> Self {
        Self {
            external_id: MOCK_EXTERNAL_ID.to_string(),
            email: Some(MOCK_EMAIL.to_string()),
            phone_number: Some(MOCK_PHONE_NUMBER.to_string()),
            is_mock_auth: Some(true),
            mock_timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }

    fn into_attributes(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Request-scoped context carried in the request extensions.
///
/// Attributes are merged, never replaced, so layers in front of the gate can
/// add their own keys. The current user is bound at most once.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    attributes: Map<String, Value>,
    current_user: Option<Arc<Account>>,
}

impl RequestContext {
    /// Merge identity attributes, overwriting only the keys it carries.
    pub fn merge(&mut self, identity: IdentityContext) {
        self.attributes.extend(identity.into_attributes());
    }

    /// Insert a single attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// All attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// External identity key of the authenticated caller.
    pub fn external_id(&self) -> Option<&str> {
        self.get("external_id").and_then(Value::as_str)
    }

    /// Whether the request was admitted through the UI testing bypass.
    pub fn is_mock_auth(&self) -> bool {
        self.get("is_mock_auth")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The account resolved by the gate, if any.
    pub fn current_user(&self) -> Option<&Account> {
        self.current_user.as_deref()
    }

    /// Bind the authenticated account. Returns false if one is already bound.
    pub(crate) fn bind_user(&mut self, account: Account) -> bool {
        if self.current_user.is_some() {
            return false;
        }
        self.current_user = Some(Arc::new(account));
        true
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(AuthError::TokenMissing)
    }
}

/// Authenticated account extracted from request.
///
/// Only available on the real-auth path; the testing bypass binds no account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<Account>);

impl CurrentUser {
    /// Get the account.
    pub fn account(&self) -> &Account {
        &self.0
    }

    /// Get the external identity key.
    pub fn external_id(&self) -> &str {
        &self.0.external_id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.current_user.clone())
            .map(CurrentUser)
            .ok_or(AuthError::TokenMissing)
    }
}
