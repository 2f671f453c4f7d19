//! Authentication gate.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;

use super::context::{IdentityContext, RequestContext};
use super::middleware::bearer_token;
use super::{AuthError, GateConfig};
use crate::account::{Account, AccountStore};
use crate::observability::{AuthEvent, AuthEventSink, TracingSink};
use crate::verifier::{TokenVerifier, VerifyError};

/// Sentinel bearer token accepted by the UI testing bypass.
pub const MOCK_TOKEN: &str = "mock-firebase-token-for-testing";

/// Characters of a rejected token kept in log output.
const TOKEN_PREVIEW_CHARS: usize = 20;

/// Shortened token for log output: the first 20 characters and `...`.
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Outcome of a successful authentication decision.
#[derive(Debug, Clone)]
pub enum Authenticated {
    /// Admitted through the UI testing bypass.
    Mock(IdentityContext),
    /// Admitted with a verified token and an active account.
    User {
        identity: IdentityContext,
        account: Account,
    },
}

impl Authenticated {
    /// Identity attributes to merge into the request.
    pub fn identity(&self) -> &IdentityContext {
        match self {
            Authenticated::Mock(identity) => identity,
            Authenticated::User { identity, .. } => identity,
        }
    }

    /// Merge the identity into the request context and bind the account.
    fn attach(self, request: &mut Request) {
        let mut ctx = request
            .extensions_mut()
            .remove::<RequestContext>()
            .unwrap_or_default();

        match self {
            Authenticated::Mock(identity) => ctx.merge(identity),
            Authenticated::User { identity, account } => {
                ctx.merge(identity);
                if !ctx.bind_user(account) {
                    debug!("current user already bound, keeping existing binding");
                }
            }
        }

        request.extensions_mut().insert(ctx);
    }
}

/// Request authentication gate.
///
/// Holds no per-request state; cloning is cheap and clones may be used
/// concurrently.
#[derive(Clone)]
pub struct AuthGate {
    config: Arc<GateConfig>,
    verifier: Arc<dyn TokenVerifier>,
    accounts: Arc<dyn AccountStore>,
    events: Arc<dyn AuthEventSink>,
}

impl AuthGate {
    /// Create a gate that reports events through `tracing`.
    pub fn new(
        config: GateConfig,
        verifier: Arc<dyn TokenVerifier>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            accounts,
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn AuthEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Gate configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Whether a request carrying `token` is admitted through the UI testing
    /// bypass. Pure; requires the local environment, debug mode and the exact
    /// sentinel token.
    pub fn should_bypass(&self, token: Option<&str>) -> bool {
        self.config.allows_bypass() && token == Some(MOCK_TOKEN)
    }

    /// Authenticate `request` and hand it to `next`, or reject it.
    ///
    /// On success the identity context is merged into the request before
    /// `next` runs and its response is returned unchanged. On failure `next`
    /// is never called.
    pub async fn handle<F, Fut>(&self, mut request: Request, next: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        let token = bearer_token(request.headers()).map(str::to_owned);

        match self.authenticate(token.as_deref()).await {
            Ok(authenticated) => {
                authenticated.attach(&mut request);
                next(request).await
            }
            Err(err) => err.into_response(),
        }
    }

    /// Decide whether a request carrying `token` is admitted.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Authenticated, AuthError> {
        if self.should_bypass(token) {
            self.events.emit(&AuthEvent::MockAuthUsed);
            return Ok(Authenticated::Mock(IdentityContext::mock(Utc::now())));
        }

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let credential = self
            .verifier
            .verify(token)
            .await
            .map_err(|err| match err {
                VerifyError::InvalidToken(reason) => {
                    self.events.emit(&AuthEvent::InvalidToken {
                        error: reason.clone(),
                        token_preview: token_preview(token),
                    });
                    AuthError::TokenInvalid(reason)
                }
                VerifyError::Unavailable(detail) => {
                    self.events.emit(&AuthEvent::AuthFailure {
                        error: detail.clone(),
                    });
                    AuthError::Internal(detail)
                }
            })?;

        let account = self
            .accounts
            .find_by_external_id(&credential.subject_id)
            .await
            .map_err(|err| {
                let detail = format!("{err:#}");
                self.events.emit(&AuthEvent::AuthFailure {
                    error: detail.clone(),
                });
                AuthError::Internal(detail)
            })?
            .ok_or(AuthError::UserNotFound)?;

        if !account.is_active {
            return Err(AuthError::AccountInactive);
        }

        Ok(Authenticated::User {
            identity: IdentityContext::verified(
                credential.subject_id,
                credential.email,
                credential.phone_number,
            ),
            account,
        })
    }
}
