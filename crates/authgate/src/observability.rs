//! Authentication events.
//!
//! The gate reports bypass use, rejected tokens and infrastructure failures
//! through an [`AuthEventSink`]. Delivery is fire-and-forget and never
//! affects the authentication decision.

use tracing::{error, info, warn};

/// Severity of an [`AuthEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Event emitted by the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The UI testing bypass admitted a request.
    MockAuthUsed,
    /// The verifier rejected a token. Only a truncated preview is kept.
    InvalidToken { error: String, token_preview: String },
    /// Verifier or account store failure.
    AuthFailure { error: String },
}

impl AuthEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            AuthEvent::MockAuthUsed => EventLevel::Info,
            AuthEvent::InvalidToken { .. } => EventLevel::Warning,
            AuthEvent::AuthFailure { .. } => EventLevel::Error,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthEvent::MockAuthUsed => "UI testing mode: using mock authentication",
            AuthEvent::InvalidToken { .. } => "Invalid Firebase token",
            AuthEvent::AuthFailure { .. } => "Firebase authentication error",
        }
    }
}

/// Receiver for authentication events.
pub trait AuthEventSink: Send + Sync {
    fn emit(&self, event: &AuthEvent);
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AuthEventSink for TracingSink {
    fn emit(&self, event: &AuthEvent) {
        let message = event.message();
        match event {
            AuthEvent::MockAuthUsed => info!(mock_auth = true, "{message}"),
            AuthEvent::InvalidToken {
                error,
                token_preview,
            } => warn!(%error, %token_preview, "{message}"),
            AuthEvent::AuthFailure { error } => error!(%error, "{message}"),
        }
    }
}
