//! Authentication module.
//!
//! Provides the request authentication gate with support for:
//! - Firebase ID token validation resolved against local accounts
//! - UI testing bypass with a fixed mock identity (local + debug only)

mod config;
mod context;
mod error;
mod gate;
mod middleware;

pub use config::{GateConfig, LOCAL_ENVIRONMENT};
pub use context::{CurrentUser, IdentityContext, RequestContext};
pub use error::{AuthError, AuthErrorResponse};
pub use gate::{AuthGate, Authenticated, MOCK_TOKEN, token_preview};
pub use middleware::{auth_middleware, bearer_token};
