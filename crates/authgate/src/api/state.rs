//! Application state shared across handlers.

use crate::auth::AuthGate;

#[derive(Clone)]
pub struct AppState {
    /// Authentication gate applied to protected routes.
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }
}
