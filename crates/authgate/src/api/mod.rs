//! HTTP API.

mod handlers;
mod routes;
mod state;

pub use handlers::{HealthResponse, MeResponse};
pub use routes::create_router;
pub use state::AppState;
