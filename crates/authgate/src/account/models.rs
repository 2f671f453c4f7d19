//! Account data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account entity from database.
///
/// The gate only reads `external_id` and `is_active`; the remaining fields
/// are passed through to handlers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    /// Identity provider subject this account belongs to.
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}
