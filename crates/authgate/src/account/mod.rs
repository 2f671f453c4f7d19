//! Local account lookup.

mod models;
mod repository;

pub use models::Account;
pub use repository::{AccountRepository, AccountStore};
