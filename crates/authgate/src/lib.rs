//! Authgate Library
//!
//! Bearer-token authentication gate for protected HTTP endpoints. Tokens are
//! verified against Firebase, resolved to local accounts and turned into a
//! per-request identity context.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod observability;
pub mod verifier;
