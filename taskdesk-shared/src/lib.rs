//! # TaskDesk Shared Library
//!
//! Domain types, access rules and storage used by the TaskDesk API server and
//! client.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks and their wire representations
//! - `auth`: Password hashing, tokens, the acting identity and the access policy
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `db`: Connection pool and migrations
//! - `service`: Operations combining the policy with the stores

pub mod auth;
pub mod db;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
