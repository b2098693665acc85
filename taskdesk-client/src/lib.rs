//! # TaskDesk Client
//!
//! Command-line shell for the TaskDesk API.
//!
//! ## Modules
//!
//! - `client`: Typed HTTP client
//! - `shell`: Role-aware action menu and table rendering

pub mod client;
pub mod shell;
