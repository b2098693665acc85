//! # TaskDesk API Server Library
//!
//! This library provides the core functionality for the TaskDesk API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `seed`: Demo accounts and tasks for a fresh store

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
