//! Infrastructure layer module
//!
//! This module contains the infrastructure adapters:
//! - Database implementations (SQLite with sqlx)
//! - Configuration management
//! - Logging infrastructure
//! - Setup and startup wiring
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod database;
pub mod logging;
pub mod setup;
