//! # domscope Common Library
//!
//! Shared code for the domscope service crates:
//! - Error type and result alias
//! - Bootstrap configuration (TOML + defaults)
//! - Domain name normalization
//! - Database initialization and persisted models

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod domain;
pub mod error;

pub use domain::{normalize_domain, DomainType};
pub use error::{Error, Result};
