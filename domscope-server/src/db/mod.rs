//! Database access for domscope-server
//!
//! Connection setup and schema live in `domscope_common::db`; this module
//! holds the queries the enrichment service runs.

pub mod domain_info;

pub use domain_info::{RefreshedRecord, UpsertCounts};
