//! core
//!
//! Core domain types, configuration and path rules for patchcheck.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Tool, PatchId, PatchSelection, VerifyMode, etc.
//! - [`results`] - Trial outcomes, patch results and catalog reports
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for checkouts and reports
//! - [`lock`] - Exclusive per-checkout run lock
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Derived values (patch status, report counts) are never stored by hand
//! - Nothing here runs version control; only [`lock`] touches a checkout

pub mod config;
pub mod lock;
pub mod paths;
pub mod results;
pub mod types;
