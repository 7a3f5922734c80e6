//! Elate Chem Core - Shared vendor directory types.
//!
//! This crate provides the domain types used across all Elate Chem components:
//! - `site` - Public marketing site, vendor search, and the admin dashboard
//! - `cli` - Operator tooling for the vendor directory
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Paging arithmetic, sequence-number assignment, form
//! validation, and the search visibility rule live here so that every consumer
//! applies them identically.
//!
//! # Modules
//!
//! - [`types`] - Vendor records, sequence numbers, page windows, and search rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
