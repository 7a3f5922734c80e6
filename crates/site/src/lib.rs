//! Elate Chem site library.
//!
//! The marketing site, public vendor search, visitor accounts and the admin
//! vendor dashboard, all backed by the hosted Supabase project. Exposed as a
//! library so the CLI and the integration tests can reuse the services and the
//! router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod supabase;
