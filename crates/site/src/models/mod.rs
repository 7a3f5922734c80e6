//! Domain models for the site that are not shared with the CLI.
//!
//! Vendor records live in `elate_chem_core`; this module holds the write-only
//! lead records and the session-stored user identity.

pub mod leads;
pub mod session;

pub use leads::{ContactSubmission, SearchRequest, UserProfile};
pub use session::{CurrentUser, keys as session_keys};
