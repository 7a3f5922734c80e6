//! Stateful controllers for interactive clients.
//!
//! - `search` - debounced, paginated listing with most-recent-wins fetches
//! - `editor` - add/edit/delete flow that patches the listing in place
//!
//! The HTTP handlers are stateless and call `crate::services` directly; these
//! controllers sit on the same services and drive the operator CLI.

pub mod editor;
pub mod search;

pub use editor::{
    EDIT_DISMISS_DELAY, EditSession, Notice, PendingDelete, VendorEditor, failure_notice, messages,
};
pub use search::{ListingHandle, SearchController, SearchState, SearchStatus};
