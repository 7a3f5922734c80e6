//! Session-related types.
//!
//! Types stored in the visitor session for authentication state.

use serde::{Deserialize, Serialize};

/// Session-stored visitor identity.
///
/// Set after a successful sign-in with the hosted auth provider. Only its
/// presence matters to vendor search; the access token is kept so sign-out can
/// revoke it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth provider user ID.
    pub id: String,
    /// Email the visitor signed in with.
    pub email: String,
    access_token: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn new(id: String, email: String, access_token: String) -> Self {
        Self {
            id,
            email,
            access_token,
        }
    }

    /// The provider access token for this session.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in visitor.
    pub const CURRENT_USER: &str = "current_user";
}
