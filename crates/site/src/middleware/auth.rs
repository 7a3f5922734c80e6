//! Visitor session extractors.
//!
//! Signed-in visitors are remembered in the `tower-sessions` session. The only
//! feature that cares is public search visibility, so there is no
//! `RequireUser`: handlers take [`OptionalUser`] and decide.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that optionally gets the current visitor.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<CurrentUser>);

impl OptionalUser {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current visitor in the session.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current visitor from the session (logout).
///
/// Returns the visitor that was signed in, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await
}
