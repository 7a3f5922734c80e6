//! Cookie gate for the admin dashboard.
//!
//! Signing in with the configured username and password sets the
//! `admin-auth=authenticated` cookie; its presence is the only thing checked
//! afterwards. The cookie carries no identity and is not signed, so anyone who
//! can set cookies for the site's origin can pass the gate. Sign-out clears it.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::ExposeSecret;

use crate::config::AdminCredentials;

/// Name of the admin flag cookie.
pub const ADMIN_COOKIE_NAME: &str = "admin-auth";

/// The only value that passes the gate.
pub const ADMIN_COOKIE_VALUE: &str = "authenticated";

/// Admin cookie lifetime (24 hours).
const ADMIN_COOKIE_MAX_AGE: time::Duration = time::Duration::hours(24);

/// Path unauthenticated dashboard requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Compare two strings without exiting early on the first differing byte.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// Checks admin credentials and builds the flag cookie.
#[derive(Clone)]
pub struct AdminGate {
    credentials: AdminCredentials,
    secure: bool,
}

impl AdminGate {
    /// `secure` marks the cookie `Secure`; set it when serving over HTTPS.
    #[must_use]
    pub const fn new(credentials: AdminCredentials, secure: bool) -> Self {
        Self {
            credentials,
            secure,
        }
    }

    /// Whether the pair matches the configured credentials.
    ///
    /// Both halves are always compared so a wrong username takes as long as a
    /// wrong password.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_compare(username, &self.credentials.username);
        let password_ok =
            constant_time_compare(password, self.credentials.password.expose_secret());
        username_ok & password_ok
    }

    /// The cookie set on successful login.
    #[must_use]
    pub fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build((ADMIN_COOKIE_NAME, ADMIN_COOKIE_VALUE))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(ADMIN_COOKIE_MAX_AGE)
            .path("/")
            .build()
    }

    /// A cookie that, when added to a jar, deletes the flag.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((ADMIN_COOKIE_NAME, ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }

    /// Log in: on success the jar gains the flag cookie.
    pub fn login(&self, jar: CookieJar, username: &str, password: &str) -> Option<CookieJar> {
        self.verify(username, password)
            .then(|| jar.add(self.session_cookie()))
    }

    /// Log out. Removing an absent cookie is harmless, so this is idempotent.
    #[must_use]
    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.removal_cookie())
    }
}

/// Whether the jar carries the admin flag.
#[must_use]
pub fn is_admin(jar: &CookieJar) -> bool {
    jar.get(ADMIN_COOKIE_NAME)
        .is_some_and(|cookie| cookie.value() == ADMIN_COOKIE_VALUE)
}

/// Extractor that requires the admin flag cookie.
///
/// Page requests without it are redirected to the login page; `/api/` requests
/// get `401 Unauthorized`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(_admin: RequireAdmin) -> impl IntoResponse {
///     "admin only"
/// }
/// ```
pub struct RequireAdmin;

/// Error returned when a gated route is requested without the flag.
pub enum AdminRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if is_admin(&jar) {
            return Ok(Self);
        }

        // Nested routers see a stripped path; decide on the one the client sent.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |uri| uri.0.path());

        if path.starts_with("/api/") {
            Err(AdminRejection::Unauthorized)
        } else {
            Err(AdminRejection::RedirectToLogin)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Request, header};
    use secrecy::SecretString;

    fn gate(secure: bool) -> AdminGate {
        AdminGate::new(
            AdminCredentials {
                username: "admin".to_string(),
                password: SecretString::from("s3cret"),
            },
            secure,
        )
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_verify() {
        let gate = gate(false);
        assert!(gate.verify("admin", "s3cret"));
        assert!(!gate.verify("wrong", "wrong"));
        assert!(!gate.verify("admin", "wrong"));
        assert!(!gate.verify("wrong", "s3cret"));
    }

    #[test]
    fn test_wrong_login_sets_no_cookie() {
        assert!(gate(false).login(CookieJar::new(), "wrong", "wrong").is_none());
    }

    #[test]
    fn test_login_sets_flag_cookie() {
        let jar = gate(true).login(CookieJar::new(), "admin", "s3cret").unwrap();
        assert!(is_admin(&jar));

        let cookie = jar.get(ADMIN_COOKIE_NAME).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_insecure_outside_production() {
        assert_eq!(gate(false).session_cookie().secure(), Some(false));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let gate = gate(false);
        let jar = gate.login(CookieJar::new(), "admin", "s3cret").unwrap();
        let jar = gate.logout(jar);
        assert!(!is_admin(&jar));
        let jar = gate.logout(jar);
        assert!(!is_admin(&jar));
    }

    #[test]
    fn test_other_cookie_values_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("admin-auth=yes"));
        assert!(!is_admin(&CookieJar::from_headers(&headers)));
    }

    async fn extract(path: &str, cookie: Option<&'static str>) -> Result<RequireAdmin, AdminRejection> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        RequireAdmin::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_require_admin_page_redirects() {
        let response = extract("/dashboard", None).await.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_require_admin_api_unauthorized() {
        let response = extract("/api/admin/vendors", None)
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_admin_with_cookie() {
        assert!(
            extract("/dashboard", Some("admin-auth=authenticated"))
                .await
                .is_ok()
        );
    }
}
