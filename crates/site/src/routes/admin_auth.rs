//! Admin login and logout.
//!
//! The form on `/login` and the JSON endpoint share the same check; both set
//! the admin flag cookie on success and answer 401 with a generic message on
//! failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::add_breadcrumb;
use crate::middleware::admin_gate::LOGIN_PATH;
use crate::middleware::is_admin;
use crate::state::AppState;

/// Message for any failed admin login.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Admin credentials, from the login form or a JSON body.
#[derive(Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

/// Display the admin login page. Already signed-in admins go straight on.
pub async fn login_page(jar: CookieJar) -> Response {
    if is_admin(&jar) {
        return Redirect::to("/dashboard").into_response();
    }

    LoginTemplate {
        username: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle the admin login form.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    match state.admin().login(jar, &form.username, &form.password) {
        Some(jar) => {
            add_breadcrumb("admin", "Admin signed in", None);
            (jar, Redirect::to("/dashboard")).into_response()
        }
        None => {
            tracing::warn!("Rejected admin login");
            (
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    username: form.username,
                    error: Some(INVALID_CREDENTIALS.to_string()),
                },
            )
                .into_response()
        }
    }
}

/// Result of `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// `POST /api/login` with `{"username", "password"}`.
pub async fn api_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<AdminLoginForm>,
) -> Response {
    match state.admin().login(jar, &form.username, &form.password) {
        Some(jar) => {
            add_breadcrumb("admin", "Admin signed in", None);
            (
                jar,
                Json(LoginResponse {
                    success: true,
                    message: None,
                }),
            )
                .into_response()
        }
        None => {
            tracing::warn!("Rejected admin login");
            (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    message: Some(INVALID_CREDENTIALS),
                }),
            )
                .into_response()
        }
    }
}

/// `POST /api/logout`: clear the flag and go back to the login page.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    add_breadcrumb("admin", "Admin signed out", None);
    (state.admin().logout(jar), Redirect::to(LOGIN_PATH))
}
