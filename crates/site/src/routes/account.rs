//! Visitor account route handlers.
//!
//! Sign-in, registration and sign-out against the hosted identity provider.
//! A signed-in visitor is remembered in the session; the only thing it unlocks
//! is full public search result pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::services::{LoginForm, RegistrationForm};
use crate::state::AppState;
use crate::store::AuthError;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
}

fn success_text(key: &str) -> Option<&'static str> {
    match key {
        "registered" => Some("Account created. Check your email, then sign in."),
        "signed_out" => Some("You have been signed out."),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Account page: sign-in and registration forms, or the signed-in summary.
#[derive(Template, WebTemplate)]
#[template(path = "auth/account.html")]
pub struct AccountTemplate {
    pub email: Option<String>,
    pub login_email: String,
    pub registration: RegistrationDraft,
    pub login_error: Option<String>,
    pub register_error: Option<String>,
    pub success: Option<String>,
}

/// Registration fields echoed back after a failed attempt. Passwords are not.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub full_name: String,
    pub company_name: String,
    pub email: String,
    pub mobile: String,
}

impl From<&RegistrationForm> for RegistrationDraft {
    fn from(form: &RegistrationForm) -> Self {
        Self {
            full_name: form.full_name.clone(),
            company_name: form.company_name.clone(),
            email: form.email.clone(),
            mobile: form.mobile.clone(),
        }
    }
}

impl AccountTemplate {
    fn empty(email: Option<String>) -> Self {
        Self {
            email,
            login_email: String::new(),
            registration: RegistrationDraft::default(),
            login_error: None,
            register_error: None,
            success: None,
        }
    }
}

fn auth_message(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::UserAlreadyExists => "An account with this email already exists".to_string(),
        AuthError::Validation(msg) => msg.clone(),
        _ => "Sign-in is unavailable right now. Please try again.".to_string(),
    }
}

// =============================================================================
// Page Routes
// =============================================================================

/// Display the account page.
pub async fn account_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> AccountTemplate {
    let mut template = AccountTemplate::empty(user.map(|u| u.email));
    template.success = query
        .success
        .as_deref()
        .and_then(success_text)
        .map(String::from);
    template
}

/// Handle the sign-in form.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match sign_in(&state, &session, &form).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(AppError::Auth(e)) => {
            let status = if matches!(e, AuthError::InvalidCredentials) {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_REQUEST
            };
            let mut template = AccountTemplate::empty(None);
            template.login_email = form.email;
            template.login_error = Some(auth_message(&e));
            (status, template).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Handle the registration form.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Response {
    match state.accounts().register(&form).await {
        Ok(_) => Redirect::to("/account?success=registered").into_response(),
        Err(e) => {
            let status = match e {
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => {
                    tracing::error!(error = %e, "Registration failed");
                    StatusCode::BAD_GATEWAY
                }
            };
            let mut template = AccountTemplate::empty(None);
            template.registration = RegistrationDraft::from(&form);
            template.register_error = Some(auth_message(&e));
            (status, template).into_response()
        }
    }
}

/// Handle sign-out.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    sign_out(&state, &session).await?;
    Ok(Redirect::to("/account?success=signed_out"))
}

// =============================================================================
// JSON API
// =============================================================================

/// Signed-in visitor summary.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub email: Option<String>,
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// Returns 401 for wrong credentials, 400 for blank fields.
pub async fn api_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<AccountResponse>> {
    sign_in(&state, &session, &form).await?;
    Ok(Json(AccountResponse {
        success: true,
        email: Some(form.email.trim().to_owned()),
    }))
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// Returns 400 for invalid input and 409 if the email is registered.
pub async fn api_register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let profile = state.accounts().register(&form).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            success: true,
            email: Some(profile.email),
        }),
    ))
}

/// `POST /api/auth/logout`
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn api_logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AccountResponse>> {
    sign_out(&state, &session).await?;
    Ok(Json(AccountResponse {
        success: true,
        email: None,
    }))
}

/// `GET /api/auth/me`
pub async fn api_me(OptionalUser(user): OptionalUser) -> Json<AccountResponse> {
    Json(AccountResponse {
        success: user.is_some(),
        email: user.map(|u| u.email),
    })
}

// =============================================================================
// Helpers
// =============================================================================

async fn sign_in(state: &AppState, session: &Session, form: &LoginForm) -> Result<()> {
    let user = state.accounts().login(form).await?;
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    Ok(())
}

async fn sign_out(state: &AppState, session: &Session) -> Result<()> {
    if let Some(user) = clear_current_user(session).await? {
        state.accounts().logout(&user).await;
    }
    clear_sentry_user();
    Ok(())
}
