//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Errors are rendered as the JSON shape the site's forms expect:
//! `{"success": false, "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::controllers::messages;
use crate::services::{LeadError, VendorError};
use crate::store::{AuthError, StoreError};

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Vendor directory operation failed.
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// Lead submission failed.
    #[error("Lead error: {0}")]
    Lead(#[from] LeadError),

    /// Visitor authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Vendor(VendorError::Store(_))
            | Self::Lead(LeadError::Store(_))
            | Self::Auth(AuthError::Http(_) | AuthError::Provider { .. } | AuthError::Store(_))
            | Self::Session(_) => true,
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Vendor(err) => match err {
                VendorError::Validation(_) => StatusCode::BAD_REQUEST,
                VendorError::DuplicateSequence { .. } => StatusCode::CONFLICT,
                VendorError::NotFound(_) => StatusCode::NOT_FOUND,
                VendorError::Store(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Lead(err) => match err {
                LeadError::MissingField(_) => StatusCode::BAD_REQUEST,
                LeadError::Store(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::Http(_) | AuthError::Provider { .. } | AuthError::Store(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message. Store and provider details never leave the server.
    fn public_message(&self) -> String {
        match self {
            Self::Vendor(err) => match err {
                VendorError::Validation(e) => e.to_string(),
                VendorError::DuplicateSequence { taken, .. } => messages::sequence_taken(taken),
                VendorError::NotFound(srno) => format!("Vendor {srno} not found"),
                VendorError::Store(StoreError::NotFound) => "Vendor not found".to_string(),
                VendorError::Store(_) => "Data service error".to_string(),
            },
            Self::Lead(err) => match err {
                LeadError::MissingField(_) => err.to_string(),
                LeadError::Store(_) => "Failed to submit. Please try again.".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::Validation(msg) => msg.clone(),
                _ => "Authentication service error".to_string(),
            },
            Self::Session(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a signed-in visitor.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for admin actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
