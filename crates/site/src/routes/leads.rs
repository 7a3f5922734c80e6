//! Contact page and lead capture endpoints.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::{ContactForm, LeadError, SearchRequestForm};
use crate::state::AppState;

/// Query parameters for the contact page.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub sent: Option<String>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub form: ContactForm,
    pub error: Option<String>,
    pub sent: bool,
}

/// Display the contact page.
pub async fn contact_page(Query(query): Query<ContactQuery>) -> ContactTemplate {
    ContactTemplate {
        form: ContactForm::default(),
        error: None,
        sent: query.sent.is_some(),
    }
}

/// Handle contact form submission.
pub async fn contact_submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Response {
    match state.leads().submit_contact(form.clone()).await {
        Ok(_) => Redirect::to("/contact?sent=1").into_response(),
        Err(e) => {
            let (status, message) = match &e {
                LeadError::MissingField(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                LeadError::Store(_) => {
                    tracing::error!(error = %e, "Failed to record contact message");
                    (
                        StatusCode::BAD_GATEWAY,
                        "Failed to send message. Please try again.".to_string(),
                    )
                }
            };
            (
                status,
                ContactTemplate {
                    form,
                    error: Some(message),
                    sent: false,
                },
            )
                .into_response()
        }
    }
}

/// Acknowledgement body for the JSON lead endpoints.
#[derive(Debug, Serialize)]
pub struct Submitted {
    pub success: bool,
}

/// `POST /api/search-requests`
///
/// # Errors
///
/// Returns 400 for a blank required field, 502 if the store write fails.
pub async fn api_search_request(
    State(state): State<AppState>,
    Json(form): Json<SearchRequestForm>,
) -> Result<(StatusCode, Json<Submitted>)> {
    state.leads().submit_search_request(form).await?;
    Ok((StatusCode::CREATED, Json(Submitted { success: true })))
}

/// `POST /api/contact`
///
/// # Errors
///
/// Returns 400 for a blank field, 502 if the store write fails.
pub async fn api_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Submitted>)> {
    state.leads().submit_contact(form).await?;
    Ok((StatusCode::CREATED, Json(Submitted { success: true })))
}
