//! Home page with the public vendor search.
//!
//! Anonymous visitors see the first result of each page and a count of the
//! rest; signed-in visitors see the whole page. A blank query shows nothing and
//! never reaches the store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use elate_chem_core::{SearchMode, VendorRecord, hidden_result_count, visible_results};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::OptionalUser;
use crate::routes::paging::{ListingParams, Pager};
use crate::services::{LeadError, SearchPage, SearchRequestForm};
use crate::state::AppState;

/// Shown when the search request itself fails.
const SEARCH_FAILED: &str = "Search is unavailable right now. Please try again.";

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub query: String,
    pub results: Vec<VendorRecord>,
    pub hidden_count: usize,
    pub pager: Pager,
    pub signed_in: bool,
    /// A non-blank query came back with no rows.
    pub no_results: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Previous request form input, kept when it fails validation.
    pub request: SearchRequestForm,
}

impl HomeTemplate {
    fn new(page: &SearchPage, signed_in: bool) -> Self {
        Self {
            query: page.query.clone(),
            results: visible_results(&page.results, signed_in).to_vec(),
            hidden_count: hidden_result_count(&page.results, signed_in),
            pager: Pager::new("/", &page.query, &page.window),
            signed_in,
            no_results: page.fetched && page.results.is_empty(),
            error: None,
            notice: None,
            request: SearchRequestForm {
                searched_query: page.query.clone(),
                chemical_name: page.query.clone(),
                ..SearchRequestForm::default()
            },
        }
    }
}

fn notice_text(key: &str) -> Option<String> {
    match key {
        "request_sent" => Some("Thanks! We'll get back to you about this chemical.".to_string()),
        _ => None,
    }
}

/// Display the home page, with search results when `?q=` is present.
pub async fn home(
    State(state): State<AppState>,
    user: OptionalUser,
    Query(params): Query<ListingParams>,
) -> HomeTemplate {
    let signed_in = user.is_signed_in();

    let mut template = match state
        .vendors()
        .search(SearchMode::Public, &params.q, params.page)
        .await
    {
        Ok(page) => HomeTemplate::new(&page, signed_in),
        Err(e) => {
            tracing::warn!(error = %e, "Public search failed");
            let mut template = HomeTemplate::new(
                &SearchPage {
                    query: params.q.trim().to_owned(),
                    ..SearchPage::default()
                },
                signed_in,
            );
            template.error = Some(SEARCH_FAILED.to_string());
            template
        }
    };

    template.notice = params.notice.as_deref().and_then(notice_text);
    template
}

/// JSON search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub results: Vec<VendorRecord>,
    /// Rows on this page withheld from an anonymous visitor.
    pub hidden_count: usize,
    pub authenticated: bool,
}

/// `GET /api/search?q=&page=`
///
/// # Errors
///
/// Returns a 502 if the store request fails.
pub async fn api_search(
    State(state): State<AppState>,
    user: OptionalUser,
    Query(params): Query<ListingParams>,
) -> Result<Json<SearchResponse>> {
    let authenticated = user.is_signed_in();
    let page = state
        .vendors()
        .search(SearchMode::Public, &params.q, params.page)
        .await?;

    Ok(Json(SearchResponse {
        page: page.window.page(),
        total_pages: page.window.total_pages(),
        total_count: page.window.total_count(),
        results: visible_results(&page.results, authenticated).to_vec(),
        hidden_count: hidden_result_count(&page.results, authenticated),
        authenticated,
        query: page.query,
    }))
}

/// `POST /search-requests`: the "couldn't find it" form under empty results.
///
/// On success the visitor lands back on the same search with a thank-you
/// notice. Validation failures re-render the page with the form filled in.
pub async fn submit_search_request(
    State(state): State<AppState>,
    user: OptionalUser,
    Form(form): Form<SearchRequestForm>,
) -> Response {
    let searched = form.searched_query.trim().to_owned();

    match state.leads().submit_search_request(form.clone()).await {
        Ok(_) => Redirect::to(&format!(
            "/?q={}&notice=request_sent",
            urlencoding::encode(&searched)
        ))
        .into_response(),
        Err(e) => {
            if matches!(e, LeadError::Store(_)) {
                tracing::error!(error = %e, "Failed to record search request");
            }
            let mut template = HomeTemplate::new(
                &SearchPage {
                    query: searched,
                    fetched: true,
                    ..SearchPage::default()
                },
                user.is_signed_in(),
            );
            template.error = Some(match e {
                LeadError::MissingField(_) => e.to_string(),
                LeadError::Store(_) => "Failed to submit request. Please try again.".to_string(),
            });
            template.request = form;
            template.into_response()
        }
    }
}
