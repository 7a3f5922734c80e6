//! Admin dashboard pages.
//!
//! Server-rendered listing with the add-vendor form, plus edit and delete
//! confirmation pages. Successful writes redirect back to the listing with a
//! `?notice=` key; failures re-render the form with what was submitted.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use elate_chem_core::{
    PageWindow, SearchMode, SequenceNumber, VendorDetails, VendorField, VendorRecord,
};
use serde::Deserialize;

use crate::controllers::{Notice, failure_notice, messages};
use crate::error::add_breadcrumb;
use crate::middleware::RequireAdmin;
use crate::routes::paging::{ListingParams, Pager};
use crate::services::VendorError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add-vendor form. The sequence number is the one scanned when the page was
/// rendered, carried in a hidden input.
#[derive(Debug, Deserialize)]
pub struct AddVendorForm {
    #[serde(default)]
    pub sequence_number: String,
    #[serde(flatten)]
    pub details: VendorDetails,
}

/// One labelled input of the vendor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// The detail inputs in display order.
#[must_use]
pub fn form_fields(details: &VendorDetails) -> Vec<FormField> {
    [
        ("chemical_name", VendorField::ChemicalName, &details.chemical_name),
        ("category", VendorField::Category, &details.category),
        ("cas_number", VendorField::CasNumber, &details.cas_number),
        ("supplier_name", VendorField::SupplierName, &details.supplier_name),
        ("contact_info", VendorField::ContactInfo, &details.contact_info),
        ("phone_number", VendorField::PhoneNumber, &details.phone_number),
        ("business_status", VendorField::BusinessStatus, &details.business_status),
        ("country", VendorField::Country, &details.country),
    ]
    .into_iter()
    .map(|(name, field, value)| FormField {
        name,
        label: field.label(),
        value: value.clone(),
    })
    .collect()
}

fn notice_for(key: &str) -> Option<Notice> {
    match key {
        "added" => Some(Notice::Success(messages::ADDED.to_string())),
        "updated" => Some(Notice::Success(messages::UPDATED.to_string())),
        "deleted" => Some(Notice::Success(messages::DELETED.to_string())),
        "delete_failed" => Some(Notice::Error(messages::DELETE_FAILED.to_string())),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Dashboard listing template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub query: String,
    pub results: Vec<VendorRecord>,
    pub pager: Pager,
    pub next_sequence: SequenceNumber,
    pub fields: Vec<FormField>,
    pub notice: Option<Notice>,
    pub list_error: Option<String>,
}

/// Edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/vendor_edit.html")]
pub struct VendorEditTemplate {
    pub sequence_number: SequenceNumber,
    pub fields: Vec<FormField>,
    pub notice: Option<Notice>,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/vendor_delete.html")]
pub struct VendorDeleteTemplate {
    pub vendor: VendorRecord,
}

/// Where the add form's sequence number comes from.
enum NextSequence {
    /// Scan the store now.
    Scan,
    /// Already assigned by the rescan after a rejected insert.
    Known(SequenceNumber),
}

async fn render_dashboard(
    state: &AppState,
    params: &ListingParams,
    form: &VendorDetails,
    next_sequence: NextSequence,
    notice: Option<Notice>,
) -> DashboardTemplate {
    let listing = state
        .vendors()
        .search(SearchMode::AdminListing, &params.q, params.page)
        .await;

    let next_sequence = match next_sequence {
        NextSequence::Known(next) => next,
        NextSequence::Scan => state.vendors().assign_next_sequence().await,
    };

    let (query, results, pager, list_error) = match listing {
        Ok(page) => (
            page.query.clone(),
            page.results,
            Pager::new("/dashboard", &page.query, &page.window),
            None,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Admin listing failed");
            let query = params.q.trim().to_owned();
            let pager = Pager::new("/dashboard", &query, &PageWindow::first());
            (
                query,
                Vec::new(),
                pager,
                Some("Could not load vendors. Please try again.".to_string()),
            )
        }
    };

    DashboardTemplate {
        query,
        results,
        pager,
        next_sequence,
        fields: form_fields(form),
        notice,
        list_error,
    }
}

// =============================================================================
// Listing
// =============================================================================

/// `GET /dashboard?q=&page=`
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> DashboardTemplate {
    let notice = params.notice.as_deref().and_then(notice_for);
    render_dashboard(
        &state,
        &params,
        &VendorDetails::default(),
        NextSequence::Scan,
        notice,
    )
    .await
}

/// `POST /dashboard/vendors`: insert under the sequence number shown on the page.
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<AddVendorForm>,
) -> Response {
    let sequence_number = SequenceNumber::parse(&form.sequence_number).ok();

    match state
        .vendors()
        .insert(sequence_number, form.details.clone())
        .await
    {
        Ok(record) => {
            let srno = record.sequence_number.to_string();
            add_breadcrumb("vendors", "Vendor added", Some(&[("srno", srno.as_str())]));
            Redirect::to("/dashboard?notice=added").into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            let next = match &e {
                VendorError::DuplicateSequence { next, .. } => NextSequence::Known(*next),
                _ => NextSequence::Scan,
            };
            let notice = failure_notice(&e, messages::ADD_FAILED);
            let params = ListingParams {
                q: String::new(),
                page: 1,
                notice: None,
            };
            let template =
                render_dashboard(&state, &params, &form.details, next, Some(notice)).await;
            (status, template).into_response()
        }
    }
}

fn status_for(error: &VendorError) -> StatusCode {
    match error {
        VendorError::Validation(_) => StatusCode::BAD_REQUEST,
        VendorError::DuplicateSequence { .. } => StatusCode::CONFLICT,
        VendorError::NotFound(_) => StatusCode::NOT_FOUND,
        VendorError::Store(e) => {
            tracing::error!(error = %e, "Vendor write failed");
            StatusCode::BAD_GATEWAY
        }
    }
}

// =============================================================================
// Edit
// =============================================================================

/// `GET /dashboard/vendors/{srno}/edit`
pub async fn edit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
) -> Response {
    let Ok(sequence_number) = SequenceNumber::parse(&srno) else {
        return Redirect::to("/dashboard").into_response();
    };

    match state.vendors().get(sequence_number).await {
        Ok(vendor) => VendorEditTemplate {
            sequence_number,
            fields: form_fields(&vendor.details),
            notice: None,
        }
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            let notice = failure_notice(&e, messages::UPDATE_FAILED);
            (
                status,
                VendorEditTemplate {
                    sequence_number,
                    fields: form_fields(&VendorDetails::default()),
                    notice: Some(notice),
                },
            )
                .into_response()
        }
    }
}

/// `POST /dashboard/vendors/{srno}`: overwrite every detail field.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
    Form(details): Form<VendorDetails>,
) -> Response {
    let Ok(sequence_number) = SequenceNumber::parse(&srno) else {
        return Redirect::to("/dashboard").into_response();
    };

    match state
        .vendors()
        .update(VendorRecord::new(sequence_number, details.clone()))
        .await
    {
        Ok(_) => {
            add_breadcrumb("vendors", "Vendor updated", Some(&[("srno", srno.as_str())]));
            Redirect::to("/dashboard?notice=updated").into_response()
        }
        Err(e) => (
            status_for(&e),
            VendorEditTemplate {
                sequence_number,
                fields: form_fields(&details),
                notice: Some(failure_notice(&e, messages::UPDATE_FAILED)),
            },
        )
            .into_response(),
    }
}

// =============================================================================
// Delete
// =============================================================================

/// `GET /dashboard/vendors/{srno}/delete`: confirmation step.
pub async fn confirm_delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
) -> Response {
    let Ok(sequence_number) = SequenceNumber::parse(&srno) else {
        return Redirect::to("/dashboard").into_response();
    };

    match state.vendors().get(sequence_number).await {
        Ok(vendor) => VendorDeleteTemplate { vendor }.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, srno = %sequence_number, "Vendor to delete not readable");
            Redirect::to("/dashboard?notice=delete_failed").into_response()
        }
    }
}

/// `POST /dashboard/vendors/{srno}/delete`
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
) -> Redirect {
    let Ok(sequence_number) = SequenceNumber::parse(&srno) else {
        return Redirect::to("/dashboard?notice=delete_failed");
    };

    match state.vendors().delete(sequence_number).await {
        Ok(()) => {
            add_breadcrumb("vendors", "Vendor deleted", Some(&[("srno", srno.as_str())]));
            Redirect::to("/dashboard?notice=deleted")
        }
        Err(e) => {
            tracing::error!(error = %e, srno = %sequence_number, "Vendor delete failed");
            Redirect::to("/dashboard?notice=delete_failed")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_in_order() {
        let details = VendorDetails {
            chemical_name: "Acetone".to_string(),
            country: "India".to_string(),
            ..VendorDetails::default()
        };
        let fields = form_fields(&details);

        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0].name, "chemical_name");
        assert_eq!(fields[0].value, "Acetone");
        assert_eq!(fields[4].label, "Email / Link");
        assert_eq!(fields[7].value, "India");
    }

    #[test]
    fn test_notice_keys() {
        assert_eq!(
            notice_for("added"),
            Some(Notice::Success(messages::ADDED.to_string()))
        );
        assert!(notice_for("delete_failed").unwrap().is_error());
        assert!(notice_for("bogus").is_none());
    }

    #[test]
    fn test_add_form_parses_hidden_sequence() {
        let form: AddVendorForm = serde_json::from_value(serde_json::json!({
            "sequence_number": "8",
            "chemical_name": "Acetone",
            "country": "India",
        }))
        .unwrap();

        assert_eq!(form.sequence_number, "8");
        assert_eq!(form.details.chemical_name, "Acetone");
        assert_eq!(form.details.category, "");
    }
}
