//! Admin vendor API.
//!
//! Every handler takes [`RequireAdmin`], so requests without the flag cookie
//! get a 401 before anything reaches the store.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use elate_chem_core::{SearchMode, SequenceNumber, VendorDetails, VendorRecord};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::routes::paging::ListingParams;
use crate::state::AppState;

/// A page of the admin listing.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub query: String,
    pub page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub results: Vec<VendorRecord>,
}

/// The sequence number the next insert would use.
#[derive(Debug, Serialize)]
pub struct NextSequenceResponse {
    pub sequence_number: SequenceNumber,
}

/// A single vendor after a write.
#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub success: bool,
    pub vendor: VendorRecord,
}

/// Acknowledgement for a delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// `?confirm=true` on a delete.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

fn parse_srno(raw: &str) -> Result<SequenceNumber> {
    SequenceNumber::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// `GET /api/admin/vendors?q=&page=`
///
/// # Errors
///
/// Returns a 502 if the store request fails.
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingResponse>> {
    let page = state
        .vendors()
        .search(SearchMode::AdminListing, &params.q, params.page)
        .await?;

    Ok(Json(ListingResponse {
        page: page.window.page(),
        total_pages: page.window.total_pages(),
        total_count: page.window.total_count(),
        results: page.results,
        query: page.query,
    }))
}

/// `GET /api/admin/vendors/next-srno`
///
/// # Errors
///
/// Returns a 502 if the scan fails.
pub async fn next_srno(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<NextSequenceResponse>> {
    let sequence_number = state.vendors().next_sequence_number().await?;
    Ok(Json(NextSequenceResponse { sequence_number }))
}

/// `POST /api/admin/vendors`: insert under a freshly scanned sequence number.
///
/// # Errors
///
/// Returns 400 for blank fields, 409 if another writer took the number.
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(details): Json<VendorDetails>,
) -> Result<(StatusCode, Json<VendorResponse>)> {
    let vendor = state.vendors().insert_next(details).await?;
    let srno = vendor.sequence_number.to_string();
    add_breadcrumb("vendors", "Vendor added", Some(&[("srno", srno.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(VendorResponse {
            success: true,
            vendor,
        }),
    ))
}

/// `GET /api/admin/vendors/{srno}`
///
/// # Errors
///
/// Returns 404 for an unknown sequence number.
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
) -> Result<Json<VendorRecord>> {
    let vendor = state.vendors().get(parse_srno(&srno)?).await?;
    Ok(Json(vendor))
}

/// `PUT /api/admin/vendors/{srno}`: overwrite every detail field.
///
/// Responds with the stored row as read back after the write.
///
/// # Errors
///
/// Returns 400 for blank fields, 404 for an unknown sequence number.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
    Json(details): Json<VendorDetails>,
) -> Result<Json<VendorResponse>> {
    let sequence_number = parse_srno(&srno)?;
    let updated = state
        .vendors()
        .update(VendorRecord::new(sequence_number, details))
        .await?;
    add_breadcrumb("vendors", "Vendor updated", Some(&[("srno", srno.as_str())]));

    Ok(Json(VendorResponse {
        success: true,
        vendor: updated.record,
    }))
}

/// `DELETE /api/admin/vendors/{srno}?confirm=true`
///
/// # Errors
///
/// Returns 400 without `confirm=true`, 502 if the store request fails.
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(srno): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeleteResponse>> {
    let sequence_number = parse_srno(&srno)?;
    if !query.confirm {
        return Err(AppError::BadRequest(
            "Deleting a vendor requires confirm=true".to_string(),
        ));
    }

    state.vendors().delete(sequence_number).await?;
    add_breadcrumb("vendors", "Vendor deleted", Some(&[("srno", srno.as_str())]));

    Ok(Json(DeleteResponse { success: true }))
}
