//! Data API (PostgREST) implementation of the store traits.

use async_trait::async_trait;
use elate_chem_core::{ResultOrder, SequenceNumber, VendorQuery, VendorRecord};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::SupabaseClient;
use super::types::{
    PostgrestError, SrnoRow, UNIQUE_VIOLATION, VendorColumns, VendorRow, parse_total_count,
    raw_srno,
};
use crate::models::{ContactSubmission, SearchRequest, UserProfile};
use crate::store::{CountedPage, LeadStore, StoreError, StoreResult, VendorStore};

const VENDORS: &str = "vendors_list";
const SEARCH_REQUESTS: &str = "search_requests";
const CONTACT_SUBMISSIONS: &str = "contact_submissions";
const USERS: &str = "users";

/// Rows requested per page of the sequence-number scan.
const SCAN_BATCH: u64 = 1000;

/// Build the `or=` filter matching CAS number or chemical name.
///
/// The needle is double-quoted so commas and parentheses in it are literal.
fn match_filter(needle: &str) -> String {
    let quoted = needle.replace('\\', "\\\\").replace('"', "\\\"");
    format!("(Casno.ilike.\"*{quoted}*\",Chemicalname.ilike.\"*{quoted}*\")")
}

fn srno_eq(sequence_number: SequenceNumber) -> String {
    format!("eq.{sequence_number}")
}

/// Convert a non-success response into a `StoreError`.
async fn error_from(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed: PostgrestError = serde_json::from_str(&body).unwrap_or_default();

    if status == StatusCode::CONFLICT.as_u16() || parsed.code.as_deref() == Some(UNIQUE_VIOLATION)
    {
        return StoreError::Conflict(parsed.details.or(parsed.message).unwrap_or(body));
    }

    StoreError::Api {
        status,
        message: parsed.message.unwrap_or(body),
    }
}

fn into_records(rows: Vec<VendorRow>) -> Vec<VendorRecord> {
    rows.into_iter()
        .filter_map(|row| match VendorRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable vendor row");
                None
            }
        })
        .collect()
}

impl SupabaseClient {
    async fn insert_row<T: Serialize + Sync>(&self, relation: &str, row: &T) -> StoreResult<()> {
        let response = self
            .client
            .post(self.rest(relation)?)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl VendorStore for SupabaseClient {
    #[instrument(skip(self), fields(needle = ?query.needle, start = query.range.start))]
    async fn search(&self, query: &VendorQuery) -> StoreResult<CountedPage> {
        let mut request = self
            .client
            .get(self.rest(VENDORS)?)
            .header("Prefer", "count=exact")
            .query(&[("select", "*")])
            .query(&[("offset", query.range.start), ("limit", query.range.len())]);

        if let Some(needle) = &query.needle {
            request = request.query(&[("or", match_filter(needle))]);
        }
        if query.order == ResultOrder::SequenceAscending {
            request = request.query(&[("order", "Srno.asc")]);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let header_total = content_range.as_deref().and_then(parse_total_count);

        // Offset past the end of the matching rows; the header still carries the total.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(CountedPage {
                rows: Vec::new(),
                total_count: header_total.unwrap_or(0),
            });
        }

        if !status.is_success() {
            return Err(error_from(response).await);
        }

        let rows: Vec<VendorRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        let rows = into_records(rows);
        let total_count = header_total.unwrap_or_else(|| {
            warn!(?content_range, "Missing exact count, using page length");
            query.range.start + rows.len() as u64
        });

        Ok(CountedPage { rows, total_count })
    }

    /// Pages through `select=Srno` until an empty page comes back. The server
    /// caps each response (`db-max-rows`), so a short page is not the end.
    #[instrument(skip(self))]
    async fn sequence_numbers(&self) -> StoreResult<Vec<String>> {
        let mut srnos = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let response = self
                .client
                .get(self.rest(VENDORS)?)
                .query(&[("select", "Srno"), ("order", "Srno.asc")])
                .query(&[("offset", offset), ("limit", SCAN_BATCH)])
                .send()
                .await?;

            if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
                break;
            }
            if !response.status().is_success() {
                return Err(error_from(response).await);
            }

            let rows: Vec<SrnoRow> = response
                .json()
                .await
                .map_err(|e| StoreError::Parse(e.to_string()))?;
            if rows.is_empty() {
                break;
            }

            offset += rows.len() as u64;
            srnos.extend(rows.iter().filter_map(|row| raw_srno(row.srno.as_ref())));
        }

        debug!(rows = offset, "Scanned sequence numbers");
        Ok(srnos)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, sequence_number: SequenceNumber) -> StoreResult<VendorRecord> {
        let response = self
            .client
            .get(self.rest(VENDORS)?)
            .query(&[("select", "*".to_string()), ("Srno", srno_eq(sequence_number))])
            .query(&[("limit", 1)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let rows: Vec<VendorRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(StoreError::NotFound)
            .and_then(VendorRecord::try_from)
    }

    #[instrument(skip(self, record), fields(srno = %record.sequence_number))]
    async fn insert(&self, record: &VendorRecord) -> StoreResult<()> {
        self.insert_row(VENDORS, &VendorRow::from(record)).await
    }

    #[instrument(skip(self, record), fields(srno = %record.sequence_number))]
    async fn update(&self, record: &VendorRecord) -> StoreResult<()> {
        let response = self
            .client
            .patch(self.rest(VENDORS)?)
            .query(&[("Srno", srno_eq(record.sequence_number))])
            .header("Prefer", "return=representation")
            .json(&VendorColumns::from(record.details.clone()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let updated: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        if updated.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, sequence_number: SequenceNumber) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.rest(VENDORS)?)
            .query(&[("Srno", srno_eq(sequence_number))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let response = self
            .client
            .get(self.rest(VENDORS)?)
            .query(&[("select", "Srno"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for SupabaseClient {
    #[instrument(skip(self, request))]
    async fn record_search_request(&self, request: &SearchRequest) -> StoreResult<()> {
        self.insert_row(SEARCH_REQUESTS, request).await
    }

    #[instrument(skip(self, submission))]
    async fn record_contact(&self, submission: &ContactSubmission) -> StoreResult<()> {
        self.insert_row(CONTACT_SUBMISSIONS, submission).await
    }

    #[instrument(skip(self, profile))]
    async fn create_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.insert_row(USERS, profile).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::Query;
    use axum::http::header::CONTENT_RANGE;
    use axum::routing::get;
    use axum::{Json, Router};
    use elate_chem_core::{PAGE_SIZE, RowRange, SearchMode, VendorDetails};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use url::Url;

    use super::*;
    use crate::config::StoreConfig;

    type Params = Query<HashMap<String, String>>;

    /// Serve `router` as a stand-in data API and point a client at it.
    async fn client_for(router: Router) -> SupabaseClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        SupabaseClient::new(&StoreConfig {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            anon_key: SecretString::from("test-anon-key"),
        })
        .unwrap()
    }

    fn row(srno: u64, name: &str) -> Value {
        json!({
            "Srno": srno.to_string(),
            "Chemicalname": name,
            "Category": "Solvent",
            "Casno": "67-64-1",
            "Suppliername": "Acme",
            "Email&link": "sales@acme.test",
            "Phoneno": "555",
            "Businessstatus": "Trader",
            "Country": null,
        })
    }

    fn param(params: &HashMap<String, String>, key: &str) -> Option<usize> {
        params.get(key).and_then(|v| v.parse().ok())
    }

    #[tokio::test]
    async fn test_sequence_scan_pages_past_row_cap() {
        const TOTAL: usize = 1500;
        const MAX_ROWS: usize = 1000;

        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            get(move |Query(params): Params| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let offset = param(&params, "offset").unwrap_or(0);
                let limit = param(&params, "limit").unwrap_or(usize::MAX).min(MAX_ROWS);
                let rows: Vec<Value> = (1..=TOTAL)
                    .skip(offset)
                    .take(limit)
                    .map(|n| json!({ "Srno": n.to_string() }))
                    .collect();
                Json(rows)
            }),
        );
        let client = client_for(router).await;

        let srnos = client.sequence_numbers().await.unwrap();
        assert_eq!(srnos.len(), TOTAL);
        assert_eq!(
            SequenceNumber::next_after(srnos),
            SequenceNumber::new(1501)
        );
        assert_eq!(requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_sequence_scan_keeps_unparsed_values() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            get(|Query(params): Params| async move {
                let rows = if param(&params, "offset") == Some(0) {
                    json!([{ "Srno": 4 }, { "Srno": "12" }, { "Srno": "n/a" }, { "Srno": null }])
                } else {
                    json!([])
                };
                Json(rows)
            }),
        );
        let client = client_for(router).await;

        let srnos = client.sequence_numbers().await.unwrap();
        assert_eq!(srnos, vec!["4", "12", "n/a"]);
        assert_eq!(SequenceNumber::next_after(srnos), SequenceNumber::new(13));
    }

    #[tokio::test]
    async fn test_search_reads_exact_count() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            get(|Query(params): Params| async move {
                assert_eq!(params.get("order").map(String::as_str), Some("Srno.asc"));
                assert_eq!(param(&params, "offset"), Some(10));
                assert_eq!(param(&params, "limit"), Some(10));
                let rows: Vec<Value> = (11..=20).map(|n| row(n, "Acetone")).collect();
                ([(CONTENT_RANGE, "10-19/57")], Json(rows))
            }),
        );
        let client = client_for(router).await;
        let query = SearchMode::AdminListing
            .query("", RowRange::for_page(2, PAGE_SIZE))
            .unwrap();

        let page = client.search(&query).await.unwrap();
        assert_eq!(page.total_count, 57);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].sequence_number, SequenceNumber::new(11));
        assert_eq!(page.rows[0].details.country, "");
    }

    #[tokio::test]
    async fn test_search_past_end_keeps_total() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            get(|| async {
                (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(CONTENT_RANGE, "*/57")],
                    Json(json!({
                        "code": "PGRST103",
                        "message": "Requested range not satisfiable",
                    })),
                )
            }),
        );
        let client = client_for(router).await;
        let query = SearchMode::Public
            .query("acet", RowRange::for_page(9, PAGE_SIZE))
            .unwrap();

        let page = client.search(&query).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 57);
    }

    #[tokio::test]
    async fn test_insert_unique_violation_is_conflict() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            axum::routing::post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": "23505",
                        "message": "duplicate key value violates unique constraint",
                        "details": "Key (\"Srno\")=(8) already exists.",
                    })),
                )
            }),
        );
        let client = client_for(router).await;
        let record = VendorRecord::new(SequenceNumber::new(8), VendorDetails::default());

        match client.insert(&record).await {
            Err(StoreError::Conflict(detail)) => assert!(detail.contains("already exists")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_failures_are_api_errors() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            axum::routing::delete(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "code": "XX000", "message": "boom" })),
                )
            }),
        );
        let client = client_for(router).await;

        match client.delete(SequenceNumber::new(3)).await {
            Err(StoreError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_and_fetch_of_missing_vendor() {
        let router = Router::new().route(
            "/rest/v1/vendors_list",
            get(|| async { Json(json!([])) }).patch(|| async { Json(json!([])) }),
        );
        let client = client_for(router).await;
        let record = VendorRecord::new(SequenceNumber::new(99), VendorDetails::default());

        assert!(matches!(
            client.update(&record).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            client.fetch(SequenceNumber::new(99)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_match_filter_plain() {
        assert_eq!(
            match_filter("acet"),
            r#"(Casno.ilike."*acet*",Chemicalname.ilike."*acet*")"#
        );
    }

    #[test]
    fn test_match_filter_quotes_reserved_characters() {
        assert_eq!(
            match_filter(r#"1,2-"di"\x"#),
            r#"(Casno.ilike."*1,2-\"di\"\\x*",Chemicalname.ilike."*1,2-\"di\"\\x*")"#
        );
    }

    #[test]
    fn test_srno_eq() {
        assert_eq!(srno_eq(SequenceNumber::new(42)), "eq.42");
    }
}
