//! Wire types for the hosted data and auth APIs.
//!
//! The data API exposes the vendor table with its original column names, which
//! are kept here and converted to the domain types in `elate_chem_core`.

use elate_chem_core::{SequenceNumber, VendorDetails, VendorRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::store::StoreError;

/// Treat a JSON `null` column as an empty string.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The editable vendor columns, as named in `vendors_list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorColumns {
    #[serde(rename = "Chemicalname", default, deserialize_with = "nullable_string")]
    pub chemical_name: String,
    #[serde(rename = "Category", default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(rename = "Casno", default, deserialize_with = "nullable_string")]
    pub cas_number: String,
    #[serde(rename = "Suppliername", default, deserialize_with = "nullable_string")]
    pub supplier_name: String,
    #[serde(rename = "Email&link", default, deserialize_with = "nullable_string")]
    pub contact_info: String,
    #[serde(rename = "Phoneno", default, deserialize_with = "nullable_string")]
    pub phone_number: String,
    #[serde(rename = "Businessstatus", default, deserialize_with = "nullable_string")]
    pub business_status: String,
    #[serde(rename = "Country", default, deserialize_with = "nullable_string")]
    pub country: String,
}

/// A full `vendors_list` row.
///
/// `Srno` is kept as raw JSON because older rows hold it as a number and newer
/// rows as a string, and a few hold neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRow {
    #[serde(rename = "Srno", default)]
    pub srno: Option<Value>,
    #[serde(flatten)]
    pub columns: VendorColumns,
}

/// A `select=Srno` scan row.
#[derive(Debug, Deserialize)]
pub struct SrnoRow {
    #[serde(rename = "Srno", default)]
    pub srno: Option<Value>,
}

/// The stored text of a `Srno` value, if it has one.
#[must_use]
pub fn raw_srno(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<VendorDetails> for VendorColumns {
    fn from(d: VendorDetails) -> Self {
        Self {
            chemical_name: d.chemical_name,
            category: d.category,
            cas_number: d.cas_number,
            supplier_name: d.supplier_name,
            contact_info: d.contact_info,
            phone_number: d.phone_number,
            business_status: d.business_status,
            country: d.country,
        }
    }
}

impl From<VendorColumns> for VendorDetails {
    fn from(c: VendorColumns) -> Self {
        Self {
            chemical_name: c.chemical_name,
            category: c.category,
            cas_number: c.cas_number,
            supplier_name: c.supplier_name,
            contact_info: c.contact_info,
            phone_number: c.phone_number,
            business_status: c.business_status,
            country: c.country,
        }
    }
}

impl From<&VendorRecord> for VendorRow {
    fn from(record: &VendorRecord) -> Self {
        Self {
            srno: Some(Value::String(record.sequence_number.to_string())),
            columns: record.details.clone().into(),
        }
    }
}

impl TryFrom<VendorRow> for VendorRecord {
    type Error = StoreError;

    fn try_from(row: VendorRow) -> Result<Self, Self::Error> {
        let raw = raw_srno(row.srno.as_ref())
            .ok_or_else(|| StoreError::Parse("vendor row has no Srno".to_string()))?;
        let sequence_number = SequenceNumber::parse(&raw)
            .map_err(|e| StoreError::Parse(format!("vendor row Srno: {e}")))?;
        Ok(Self::new(sequence_number, row.columns.into()))
    }
}

/// Error body returned by the data API.
#[derive(Debug, Default, Deserialize)]
pub struct PostgrestError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Read the total from a `Content-Range` header such as `0-9/57` or `*/0`.
#[must_use]
pub fn parse_total_count(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Credentials body for sign-in and sign-up.
#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// User object returned by the auth API.
#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response from the password grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: GoTrueUser,
}

/// Response from sign-up.
///
/// With email confirmation enabled the user object is returned at the top
/// level; with auto-confirm it is nested beside a session.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    WithSession { user: GoTrueUser },
    User(GoTrueUser),
}

impl SignUpResponse {
    #[must_use]
    pub fn into_user(self) -> GoTrueUser {
        match self {
            Self::WithSession { user } | Self::User(user) => user,
        }
    }
}

/// Error body returned by the auth API. Field names vary across versions.
#[derive(Debug, Default, Deserialize)]
pub struct GoTrueError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GoTrueError {
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
    }
}
