//! Lead capture records.
//!
//! These are appended to the store by public forms and never read back by the
//! site. Field names match the store's column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// "We couldn't find it" request submitted from the home page search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub chemical_name: String,
    pub cas_number: String,
    pub contact_info: String,
    /// The search box value at the time of the request.
    pub searched_query: String,
    pub requested_at: DateTime<Utc>,
}

/// Message sent from the contact page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

/// Profile row written when a visitor registers an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub company_name: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
}
