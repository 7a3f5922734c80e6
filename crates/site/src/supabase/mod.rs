//! Hosted backend client (Supabase).
//!
//! One [`SupabaseClient`] talks to both the PostgREST data API (`/rest/v1`) and
//! the GoTrue auth API (`/auth/v1`) using the project's anon key. It implements
//! [`VendorStore`](crate::store::VendorStore),
//! [`LeadStore`](crate::store::LeadStore) and
//! [`IdentityProvider`](crate::store::IdentityProvider).
//!
//! The client is constructed once at startup and shared through `AppState`.

mod auth;
mod rest;
pub mod types;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use url::Url;

use crate::config::StoreConfig;
use crate::store::StoreError;

/// Client for the hosted data and auth APIs.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: Url,
    auth_url: Url,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StoreError::Parse(format!("Invalid anon key format: {e}")))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| StoreError::Parse(format!("Invalid anon key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("Authorization", bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: join(&config.url, "rest/v1/")?,
            auth_url: join(&config.url, "auth/v1/")?,
        })
    }

    fn rest(&self, relation: &str) -> Result<Url, StoreError> {
        join(&self.rest_url, relation)
    }

    fn auth(&self, path: &str) -> Result<Url, StoreError> {
        join(&self.auth_url, path)
    }
}

/// Join a path onto a base URL, treating the base as a directory.
fn join(base: &Url, path: &str) -> Result<Url, StoreError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
        .map_err(|e| StoreError::Parse(format!("Invalid store URL: {e}")))
}
