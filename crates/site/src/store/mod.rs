//! Backend seams for the hosted data store and identity provider.
//!
//! Handlers, services, and controllers depend on these traits rather than on a
//! concrete client, so the production `supabase` client and the in-memory
//! backend are interchangeable. Instances are constructed explicitly and passed
//! in; there is no process-wide client.
//!
//! # Relations
//!
//! - `vendors_list` - the vendor directory (read, insert, update, delete)
//! - `search_requests` - "not found" leads (append-only)
//! - `contact_submissions` - contact form messages (append-only)
//! - `users` - visitor profiles written at registration (append-only)

mod error;
#[cfg(any(test, feature = "memory-store"))]
pub mod memory;

pub use error::{AuthError, StoreError, StoreResult};

use std::sync::Arc;

use async_trait::async_trait;
use elate_chem_core::{SequenceNumber, VendorQuery, VendorRecord};

use crate::config::StoreConfig;
use crate::models::{ContactSubmission, SearchRequest, UserProfile};
use crate::supabase::SupabaseClient;

/// One page of vendor rows plus the exact number of rows matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountedPage {
    pub rows: Vec<VendorRecord>,
    pub total_count: u64,
}

/// Vendor directory storage.
#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Filtered, exactly-counted, range-paged vendor query.
    async fn search(&self, query: &VendorQuery) -> StoreResult<CountedPage>;

    /// Every stored sequence number, as stored (unparsed).
    ///
    /// This is a full scan and is not bounded by paging.
    async fn sequence_numbers(&self) -> StoreResult<Vec<String>>;

    /// Read a single vendor.
    ///
    /// Returns `StoreError::NotFound` when no row has this sequence number.
    async fn fetch(&self, sequence_number: SequenceNumber) -> StoreResult<VendorRecord>;

    /// Insert a new vendor.
    ///
    /// Returns `StoreError::Conflict` if the sequence number is already taken.
    async fn insert(&self, record: &VendorRecord) -> StoreResult<()>;

    /// Overwrite every detail field of the vendor with this sequence number.
    ///
    /// Returns `StoreError::NotFound` when no row has this sequence number.
    async fn update(&self, record: &VendorRecord) -> StoreResult<()>;

    /// Delete the vendor with this sequence number. Deleting a missing
    /// vendor succeeds.
    async fn delete(&self, sequence_number: SequenceNumber) -> StoreResult<()>;

    /// Cheap reachability probe for readiness checks.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Append-only lead and profile storage.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn record_search_request(&self, request: &SearchRequest) -> StoreResult<()>;

    async fn record_contact(&self, submission: &ContactSubmission) -> StoreResult<()>;

    async fn create_user_profile(&self, profile: &UserProfile) -> StoreResult<()>;
}

/// A visitor account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// A signed-in visitor and their provider access token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: secrecy::SecretString,
}

/// Email/password visitor identity, separate from the admin gate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Create an account. The provider may require email verification before
    /// the account can sign in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Revoke a session's access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// The three backend seams, bundled for wiring.
#[derive(Clone)]
pub struct Backend {
    pub vendors: Arc<dyn VendorStore>,
    pub leads: Arc<dyn LeadStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backend {
    /// The hosted backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the client cannot be built from the config.
    pub fn supabase(config: &StoreConfig) -> StoreResult<Self> {
        let client = Arc::new(SupabaseClient::new(config)?);
        Ok(Self {
            vendors: client.clone(),
            leads: client.clone(),
            identity: client,
        })
    }

    /// A shared in-memory backend.
    #[cfg(any(test, feature = "memory-store"))]
    #[must_use]
    pub fn memory(backend: Arc<memory::MemoryBackend>) -> Self {
        Self {
            vendors: backend.clone(),
            leads: backend.clone(),
            identity: backend,
        }
    }
}
