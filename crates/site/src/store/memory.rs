//! In-memory backend for tests and local demos.
//!
//! Implements every backend trait against process-local state, with hooks to
//! slow down or fail store calls and to inspect what was queried.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use elate_chem_core::{ResultOrder, SequenceNumber, VendorQuery, VendorRecord};
use secrecy::SecretString;
use uuid::Uuid;

use super::{
    AuthError, AuthSession, AuthUser, CountedPage, IdentityProvider, LeadStore, StoreError,
    StoreResult, VendorStore,
};
use crate::models::{ContactSubmission, SearchRequest, UserProfile};

#[derive(Default)]
struct MemoryState {
    vendors: Vec<VendorRecord>,
    search_requests: Vec<SearchRequest>,
    contacts: Vec<ContactSubmission>,
    profiles: Vec<UserProfile>,
    users: Vec<(AuthUser, String)>,
    tokens: HashSet<String>,
}

/// Process-local stand-in for the hosted backend.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    searches: Mutex<Vec<VendorQuery>>,
    search_delays: Mutex<VecDeque<Duration>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-loaded with vendors, kept in the given order.
    #[must_use]
    pub fn with_vendors(vendors: impl IntoIterator<Item = VendorRecord>) -> Self {
        let backend = Self::default();
        backend.lock().vendors = vendors.into_iter().collect();
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current vendor rows in storage order.
    #[must_use]
    pub fn vendors(&self) -> Vec<VendorRecord> {
        self.lock().vendors.clone()
    }

    /// Every query passed to `search`, oldest first.
    #[must_use]
    pub fn searches(&self) -> Vec<VendorQuery> {
        self.searches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Delay the next searches by these amounts, one per call.
    pub fn delay_searches(&self, delays: impl IntoIterator<Item = Duration>) {
        self.search_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(delays);
    }

    /// Make every read (search, scan, fetch) fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write (insert, update, delete, lead) fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Register a visitor account that can sign in immediately.
    pub fn add_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
        };
        self.lock().users.push((user.clone(), password.to_owned()));
        user
    }

    #[must_use]
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.lock().search_requests.clone()
    }

    #[must_use]
    pub fn contacts(&self) -> Vec<ContactSubmission> {
        self.lock().contacts.clone()
    }

    #[must_use]
    pub fn profiles(&self) -> Vec<UserProfile> {
        self.lock().profiles.clone()
    }

    /// Whether an access token is still live.
    #[must_use]
    pub fn is_token_active(&self, token: &str) -> bool {
        self.lock().tokens.contains(token)
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VendorStore for MemoryBackend {
    async fn search(&self, query: &VendorQuery) -> StoreResult<CountedPage> {
        self.searches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        let delay = self
            .search_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check_read()?;

        let state = self.lock();
        let mut matching: Vec<&VendorRecord> = state
            .vendors
            .iter()
            .filter(|v| query.needle.as_deref().is_none_or(|needle| v.matches(needle)))
            .collect();

        // `Srno` is a text column, so "10" sorts before "2".
        if query.order == ResultOrder::SequenceAscending {
            matching.sort_by_key(|v| v.sequence_number.to_string());
        }

        let total_count = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(usize::try_from(query.range.start).unwrap_or(usize::MAX))
            .take(usize::try_from(query.range.len()).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(CountedPage { rows, total_count })
    }

    async fn sequence_numbers(&self) -> StoreResult<Vec<String>> {
        self.check_read()?;
        Ok(self
            .lock()
            .vendors
            .iter()
            .map(|v| v.sequence_number.to_string())
            .collect())
    }

    async fn fetch(&self, sequence_number: SequenceNumber) -> StoreResult<VendorRecord> {
        self.check_read()?;
        self.lock()
            .vendors
            .iter()
            .find(|v| v.sequence_number == sequence_number)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, record: &VendorRecord) -> StoreResult<()> {
        self.check_write()?;
        let mut state = self.lock();
        if state
            .vendors
            .iter()
            .any(|v| v.sequence_number == record.sequence_number)
        {
            return Err(StoreError::Conflict(format!(
                "Key (Srno)=({}) already exists.",
                record.sequence_number
            )));
        }
        state.vendors.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &VendorRecord) -> StoreResult<()> {
        self.check_write()?;
        let mut state = self.lock();
        let existing = state
            .vendors
            .iter_mut()
            .find(|v| v.sequence_number == record.sequence_number)
            .ok_or(StoreError::NotFound)?;
        existing.details = record.details.clone();
        Ok(())
    }

    async fn delete(&self, sequence_number: SequenceNumber) -> StoreResult<()> {
        self.check_write()?;
        self.lock()
            .vendors
            .retain(|v| v.sequence_number != sequence_number);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.check_read()
    }
}

#[async_trait]
impl LeadStore for MemoryBackend {
    async fn record_search_request(&self, request: &SearchRequest) -> StoreResult<()> {
        self.check_write()?;
        self.lock().search_requests.push(request.clone());
        Ok(())
    }

    async fn record_contact(&self, submission: &ContactSubmission) -> StoreResult<()> {
        self.check_write()?;
        self.lock().contacts.push(submission.clone());
        Ok(())
    }

    async fn create_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.check_write()?;
        self.lock().profiles.push(profile.clone());
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter()
            .find(|(user, stored)| user.email.eq_ignore_ascii_case(email) && stored == password)
            .map(|(user, _)| user.clone())
            .ok_or(AuthError::InvalidCredentials)?;

        let token = Uuid::new_v4().to_string();
        state.tokens.insert(token.clone());
        Ok(AuthSession {
            user,
            access_token: SecretString::from(token),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if self
            .lock()
            .users
            .iter()
            .any(|(user, _)| user.email.eq_ignore_ascii_case(email))
        {
            return Err(AuthError::UserAlreadyExists);
        }
        Ok(self.add_user(email, password))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.lock().tokens.remove(access_token);
        Ok(())
    }
}
