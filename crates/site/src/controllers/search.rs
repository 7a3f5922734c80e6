//! Debounced, paginated vendor search for interactive clients.
//!
//! A [`SearchController`] owns the query box and pager for one listing. Query
//! edits wait for typing to settle before fetching; page changes fetch at once.
//! Every fetch carries a token from a monotonic counter and its result is
//! applied only if no newer fetch has been issued since. In-flight fetches are
//! never cancelled, only ignored.
//!
//! State is published through a `watch` channel so any number of observers can
//! render it.
//!
//! All methods that start work spawn Tokio tasks and must be called from within
//! a runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use elate_chem_core::{PageWindow, SearchMode, SequenceNumber, VendorRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::services::VendorService;

/// Where a listing is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing requested yet, or a blank public query.
    Idle,
    /// A fetch is in flight (or a query edit is waiting to settle).
    Loading,
    /// `results` holds the latest fetched page.
    Ready,
    /// The latest fetch failed; `results` is empty.
    Failed,
}

/// Snapshot of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Query box contents, untrimmed.
    pub query: String,
    pub window: PageWindow,
    pub results: Vec<VendorRecord>,
    pub status: SearchStatus,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            window: PageWindow::first(),
            results: Vec::new(),
            status: SearchStatus::Idle,
        }
    }
}

struct Inner {
    service: VendorService,
    mode: SearchMode,
    latest: AtomicU64,
    state: watch::Sender<SearchState>,
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn cancel_debounce(&self) {
        if let Some(timer) = self
            .debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
    }

    /// Issue a fetch for `page` of the current query.
    fn fetch(self: &Arc<Self>, page: u64) {
        let mut issued = None;
        self.state.send_modify(|state| {
            let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            state.window = state.window.requesting(page);
            state.status = SearchStatus::Loading;
            issued = Some((token, state.query.clone()));
        });
        let Some((token, query)) = issued else {
            return;
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.service.search(inner.mode, &query, page).await;
            inner.state.send_if_modified(|state| {
                if inner.latest.load(Ordering::SeqCst) != token {
                    debug!(token, "Dropping superseded search result");
                    return false;
                }
                match result {
                    Ok(page) => {
                        state.window = page.window;
                        state.results = page.results;
                        state.status = SearchStatus::Ready;
                    }
                    Err(e) => {
                        error!(error = %e, query = %query, "Vendor search failed");
                        state.results.clear();
                        state.status = SearchStatus::Failed;
                    }
                }
                true
            });
        });
    }
}

/// Debounced search over one vendor listing.
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    #[must_use]
    pub fn new(service: VendorService, mode: SearchMode) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                service,
                mode,
                latest: AtomicU64::new(0),
                state,
                debounce: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn mode(&self) -> SearchMode {
        self.inner.mode
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Replace the query and go back to page 1.
    ///
    /// The fetch starts once no further edit arrives within the listing's
    /// debounce interval. A blank public query clears the results at once and
    /// never fetches.
    pub fn set_query(&self, raw: impl Into<String>) {
        let raw = raw.into();
        self.inner.cancel_debounce();

        let blank_public = raw.trim().is_empty() && !self.inner.mode.empty_query_matches_all();
        self.inner.state.send_modify(|state| {
            // Anything still in flight belongs to an older query.
            self.inner.latest.fetch_add(1, Ordering::SeqCst);
            state.query = raw;
            state.window = PageWindow::first();
            if blank_public {
                state.results.clear();
                state.status = SearchStatus::Idle;
            } else {
                state.status = SearchStatus::Loading;
            }
        });
        if blank_public {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.mode.debounce()).await;
            inner.fetch(1);
        });
        *self
            .inner
            .debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(timer);
    }

    /// Move to another page and fetch it immediately.
    ///
    /// The page is clamped to the totals from the last fetch. Asking for the
    /// page already shown does nothing.
    pub fn set_page(&self, page: u64) {
        let (current, target) = {
            let state = self.inner.state.borrow();
            (state.window.page(), state.window.with_page(page).page())
        };
        if target == current {
            return;
        }
        self.inner.cancel_debounce();
        self.inner.fetch(target);
    }

    pub fn next_page(&self) {
        self.set_page(self.state().window.page().saturating_add(1));
    }

    pub fn previous_page(&self) {
        self.set_page(self.state().window.page().saturating_sub(1));
    }

    /// Fetch the current page of the current query now, skipping the debounce.
    ///
    /// Used for the initial load of the admin listing. A blank public query
    /// still fetches nothing.
    pub fn refresh(&self) {
        self.inner.cancel_debounce();
        let (blank_public, page) = {
            let state = self.inner.state.borrow();
            (
                state.query.trim().is_empty() && !self.inner.mode.empty_query_matches_all(),
                state.window.page(),
            )
        };
        if !blank_public {
            self.inner.fetch(page);
        }
    }

    /// A handle for patching the displayed rows after mutations.
    #[must_use]
    pub fn listing(&self) -> ListingHandle {
        ListingHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.inner.cancel_debounce();
    }
}

/// Local edits to a controller's displayed rows.
///
/// These patch the page in place without refetching, so totals and paging
/// are left as they were.
#[derive(Clone)]
pub struct ListingHandle {
    inner: Arc<Inner>,
}

impl ListingHandle {
    /// Replace the row with the same sequence number. Returns whether a row
    /// was replaced.
    pub fn splice(&self, record: &VendorRecord) -> bool {
        self.inner.state.send_if_modified(|state| {
            let Some(slot) = state
                .results
                .iter_mut()
                .find(|row| row.sequence_number == record.sequence_number)
            else {
                return false;
            };
            *slot = record.clone();
            true
        })
    }

    /// Remove the row with this sequence number. Returns whether a row was
    /// removed.
    pub fn remove(&self, sequence_number: SequenceNumber) -> bool {
        self.inner.state.send_if_modified(|state| {
            let before = state.results.len();
            state.results.retain(|row| row.sequence_number != sequence_number);
            state.results.len() != before
        })
    }

    /// The currently displayed rows.
    #[must_use]
    pub fn rows(&self) -> Vec<VendorRecord> {
        self.inner.state.borrow().results.clone()
    }

    /// Look up a displayed row.
    #[must_use]
    pub fn find(&self, sequence_number: SequenceNumber) -> Option<VendorRecord> {
        self.inner
            .state
            .borrow()
            .results
            .iter()
            .find(|row| row.sequence_number == sequence_number)
            .cloned()
    }
}
