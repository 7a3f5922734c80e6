//! Vendor directory operations shared by the HTTP handlers, the controllers and
//! the CLI.
//!
//! The service is stateless: each call is one request/response exchange with
//! the store (plus, in two documented cases, one follow-up request). Local list
//! state and debouncing belong to the controllers in `crate::controllers`.

use std::sync::Arc;

use elate_chem_core::{
    PageWindow, SearchMode, SequenceNumber, ValidationError, VendorDetails, VendorRecord,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::store::{StoreError, VendorStore};

/// Errors from vendor operations.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The form failed required-field checks; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another writer took this sequence number between the scan and the
    /// insert. `next` is a freshly assigned replacement.
    #[error("sequence number {taken} is already taken")]
    DuplicateSequence {
        taken: SequenceNumber,
        next: SequenceNumber,
    },

    /// No vendor has this sequence number.
    #[error("vendor {0} not found")]
    NotFound(SequenceNumber),

    /// The store could not complete the request.
    #[error("store error: {0}")]
    Store(StoreError),
}

/// One fetched page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Trimmed query this page answers.
    pub query: String,
    pub window: PageWindow,
    pub results: Vec<VendorRecord>,
    /// Whether the store was asked at all (blank public queries skip it).
    pub fetched: bool,
}

/// The outcome of an update: the stored row, or the submitted one when the
/// re-read failed after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedVendor {
    pub record: VendorRecord,
    pub reread: bool,
}

/// Vendor directory operations over a [`VendorStore`].
#[derive(Clone)]
pub struct VendorService {
    store: Arc<dyn VendorStore>,
}

impl VendorService {
    #[must_use]
    pub fn new(store: Arc<dyn VendorStore>) -> Self {
        Self { store }
    }

    /// Fetch one page of a listing.
    ///
    /// A blank public query returns an empty page without touching the store.
    /// If the requested page turns out to be past the end (rows were removed),
    /// the page is clamped and fetched once more.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Store` if the store request fails.
    #[instrument(skip(self), fields(mode = ?mode))]
    pub async fn search(
        &self,
        mode: SearchMode,
        raw_query: &str,
        page: u64,
    ) -> Result<SearchPage, VendorError> {
        let query = raw_query.trim().to_owned();
        let requested = PageWindow::first().requesting(page);

        let Some(store_query) = mode.query(&query, requested.row_range()) else {
            return Ok(SearchPage {
                query,
                ..SearchPage::default()
            });
        };

        let counted = self
            .store
            .search(&store_query)
            .await
            .map_err(VendorError::Store)?;
        let window = requested.with_total(counted.total_count);

        if window.page() == requested.page() {
            return Ok(SearchPage {
                query,
                window,
                results: counted.rows,
                fetched: true,
            });
        }

        info!(
            requested = requested.page(),
            clamped = window.page(),
            "Requested page past the end, refetching"
        );
        let Some(store_query) = mode.query(&query, window.row_range()) else {
            return Ok(SearchPage::default());
        };
        let counted = self
            .store
            .search(&store_query)
            .await
            .map_err(VendorError::Store)?;

        Ok(SearchPage {
            query,
            window: window.with_total(counted.total_count),
            results: counted.rows,
            fetched: true,
        })
    }

    /// `max(existing) + 1`, or `1` for an empty directory.
    ///
    /// This scans every sequence number. Values that are not whole numbers are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Store` if the scan fails.
    #[instrument(skip(self))]
    pub async fn next_sequence_number(&self) -> Result<SequenceNumber, VendorError> {
        let existing = self
            .store
            .sequence_numbers()
            .await
            .map_err(VendorError::Store)?;
        Ok(SequenceNumber::next_after(existing))
    }

    /// The number to offer on an add form: [`Self::next_sequence_number`], or
    /// `1` when the scan fails. A collision is caught by the store's
    /// uniqueness constraint on insert.
    pub async fn assign_next_sequence(&self) -> SequenceNumber {
        match self.next_sequence_number().await {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "Sequence number scan failed, falling back to 1");
                SequenceNumber::FIRST
            }
        }
    }

    /// Read one vendor.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::NotFound` for an unknown sequence number.
    pub async fn get(&self, sequence_number: SequenceNumber) -> Result<VendorRecord, VendorError> {
        self.store
            .fetch(sequence_number)
            .await
            .map_err(|e| not_found_or_store(e, sequence_number))
    }

    /// Insert a vendor under an already assigned sequence number.
    ///
    /// The scan that produced `sequence_number` is not atomic with this
    /// insert; if another writer won, the store's uniqueness constraint
    /// rejects this one and a fresh number is scanned for the caller.
    ///
    /// # Errors
    ///
    /// - `VendorError::Validation` if the number is unassigned or a field is blank
    /// - `VendorError::DuplicateSequence` if the number was taken meanwhile
    /// - `VendorError::Store` on any other store failure
    #[instrument(skip(self, details))]
    pub async fn insert(
        &self,
        sequence_number: Option<SequenceNumber>,
        details: VendorDetails,
    ) -> Result<VendorRecord, VendorError> {
        details.validate_insert(sequence_number)?;
        let Some(sequence_number) = sequence_number else {
            return Err(ValidationError::MissingFields(Vec::new()).into());
        };

        let record = VendorRecord::new(sequence_number, details);
        match self.store.insert(&record).await {
            Ok(()) => {
                info!(srno = %sequence_number, "Vendor added");
                Ok(record)
            }
            Err(StoreError::Conflict(detail)) => {
                warn!(srno = %sequence_number, %detail, "Sequence number already taken");
                let next = self.assign_next_sequence().await;
                Err(VendorError::DuplicateSequence {
                    taken: sequence_number,
                    next,
                })
            }
            Err(e) => Err(VendorError::Store(e)),
        }
    }

    /// Insert a vendor under a freshly scanned sequence number.
    ///
    /// # Errors
    ///
    /// Same as [`Self::insert`], plus scan failures.
    pub async fn insert_next(&self, details: VendorDetails) -> Result<VendorRecord, VendorError> {
        details.validate()?;
        let sequence_number = self.next_sequence_number().await?;
        self.insert(Some(sequence_number), details).await
    }

    /// Overwrite every detail field of a vendor, then read it back.
    ///
    /// # Errors
    ///
    /// - `VendorError::Validation` if a field is blank
    /// - `VendorError::NotFound` if no vendor has this sequence number
    /// - `VendorError::Store` if the write fails
    #[instrument(skip(self, record), fields(srno = %record.sequence_number))]
    pub async fn update(&self, record: VendorRecord) -> Result<UpdatedVendor, VendorError> {
        record.details.validate()?;
        let sequence_number = record.sequence_number;

        self.store
            .update(&record)
            .await
            .map_err(|e| not_found_or_store(e, sequence_number))?;
        info!("Vendor updated");

        match self.store.fetch(sequence_number).await {
            Ok(stored) => Ok(UpdatedVendor {
                record: stored,
                reread: true,
            }),
            Err(e) => {
                warn!(error = %e, "Re-read after update failed, using submitted values");
                Ok(UpdatedVendor {
                    record,
                    reread: false,
                })
            }
        }
    }

    /// Delete a vendor. Deleting a vendor that is already gone succeeds.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Store` if the store request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, sequence_number: SequenceNumber) -> Result<(), VendorError> {
        self.store
            .delete(sequence_number)
            .await
            .map_err(VendorError::Store)?;
        info!("Vendor deleted");
        Ok(())
    }

    /// Whether the store answers at all.
    ///
    /// # Errors
    ///
    /// Returns the store error when it does not.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }
}

fn not_found_or_store(error: StoreError, sequence_number: SequenceNumber) -> VendorError {
    match error {
        StoreError::NotFound => VendorError::NotFound(sequence_number),
        other => VendorError::Store(other),
    }
}
