//! Vendor add/edit/delete flow for interactive clients.
//!
//! [`VendorEditor`] holds the add-vendor form with its pre-assigned sequence
//! number, at most one open edit, and the last status message. After each
//! successful mutation it patches the rows shown by the listing it was given,
//! instead of refetching the page.

use std::time::Duration;

use elate_chem_core::{SequenceNumber, VendorDetails, VendorField, VendorRecord};
use tokio::time::Instant;
use tracing::{error, warn};

use super::search::ListingHandle;
use crate::services::{VendorError, VendorService};

/// How long a successful edit stays open before it closes itself.
pub const EDIT_DISMISS_DELAY: Duration = Duration::from_millis(1500);

/// User-facing status messages.
pub mod messages {
    pub const ADDED: &str = "Vendor added successfully!";
    pub const ADD_FAILED: &str = "Error submitting form. Please try again.";
    pub const UPDATED: &str = "Vendor updated successfully!";
    pub const UPDATE_FAILED: &str = "Error updating vendor. Please try again.";
    pub const DELETED: &str = "Vendor deleted successfully!";
    pub const DELETE_FAILED: &str = "Error deleting vendor";

    #[must_use]
    pub fn sequence_taken(taken: impl std::fmt::Display) -> String {
        format!(
            "Sequence number {taken} is already taken. A new number has been assigned; please submit again."
        )
    }
}

/// A status message for the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Message for a failed mutation: validation and duplicate-number problems are
/// specific, store failures use the generic text.
#[must_use]
pub fn failure_notice(error: &VendorError, generic: &str) -> Notice {
    match error {
        VendorError::Validation(e) => Notice::Error(e.to_string()),
        VendorError::DuplicateSequence { taken, .. } => {
            Notice::Error(messages::sequence_taken(taken))
        }
        VendorError::NotFound(_) | VendorError::Store(_) => Notice::Error(generic.to_owned()),
    }
}

/// An open edit of one vendor.
#[derive(Debug, Clone)]
pub struct EditSession {
    draft: VendorRecord,
    notice: Option<Notice>,
    dismiss_at: Option<Instant>,
}

impl EditSession {
    /// The record as edited so far. Its sequence number never changes.
    #[must_use]
    pub const fn draft(&self) -> &VendorRecord {
        &self.draft
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn expired(&self) -> bool {
        self.dismiss_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Proof that the user was asked to confirm a delete.
#[must_use = "a delete only happens once the pending delete is confirmed"]
#[derive(Debug)]
pub struct PendingDelete {
    sequence_number: SequenceNumber,
}

impl PendingDelete {
    #[must_use]
    pub const fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }
}

/// The dashboard's add/edit/delete state.
pub struct VendorEditor {
    service: VendorService,
    listing: Option<ListingHandle>,
    next_sequence: Option<SequenceNumber>,
    form: VendorDetails,
    notice: Option<Notice>,
    editing: Option<EditSession>,
}

impl VendorEditor {
    /// Create an editor. Mutations patch `listing` when one is given.
    #[must_use]
    pub fn new(service: VendorService, listing: Option<ListingHandle>) -> Self {
        Self {
            service,
            listing,
            next_sequence: None,
            form: VendorDetails::default(),
            notice: None,
            editing: None,
        }
    }

    // =========================================================================
    // Add
    // =========================================================================

    /// Scan the store for the next sequence number and cache it. An
    /// unreadable store yields `1`.
    pub async fn refresh_next_sequence(&mut self) -> SequenceNumber {
        let next = self.service.assign_next_sequence().await;
        self.next_sequence = Some(next);
        next
    }

    /// The number the next added vendor will get.
    #[must_use]
    pub const fn next_sequence(&self) -> Option<SequenceNumber> {
        self.next_sequence
    }

    #[must_use]
    pub const fn form(&self) -> &VendorDetails {
        &self.form
    }

    /// Fill in one add-form field. The sequence number is not a form field.
    pub fn set_field(&mut self, field: VendorField, value: impl Into<String>) -> bool {
        self.form.set(field, value)
    }

    /// Last add or delete message.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Submit the add form under the cached sequence number.
    ///
    /// On success the form is cleared and the cached number advances by one.
    /// On failure the form is kept. If the number was taken by another writer,
    /// the cache holds a freshly scanned number for the next attempt.
    ///
    /// # Errors
    ///
    /// Returns the `VendorError` from the insert.
    pub async fn submit_new(&mut self) -> Result<VendorRecord, VendorError> {
        match self
            .service
            .insert(self.next_sequence, self.form.clone())
            .await
        {
            Ok(record) => {
                self.form = VendorDetails::default();
                self.next_sequence = Some(record.sequence_number.next());
                self.notice = Some(Notice::Success(messages::ADDED.to_owned()));
                Ok(record)
            }
            Err(e) => {
                if let VendorError::DuplicateSequence { next, .. } = &e {
                    self.next_sequence = Some(*next);
                } else if !matches!(e, VendorError::Validation(_)) {
                    error!(error = %e, "Vendor insert failed");
                }
                self.notice = Some(failure_notice(&e, messages::ADD_FAILED));
                Err(e)
            }
        }
    }

    // =========================================================================
    // Edit
    // =========================================================================

    /// Open an edit on a snapshot of `record`, replacing any open edit.
    pub fn begin_edit(&mut self, record: VendorRecord) {
        self.editing = Some(EditSession {
            draft: record,
            notice: None,
            dismiss_at: None,
        });
    }

    /// Open an edit on a row currently shown by the listing.
    pub fn begin_edit_from_listing(&mut self, sequence_number: SequenceNumber) -> bool {
        let Some(record) = self
            .listing
            .as_ref()
            .and_then(|listing| listing.find(sequence_number))
        else {
            return false;
        };
        self.begin_edit(record);
        true
    }

    /// The open edit, if any. A successful edit closes itself once its
    /// dismiss delay has passed.
    pub fn editing(&mut self) -> Option<&EditSession> {
        if self.editing.as_ref().is_some_and(EditSession::expired) {
            self.editing = None;
        }
        self.editing.as_ref()
    }

    /// Change one field of the open edit. The sequence number cannot change.
    pub fn edit_field(&mut self, field: VendorField, value: impl Into<String>) -> bool {
        self.editing
            .as_mut()
            .is_some_and(|session| session.draft.details.set(field, value))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the open edit. Returns `None` when no edit is open.
    ///
    /// On success the stored row replaces the listing row with the same
    /// sequence number and the edit closes after [`EDIT_DISMISS_DELAY`]. On
    /// failure the edit stays open with an error message until the next
    /// submit.
    pub async fn submit_edit(&mut self) -> Option<Result<VendorRecord, VendorError>> {
        let draft = {
            let session = self.editing.as_mut()?;
            session.notice = None;
            session.dismiss_at = None;
            session.draft.clone()
        };

        let result = self.service.update(draft).await;
        let session = self.editing.as_mut()?;

        Some(match result {
            Ok(updated) => {
                if !updated.reread {
                    warn!(srno = %updated.record.sequence_number, "Showing submitted values");
                }
                if let Some(listing) = &self.listing {
                    listing.splice(&updated.record);
                }
                session.draft = updated.record.clone();
                session.notice = Some(Notice::Success(messages::UPDATED.to_owned()));
                session.dismiss_at = Some(Instant::now() + EDIT_DISMISS_DELAY);
                Ok(updated.record)
            }
            Err(e) => {
                if !matches!(e, VendorError::Validation(_)) {
                    error!(error = %e, "Vendor update failed");
                }
                session.notice = Some(failure_notice(&e, messages::UPDATE_FAILED));
                Err(e)
            }
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// First step of a delete: nothing is removed until the returned token is
    /// passed to [`Self::confirm_delete`].
    pub const fn request_delete(&self, sequence_number: SequenceNumber) -> PendingDelete {
        PendingDelete { sequence_number }
    }

    /// Delete the vendor and drop it from the listing.
    ///
    /// # Errors
    ///
    /// Returns the `VendorError` from the store; the listing is left as it was.
    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<(), VendorError> {
        let sequence_number = pending.sequence_number;
        match self.service.delete(sequence_number).await {
            Ok(()) => {
                if let Some(listing) = &self.listing {
                    listing.remove(sequence_number);
                }
                self.notice = Some(Notice::Success(messages::DELETED.to_owned()));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, srno = %sequence_number, "Vendor delete failed");
                self.notice = Some(Notice::Error(messages::DELETE_FAILED.to_owned()));
                Err(e)
            }
        }
    }
}
