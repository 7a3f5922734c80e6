//! Lead capture: "couldn't find it" requests and contact messages.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::models::{ContactSubmission, SearchRequest};
use crate::store::{LeadStore, StoreError};

/// Errors from lead submission.
#[derive(Debug, Error)]
pub enum LeadError {
    /// A required field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Request form shown when a search finds nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequestForm {
    #[serde(default)]
    pub chemical_name: String,
    #[serde(default)]
    pub cas_number: String,
    #[serde(default)]
    pub contact_info: String,
    /// The search box value when the form was opened.
    #[serde(default)]
    pub searched_query: String,
}

/// Contact page form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

fn required(value: &str, field: &'static str) -> Result<String, LeadError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LeadError::MissingField(field));
    }
    Ok(value.to_owned())
}

/// Appends lead records to the store.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
}

impl LeadService {
    #[must_use]
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    /// Record a request for a chemical the directory does not list.
    ///
    /// # Errors
    ///
    /// Returns `LeadError::MissingField` for a blank chemical name or contact,
    /// or `LeadError::Store` if the write fails.
    #[instrument(skip(self, form))]
    pub async fn submit_search_request(
        &self,
        form: SearchRequestForm,
    ) -> Result<SearchRequest, LeadError> {
        let request = SearchRequest {
            chemical_name: required(&form.chemical_name, "Chemical name")?,
            cas_number: form.cas_number.trim().to_owned(),
            contact_info: required(&form.contact_info, "Contact information")?,
            searched_query: form.searched_query,
            requested_at: Utc::now(),
        };

        self.store.record_search_request(&request).await?;
        info!(chemical = %request.chemical_name, "Search request recorded");
        Ok(request)
    }

    /// Record a contact form message.
    ///
    /// # Errors
    ///
    /// Returns `LeadError::MissingField` for any blank field, or
    /// `LeadError::Store` if the write fails.
    #[instrument(skip(self, form))]
    pub async fn submit_contact(&self, form: ContactForm) -> Result<ContactSubmission, LeadError> {
        let submission = ContactSubmission {
            name: required(&form.name, "Name")?,
            email: required(&form.email, "Email")?,
            message: required(&form.message, "Message")?,
            submitted_at: Utc::now(),
        };

        self.store.record_contact(&submission).await?;
        info!("Contact message recorded");
        Ok(submission)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryBackend;

    #[tokio::test]
    async fn test_search_request_recorded() {
        let backend = Arc::new(MemoryBackend::new());
        let service = LeadService::new(backend.clone());

        service
            .submit_search_request(SearchRequestForm {
                chemical_name: " Xylene ".to_string(),
                cas_number: String::new(),
                contact_info: "buyer@example.test".to_string(),
                searched_query: "xyl".to_string(),
            })
            .await
            .unwrap();

        let recorded = backend.search_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].chemical_name, "Xylene");
        assert_eq!(recorded[0].searched_query, "xyl");
    }

    #[tokio::test]
    async fn test_contact_requires_message() {
        let backend = Arc::new(MemoryBackend::new());
        let service = LeadService::new(backend.clone());

        let result = service
            .submit_contact(ContactForm {
                name: "Sam".to_string(),
                email: "sam@example.test".to_string(),
                message: "   ".to_string(),
            })
            .await;

        assert!(matches!(result, Err(LeadError::MissingField("Message"))));
        assert!(backend.contacts().is_empty());
    }

    #[tokio::test]
    async fn test_contact_store_failure() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_writes(true);
        let result = LeadService::new(backend)
            .submit_contact(ContactForm {
                name: "Sam".to_string(),
                email: "sam@example.test".to_string(),
                message: "Hello".to_string(),
            })
            .await;

        assert!(matches!(result, Err(LeadError::Store(_))));
    }
}
