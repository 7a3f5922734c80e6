//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::middleware::AdminGate;
use crate::services::{AccountService, LeadService, VendorService};
use crate::store::Backend;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the services built over the backend, and the admin gate.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    vendors: VendorService,
    leads: LeadService,
    accounts: AccountService,
    admin: AdminGate,
}

impl AppState {
    /// Create a new application state over an explicitly constructed backend.
    #[must_use]
    pub fn new(config: SiteConfig, backend: Backend) -> Self {
        let admin = AdminGate::new(config.admin.clone(), config.is_production());

        Self {
            inner: Arc::new(AppStateInner {
                vendors: VendorService::new(backend.vendors),
                leads: LeadService::new(backend.leads.clone()),
                accounts: AccountService::new(backend.identity, backend.leads),
                admin,
                config,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Vendor directory operations.
    #[must_use]
    pub fn vendors(&self) -> &VendorService {
        &self.inner.vendors
    }

    /// Lead capture.
    #[must_use]
    pub fn leads(&self) -> &LeadService {
        &self.inner.leads
    }

    /// Visitor accounts.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// The admin cookie gate.
    #[must_use]
    pub fn admin(&self) -> &AdminGate {
        &self.inner.admin
    }
}
