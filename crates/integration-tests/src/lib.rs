//! Integration test harness for the Elate Chem site.
//!
//! Each test starts the real router on an ephemeral local port, backed by the
//! in-memory store, and talks to it with a cookie-aware `reqwest` client.
//! Nothing external is needed.
//!
//! ```bash
//! cargo test -p elate-chem-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use elate_chem_core::{SequenceNumber, VendorDetails, VendorRecord};
use elate_chem_site::app;
use elate_chem_site::config::{AdminCredentials, SiteConfig, StoreConfig};
use elate_chem_site::state::AppState;
use elate_chem_site::store::Backend;
use elate_chem_site::store::memory::MemoryBackend;
use reqwest::{Client, redirect};
use secrecy::SecretString;
use tokio::task::JoinHandle;
use url::Url;

/// Dashboard username every test server accepts.
pub const ADMIN_USERNAME: &str = "admin";

/// Dashboard password every test server accepts.
pub const ADMIN_PASSWORD: &str = "integration-admin-password";

/// Site configuration for a local, non-production test server.
///
/// # Panics
///
/// Never in practice; the store URL is a constant.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        store: StoreConfig {
            url: Url::parse("http://127.0.0.1:54321").expect("valid URL"),
            anon_key: SecretString::from("integration-anon-key"),
        },
        admin: AdminCredentials {
            username: ADMIN_USERNAME.to_string(),
            password: SecretString::from(ADMIN_PASSWORD),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A vendor with every field filled in.
#[must_use]
pub fn vendor(srno: u64, chemical_name: &str, cas_number: &str) -> VendorRecord {
    VendorRecord::new(
        SequenceNumber::new(srno),
        VendorDetails {
            chemical_name: chemical_name.to_string(),
            category: "Solvent".to_string(),
            cas_number: cas_number.to_string(),
            supplier_name: format!("Supplier {srno}"),
            contact_info: format!("sales{srno}@supplier.test"),
            phone_number: "+91 22 5550 0100".to_string(),
            business_status: "Manufacturer".to_string(),
            country: "India".to_string(),
        },
    )
}

/// A running site over an in-memory backend.
pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<MemoryBackend>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server whose directory holds `vendors`.
    ///
    /// # Panics
    ///
    /// Panics if the local listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start(vendors: impl IntoIterator<Item = VendorRecord>) -> Self {
        let backend = Arc::new(MemoryBackend::with_vendors(vendors));
        let state = AppState::new(test_config(), Backend::memory(backend.clone()));
        let router = app::router(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Self {
            base_url: format!("http://{addr}"),
            backend,
            handle,
        }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser-like client: keeps cookies, does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
