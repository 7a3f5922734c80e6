//! CLI command implementations.

pub mod vendors;

use clap::Args;
use elate_chem_core::{SequenceNumberError, VendorDetails, VendorField};
use elate_chem_site::config::{ConfigError, StoreConfig};
use elate_chem_site::services::{VendorError, VendorService};
use elate_chem_site::store::{Backend, StoreError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The store client could not be built.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A vendor operation failed.
    #[error("{0}")]
    Vendor(#[from] VendorError),

    /// The sequence number argument is not a whole number.
    #[error("Invalid sequence number: {0}")]
    SequenceNumber(#[from] SequenceNumberError),

    /// Writing output or reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operator declined a confirmation prompt.
    #[error("Cancelled")]
    Cancelled,
}

/// Vendor detail flags shared by `add` and `update`.
#[derive(Debug, Default, Args)]
pub struct DetailArgs {
    #[arg(long)]
    pub chemical_name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub cas_number: Option<String>,
    #[arg(long)]
    pub supplier_name: Option<String>,
    /// Email address or link
    #[arg(long)]
    pub contact_info: Option<String>,
    #[arg(long)]
    pub phone_number: Option<String>,
    /// e.g. Manufacturer, Trader
    #[arg(long)]
    pub business_status: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
}

impl DetailArgs {
    /// The flags that were given, as form fields.
    #[must_use]
    pub fn fields(&self) -> Vec<(VendorField, &str)> {
        [
            (VendorField::ChemicalName, &self.chemical_name),
            (VendorField::Category, &self.category),
            (VendorField::CasNumber, &self.cas_number),
            (VendorField::SupplierName, &self.supplier_name),
            (VendorField::ContactInfo, &self.contact_info),
            (VendorField::PhoneNumber, &self.phone_number),
            (VendorField::BusinessStatus, &self.business_status),
            (VendorField::Country, &self.country),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }

    /// Apply the given flags on top of `details`.
    pub fn apply(&self, details: &mut VendorDetails) {
        for (field, value) in self.fields() {
            details.set(field, value);
        }
    }
}

/// Build the vendor service over the hosted store.
///
/// # Errors
///
/// Returns `CliError::Config` if `SUPABASE_URL` or `SUPABASE_ANON_KEY` is
/// missing or invalid.
pub fn connect() -> Result<VendorService, CliError> {
    let config = StoreConfig::from_env()?;
    tracing::info!(url = %config.url, "Connecting to Supabase");
    let backend = Backend::supabase(&config)?;
    Ok(VendorService::new(backend.vendors))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_given_flags_apply() {
        let args = DetailArgs {
            country: Some("Germany".to_string()),
            ..DetailArgs::default()
        };
        let mut details = VendorDetails {
            chemical_name: "Acetone".to_string(),
            country: "India".to_string(),
            ..VendorDetails::default()
        };

        args.apply(&mut details);

        assert_eq!(details.chemical_name, "Acetone");
        assert_eq!(details.country, "Germany");
        assert_eq!(args.fields().len(), 1);
    }
}
