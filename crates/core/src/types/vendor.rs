//! Vendor directory records and form validation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::SequenceNumber;

/// A field of a vendor record, used to report validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorField {
    SequenceNumber,
    ChemicalName,
    Category,
    CasNumber,
    SupplierName,
    ContactInfo,
    PhoneNumber,
    BusinessStatus,
    Country,
}

impl VendorField {
    /// Human-readable form label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SequenceNumber => "Sr. No",
            Self::ChemicalName => "Chemical Name",
            Self::Category => "Category",
            Self::CasNumber => "CAS Number",
            Self::SupplierName => "Supplier Name",
            Self::ContactInfo => "Email / Link",
            Self::PhoneNumber => "Phone Number",
            Self::BusinessStatus => "Business Status",
            Self::Country => "Country",
        }
    }
}

impl fmt::Display for VendorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised before a vendor form is sent to the store.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are blank.
    #[error("missing required fields: {}", join_labels(.0))]
    MissingFields(Vec<VendorField>),
}

fn join_labels(fields: &[VendorField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The editable part of a vendor record.
///
/// This is both the add-vendor form and the body of an update. Every field is
/// required; a value consisting only of whitespace counts as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDetails {
    #[serde(default)]
    pub chemical_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cas_number: String,
    #[serde(default)]
    pub supplier_name: String,
    /// Email address or link text for the supplier.
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub phone_number: String,
    /// Free-text label such as "Manufacturer" or "Trader".
    #[serde(default)]
    pub business_status: String,
    #[serde(default)]
    pub country: String,
}

impl VendorDetails {
    fn fields(&self) -> [(VendorField, &str); 8] {
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
    }

    /// Fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<VendorField> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect()
    }

    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` listing each blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Validate a new-vendor submission, including its assigned sequence number.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` if the sequence number has not
    /// been assigned yet or any detail field is blank.
    pub fn validate_insert(
        &self,
        sequence_number: Option<SequenceNumber>,
    ) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if sequence_number.is_none() {
            missing.push(VendorField::SequenceNumber);
        }
        missing.extend(self.missing_fields());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Set a single field by name. Returns `false` for the sequence number,
    /// which is never editable.
    pub fn set(&mut self, field: VendorField, value: impl Into<String>) -> bool {
        let slot = match field {
            VendorField::SequenceNumber => return false,
            VendorField::ChemicalName => &mut self.chemical_name,
            VendorField::Category => &mut self.category,
            VendorField::CasNumber => &mut self.cas_number,
            VendorField::SupplierName => &mut self.supplier_name,
            VendorField::ContactInfo => &mut self.contact_info,
            VendorField::PhoneNumber => &mut self.phone_number,
            VendorField::BusinessStatus => &mut self.business_status,
            VendorField::Country => &mut self.country,
        };
        *slot = value.into();
        true
    }
}

/// A vendor directory entry.
///
/// Identity is the sequence number; everything in `details` can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub sequence_number: SequenceNumber,
    #[serde(flatten)]
    pub details: VendorDetails,
}

impl VendorRecord {
    /// Create a record from its parts.
    #[must_use]
    pub const fn new(sequence_number: SequenceNumber, details: VendorDetails) -> Self {
        Self {
            sequence_number,
            details,
        }
    }

    /// Case-insensitive substring match on CAS number OR chemical name.
    ///
    /// `needle` must already be trimmed. This mirrors the data API's
    /// `ilike '%needle%'` predicate pair.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.details.cas_number.to_lowercase().contains(&needle)
            || self.details.chemical_name.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> VendorDetails {
        VendorDetails {
            chemical_name: "Acetone".to_string(),
            category: "Solvent".to_string(),
            cas_number: "67-64-1".to_string(),
            supplier_name: "Acme Solvents".to_string(),
            contact_info: "sales@acme.example".to_string(),
            phone_number: "+91 22 5555 0100".to_string(),
            business_status: "Manufacturer".to_string(),
            country: "India".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_form() {
        assert!(filled().validate().is_ok());
        assert!(
            filled()
                .validate_insert(Some(SequenceNumber::new(3)))
                .is_ok()
        );
    }

    #[test]
    fn test_validate_reports_blank_fields_in_order() {
        let mut details = filled();
        details.country = "   ".to_string();
        details.category = String::new();

        let err = details.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![VendorField::Category, VendorField::Country])
        );
        assert_eq!(err.to_string(), "missing required fields: Category, Country");
    }

    #[test]
    fn test_validate_insert_requires_sequence_number() {
        let err = filled().validate_insert(None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![VendorField::SequenceNumber])
        );
    }

    #[test]
    fn test_set_refuses_sequence_number() {
        let mut details = filled();
        assert!(!details.set(VendorField::SequenceNumber, "9"));
        assert!(details.set(VendorField::Country, "Germany"));
        assert_eq!(details.country, "Germany");
    }

    #[test]
    fn test_matches_cas_or_name_case_insensitive() {
        let record = VendorRecord::new(SequenceNumber::new(1), filled());
        assert!(record.matches("acet"));
        assert!(record.matches("ACETONE"));
        assert!(record.matches("64-1"));
        assert!(!record.matches("benzene"));
        // Other columns are not searched
        assert!(!record.matches("acme"));
    }

    #[test]
    fn test_record_json_is_flat() {
        let record = VendorRecord::new(SequenceNumber::new(5), filled());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sequence_number"], "5");
        assert_eq!(value["chemical_name"], "Acetone");
    }
}
