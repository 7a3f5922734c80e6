//! Business logic services for the site.
//!
//! # Services
//!
//! - `vendors` - Vendor directory search, sequence assignment and mutations
//! - `leads` - Search request and contact form capture
//! - `accounts` - Visitor sign-in and registration

pub mod accounts;
pub mod leads;
pub mod vendors;

pub use accounts::{AccountService, LoginForm, RegistrationForm};
pub use leads::{ContactForm, LeadError, LeadService, SearchRequestForm};
pub use vendors::{SearchPage, UpdatedVendor, VendorError, VendorService};
