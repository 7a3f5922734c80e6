//! Core types for the vendor directory.

pub mod page;
pub mod search;
pub mod sequence;
pub mod vendor;

pub use page::{PAGE_SIZE, PageWindow, RowRange};
pub use search::{ResultOrder, SearchMode, VendorQuery, hidden_result_count, visible_results};
pub use sequence::{SequenceNumber, SequenceNumberError};
pub use vendor::{ValidationError, VendorDetails, VendorField, VendorRecord};
