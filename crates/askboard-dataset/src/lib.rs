//! Askboard Dataset - typed tabular data and content fingerprinting
//!
//! The data model shared across the query pipeline:
//! - Typed cell values ([`CellValue`])
//! - Tabular results with a shape invariant ([`TableData`])
//! - Immutable materialized datasets ([`Dataset`])
//! - Content-addressed query fingerprints ([`Fingerprint`])
//!
//! # Example
//!
//! ```rust,ignore
//! use askboard_dataset::{CellValue, Column, Dataset, Fingerprint};
//!
//! let dataset = Dataset::new(
//!     "sales",
//!     vec![Column::new("amount", vec![CellValue::from(10.5)])],
//! )?;
//! let fingerprint = Fingerprint::of_query(&[dataset], "total sales");
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod cell;
pub mod dataset;
pub mod fingerprint;
pub mod table;

// Re-exports for convenience
pub use cell::{CellValue, DATETIME_FORMAT};
pub use dataset::{Column, Dataset, DatasetError};
pub use fingerprint::{Fingerprint, FingerprintError};
pub use table::{TableData, TableError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with askboard datasets
    pub use crate::{CellValue, Column, Dataset, Fingerprint, TableData};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
