// Public fallible APIs in this crate share one concrete error contract (`VaultError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod batch;
pub(crate) mod cleaning;
pub mod config;
pub mod dataset_io;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod key;
pub mod name;
pub mod overlay;
pub mod projection;
pub mod record;
pub mod store;
pub mod suggest;
pub mod taxonomy;
pub(crate) mod view;

pub use cleaning::CleanReport;
pub use error::{Result, VaultError};
pub use key::RecordKey;
pub use record::{KeyedRecord, Record};
pub use store::{DatasetSlot, PartVault};
pub use view::CacheStats;
