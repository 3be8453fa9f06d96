//! Indexer provider records and the default/user catalog merge.

mod catalog;
mod record;
mod types;

pub use catalog::{merge, merge_with_prior, parse_catalog, ProviderCatalog, DEFAULT_CATALOG};
pub use record::{serialize_catalog, RecordError, FIELD_SEPARATOR, RECORD_SEPARATOR};
pub use types::*;
