//! sieve: filter toolbar state core
//!
//! Typed filter values, a token codec, query building, and an active-filter
//! store that syncs to URL, storage, or in-memory persistence.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod error;
pub mod query;
pub mod schema;
pub mod store;

pub use adapters::{
    FileStorage, Location, MemoryAdapter, MemoryRouter, NullAdapter, PersistenceAdapter, Router,
    Storage, StorageAdapter, UrlAdapter,
};
pub use config::Config;
pub use error::{Error, Result};
pub use query::{build_query, FilterQuery, QueryValue};
pub use schema::{
    ActiveFilter, DateRange, FilterCategory, FilterDefinition, FilterId, FilterOption, FilterType,
    FilterValue, NumberRange,
};
pub use store::{FilterStore, Lifecycle, QueryListener};
