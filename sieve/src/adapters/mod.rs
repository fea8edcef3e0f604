//! Persistence adapters - where an active filter set lives between sessions.
//!
//! A [`FilterStore`](crate::FilterStore) hands its list to one adapter after
//! every change and asks it for a prior list once, on initialization. The
//! store treats every adapter call as best-effort: errors are logged and
//! dropped, never surfaced to the caller.

mod atomic;
mod memory;
mod router;
mod storage;

use crate::codec;
use crate::schema::{ActiveFilter, FilterDefinition};
use crate::Result;

pub use memory::MemoryAdapter;
pub use router::{Location, MemoryRouter, Router, UrlAdapter};
pub use storage::{FileStorage, Storage, StorageAdapter, StoredFilter};

/// Save/load/clear contract consumed by the filter store.
pub trait PersistenceAdapter {
    /// Persist the full, non-empty active list.
    fn save_filters(&mut self, filters: &[ActiveFilter]) -> Result<()>;

    /// Restore a previously saved list, resolved against `available`.
    ///
    /// Returns an empty list when nothing was persisted.
    fn load_filters(&mut self, available: &[FilterDefinition]) -> Result<Vec<ActiveFilter>>;

    /// Forget any persisted list.
    fn clear_filters(&mut self) -> Result<()>;
}

/// Adapter that persists nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAdapter;

impl PersistenceAdapter for NullAdapter {
    fn save_filters(&mut self, _filters: &[ActiveFilter]) -> Result<()> {
        Ok(())
    }

    fn load_filters(&mut self, _available: &[FilterDefinition]) -> Result<Vec<ActiveFilter>> {
        Ok(Vec::new())
    }

    fn clear_filters(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Rebuild active filters from `(key, token)` pairs.
///
/// Keys without an available definition and tokens that decode to an
/// invalid value are dropped. Each restored filter gets a fresh id. Only the
/// first occurrence of a key counts.
pub(crate) fn restore_filters<'a, I>(entries: I, available: &[FilterDefinition]) -> Vec<ActiveFilter>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut restored: Vec<ActiveFilter> = Vec::new();

    for (key, token) in entries {
        if restored.iter().any(|f| f.key() == key) {
            continue;
        }
        let Some(definition) = available.iter().find(|d| d.key == key) else {
            continue;
        };
        let value = codec::decode(token, definition);
        if codec::is_valid(&value, definition) {
            restored.push(ActiveFilter::new(definition.clone(), value));
        }
    }

    restored
}
