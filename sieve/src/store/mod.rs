//! Filter store - the authoritative list of active filters.
//!
//! The store owns the active list, derives the query after every change and
//! keeps a [`PersistenceAdapter`] in sync with it.
//!
//! # Lifecycle
//!
//! A store starts `Uninitialized`. [`FilterStore::initialize`] loads any
//! persisted filter set and moves it to `Ready`; that happens once per
//! store. Mutations before that point only touch the in-memory list, so a
//! late initial load can never be overwritten by a sync of an empty list.

mod catalog;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::adapters::{NullAdapter, PersistenceAdapter};
use crate::query::{build_query, FilterQuery};
use crate::schema::{ActiveFilter, FilterCategory, FilterDefinition, FilterId, FilterValue};

pub use catalog::{addable_by_category, addable_filters};

/// Callback invoked with the freshly derived query after every change.
pub type QueryListener = Box<dyn FnMut(&FilterQuery)>;

/// Store lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; persisted state not yet loaded.
    Uninitialized,
    /// Persisted state loaded; every change is synced.
    Ready,
}

/// Active filter list with derived query and best-effort persistence.
pub struct FilterStore<P: PersistenceAdapter = NullAdapter> {
    available: Vec<FilterDefinition>,
    initial: Vec<ActiveFilter>,
    filters: Vec<ActiveFilter>,
    query: FilterQuery,
    lifecycle: Lifecycle,
    persistence: P,
    listener: Option<QueryListener>,
}

impl FilterStore<NullAdapter> {
    /// Create a store over the filters the host offers, without persistence.
    pub fn new(available: Vec<FilterDefinition>) -> Self {
        Self {
            available,
            initial: Vec::new(),
            filters: Vec::new(),
            query: FilterQuery::default(),
            lifecycle: Lifecycle::Uninitialized,
            persistence: NullAdapter,
            listener: None,
        }
    }
}

impl<P: PersistenceAdapter> FilterStore<P> {
    /// Swap in a persistence adapter. Must happen before [`initialize`](Self::initialize)
    /// to take part in the initial load.
    pub fn with_persistence<Q: PersistenceAdapter>(self, persistence: Q) -> FilterStore<Q> {
        FilterStore {
            available: self.available,
            initial: self.initial,
            filters: self.filters,
            query: self.query,
            lifecycle: self.lifecycle,
            persistence,
            listener: self.listener,
        }
    }

    /// Filters to adopt when persistence has nothing to offer.
    pub fn with_initial_filters(mut self, filters: Vec<ActiveFilter>) -> Self {
        self.initial = filters;
        self
    }

    /// Register the query-change callback.
    pub fn on_query_change(mut self, listener: impl FnMut(&FilterQuery) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Load persisted filters, falling back to the initial list, and become ready.
    ///
    /// Only the first call does anything.
    pub fn initialize(&mut self) {
        if self.lifecycle == Lifecycle::Ready {
            tracing::debug!("filter store already initialized");
            return;
        }

        let loaded = match self.persistence.load_filters(&self.available) {
            Ok(filters) => filters,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted filters");
                Vec::new()
            }
        };

        let adopted = if loaded.is_empty() {
            std::mem::take(&mut self.initial)
        } else {
            tracing::debug!(count = loaded.len(), "restored persisted filters");
            loaded
        };

        self.filters = dedup_by_key(adopted);
        self.lifecycle = Lifecycle::Ready;
        self.commit();
    }

    /// Activate `definition` with its default value.
    ///
    /// Returns `None` without changing anything if a filter with the same key
    /// is already active.
    pub fn add_filter(&mut self, definition: &FilterDefinition) -> Option<FilterId> {
        if self.is_active(&definition.key) {
            return None;
        }

        let filter = ActiveFilter::with_default(definition.clone());
        let id = filter.id();
        self.filters.push(filter);
        self.commit();
        Some(id)
    }

    /// Activate the available definition named `key`.
    pub fn add_filter_by_key(&mut self, key: &str) -> Option<FilterId> {
        let definition = self.available.iter().find(|d| d.key == key)?.clone();
        self.add_filter(&definition)
    }

    /// Replace the value of filter `id`. Unknown ids are ignored.
    pub fn update_filter(&mut self, id: FilterId, value: FilterValue) -> bool {
        let Some(filter) = self.filters.iter_mut().find(|f| f.id() == id) else {
            return false;
        };
        filter.set_value(value);
        self.commit();
        true
    }

    /// Deactivate filter `id`. Unknown ids are ignored.
    pub fn remove_filter(&mut self, id: FilterId) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id() != id);
        if self.filters.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Deactivate everything.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.commit();
    }

    pub fn active_filters(&self) -> &[ActiveFilter] {
        &self.filters
    }

    pub fn filter(&self, id: FilterId) -> Option<&ActiveFilter> {
        self.filters.iter().find(|f| f.id() == id)
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.filters.iter().any(|f| f.key() == key)
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    pub fn available_filters(&self) -> &[FilterDefinition] {
        &self.available
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Available definitions that are not active yet, in declaration order.
    pub fn addable_filters(&self) -> Vec<&FilterDefinition> {
        addable_filters(&self.available, &self.filters)
    }

    /// [`addable_filters`](Self::addable_filters) grouped by category.
    pub fn addable_by_category(&self) -> BTreeMap<Option<FilterCategory>, Vec<&FilterDefinition>> {
        addable_by_category(&self.available, &self.filters)
    }

    /// Re-derive the query, notify, and sync persistence once ready.
    fn commit(&mut self) {
        self.query = build_query(&self.filters);

        if let Some(listener) = self.listener.as_mut() {
            listener(&self.query);
        }

        if self.lifecycle == Lifecycle::Ready {
            self.sync();
        }
    }

    fn sync(&mut self) {
        let result = if self.filters.is_empty() {
            self.persistence.clear_filters()
        } else {
            self.persistence.save_filters(&self.filters)
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist filters");
        }
    }
}

impl<P: PersistenceAdapter + fmt::Debug> fmt::Debug for FilterStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("lifecycle", &self.lifecycle)
            .field("filters", &self.filters)
            .field("query", &self.query)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

/// Keep the first filter for each key.
fn dedup_by_key(filters: Vec<ActiveFilter>) -> Vec<ActiveFilter> {
    let mut seen = HashSet::new();
    filters
        .into_iter()
        .filter(|f| seen.insert(f.key().to_string()))
        .collect()
}
