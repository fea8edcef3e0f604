//! In-memory persistence, mainly for tests.

use crate::schema::{ActiveFilter, FilterDefinition};
use crate::Result;

use super::PersistenceAdapter;

/// Keeps the last saved list in the adapter instance itself.
///
/// Nothing is shared between instances; two stores with two memory adapters
/// never see each other's filters.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdapter {
    saved: Vec<ActiveFilter>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously saved list.
    pub fn with_saved(filters: Vec<ActiveFilter>) -> Self {
        Self { saved: filters }
    }

    /// The list as last saved.
    pub fn snapshot(&self) -> &[ActiveFilter] {
        &self.saved
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn save_filters(&mut self, filters: &[ActiveFilter]) -> Result<()> {
        self.saved = filters.to_vec();
        Ok(())
    }

    /// Filters whose key is no longer available are dropped; the rest are
    /// rebound to the current definitions.
    fn load_filters(&mut self, available: &[FilterDefinition]) -> Result<Vec<ActiveFilter>> {
        let restored = self
            .saved
            .iter()
            .filter_map(|saved| {
                available
                    .iter()
                    .find(|d| d.key == saved.key())
                    .map(|d| ActiveFilter::new(d.clone(), saved.value().clone()))
            })
            .collect();
        Ok(restored)
    }

    fn clear_filters(&mut self) -> Result<()> {
        self.saved.clear();
        Ok(())
    }
}
