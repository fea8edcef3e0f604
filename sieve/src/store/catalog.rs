//! Which filters can still be added.

use std::collections::BTreeMap;

use crate::schema::{ActiveFilter, FilterCategory, FilterDefinition};

/// Definitions from `available` with no active filter, in declaration order.
pub fn addable_filters<'a>(
    available: &'a [FilterDefinition],
    active: &[ActiveFilter],
) -> Vec<&'a FilterDefinition> {
    available
        .iter()
        .filter(|d| !active.iter().any(|f| f.key() == d.key))
        .collect()
}

/// Addable definitions grouped by category; uncategorized ones sort first.
pub fn addable_by_category<'a>(
    available: &'a [FilterDefinition],
    active: &[ActiveFilter],
) -> BTreeMap<Option<FilterCategory>, Vec<&'a FilterDefinition>> {
    let mut groups: BTreeMap<Option<FilterCategory>, Vec<&'a FilterDefinition>> = BTreeMap::new();
    for definition in addable_filters(available, active) {
        groups.entry(definition.category).or_default().push(definition);
    }
    groups
}
