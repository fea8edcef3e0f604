//! Query building: fold active filters into a backend-ready key/value map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::codec::format_date_only;
use crate::schema::{ActiveFilter, FilterValue};

/// Query-shaped value of one filter.
///
/// Serializes untagged, so a query renders as a plain JSON object:
/// `{"status": "active", "price": {"min": 10}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    List(Vec<String>),
    NumberRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    DateRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },
}

/// Derived mapping from filter key to query value.
///
/// Only holds keys whose filter value passed [`crate::codec::is_valid`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterQuery(BTreeMap<String, QueryValue>);

impl FilterQuery {
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        // A map of strings, numbers and string lists always serializes
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}

/// Build the query for `filters`, in activation order.
///
/// Invalid values are skipped. A later filter with a duplicate key replaces
/// the earlier entry.
pub fn build_query(filters: &[ActiveFilter]) -> FilterQuery {
    let mut query = BTreeMap::new();

    for filter in filters {
        if !filter.is_valid() {
            continue;
        }
        if let Some(value) = shape(filter.value()) {
            query.insert(filter.key().to_string(), value);
        }
    }

    FilterQuery(query)
}

/// Shape a valid filter value for the query.
fn shape(value: &FilterValue) -> Option<QueryValue> {
    let shaped = match value {
        FilterValue::Text(text) => QueryValue::Text(text.clone()),
        FilterValue::Number(number) => QueryValue::Number((*number)?),
        FilterValue::Select(selected) => QueryValue::Text(selected.clone()?),
        FilterValue::MultiSelect(items) => QueryValue::List(
            items.iter().filter(|item| !item.is_empty()).cloned().collect(),
        ),
        FilterValue::Date(date) => QueryValue::Text(format_date_only((*date)?)),
        FilterValue::DateRange(range) => QueryValue::DateRange {
            from: range.from.map(format_date_only),
            to: range.to.map(format_date_only),
        },
        FilterValue::NumberRange(range) => {
            let range = range.finite();
            QueryValue::NumberRange {
                min: range.min,
                max: range.max,
            }
        }
        FilterValue::Boolean(flag) => QueryValue::Boolean((*flag)?),
    };
    Some(shaped)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::schema::{DateRange, FilterDefinition, FilterOption, FilterType, NumberRange};

    fn active(def: FilterDefinition, value: FilterValue) -> ActiveFilter {
        ActiveFilter::new(def, value)
    }

    #[test]
    fn test_empty_filters_empty_query() {
        assert!(build_query(&[]).is_empty());
    }

    #[test]
    fn test_invalid_values_are_skipped() {
        let filters = vec![
            ActiveFilter::with_default(FilterDefinition::new("status", "Status", FilterType::Select)),
            ActiveFilter::with_default(FilterDefinition::new("q", "Search", FilterType::Text)),
            active(
                FilterDefinition::new("flag", "Flag", FilterType::Boolean),
                FilterValue::boolean(false),
            ),
        ];

        let query = build_query(&filters);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("flag"), Some(&QueryValue::Boolean(false)));
        assert!(!query.contains_key("status"));
    }

    #[test]
    fn test_number_range_omits_absent_bound() {
        let filters = vec![active(
            FilterDefinition::new("price", "Price", FilterType::NumberRange),
            FilterValue::NumberRange(NumberRange::new(Some(10.0), None)),
        )];

        let query = build_query(&filters);
        assert_eq!(query.to_json(), json!({"price": {"min": 10.0}}));
    }

    #[test]
    fn test_date_is_date_only_string() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let filters = vec![active(
            FilterDefinition::new("createdDate", "Created", FilterType::Date),
            FilterValue::date(date),
        )];

        let query = build_query(&filters);
        assert_eq!(query.get("createdDate"), Some(&QueryValue::Text("2024-03-15".to_string())));
    }

    #[test]
    fn test_date_range_shapes_present_bounds() {
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let filters = vec![active(
            FilterDefinition::new("period", "Period", FilterType::DateRange),
            FilterValue::DateRange(DateRange::new(None, Some(to))),
        )];

        assert_eq!(build_query(&filters).to_json(), json!({"period": {"to": "2024-12-31"}}));
    }

    #[test]
    fn test_multi_select_passes_list_through() {
        let def = FilterDefinition::new("tags", "Tags", FilterType::MultiSelect)
            .with_options([FilterOption::new("a", "A"), FilterOption::new("b", "B")]);
        let filters = vec![active(def, FilterValue::multi(["b", "a"]))];

        assert_eq!(build_query(&filters).to_json(), json!({"tags": ["b", "a"]}));
    }

    #[test]
    fn test_non_finite_and_empty_parts_left_out() {
        let price = FilterDefinition::new("price", "Price", FilterType::NumberRange);
        let tags = FilterDefinition::new("tags", "Tags", FilterType::MultiSelect);
        let filters = vec![
            active(price.clone(), FilterValue::NumberRange(NumberRange::new(Some(f64::NAN), None))),
            active(tags.clone(), FilterValue::multi([""])),
        ];
        assert!(build_query(&filters).is_empty());

        let filters = vec![
            active(price, FilterValue::NumberRange(NumberRange::new(Some(1.0), Some(f64::INFINITY)))),
            active(tags, FilterValue::multi(["", "a"])),
        ];
        assert_eq!(
            build_query(&filters).to_json(),
            json!({"price": {"min": 1.0}, "tags": ["a"]})
        );
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let def = FilterDefinition::new("q", "Search", FilterType::Text);
        let filters = vec![
            active(def.clone(), FilterValue::text("first")),
            active(def, FilterValue::text("second")),
        ];

        let query = build_query(&filters);
        assert_eq!(query.get("q"), Some(&QueryValue::Text("second".to_string())));
    }

    #[test]
    fn test_build_is_deterministic() {
        let filters = vec![
            active(
                FilterDefinition::new("zeta", "Zeta", FilterType::Number),
                FilterValue::number(1.0),
            ),
            active(
                FilterDefinition::new("alpha", "Alpha", FilterType::Text),
                FilterValue::text("x"),
            ),
        ];

        let first = build_query(&filters);
        let second = build_query(&filters);
        assert_eq!(first, second);
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }
}
