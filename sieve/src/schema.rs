//! Schema definitions for filters and their values.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec;
use crate::{Error, Result};

/// The kind of input a filter field takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Free text input.
    Text,
    /// Single choice from `options`.
    Select,
    /// Any number of choices from `options`.
    MultiSelect,
    /// A single calendar date.
    Date,
    /// A from/to pair of calendar dates, either side optional.
    DateRange,
    /// A single number.
    Number,
    /// A min/max pair of numbers, either side optional.
    NumberRange,
    /// Yes/no toggle.
    Boolean,
    /// Host-provided lookup; single or multiple depending on the definition.
    Lookup,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::Text => "text",
            FilterType::Select => "select",
            FilterType::MultiSelect => "multi-select",
            FilterType::Date => "date",
            FilterType::DateRange => "date-range",
            FilterType::Number => "number",
            FilterType::NumberRange => "number-range",
            FilterType::Boolean => "boolean",
            FilterType::Lookup => "lookup",
        };
        f.write_str(name)
    }
}

/// Grouping tag used when listing filters that can be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Basic,
    Dates,
    Relationships,
    Numbers,
    Custom,
}

/// One selectable option of a select or multi-select filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Static description of one filterable field, owned by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    /// Stable identity across sessions; also the query and URL parameter name.
    pub key: String,

    /// Human label shown in the toolbar.
    pub label: String,

    #[serde(rename = "type")]
    pub filter_type: FilterType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FilterCategory>,

    /// Options for select and multi-select filters, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,

    /// Key handed to the host's lookup source for `lookup` filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_key: Option<String>,

    /// Whether a `lookup` filter holds a list instead of a single value.
    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl FilterDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            filter_type,
            category: None,
            options: Vec::new(),
            lookup_key: None,
            multiple: false,
            required: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = FilterOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    pub fn with_category(mut self, category: FilterCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_lookup_key(mut self, lookup_key: impl Into<String>) -> Self {
        self.lookup_key = Some(lookup_key.into());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// True when the value is a list of strings rather than a scalar.
    pub fn is_multi_valued(&self) -> bool {
        match self.filter_type {
            FilterType::MultiSelect => true,
            FilterType::Lookup => self.multiple,
            _ => false,
        }
    }

    /// Look up the option with the given value.
    pub fn option(&self, value: &str) -> Option<&FilterOption> {
        self.options.iter().find(|opt| opt.value == value)
    }

    /// Options that can currently be picked.
    pub fn enabled_options(&self) -> impl Iterator<Item = &FilterOption> {
        self.options.iter().filter(|opt| !opt.disabled)
    }

    /// Parse a JSON array of definitions, rejecting duplicate keys.
    pub fn from_json_list(json: &str) -> Result<Vec<FilterDefinition>> {
        let definitions: Vec<FilterDefinition> =
            serde_json::from_str(json).map_err(|e| Error::Definition(e.to_string()))?;

        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.key.is_empty() {
                return Err(Error::Definition("empty filter key".to_string()));
            }
            if !seen.insert(definition.key.as_str()) {
                return Err(Error::Definition(format!(
                    "duplicate filter key '{}'",
                    definition.key
                )));
            }
        }

        Ok(definitions)
    }
}

/// Inclusive calendar date range; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Numeric range; either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// The same range with non-finite bounds treated as absent.
    pub fn finite(&self) -> Self {
        Self {
            min: self.min.filter(|n| n.is_finite()),
            max: self.max.filter(|n| n.is_finite()),
        }
    }

    /// No finite bound on either side.
    pub fn is_open(&self) -> bool {
        let bounds = self.finite();
        bounds.min.is_none() && bounds.max.is_none()
    }
}

/// Current value of an active filter.
///
/// The variant follows the definition's [`FilterType`]: `lookup` filters use
/// `Select` or `MultiSelect` depending on `multiple`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FilterValue {
    Text(String),
    Number(Option<f64>),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    Date(Option<NaiveDate>),
    DateRange(DateRange),
    NumberRange(NumberRange),
    Boolean(Option<bool>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        FilterValue::Number(Some(value))
    }

    pub fn select(value: impl Into<String>) -> Self {
        FilterValue::Select(Some(value.into()))
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::MultiSelect(values.into_iter().map(Into::into).collect())
    }

    pub fn date(value: NaiveDate) -> Self {
        FilterValue::Date(Some(value))
    }

    pub fn boolean(value: bool) -> Self {
        FilterValue::Boolean(Some(value))
    }

    /// Whether this variant is the shape a filter of `definition` holds.
    pub fn fits(&self, definition: &FilterDefinition) -> bool {
        match (self, definition.filter_type) {
            (FilterValue::Text(_), FilterType::Text) => true,
            (FilterValue::Number(_), FilterType::Number) => true,
            (FilterValue::Select(_), FilterType::Select) => true,
            (FilterValue::MultiSelect(_), FilterType::MultiSelect) => true,
            (FilterValue::Select(_), FilterType::Lookup) => !definition.multiple,
            (FilterValue::MultiSelect(_), FilterType::Lookup) => definition.multiple,
            (FilterValue::Date(_), FilterType::Date) => true,
            (FilterValue::DateRange(_), FilterType::DateRange) => true,
            (FilterValue::NumberRange(_), FilterType::NumberRange) => true,
            (FilterValue::Boolean(_), FilterType::Boolean) => true,
            _ => false,
        }
    }
}

/// Process-unique identity of an active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FilterId(Uuid);

impl FilterId {
    /// Generate a fresh id (UUIDv7, so ids sort by creation time).
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter_{}", self.0.simple())
    }
}

/// A filter definition bound to a current value.
///
/// The display string is recomputed on every value change, so it can never
/// disagree with the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    id: FilterId,
    definition: FilterDefinition,
    value: FilterValue,
    display_value: String,
}

impl ActiveFilter {
    /// Bind `definition` to `value` under a fresh id.
    pub fn new(definition: FilterDefinition, value: FilterValue) -> Self {
        let display_value = codec::display_value(&definition, &value);
        Self {
            id: FilterId::generate(),
            definition,
            value,
            display_value,
        }
    }

    /// Bind `definition` to its type's default value.
    pub fn with_default(definition: FilterDefinition) -> Self {
        let value = codec::default_value(&definition);
        Self::new(definition, value)
    }

    pub fn id(&self) -> FilterId {
        self.id
    }

    pub fn definition(&self) -> &FilterDefinition {
        &self.definition
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    /// Replace the value and its display string together.
    pub fn set_value(&mut self, value: FilterValue) {
        self.display_value = codec::display_value(&self.definition, &value);
        self.value = value;
    }

    pub fn is_valid(&self) -> bool {
        codec::is_valid(&self.value, &self.definition)
    }
}
