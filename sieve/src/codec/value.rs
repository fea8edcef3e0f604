//! Defaults, validity and token encoding.

use chrono::{DateTime, NaiveDate};

use crate::schema::{DateRange, FilterDefinition, FilterType, FilterValue, NumberRange};

/// Separates the two sides of a range token.
pub const RANGE_DELIMITER: &str = "|";

/// Separates the items of a list token.
pub const LIST_DELIMITER: &str = ",";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The empty value a filter starts with when first added.
pub fn default_value(definition: &FilterDefinition) -> FilterValue {
    match definition.filter_type {
        FilterType::Text => FilterValue::Text(String::new()),
        FilterType::Number => FilterValue::Number(None),
        FilterType::Select => FilterValue::Select(None),
        FilterType::MultiSelect => FilterValue::MultiSelect(Vec::new()),
        FilterType::Lookup if definition.multiple => FilterValue::MultiSelect(Vec::new()),
        FilterType::Lookup => FilterValue::Select(None),
        FilterType::Date => FilterValue::Date(None),
        FilterType::DateRange => FilterValue::DateRange(DateRange::default()),
        FilterType::NumberRange => FilterValue::NumberRange(NumberRange::default()),
        FilterType::Boolean => FilterValue::Boolean(None),
    }
}

/// Whether `value` is a meaningful, non-default value for `definition`.
///
/// Fails closed: absent values and values of the wrong shape are invalid.
/// Non-finite numbers count as absent, and a list needs at least one
/// non-empty item. An explicit `false` is a valid boolean.
pub fn is_valid(value: &FilterValue, definition: &FilterDefinition) -> bool {
    if !value.fits(definition) {
        return false;
    }

    match value {
        FilterValue::Text(text) => !text.is_empty(),
        FilterValue::Number(number) => number.is_some_and(f64::is_finite),
        FilterValue::Select(selected) => selected.as_deref().is_some_and(|s| !s.is_empty()),
        FilterValue::MultiSelect(items) => items.iter().any(|item| !item.is_empty()),
        FilterValue::Date(date) => date.is_some(),
        FilterValue::DateRange(range) => !range.is_open(),
        FilterValue::NumberRange(range) => !range.is_open(),
        FilterValue::Boolean(flag) => flag.is_some(),
    }
}

/// Encode a value as a flat token.
pub fn encode(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Number(number) => number.map(|n| n.to_string()).unwrap_or_default(),
        FilterValue::Select(selected) => selected.clone().unwrap_or_default(),
        FilterValue::MultiSelect(items) => items
            .iter()
            .filter(|item| !item.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LIST_DELIMITER),
        FilterValue::Date(date) => date.map(format_date_only).unwrap_or_default(),
        FilterValue::DateRange(range) => format!(
            "{}{}{}",
            range.from.map(format_date_only).unwrap_or_default(),
            RANGE_DELIMITER,
            range.to.map(format_date_only).unwrap_or_default(),
        ),
        FilterValue::NumberRange(range) => {
            let range = range.finite();
            format!(
                "{}{}{}",
                range.min.map(|n| n.to_string()).unwrap_or_default(),
                RANGE_DELIMITER,
                range.max.map(|n| n.to_string()).unwrap_or_default(),
            )
        }
        FilterValue::Boolean(flag) => flag.map(|b| b.to_string()).unwrap_or_default(),
    }
}

/// Decode a token produced by [`encode`] for a filter of `definition`.
///
/// An empty token, or any side that fails to parse, yields the default.
pub fn decode(token: &str, definition: &FilterDefinition) -> FilterValue {
    if token.is_empty() {
        return default_value(definition);
    }

    match definition.filter_type {
        FilterType::Text => FilterValue::Text(token.to_string()),
        FilterType::Select => FilterValue::Select(Some(token.to_string())),
        FilterType::Lookup if definition.multiple => FilterValue::MultiSelect(split_list(token)),
        FilterType::Lookup => FilterValue::Select(Some(token.to_string())),
        FilterType::MultiSelect => FilterValue::MultiSelect(split_list(token)),
        FilterType::Number => FilterValue::Number(parse_number(token)),
        FilterType::Date => FilterValue::Date(parse_date(token)),
        FilterType::DateRange => {
            let (from, to) = split_range(token);
            FilterValue::DateRange(DateRange::new(parse_date(from), parse_date(to)))
        }
        FilterType::NumberRange => {
            let (min, max) = split_range(token);
            FilterValue::NumberRange(NumberRange::new(parse_number(min), parse_number(max)))
        }
        FilterType::Boolean => FilterValue::Boolean(Some(token == "true")),
    }
}

/// Format a date as `YYYY-MM-DD` with no time component.
pub fn format_date_only(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp keeping only its date.
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(token).ok().map(|dt| dt.date_naive()))
}

fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Split a range token; a token without a delimiter is the lower side.
fn split_range(token: &str) -> (&str, &str) {
    token.split_once(RANGE_DELIMITER).unwrap_or((token, ""))
}

fn split_list(token: &str) -> Vec<String> {
    token
        .split(LIST_DELIMITER)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
