//! Human-readable labels for filter chips.

use chrono::NaiveDate;

use crate::schema::{FilterDefinition, FilterType, FilterValue};

/// Calendar date format used in display strings (en-US `M/D/YYYY`).
pub const DATE_DISPLAY_FORMAT: &str = "%-m/%-d/%Y";

/// Short label describing `value`, or `""` when there is nothing to show.
///
/// Select values whose option has disappeared from the definition fall back
/// to the raw value. Lookup values are ids, not options: a single lookup
/// shows the id and a multiple lookup shows a count.
pub fn display_value(definition: &FilterDefinition, value: &FilterValue) -> String {
    if definition.filter_type == FilterType::Lookup {
        return lookup_display(value);
    }

    match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Number(number) => number.map(|n| n.to_string()).unwrap_or_default(),
        FilterValue::Select(selected) => match selected.as_deref() {
            None | Some("") => String::new(),
            Some(raw) => option_label(definition, raw),
        },
        FilterValue::MultiSelect(items) => match items.as_slice() {
            [] => String::new(),
            [only] => option_label(definition, only),
            _ => format!("{} selected", items.len()),
        },
        FilterValue::Boolean(flag) => match flag {
            Some(true) => "Yes".to_string(),
            Some(false) => "No".to_string(),
            None => String::new(),
        },
        FilterValue::Date(date) => date.map(format_display_date).unwrap_or_default(),
        FilterValue::DateRange(range) => match (range.from, range.to) {
            (Some(from), Some(to)) => {
                format!("{} - {}", format_display_date(from), format_display_date(to))
            }
            (Some(from), None) => format!("From {}", format_display_date(from)),
            (None, Some(to)) => format!("Until {}", format_display_date(to)),
            (None, None) => String::new(),
        },
        FilterValue::NumberRange(range) => {
            let range = range.finite();
            match (range.min, range.max) {
                (Some(min), Some(max)) => format!("{} - {}", min, max),
                (Some(min), None) => format!("Min {}", min),
                (None, Some(max)) => format!("Max {}", max),
                (None, None) => String::new(),
            }
        }
    }
}

fn lookup_display(value: &FilterValue) -> String {
    match value {
        FilterValue::Select(selected) => selected.clone().unwrap_or_default(),
        FilterValue::MultiSelect(items) if items.is_empty() => String::new(),
        FilterValue::MultiSelect(items) => format!("{} selected", items.len()),
        _ => String::new(),
    }
}

fn option_label(definition: &FilterDefinition, raw: &str) -> String {
    definition
        .option(raw)
        .filter(|opt| !opt.label.is_empty())
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| raw.to_string())
}

fn format_display_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}
