//! Value codec for filter values.
//!
//! # Token format
//!
//! Every [`FilterValue`](crate::FilterValue) maps to one flat string token,
//! suitable for a URL parameter or a storage entry:
//!
//! - **Scalars**: the value itself (`active`, `42`, `true`, `2024-03-15`)
//! - **Lists**: comma-joined (`red,green`)
//! - **Ranges**: two sides joined by `|`, either side empty (`10|`, `|2024-12-31`)
//! - **Absent**: the empty string
//!
//! Decoding is type-directed and never fails: anything unparseable degrades
//! to the type's default value.

mod display;
mod value;

pub use display::{display_value, DATE_DISPLAY_FORMAT};
pub use value::{
    decode, default_value, encode, format_date_only, is_valid, parse_date, LIST_DELIMITER,
    RANGE_DELIMITER,
};
