//! Client-side record ordering.

use std::cmp::Ordering;

use crate::model::Record;
use crate::model::Value;
use crate::query::Direction;

/// Compares two field values the way the grid orders rows.
///
/// When both values are numeric they compare as numbers; otherwise both are
/// compared as lowercase display text. Missing values count as `""`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let numbers = (a.and_then(Value::as_number), b.and_then(Value::as_number));
    if let (Some(x), Some(y)) = numbers {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    let x = a.map(Value::to_display).unwrap_or_default().to_lowercase();
    let y = b.map(Value::to_display).unwrap_or_default().to_lowercase();
    x.cmp(&y)
}

/// Stable in-place sort of records by one field.
pub fn sort_records(records: &mut [Record], field: &str, direction: Direction) {
    records.sort_by(|a, b| {
        let ordering = compare_values(a.get(field), b.get(field));
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}
