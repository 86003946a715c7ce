//! Collection response parsing.

use serde::Deserialize;

use crate::error::FetchError;
use crate::model::PageResult;
use crate::model::Record;

/// OData response structure for collection queries.
///
/// Both fields are kept as raw JSON so a wrong-typed field degrades instead of
/// failing the whole page.
#[derive(Debug, Deserialize)]
struct ODataResponse {
    /// The records in this page.
    #[serde(default)]
    value: serde_json::Value,
    /// Total count (when `$count=true`).
    #[serde(rename = "@odata.count", default)]
    count: serde_json::Value,
}

/// Parses a collection response body into a page.
///
/// A body that is not JSON is an error. Valid JSON that is not an object, a
/// missing or malformed `value` all yield an empty page. A missing or
/// non-numeric `@odata.count` leaves the total unset so callers fall back to
/// the page length.
pub fn parse_page(body: &str) -> Result<PageResult, FetchError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::parse_with_body(e.to_string(), body))?;
    if !json.is_object() {
        log::warn!("response body is not a JSON object, treating as empty");
        return Ok(PageResult::new(Vec::new()));
    }

    let response: ODataResponse =
        serde_json::from_value(json).map_err(|e| FetchError::parse_with_body(e.to_string(), body))?;

    let records = match response.value {
        serde_json::Value::Array(items) => {
            let total = items.len();
            let records: Vec<Record> = items
                .into_iter()
                .filter(serde_json::Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();
            if records.len() != total {
                log::warn!("skipped {} non-object entries in response", total - records.len());
            }
            records
        }
        serde_json::Value::Null => {
            log::warn!("response has no `value` field, treating as empty");
            Vec::new()
        }
        other => {
            log::warn!("response `value` is not an array ({}), treating as empty", other);
            Vec::new()
        }
    };

    let page = PageResult::new(records);
    Ok(match response.count.as_u64() {
        Some(count) => page.with_total_count(count),
        None => page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_count() {
        let body = r#"{
            "@odata.context": "http://services.odata.org/V4/TripPinServiceRW/$metadata#People",
            "@odata.count": 20,
            "value": [
                {"UserName": "russellwhyte", "FirstName": "Russell", "Age": null},
                {"UserName": "scottketchum", "FirstName": "Scott"}
            ]
        }"#;
        let page = parse_page(body).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_count(), Some(20));
        assert_eq!(page.records()[1].get_string("FirstName"), Some("Scott"));
    }

    #[test]
    fn test_missing_count_falls_back_to_length() {
        let page = parse_page(r#"{"value": [{"A": 1}, {"A": 2}, {"A": 3}]}"#).unwrap();
        assert_eq!(page.total_count(), None);
        assert_eq!(page.effective_total(), 3);

        let page = parse_page(r#"{"value": [{"A": 1}], "@odata.count": "many"}"#).unwrap();
        assert_eq!(page.effective_total(), 1);
    }

    #[test]
    fn test_malformed_value_degrades() {
        let page = parse_page(r#"{"value": "nope", "@odata.count": 7}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_count(), Some(7));

        let page = parse_page(r#"{"value": [1, {"A": "x"}, null]}"#).unwrap();
        assert_eq!(page.len(), 1);

        assert!(parse_page("{}").unwrap().is_empty());
    }

    #[test]
    fn test_non_object_json_degrades() {
        for body in ["[]", "null", "42", r#""value""#, r#"[{"A": 1}]"#] {
            let page = parse_page(body).unwrap();
            assert!(page.is_empty(), "{}", body);
            assert_eq!(page.total_count(), None);
            assert_eq!(page.effective_total(), 0);
        }
    }

    #[test]
    fn test_non_json_body_is_error() {
        let err = parse_page("<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert!(matches!(parse_page(""), Err(FetchError::Parse { .. })));
    }
}
