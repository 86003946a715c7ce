//! Address-bar query parameters.
//!
//! The address bar carries `$orderby`, `$filter` and `page`, so a reloaded or
//! shared URL reproduces the same view. Decoding never fails: malformed values
//! fall back to defaults.

use url::form_urlencoded;

use super::QueryState;
use super::odata::decode_filter;
use super::odata::decode_sort;
use super::odata::encode_filter;
use super::odata::encode_sort;

/// Sort parameter name.
pub const ORDERBY_PARAM: &str = "$orderby";
/// Filter parameter name.
pub const FILTER_PARAM: &str = "$filter";
/// Page parameter name.
pub const PAGE_PARAM: &str = "page";

/// Reads the query state from an address-bar search string (`?a=b&c=d`).
pub fn read_from_search(search: &str, page_size: u32) -> QueryState {
    let mut orderby = None;
    let mut filter = None;
    let mut page = None;

    for (key, value) in form_urlencoded::parse(strip_question_mark(search).as_bytes()) {
        match key.as_ref() {
            ORDERBY_PARAM if orderby.is_none() => orderby = Some(value.into_owned()),
            FILTER_PARAM if filter.is_none() => filter = Some(value.into_owned()),
            PAGE_PARAM if page.is_none() => page = Some(value.into_owned()),
            _ => {}
        }
    }

    QueryState::new(page_size)
        .with_sort(orderby.as_deref().map(decode_sort).unwrap_or_default())
        .with_filter(filter.as_deref().map(decode_filter).unwrap_or_default())
        .with_page(page.as_deref().map(parse_page).unwrap_or(1))
}

/// Writes the query state into an existing search string.
///
/// Managed parameters are set in place (or appended) and deleted when they
/// carry their default; every other parameter is kept in its position.
/// Returns the new search string with its leading `?`, or an empty string.
pub fn write_to_search(search: &str, state: &QueryState) -> String {
    let orderby = encode_sort(state.sort());
    let filter = encode_filter(state.filter());
    let page = state.page().to_string();

    let mut managed: [(&str, Option<&str>, bool); 3] = [
        (ORDERBY_PARAM, (!orderby.is_empty()).then_some(orderby.as_str()), false),
        (FILTER_PARAM, (!filter.is_empty()).then_some(filter.as_str()), false),
        (PAGE_PARAM, (state.page() > 1).then_some(page.as_str()), false),
    ];

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(strip_question_mark(search).as_bytes()) {
        let slot = managed.iter_mut().find(|slot| slot.0 == key.as_ref());
        match slot {
            Some(slot) => {
                if !slot.2 {
                    if let Some(new_value) = slot.1 {
                        serializer.append_pair(slot.0, new_value);
                    }
                    slot.2 = true;
                }
            }
            None => {
                serializer.append_pair(&key, &value);
            }
        }
    }
    for &(name, new_value, written) in &managed {
        if let (Some(new_value), false) = (new_value, written) {
            serializer.append_pair(name, new_value);
        }
    }

    let query = serializer.finish();
    if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    }
}

/// Parses a page number the way `parseInt(value, 10)` does: leading
/// whitespace, then leading digits. Anything else, or zero, yields page 1.
pub fn parse_page(value: &str) -> u32 {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

fn strip_question_mark(search: &str) -> &str {
    search.strip_prefix('?').unwrap_or(search)
}
