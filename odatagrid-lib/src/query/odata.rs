//! OData `$orderby` / `$filter` expression encoding and decoding.

use super::Direction;
use super::FilterCriteria;
use super::FilterCriterion;
use super::FilterOperator;
use super::SortCriteria;
use super::SortCriterion;

/// Converts sort criteria to an OData `$orderby` expression.
///
/// Returns an empty string for empty criteria; callers omit the parameter.
pub fn encode_sort(sort: &SortCriteria) -> String {
    sort.iter()
        .filter(|c| !c.field.is_empty())
        .map(|c| format!("{} {}", c.field, c.direction.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Converts one filter criterion to an OData boolean expression.
pub fn encode_criterion(criterion: &FilterCriterion) -> String {
    let field = &criterion.field;
    let literal = escape_string(&criterion.value);
    match criterion.operator {
        FilterOperator::Equals => format!("{} eq {}", field, literal),
        FilterOperator::Contains => format!("contains({}, {})", field, literal),
        FilterOperator::StartsWith => format!("startswith({}, {})", field, literal),
        FilterOperator::EndsWith => format!("endswith({}, {})", field, literal),
    }
}

/// Converts filter criteria to an OData `$filter` expression joined by `and`.
pub fn encode_filter(filter: &FilterCriteria) -> String {
    filter
        .iter()
        .filter(|c| !c.field.is_empty())
        .map(encode_criterion)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Escapes a string for use in OData queries.
///
/// OData strings are enclosed in single quotes, with internal single quotes doubled.
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Parses an OData `$orderby` expression.
///
/// Parts with an empty field or an unknown direction are dropped; a missing
/// direction means ascending.
pub fn decode_sort(expr: &str) -> SortCriteria {
    let mut sort = SortCriteria::new();
    for part in expr.split(',') {
        let mut tokens = part.split_whitespace();
        let Some(field) = tokens.next() else { continue };
        let direction = match tokens.next() {
            None => Some(Direction::Asc),
            Some(dir) => Direction::parse(dir),
        };
        match (direction, tokens.next()) {
            (Some(direction), None) => {
                sort.push(SortCriterion::new(field, direction));
            }
            _ => log::debug!("dropping unparseable $orderby part {:?}", part),
        }
    }
    sort
}

/// Parses an OData `$filter` expression made of `and`-joined clauses.
///
/// Only the clause shapes produced by [`encode_filter`] are recognised.
/// Anything else is dropped.
pub fn decode_filter(expr: &str) -> FilterCriteria {
    let mut filter = FilterCriteria::new();
    for clause in split_clauses(expr) {
        match parse_clause(clause) {
            Some(criterion) => {
                filter.insert(criterion);
            }
            None => log::debug!("dropping unparseable $filter clause {:?}", clause),
        }
    }
    filter
}

/// Splits on top-level `and` keywords, ignoring quoted literals and parentheses.
fn split_clauses(expr: &str) -> Vec<&str> {
    let bytes = expr.as_bytes();
    let mut clauses = Vec::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b'(' if !in_quote => depth += 1,
            b')' if !in_quote => depth = depth.saturating_sub(1),
            b if !in_quote && depth == 0 && b.is_ascii_whitespace() => {
                if let Some(end) = and_keyword_end(bytes, i) {
                    clauses.push(&expr[start..i]);
                    start = end;
                    i = end;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    clauses.push(&expr[start..]);
    clauses.into_iter().map(str::trim).filter(|c| !c.is_empty()).collect()
}

/// Returns the index after `<ws>and<ws>` starting at `at`, if present.
fn and_keyword_end(bytes: &[u8], at: usize) -> Option<usize> {
    let mut i = at;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let keyword = bytes.get(i..i + 3)?;
    if !keyword.eq_ignore_ascii_case(b"and") {
        return None;
    }
    let after = i + 3;
    if !bytes.get(after)?.is_ascii_whitespace() {
        return None;
    }
    let mut end = after;
    while end < bytes.len() && bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    Some(end)
}

fn parse_clause(clause: &str) -> Option<FilterCriterion> {
    let clause = clause.trim();

    if let Some(operator) = function_operator(clause) {
        let open = clause.find('(')?;
        let inner = clause[open + 1..].strip_suffix(')')?;
        let (field, literal) = inner.split_once(',')?;
        let value = unquote(literal.trim())?;
        return Some(FilterCriterion::new(field.trim(), operator, value));
    }

    let (field, rest) = clause.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (keyword, literal) = rest.split_once(char::is_whitespace)?;
    if !keyword.eq_ignore_ascii_case("eq") {
        return None;
    }
    let value = unquote(literal.trim())?;
    Some(FilterCriterion::equals(field, value))
}

/// Returns the operator of a `name(...)` clause. The name must be the bare
/// identifier at the start of the clause, so `eq` literals containing `(`
/// are not mistaken for calls.
fn function_operator(clause: &str) -> Option<FilterOperator> {
    let (name, _) = clause.split_once('(')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    match name.to_ascii_lowercase().as_str() {
        "contains" => Some(FilterOperator::Contains),
        "startswith" => Some(FilterOperator::StartsWith),
        "endswith" => Some(FilterOperator::EndsWith),
        _ => None,
    }
}

/// Strips the surrounding quotes of an OData string literal and un-doubles
/// embedded quotes.
fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sort() {
        let sort = SortCriteria::asc("LastName").then_desc("FirstName");
        assert_eq!(encode_sort(&sort), "LastName asc, FirstName desc");
        assert_eq!(encode_sort(&SortCriteria::new()), "");
    }

    #[test]
    fn test_encode_filter_operators() {
        let filter = FilterCriteria::new()
            .and(FilterCriterion::equals("Gender", "Male"))
            .and(FilterCriterion::contains("LastName", "ss"))
            .and(FilterCriterion::starts_with("FirstName", "Ru"))
            .and(FilterCriterion::ends_with("UserName", "te"));
        assert_eq!(
            encode_filter(&filter),
            "Gender eq 'Male' and contains(LastName, 'ss') and startswith(FirstName, 'Ru') and endswith(UserName, 'te')"
        );
        assert_eq!(encode_filter(&FilterCriteria::new()), "");
    }

    #[test]
    fn test_filter_value_quotes_are_escaped() {
        let filter = FilterCriteria::new().and(FilterCriterion::contains("LastName", "O'Brien"));
        assert_eq!(encode_filter(&filter), "contains(LastName, 'O''Brien')");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("O'Brien"), "'O''Brien'");
        assert_eq!(escape_string("' or 1 eq 1 or '"), "''' or 1 eq 1 or '''");
    }

    #[test]
    fn test_decode_sort() {
        assert_eq!(decode_sort("LastName desc"), SortCriteria::desc("LastName"));
        assert_eq!(
            decode_sort("LastName DESC,FirstName, Age sideways, ,Age asc"),
            SortCriteria::desc("LastName").then_asc("FirstName").then_asc("Age")
        );
        assert!(decode_sort("").is_empty());
    }

    #[test]
    fn test_decode_filter_handles_keywords_inside_literals() {
        let filter = decode_filter("contains(LastName, 'Smith and Sons') AND Gender eq 'Male'");
        assert_eq!(
            filter.criteria(),
            &[
                FilterCriterion::contains("LastName", "Smith and Sons"),
                FilterCriterion::equals("Gender", "Male"),
            ]
        );
    }

    #[test]
    fn test_decode_filter_drops_unknown_clauses() {
        let filter = decode_filter("Age gt 30 and substringof('a', Name) and startswith(FirstName,'R')");
        assert_eq!(filter.criteria(), &[FilterCriterion::starts_with("FirstName", "R")]);
        assert!(decode_filter("((( '").is_empty());
    }

    #[test]
    fn test_round_trip() {
        let sort = SortCriteria::desc("LastName").then_asc("Age");
        assert_eq!(decode_sort(&encode_sort(&sort)), sort);

        let filter = FilterCriteria::new()
            .and(FilterCriterion::contains("LastName", "O'Brien"))
            .and(FilterCriterion::equals("Gender", "It's and 'quoted'"))
            .and(FilterCriterion::ends_with("Emails", "@example.com"))
            .and(FilterCriterion::equals("LastName", "Smith (Jr)"));
        assert_eq!(decode_filter(&encode_filter(&filter)), filter);
    }

    #[test]
    fn test_round_trip_with_syntax_inside_values() {
        let values = ["Smith (Jr)", "a)", "(b", "x, y", "cats and dogs", "contains(A, 'b')", "f(x) and g(y), 'z'"];
        for value in values {
            for operator in FilterOperator::ALL {
                let filter = FilterCriteria::new()
                    .and(FilterCriterion::new("LastName", operator, value))
                    .and(FilterCriterion::equals("Gender", "Male"));
                let encoded = encode_filter(&filter);
                assert_eq!(decode_filter(&encoded), filter, "{}", encoded);
            }
        }
    }

    #[test]
    fn test_eq_literal_shaped_like_call() {
        let filter = decode_filter("Name eq 'contains(x, ''y'')'");
        assert_eq!(filter.criteria(), &[FilterCriterion::equals("Name", "contains(x, 'y')")]);
    }

    #[test]
    fn test_encode_is_idempotent() {
        let filter = FilterCriteria::new().and(FilterCriterion::contains("LastName", "a"));
        let once = encode_filter(&filter);
        let twice = encode_filter(&decode_filter(&once));
        assert_eq!(once, twice);
    }
}
