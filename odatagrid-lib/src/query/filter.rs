//! Filter criteria.

use super::is_valid_field;

/// Comparison operator of a filter criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equality: `field eq 'value'`
    Equals,
    /// Contains substring: `contains(field, 'value')`
    Contains,
    /// Starts with: `startswith(field, 'value')`
    StartsWith,
    /// Ends with: `endswith(field, 'value')`
    EndsWith,
}

impl FilterOperator {
    /// All operators, in dialog order.
    pub const ALL: [FilterOperator; 4] = [
        FilterOperator::Equals,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
    ];

    /// Parses an operator name as submitted by the filter dialog.
    ///
    /// Accepts the dialog values (`equals`, `contains`, `starts`, `ends`) and
    /// the OData spellings (`eq`, `startswith`, `endswith`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" | "eq" => Some(FilterOperator::Equals),
            "contains" => Some(FilterOperator::Contains),
            "starts" | "startswith" | "starts_with" => Some(FilterOperator::StartsWith),
            "ends" | "endswith" | "ends_with" => Some(FilterOperator::EndsWith),
            _ => None,
        }
    }

    /// Returns the value used for this operator in the filter dialog.
    pub fn form_value(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts",
            FilterOperator::EndsWith => "ends",
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "Equals",
            FilterOperator::Contains => "Contains",
            FilterOperator::StartsWith => "Starts With",
            FilterOperator::EndsWith => "Ends With",
        }
    }
}

/// One filter rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCriterion {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, value)
    }
}

/// Raw filter row as submitted from the filter dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    pub field: String,
    pub op: String,
    pub value: String,
}

impl FilterInput {
    pub fn new(field: impl Into<String>, op: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

/// Filter criteria combined with logical AND.
///
/// Behaves as a set: exact duplicates collapse, and criteria with an empty
/// field or value are dropped on insertion. Insertion order is kept so the
/// encoded expression is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    criteria: Vec<FilterCriterion>,
}

impl FilterCriteria {
    /// Creates empty criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, returning the criteria (builder style).
    pub fn and(mut self, criterion: FilterCriterion) -> Self {
        self.insert(criterion);
        self
    }

    /// Inserts a criterion. Returns `false` if it was dropped.
    pub fn insert(&mut self, criterion: FilterCriterion) -> bool {
        let field = criterion.field.trim();
        if !is_valid_field(field) || criterion.value.is_empty() {
            return false;
        }
        let criterion = FilterCriterion::new(field, criterion.operator, criterion.value);
        if self.criteria.contains(&criterion) {
            return false;
        }
        self.criteria.push(criterion);
        true
    }

    /// Builds criteria from dialog rows, dropping rows with unknown operators.
    pub fn from_inputs<'a>(inputs: impl IntoIterator<Item = &'a FilterInput>) -> Self {
        let mut criteria = Self::new();
        for input in inputs {
            if let Some(operator) = FilterOperator::parse(&input.op) {
                criteria.insert(FilterCriterion::new(input.field.clone(), operator, input.value.clone()));
            }
        }
        criteria
    }

    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterCriterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl FromIterator<FilterCriterion> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = FilterCriterion>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for criterion in iter {
            criteria.insert(criterion);
        }
        criteria
    }
}
