//! Sort criteria.

use super::is_valid_field;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the OData keyword for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    /// Parses a direction keyword (`asc`, `ascending`, `desc`, `descending`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Direction::Asc),
            "desc" | "descending" => Some(Direction::Desc),
            _ => None,
        }
    }
}

/// One sort rule: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub field: String,
    pub direction: Direction,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Raw sort row as submitted from the sort dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortInput {
    pub field: String,
    pub order: String,
}

impl SortInput {
    pub fn new(field: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: order.into(),
        }
    }
}

/// Ordered sort criteria; earlier criteria take precedence on ties.
///
/// Criteria with an empty or malformed field, and repeats of a field that is
/// already present, are dropped on insertion so the sequence is always
/// encodable.
///
/// # Example
///
/// ```
/// use odatagrid_lib::query::SortCriteria;
///
/// let sort = SortCriteria::desc("LastName").then_asc("FirstName");
/// assert_eq!(sort.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortCriteria {
    criteria: Vec<SortCriterion>,
}

impl SortCriteria {
    /// Creates empty criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new().then_asc(field)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new().then_desc(field)
    }

    /// Adds a secondary ascending order on a field.
    pub fn then_asc(mut self, field: impl Into<String>) -> Self {
        self.push(SortCriterion::new(field, Direction::Asc));
        self
    }

    /// Adds a secondary descending order on a field.
    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.push(SortCriterion::new(field, Direction::Desc));
        self
    }

    /// Appends a criterion. Returns `false` if it was dropped.
    pub fn push(&mut self, criterion: SortCriterion) -> bool {
        let field = criterion.field.trim();
        if !is_valid_field(field) || self.criteria.iter().any(|c| c.field == field) {
            return false;
        }
        self.criteria.push(SortCriterion::new(field, criterion.direction));
        true
    }

    /// Builds criteria from dialog rows, dropping rows with an unknown order.
    pub fn from_inputs<'a>(inputs: impl IntoIterator<Item = &'a SortInput>) -> Self {
        let mut criteria = Self::new();
        for input in inputs {
            if let Some(direction) = Direction::parse(&input.order) {
                criteria.push(SortCriterion::new(input.field.clone(), direction));
            }
        }
        criteria
    }

    /// Returns the criteria in precedence order.
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortCriterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl FromIterator<SortCriterion> for SortCriteria {
    fn from_iter<I: IntoIterator<Item = SortCriterion>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for criterion in iter {
            criteria.push(criterion);
        }
        criteria
    }
}
