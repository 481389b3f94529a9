use std::cmp::Ordering;

use crate::record::Record;

/// Record selection predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    /// Matches when any value of `field` equals `value`.
    Eq { field: &'static str, value: String },
    /// Like `Eq`, comparing under Unicode default case folding, so
    /// "STRASSE" matches "Straße". Accents still distinguish values.
    EqIgnoreCase { field: &'static str, value: String },
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn eq_ignore_case(field: &'static str, value: impl Into<String>) -> Self {
        Self::EqIgnoreCase {
            field,
            value: value.into(),
        }
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => record.field(field).iter().any(|v| *v == value.as_str()),
            Filter::EqIgnoreCase { field, value } => {
                let folded = caseless::default_case_fold_str(value);
                record
                    .field(field)
                    .iter()
                    .any(|v| caseless::default_case_fold_str(v) == folded)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: Direction,
}

impl Sort {
    /// Orders by the first value of the field; records without one sort first.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let ordering = a
            .field(self.field)
            .first()
            .cmp(&b.field(self.field).first());
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// A filter plus optional ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<Sort>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(filter: Filter) -> Self {
        Self { filter, sort: None }
    }

    pub fn sort_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.sort = Some(Sort { field, direction });
        self
    }
}

impl From<Filter> for Query {
    fn from(filter: Filter) -> Self {
        Self::filter(filter)
    }
}
