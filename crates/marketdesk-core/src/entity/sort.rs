use crate::entity::Record;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

///
/// SortParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SortParseError {
    #[error("sort expression is empty")]
    Empty,
}

///
/// Sort
///
/// Single-field ordering in the platform's string form: `"date"` ascending,
/// `"-date"` descending.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sort {
    field: String,
    direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Compare two records under this ordering; ties fall back to record id.
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let left = a.field(&self.field);
        let right = b.field(&self.field);
        let ord = compare_values(left.as_deref(), right.as_deref());
        let ord = match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };

        ord.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort a slice of records in place.
    pub fn apply(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => f.write_str(&self.field),
            Direction::Desc => write!(f, "-{}", self.field),
        }
    }
}

impl FromStr for Sort {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (field, direction) = match s.strip_prefix('-') {
            Some(rest) => (rest.trim(), Direction::Desc),
            None => (s.strip_prefix('+').unwrap_or(s).trim(), Direction::Asc),
        };
        if field.is_empty() {
            return Err(SortParseError::Empty);
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl TryFrom<String> for Sort {
    type Error = SortParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sort> for String {
    fn from(sort: Sort) -> Self {
        sort.to_string()
    }
}

// Missing < null < bool < number < string < array/object (by serialized text).
fn value_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_) | Value::Object(_)) => 5,
    }
}

pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (
            Some(x @ (Value::Array(_) | Value::Object(_))),
            Some(y @ (Value::Array(_) | Value::Object(_))),
        ) => x.to_string().cmp(&y.to_string()),
        _ => value_rank(a).cmp(&value_rank(b)),
    }
}

///
/// TESTS
///
