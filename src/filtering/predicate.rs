use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A coerced query value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// May be NaN when the raw value was not numeric.
    Number(f64),
    /// `None` when the raw value did not parse as a date-time.
    Date(Option<DateTime<Utc>>),
    Bool(bool),
}

impl Scalar {
    /// False for NaN numbers and unparseable dates.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Number(value) => !value.is_nan(),
            Self::Date(value) => value.is_some(),
            Self::Bool(_) => true,
        }
    }
}

/// Which end of a range a suffixed parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// The match applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    Equals(Scalar),
    Contains {
        needle: String,
        case_insensitive: bool,
    },
    Range {
        gte: Option<Scalar>,
        lte: Option<Scalar>,
    },
    OneOf(Vec<String>),
}

impl FieldCondition {
    #[must_use]
    pub fn contains_ignore_case(needle: impl Into<String>) -> Self {
        Self::Contains {
            needle: needle.into(),
            case_insensitive: true,
        }
    }

    /// Set one bound, keeping the other bound of an existing range. Any other
    /// existing condition is replaced.
    #[must_use]
    pub fn with_bound(existing: Option<Self>, bound: Bound, value: Scalar) -> Self {
        let (mut gte, mut lte) = match existing {
            Some(Self::Range { gte, lte }) => (gte, lte),
            _ => (None, None),
        };
        match bound {
            Bound::Lower => gte = Some(value),
            Bound::Upper => lte = Some(value),
        }
        Self::Range { gte, lte }
    }
}

/// Field name to condition. Every field appears at most once; all conditions
/// must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    conditions: BTreeMap<String, FieldCondition>,
}

impl FilterPredicate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldCondition> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldCondition)> {
        self.conditions
            .iter()
            .map(|(field, condition)| (field.as_str(), condition))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn insert(&mut self, field: &str, condition: FieldCondition) {
        self.conditions.insert(field.to_string(), condition);
    }

    pub fn merge_bound(&mut self, field: &str, bound: Bound, value: Scalar) {
        let existing = self.conditions.remove(field);
        self.conditions.insert(
            field.to_string(),
            FieldCondition::with_bound(existing, bound, value),
        );
    }
}
