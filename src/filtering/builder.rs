use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::predicate::{Bound, FieldCondition, FilterPredicate, Scalar};
use super::query::{QueryParams, QueryValue};

/// How a query parameter is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// Exact number, or a bound when the parameter ends in `_min`/`_max`.
    Number,
    /// Membership in a comma-separated or repeated list.
    Array,
    /// Exact date-time, or a bound when the parameter ends in `_from`/`_to`.
    Date,
    /// `true` (any case) is true, everything else is false.
    Boolean,
}

/// Target field and kind of one accepted query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    pub field: &'static str,
    pub kind: FilterKind,
}

/// The query parameters a resource accepts, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(&'static str, FilterConfig)>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `param`, filtering `field` as `kind`. Declaring a parameter
    /// twice keeps the latest declaration.
    #[must_use]
    pub fn with(mut self, param: &'static str, field: &'static str, kind: FilterKind) -> Self {
        self.entries.retain(|(existing, _)| *existing != param);
        self.entries.push((param, FilterConfig { field, kind }));
        self
    }

    #[must_use]
    pub fn get(&self, param: &str) -> Option<&FilterConfig> {
        self.entries
            .iter()
            .find(|(name, _)| *name == param)
            .map(|(_, config)| config)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FilterConfig)> {
        self.entries.iter().map(|(param, config)| (*param, config))
    }

    /// Distinct target fields.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for (_, config) in &self.entries {
            if !fields.contains(&config.field) {
                fields.push(config.field);
            }
        }
        fields
    }
}

/// Build the predicate for one request.
///
/// Only parameters declared in `filters` are read, and only their target
/// fields appear in the result. Values are coerced leniently: a non-numeric
/// number becomes NaN and an unparseable date becomes an invalid date, both
/// of which are left for the caller to reject or pass through.
#[must_use]
pub fn build_filter(params: &QueryParams, filters: &FilterSet) -> FilterPredicate {
    let mut predicate = FilterPredicate::new();

    for (param, config) in filters.iter() {
        let Some(value) = params.get(param) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match config.kind {
            FilterKind::Text => {
                predicate.insert(
                    config.field,
                    FieldCondition::contains_ignore_case(value.first()),
                );
            }
            FilterKind::Number => apply_ranged(
                &mut predicate,
                param,
                config.field,
                ("_min", "_max"),
                Scalar::Number(coerce_number(value.first())),
            ),
            FilterKind::Array => {
                predicate.insert(config.field, FieldCondition::OneOf(membership_candidates(value)));
            }
            FilterKind::Date => apply_ranged(
                &mut predicate,
                param,
                config.field,
                ("_from", "_to"),
                Scalar::Date(coerce_date(value.first())),
            ),
            FilterKind::Boolean => {
                predicate.insert(
                    config.field,
                    FieldCondition::Equals(Scalar::Bool(coerce_bool(value.first()))),
                );
            }
        }
    }

    tracing::trace!(?predicate, "Built filter predicate");
    predicate
}

fn apply_ranged(
    predicate: &mut FilterPredicate,
    param: &str,
    field: &str,
    (lower_suffix, upper_suffix): (&str, &str),
    value: Scalar,
) {
    if param.ends_with(lower_suffix) {
        predicate.merge_bound(field, Bound::Lower, value);
    } else if param.ends_with(upper_suffix) {
        predicate.merge_bound(field, Bound::Upper, value);
    } else {
        predicate.insert(field, FieldCondition::Equals(value));
    }
}

fn membership_candidates(value: &QueryValue) -> Vec<String> {
    match value {
        QueryValue::Many(values) => values
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
        QueryValue::Single(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Blank input is zero, anything unparseable is NaN.
///
/// Accepts decimal and exponent notation, a signed `Infinity`, and unsigned
/// `0x`/`0o`/`0b` integers. Other spellings `f64::from_str` would take, such
/// as `inf` or `nan`, are NaN.
fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    let (sign, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .unwrap_or(f64::NAN)
}

/// Accepts RFC 3339, a naive date-time (read as UTC) or a bare date (UTC
/// midnight).
fn coerce_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn coerce_bool(raw: &str) -> bool {
    raw.to_lowercase() == "true"
}
