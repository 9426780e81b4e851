use sea_orm::{
    ColumnTrait, ColumnType, Condition, Value,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use uuid::Uuid;

use super::predicate::{FieldCondition, FilterPredicate, Scalar};

/// Escape character for LIKE patterns.
const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace(LIKE_ESCAPE, "!!")
        .replace('%', "!%")
        .replace('_', "!_")
}

/// Matches no row. Used for comparisons against values that failed to coerce.
fn never_matches() -> SimpleExpr {
    Expr::cust("1 = 0")
}

/// Translate a predicate into a Sea-ORM condition over `columns`.
///
/// Fields without a matching column are skipped with a warning. A number
/// that coerced to NaN or an unparseable date compares false against every
/// row.
pub fn apply_predicate<C>(predicate: &FilterPredicate, columns: &[(&str, C)]) -> Condition
where
    C: ColumnTrait,
{
    let mut condition = Condition::all();

    for (field, field_condition) in predicate.iter() {
        let Some(column) = columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
        else {
            tracing::warn!(field = %field, "Filter references a field with no column, skipping");
            continue;
        };

        condition = condition.add(condition_for(column, field_condition));
    }

    condition
}

fn condition_for<C: ColumnTrait>(column: C, field_condition: &FieldCondition) -> SimpleExpr {
    match field_condition {
        FieldCondition::Contains {
            needle,
            case_insensitive,
        } => contains(column, needle, *case_insensitive),
        FieldCondition::Equals(scalar) => match scalar_value(scalar) {
            Some(value) => column.eq(value),
            None => never_matches(),
        },
        FieldCondition::Range { gte, lte } => range(column, gte.as_ref(), lte.as_ref()),
        FieldCondition::OneOf(candidates) => one_of(column, candidates),
    }
}

fn contains<C: ColumnTrait>(column: C, needle: &str, case_insensitive: bool) -> SimpleExpr {
    let target = Expr::col((column.entity_name(), column));
    let pattern = format!("%{}%", escape_like_wildcards(needle));

    if case_insensitive {
        Expr::expr(Func::upper(target))
            .like(LikeExpr::new(pattern.to_uppercase()).escape(LIKE_ESCAPE))
    } else {
        target.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
    }
}

fn range<C: ColumnTrait>(column: C, gte: Option<&Scalar>, lte: Option<&Scalar>) -> SimpleExpr {
    let mut bounds: Vec<SimpleExpr> = Vec::with_capacity(2);

    if let Some(lower) = gte {
        bounds.push(scalar_value(lower).map_or_else(never_matches, |value| column.gte(value)));
    }
    if let Some(upper) = lte {
        bounds.push(scalar_value(upper).map_or_else(never_matches, |value| column.lte(value)));
    }

    bounds
        .into_iter()
        .reduce(SimpleExpr::and)
        .unwrap_or_else(|| Expr::cust("1 = 1"))
}

fn one_of<C: ColumnTrait>(column: C, candidates: &[String]) -> SimpleExpr {
    if matches!(column.def().get_column_type(), ColumnType::Uuid) {
        // Candidates that are not UUIDs can never equal a UUID column.
        let ids: Vec<Uuid> = candidates
            .iter()
            .filter_map(|candidate| Uuid::parse_str(candidate.trim()).ok())
            .collect();
        return column.is_in(ids);
    }
    column.is_in(candidates.iter().cloned())
}

/// Integral numbers bind as integers so they compare exactly against integer
/// columns on every backend.
#[allow(clippy::cast_possible_truncation)]
fn scalar_value(scalar: &Scalar) -> Option<Value> {
    match scalar {
        Scalar::Number(number) if number.is_nan() => None,
        Scalar::Number(number)
            if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 =>
        {
            Some(Value::from(*number as i64))
        }
        Scalar::Number(number) => Some(Value::from(*number)),
        Scalar::Date(Some(date)) => Some(Value::from(*date)),
        Scalar::Date(None) => None,
        Scalar::Bool(flag) => Some(Value::from(*flag)),
    }
}
