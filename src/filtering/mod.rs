//! # Query-Parameter Filtering
//!
//! Turns the query string of a list request into a storage condition in three
//! steps:
//!
//! 1. [`QueryParams`] collects the raw parameters (`?title=Storm&species=a,b`).
//! 2. [`build_filter`] walks a resource's [`FilterSet`] and produces a
//!    [`FilterPredicate`], a storage-agnostic map from field name to
//!    [`FieldCondition`].
//! 3. [`apply_predicate`] translates the predicate into a Sea-ORM
//!    [`Condition`](sea_orm::Condition) for the resource's columns.
//!
//! Steps 1 and 2 are pure and never fail: malformed values degrade to a
//! best-effort coercion instead of an error.
//!
//! ## Parameter kinds
//!
//! ```rust,ignore
//! let filters = FilterSet::new()
//!     .with("title", "title", FilterKind::Text)                   // ?title=storm
//!     .with("publication_year_min", "publication_year", FilterKind::Number) // ?publication_year_min=1990
//!     .with("publication_year_max", "publication_year", FilterKind::Number) // ?publication_year_max=2000
//!     .with("species", "species", FilterKind::Array)              // ?species=a,b,c
//!     .with("created_at_from", "created_at", FilterKind::Date);   // ?created_at_from=2024-01-01
//! ```
//!
//! Number parameters ending in `_min`/`_max` and date parameters ending in
//! `_from`/`_to` are merged into a single range on their field.

pub mod builder;
pub mod conditions;
pub mod predicate;
pub mod query;

pub use builder::{FilterConfig, FilterKind, FilterSet, build_filter};
pub use conditions::apply_predicate;
pub use predicate::{Bound, FieldCondition, FilterPredicate, Scalar};
pub use query::{QueryParams, QueryValue};
