//! The four collections served by the API.
//!
//! Each module holds the Sea-ORM entity, the API representation, the
//! create/update payloads and the resource's router.

pub mod book;
pub mod character;
pub mod poi;
pub mod species;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use book::Book;
pub use character::Character;
pub use poi::Poi;
pub use species::Species;

/// Ordered list of referenced ids, stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct IdList(pub Vec<Uuid>);

impl From<Vec<Uuid>> for IdList {
    fn from(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }
}

/// Trimmed value of a field that validation has already required.
pub(crate) fn trimmed(value: Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

pub(crate) fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}
