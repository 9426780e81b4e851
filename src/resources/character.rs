use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set,
    QueryFilter, QueryOrder, QuerySelect, Select,
    entity::prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{IdList, book, species, trimmed, trimmed_opt};
use crate::errors::{ApiError, Operation};
use crate::filtering::{FilterKind, FilterSet};
use crate::response::ApiResponse;
use crate::routes::{AppState, crud_router, parse_id};
use crate::traits::{CRUDResource, MergeIntoActiveModel};
use crate::validation::{Validatable, ValidationErrors};

pub const DESC_MAX_LENGTH: usize = 1000;

/// Reported for characters whose species no longer exists.
pub const UNKNOWN_SPECIES: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub species: Uuid,
    #[sea_orm(column_type = "Json")]
    pub appears_in: IdList,
    pub desc: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::species::Entity",
        from = "Column::Species",
        to = "super::species::Column::Id"
    )]
    Species,
}

impl Related<species::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Species.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub species: Uuid,
    pub appears_in: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Character {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            age: model.age,
            species: model.species,
            appears_in: model.appears_in.0,
            desc: model.desc,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CharacterCreate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub species: Option<Uuid>,
    #[serde(default)]
    pub appears_in: Vec<Uuid>,
    pub desc: Option<String>,
}

impl Validatable for CharacterCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", self.name.as_deref(), None);
        errors.require("age", self.age.as_ref());
        errors.require("species", self.species.as_ref());
        errors.optional_text("desc", self.desc.as_deref(), Some(DESC_MAX_LENGTH));
        errors.result()
    }
}

impl From<CharacterCreate> for ActiveModel {
    fn from(create: CharacterCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Set(Uuid::new_v4()),
            name: Set(trimmed(create.name)),
            age: Set(create.age.unwrap_or_default()),
            species: Set(create.species.unwrap_or_default()),
            appears_in: Set(IdList(create.appears_in)),
            desc: Set(trimmed_opt(create.desc)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub species: Option<Uuid>,
    pub appears_in: Option<Vec<Uuid>>,
    pub desc: Option<String>,
}

impl Validatable for CharacterUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.update_text("name", self.name.as_deref(), None);
        errors.optional_text("desc", self.desc.as_deref(), Some(DESC_MAX_LENGTH));
        errors.result()
    }
}

impl MergeIntoActiveModel<ActiveModel> for CharacterUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = Set(name.trim().to_string());
        }
        if let Some(age) = self.age {
            existing.age = Set(age);
        }
        if let Some(species) = self.species {
            existing.species = Set(species);
        }
        if let Some(appears_in) = self.appears_in {
            existing.appears_in = Set(IdList(appears_in));
        }
        if self.desc.is_some() {
            existing.desc = Set(trimmed_opt(self.desc));
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

impl CRUDResource for Character {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = CharacterCreate;
    type UpdateModel = CharacterUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "character";
    const RESOURCE_NAME_PLURAL: &'static str = "characters";
    const RESOURCE_LABEL: &'static str = "Character";

    fn filters() -> FilterSet {
        FilterSet::new()
            .with("name", "name", FilterKind::Text)
            .with("species", "species", FilterKind::Array)
            .with("age", "age", FilterKind::Number)
            .with("age_min", "age", FilterKind::Number)
            .with("age_max", "age", FilterKind::Number)
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("age", Column::Age),
            ("species", Column::Species),
            ("desc", Column::Desc),
            ("created_at", Column::CreatedAt),
            ("updated_at", Column::UpdatedAt),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub species: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStat {
    pub book_id: Uuid,
    pub title: String,
    pub character_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBookStats {
    pub character_id: Uuid,
    pub character_name: String,
    pub total_books: usize,
    pub books: Vec<BookStat>,
}

/// `(species name, character count)` rows, one per referenced species id.
/// The name is NULL when the species no longer exists.
fn species_stats_query() -> Select<Entity> {
    let character_count: SimpleExpr = Func::count(Expr::col((Entity, Column::Id))).into();

    Entity::find()
        .select_only()
        .column(species::Column::Name)
        .column_as(character_count.clone(), "count")
        .left_join(species::Entity)
        .group_by(Column::Species)
        .group_by(species::Column::Name)
        .order_by_desc(character_count)
        .order_by_asc(species::Column::Name)
}

/// Character count per species, largest first.
///
/// # Errors
///
/// Any database error from the aggregate query.
pub async fn count_by_species(db: &DatabaseConnection) -> Result<Vec<SpeciesStats>, DbErr> {
    let rows: Vec<(Option<String>, i64)> = species_stats_query().into_tuple().all(db).await?;

    Ok(rows
        .into_iter()
        .map(|(name, count)| SpeciesStats {
            species: name.unwrap_or_else(|| UNKNOWN_SPECIES.to_string()),
            count,
        })
        .collect())
}

/// The books a character appears in, in the character's own order. Ids that
/// no longer resolve to a book are left out.
///
/// # Errors
///
/// `RecordNotFound` when the character does not exist, or any database error.
pub async fn book_stats(db: &DatabaseConnection, id: Uuid) -> Result<CharacterBookStats, DbErr> {
    let character = Character::get_one(db, id).await?;

    let books: HashMap<Uuid, book::Model> = if character.appears_in.is_empty() {
        HashMap::new()
    } else {
        book::Entity::find()
            .filter(book::Column::Id.is_in(character.appears_in.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|book| (book.id, book))
            .collect()
    };

    let stats: Vec<BookStat> = character
        .appears_in
        .iter()
        .filter_map(|book_id| books.get(book_id))
        .map(|book| BookStat {
            book_id: book.id,
            title: book.title.clone(),
            character_count: book.characters.0.len(),
        })
        .collect();

    Ok(CharacterBookStats {
        character_id: character.id,
        character_name: character.name,
        total_books: stats.len(),
        books: stats,
    })
}

async fn get_species_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SpeciesStats>>>, ApiError> {
    let stats = count_by_species(&state.db).await.map_err(|err| {
        ApiError::operation(Operation::FetchAll, "character species statistics", err)
    })?;
    Ok(Json(ApiResponse::ok(stats)))
}

async fn get_book_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CharacterBookStats>>, ApiError> {
    let id = parse_id::<Character>(&id)?;
    let stats = book_stats(&state.db, id).await.map_err(|err| {
        ApiError::operation(Operation::FetchOne, "character book statistics", err)
    })?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats/species", get(get_species_stats))
        .route("/{id}/book-stats", get(get_book_stats))
        .merge(crud_router::<Character>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, QueryTrait};

    #[test]
    fn test_create_requires_name_age_species() {
        let errors = CharacterCreate::default().validate().unwrap_err();
        let messages: Vec<&str> = errors.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Path `name` is required.",
                "Path `age` is required.",
                "Path `species` is required."
            ]
        );
    }

    #[test]
    fn test_desc_length_limit() {
        let update = CharacterUpdate {
            desc: Some("d".repeat(DESC_MAX_LENGTH + 1)),
            ..CharacterUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_species_stats_query_groups_and_joins() {
        let sql = species_stats_query()
            .build(DatabaseBackend::Sqlite)
            .to_string();

        assert!(sql.contains("LEFT JOIN \"species\""), "{sql}");
        assert!(sql.contains("COUNT(\"characters\".\"id\") AS \"count\""), "{sql}");
        assert!(
            sql.contains("GROUP BY \"characters\".\"species\", \"species\".\"name\""),
            "{sql}"
        );
        assert!(sql.contains("ORDER BY COUNT(\"characters\".\"id\") DESC"), "{sql}");
        assert!(sql.ends_with("\"species\".\"name\" ASC"), "{sql}");
    }
}
