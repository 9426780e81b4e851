use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::{IdList, trimmed};
use crate::errors::{ApiError, Operation};
use crate::filtering::{FilterKind, FilterSet};
use crate::pagination::PaginationResult;
use crate::response::ApiResponse;
use crate::routes::{AppState, crud_router, fetch_page, parse_id};
use crate::traits::{CRUDResource, MergeIntoActiveModel};
use crate::validation::{Validatable, ValidationErrors};

pub const TITLE_MAX_LENGTH: usize = 200;
pub const BLURB_MAX_LENGTH: usize = 500;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub blurb: String,
    pub pages: i32,
    pub publication_year: i32,
    #[sea_orm(column_type = "Json")]
    pub characters: IdList,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub blurb: String,
    pub pages: i32,
    pub publication_year: i32,
    pub characters: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            blurb: model.blurb,
            pages: model.pages,
            publication_year: model.publication_year,
            characters: model.characters.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// The lightweight listing shape served by the metadata endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub id: Uuid,
    pub title: String,
    pub blurb: String,
    pub characters: Vec<Uuid>,
    pub publication_year: i32,
}

impl From<Book> for BookMetadata {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            blurb: book.blurb,
            characters: book.characters,
            publication_year: book.publication_year,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookCreate {
    pub title: Option<String>,
    pub blurb: Option<String>,
    pub pages: Option<i32>,
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub characters: Vec<Uuid>,
}

impl Validatable for BookCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", self.title.as_deref(), Some(TITLE_MAX_LENGTH));
        errors.require_text("blurb", self.blurb.as_deref(), Some(BLURB_MAX_LENGTH));
        errors.require("pages", self.pages.as_ref());
        errors.require("publication_year", self.publication_year.as_ref());
        errors.result()
    }
}

impl From<BookCreate> for ActiveModel {
    fn from(create: BookCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Set(Uuid::new_v4()),
            title: Set(trimmed(create.title)),
            blurb: Set(trimmed(create.blurb)),
            pages: Set(create.pages.unwrap_or_default()),
            publication_year: Set(create.publication_year.unwrap_or_default()),
            characters: Set(IdList(create.characters)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub blurb: Option<String>,
    pub pages: Option<i32>,
    pub publication_year: Option<i32>,
    pub characters: Option<Vec<Uuid>>,
}

impl Validatable for BookUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.update_text("title", self.title.as_deref(), Some(TITLE_MAX_LENGTH));
        errors.update_text("blurb", self.blurb.as_deref(), Some(BLURB_MAX_LENGTH));
        errors.result()
    }
}

impl MergeIntoActiveModel<ActiveModel> for BookUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(title) = self.title {
            existing.title = Set(title.trim().to_string());
        }
        if let Some(blurb) = self.blurb {
            existing.blurb = Set(blurb.trim().to_string());
        }
        if let Some(pages) = self.pages {
            existing.pages = Set(pages);
        }
        if let Some(publication_year) = self.publication_year {
            existing.publication_year = Set(publication_year);
        }
        if let Some(characters) = self.characters {
            existing.characters = Set(IdList(characters));
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

impl CRUDResource for Book {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = BookCreate;
    type UpdateModel = BookUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "book";
    const RESOURCE_NAME_PLURAL: &'static str = "books";
    const RESOURCE_LABEL: &'static str = "Book";

    fn filters() -> FilterSet {
        FilterSet::new()
            .with("title", "title", FilterKind::Text)
            .with("publication_year", "publication_year", FilterKind::Number)
            .with("publication_year_min", "publication_year", FilterKind::Number)
            .with("publication_year_max", "publication_year", FilterKind::Number)
            .with("created_at_from", "created_at", FilterKind::Date)
            .with("created_at_to", "created_at", FilterKind::Date)
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("title", Column::Title),
            ("blurb", Column::Blurb),
            ("pages", Column::Pages),
            ("publication_year", Column::PublicationYear),
            ("created_at", Column::CreatedAt),
            ("updated_at", Column::UpdatedAt),
        ]
    }
}

/// `GET /metadata`, the filtered and paginated metadata listing.
async fn get_all_metadata(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<PaginationResult<BookMetadata>>>, ApiError> {
    let page = fetch_page::<Book>(&state, params)
        .await
        .map_err(|err| ApiError::operation(Operation::FetchMetadata, "books", err))?;
    Ok(Json(ApiResponse::ok(page.map_data(BookMetadata::from))))
}

async fn get_one_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookMetadata>>, ApiError> {
    let id = parse_id::<Book>(&id)?;
    let book = Book::get_one(&state.db, id)
        .await
        .map_err(|err| ApiError::operation(Operation::FetchMetadata, "book", err))?;
    Ok(Json(ApiResponse::ok(book.into())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metadata", get(get_all_metadata))
        .route("/{id}/metadata", get(get_one_metadata))
        .merge(crud_router::<Book>())
}
