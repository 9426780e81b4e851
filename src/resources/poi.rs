use axum::Router;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::trimmed_opt;
use crate::filtering::{FilterKind, FilterSet};
use crate::routes::{AppState, crud_router};
use crate::traits::{CRUDResource, MergeIntoActiveModel};
use crate::validation::{Validatable, ValidationErrors};

/// A point of interest. Every descriptive field is optional.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pois")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: Option<String>,
    pub desc: Option<String>,
    #[sea_orm(column_name = "type")]
    pub kind: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Poi {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            desc: model.desc,
            kind: model.kind,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create and update share a shape since nothing is required.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PoiPayload {
    pub name: Option<String>,
    pub desc: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl Validatable for PoiPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl From<PoiPayload> for ActiveModel {
    fn from(create: PoiPayload) -> Self {
        let now = Utc::now();
        Self {
            id: Set(Uuid::new_v4()),
            name: Set(trimmed_opt(create.name)),
            desc: Set(trimmed_opt(create.desc)),
            kind: Set(trimmed_opt(create.kind)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl MergeIntoActiveModel<ActiveModel> for PoiPayload {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if self.name.is_some() {
            existing.name = Set(trimmed_opt(self.name));
        }
        if self.desc.is_some() {
            existing.desc = Set(trimmed_opt(self.desc));
        }
        if self.kind.is_some() {
            existing.kind = Set(trimmed_opt(self.kind));
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

impl CRUDResource for Poi {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = PoiPayload;
    type UpdateModel = PoiPayload;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "point of interest";
    const RESOURCE_NAME_PLURAL: &'static str = "points of interest";
    const RESOURCE_LABEL: &'static str = "Point of interest";

    fn filters() -> FilterSet {
        FilterSet::new()
            .with("name", "name", FilterKind::Text)
            .with("type", "type", FilterKind::Text)
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("desc", Column::Desc),
            ("type", Column::Kind),
            ("created_at", Column::CreatedAt),
        ]
    }
}

pub fn router() -> Router<AppState> {
    crud_router::<Poi>()
}
