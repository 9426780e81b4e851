use axum::Router;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::trimmed;
use crate::filtering::{FilterKind, FilterSet};
use crate::routes::{AppState, crud_router};
use crate::traits::{CRUDResource, MergeIntoActiveModel};
use crate::validation::{Validatable, ValidationErrors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "species")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::character::Entity")]
    Characters,
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Characters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Species {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            desc: model.desc,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpeciesCreate {
    pub name: Option<String>,
    pub desc: Option<String>,
}

impl Validatable for SpeciesCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", self.name.as_deref(), None);
        errors.require_text("desc", self.desc.as_deref(), None);
        errors.result()
    }
}

impl From<SpeciesCreate> for ActiveModel {
    fn from(create: SpeciesCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Set(Uuid::new_v4()),
            name: Set(trimmed(create.name)),
            desc: Set(trimmed(create.desc)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpeciesUpdate {
    pub name: Option<String>,
    pub desc: Option<String>,
}

impl Validatable for SpeciesUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.update_text("name", self.name.as_deref(), None);
        errors.update_text("desc", self.desc.as_deref(), None);
        errors.result()
    }
}

impl MergeIntoActiveModel<ActiveModel> for SpeciesUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = Set(name.trim().to_string());
        }
        if let Some(desc) = self.desc {
            existing.desc = Set(desc.trim().to_string());
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

impl CRUDResource for Species {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = SpeciesCreate;
    type UpdateModel = SpeciesUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "species";
    const RESOURCE_NAME_PLURAL: &'static str = "species";
    const RESOURCE_LABEL: &'static str = "Species";

    fn filters() -> FilterSet {
        FilterSet::new().with("name", "name", FilterKind::Text)
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("desc", Column::Desc),
            ("created_at", Column::CreatedAt),
        ]
    }
}

pub fn router() -> Router<AppState> {
    crud_router::<Species>()
}
