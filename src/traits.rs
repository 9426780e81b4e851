use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::filtering::FilterSet;
use crate::validation::Validatable;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this update model into an existing active model
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the merge operation fails due to data conversion issues.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// A collection exposed as a REST resource.
///
/// Implementors describe their entity, payload types, naming and filterable
/// parameters; the storage operations below and the generic handlers in
/// [`crate::routes`] do the rest.
#[async_trait]
pub trait CRUDResource: Serialize + Sized + Send + Sync + 'static {
    type EntityType: EntityTrait<Model = Self::ModelType> + Sync;
    type ModelType: FromQueryResult
        + IntoActiveModel<Self::ActiveModelType>
        + Into<Self>
        + Send
        + Sync
        + 'static;
    type ColumnType: ColumnTrait + Send + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync
        + 'static;
    type CreateModel: Into<Self::ActiveModelType> + Validatable + DeserializeOwned + Send + 'static;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModelType>
        + Validatable
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const ID_COLUMN: Self::ColumnType;
    const CREATED_AT_COLUMN: Self::ColumnType;
    /// Used in failure messages, e.g. `Failed to create book`.
    const RESOURCE_NAME_SINGULAR: &'static str;
    /// Used in list failure messages, e.g. `Failed to fetch books`.
    const RESOURCE_NAME_PLURAL: &'static str;
    /// Capitalised name used in not-found messages, e.g. `Book not found`.
    const RESOURCE_LABEL: &'static str;

    /// Accepted list query parameters.
    #[must_use]
    fn filters() -> FilterSet {
        FilterSet::new()
    }

    /// Field name to column, for every field [`Self::filters`] targets.
    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    /// One page of matching records, newest first.
    async fn get_all(
        db: &DatabaseConnection,
        condition: &Condition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let models = Self::EntityType::find()
            .filter(condition.clone())
            .order_by_desc(Self::CREATED_AT_COLUMN)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_one(db: &DatabaseConnection, id: Uuid) -> Result<Self, DbErr> {
        let model = Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::RESOURCE_LABEL)))?;
        Ok(model.into())
    }

    async fn create(db: &DatabaseConnection, create_model: Self::CreateModel) -> Result<Self, DbErr> {
        let active_model: Self::ActiveModelType = create_model.into();

        // insert returns the stored row, which works for UUID keys on every backend
        let model = active_model.insert(db).await?;
        Ok(model.into())
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        update_model: Self::UpdateModel,
    ) -> Result<Self, DbErr> {
        let model = Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::RESOURCE_LABEL)))?;
        let existing: Self::ActiveModelType = model.into_active_model();
        let updated_model = update_model.merge_into_activemodel(existing)?;
        let updated = updated_model.update(db).await?;
        Ok(updated.into())
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, DbErr> {
        let res = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        match res.rows_affected {
            0 => Err(DbErr::RecordNotFound(format!(
                "{} not found",
                Self::RESOURCE_LABEL
            ))),
            _ => Ok(id),
        }
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        let query = Self::EntityType::find().filter(condition.clone());
        PaginatorTrait::count(query, db).await
    }
}
