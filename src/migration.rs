//! Schema migrations, applied at startup and by the test harness.
//!
//! References between collections (`characters.species`,
//! `characters.appears_in`, `books.characters`) are not foreign keys: a
//! dangling reference is tolerated and surfaces as `Unknown` or is skipped by
//! the statistics endpoints.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateSpeciesTable),
            Box::new(CreateCharactersTable),
            Box::new(CreateBooksTable),
            Box::new(CreatePoisTable),
        ]
    }
}

fn index(
    name: &str,
    table: impl IntoIden + 'static,
    column: impl IntoIden + 'static,
) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .if_not_exists()
        .to_owned()
}

pub struct CreateSpeciesTable;

impl MigrationName for CreateSpeciesTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_species_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateSpeciesTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Species::Table)
            .if_not_exists()
            .col(ColumnDef::new(Species::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Species::Name).string().not_null())
            .col(ColumnDef::new(Species::Desc).text().not_null())
            .col(ColumnDef::new(Species::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Species::UpdatedAt).timestamp_with_time_zone().not_null())
            .to_owned();

        manager.create_table(table).await?;
        manager
            .create_index(index("idx-species-name", Species::Table, Species::Name))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Species::Table).to_owned())
            .await
    }
}

pub struct CreateCharactersTable;

impl MigrationName for CreateCharactersTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_characters_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCharactersTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Characters::Table)
            .if_not_exists()
            .col(ColumnDef::new(Characters::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Characters::Name).string().not_null())
            .col(ColumnDef::new(Characters::Age).integer().not_null())
            .col(ColumnDef::new(Characters::Species).uuid().not_null())
            .col(ColumnDef::new(Characters::AppearsIn).json().not_null())
            .col(ColumnDef::new(Characters::Desc).text().null())
            .col(ColumnDef::new(Characters::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Characters::UpdatedAt).timestamp_with_time_zone().not_null())
            .to_owned();

        manager.create_table(table).await?;
        manager
            .create_index(index("idx-characters-name", Characters::Table, Characters::Name))
            .await?;
        manager
            .create_index(index(
                "idx-characters-species",
                Characters::Table,
                Characters::Species,
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await
    }
}

pub struct CreateBooksTable;

impl MigrationName for CreateBooksTable {
    fn name(&self) -> &'static str {
        "m20240101_000003_create_books_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBooksTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Books::Table)
            .if_not_exists()
            .col(ColumnDef::new(Books::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Books::Title).string_len(200).not_null())
            .col(ColumnDef::new(Books::Blurb).string_len(500).not_null())
            .col(ColumnDef::new(Books::Pages).integer().not_null())
            .col(ColumnDef::new(Books::PublicationYear).integer().not_null())
            .col(ColumnDef::new(Books::Characters).json().not_null())
            .col(ColumnDef::new(Books::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Books::UpdatedAt).timestamp_with_time_zone().not_null())
            .to_owned();

        manager.create_table(table).await?;
        manager
            .create_index(index("idx-books-title", Books::Table, Books::Title))
            .await?;
        manager
            .create_index(index(
                "idx-books-publication-year",
                Books::Table,
                Books::PublicationYear,
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await
    }
}

pub struct CreatePoisTable;

impl MigrationName for CreatePoisTable {
    fn name(&self) -> &'static str {
        "m20240101_000004_create_pois_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePoisTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Pois::Table)
            .if_not_exists()
            .col(ColumnDef::new(Pois::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Pois::Name).string().null())
            .col(ColumnDef::new(Pois::Desc).text().null())
            .col(ColumnDef::new(Pois::Type).string().null())
            .col(ColumnDef::new(Pois::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Pois::UpdatedAt).timestamp_with_time_zone().not_null())
            .to_owned();

        manager.create_table(table).await?;
        manager
            .create_index(index("idx-pois-name", Pois::Table, Pois::Name))
            .await?;
        manager
            .create_index(index("idx-pois-type", Pois::Table, Pois::Type))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pois::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Species {
    Table,
    Id,
    Name,
    Desc,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Characters {
    Table,
    Id,
    Name,
    Age,
    Species,
    AppearsIn,
    Desc,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Title,
    Blurb,
    Pages,
    PublicationYear,
    Characters,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pois {
    Table,
    Id,
    Name,
    Desc,
    Type,
    CreatedAt,
    UpdatedAt,
}
