//! Portfolio content.
//!
//! Every content kind (hero, config, skills, projects, ...) shares one table;
//! the per-kind fields live in the JSON `data` column.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ContentItems {
    Table,
    Id,
    Kind,
    Position,
    Data,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentItems::Kind).string().not_null())
                    .col(
                        ColumnDef::new(ContentItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ContentItems::Data).text().not_null())
                    .col(
                        ColumnDef::new(ContentItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-content_items-kind-position")
                    .table(ContentItems::Table)
                    .col(ContentItems::Kind)
                    .col(ContentItems::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentItems::Table).to_owned())
            .await
    }
}
