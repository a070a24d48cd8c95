//! Create category table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Category::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Category::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Category::Description).text())
                    .col(
                        ColumnDef::new(Category::ParentId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Category::IconUrl).string_len(500))
                    .col(ColumnDef::new(Category::Sort).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Category::ContentCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Category::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Category::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Category::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: parent_id (children lookups and tree loads)
        manager
            .create_index(
                Index::create()
                    .name("idx_category_parent_id")
                    .table(Category::Table)
                    .col(Category::ParentId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: sibling names among active categories
        manager
            .get_connection()
            .execute_unprepared(
                r"CREATE UNIQUE INDEX IF NOT EXISTS idx_category_parent_name_active
                  ON category (parent_id, name)
                  WHERE status = 'active'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
    Description,
    ParentId,
    IconUrl,
    Sort,
    ContentCount,
    Status,
    CreatedAt,
    UpdatedAt,
}
