//! Create search history and hot search tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchHistory::UserId).big_integer().not_null())
                    .col(ColumnDef::new(SearchHistory::Keyword).string_len(200).not_null())
                    .col(
                        ColumnDef::new(SearchHistory::SearchType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SearchHistory::ResultCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SearchHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_history_user")
                            .from(SearchHistory::Table, SearchHistory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) for recent history
        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_created")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::UserId)
                    .col(SearchHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HotSearch::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HotSearch::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HotSearch::Keyword).string_len(200).not_null())
                    .col(
                        ColumnDef::new(HotSearch::SearchCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(HotSearch::TrendScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(HotSearch::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(HotSearch::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HotSearch::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: keyword
        manager
            .create_index(
                Index::create()
                    .name("idx_hot_search_keyword")
                    .table(HotSearch::Table)
                    .col(HotSearch::Keyword)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (status, search_count) for the hot list
        manager
            .create_index(
                Index::create()
                    .name("idx_hot_search_status_count")
                    .table(HotSearch::Table)
                    .col(HotSearch::Status)
                    .col(HotSearch::SearchCount)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HotSearch::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SearchHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SearchHistory {
    Table,
    Id,
    UserId,
    Keyword,
    SearchType,
    ResultCount,
    CreatedAt,
}

#[derive(Iden)]
enum HotSearch {
    Table,
    Id,
    Keyword,
    SearchCount,
    TrendScore,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
