//! Create favorite table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserFavorite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserFavorite::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserFavorite::FavoriteType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserFavorite::TargetId).big_integer().not_null())
                    .col(ColumnDef::new(UserFavorite::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserFavorite::TargetTitle).string_len(200))
                    .col(ColumnDef::new(UserFavorite::TargetCover).string_len(500))
                    .col(ColumnDef::new(UserFavorite::TargetAuthorId).big_integer())
                    .col(ColumnDef::new(UserFavorite::UserNickname).string_len(100))
                    .col(
                        ColumnDef::new(UserFavorite::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(UserFavorite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserFavorite::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorite_user")
                            .from(UserFavorite::Table, UserFavorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one relation row per (user, type, target)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_favorite_user_type_target")
                    .table(UserFavorite::Table)
                    .col(UserFavorite::UserId)
                    .col(UserFavorite::FavoriteType)
                    .col(UserFavorite::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (user, status, created_at) for the favorites list
        manager
            .create_index(
                Index::create()
                    .name("idx_user_favorite_user_status_created")
                    .table(UserFavorite::Table)
                    .col(UserFavorite::UserId)
                    .col(UserFavorite::Status)
                    .col(UserFavorite::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserFavorite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserFavorite {
    Table,
    Id,
    FavoriteType,
    TargetId,
    UserId,
    TargetTitle,
    TargetCover,
    TargetAuthorId,
    UserNickname,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
