//! Create like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLike::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserLike::LikeType).string_len(16).not_null())
                    .col(ColumnDef::new(UserLike::TargetId).big_integer().not_null())
                    .col(ColumnDef::new(UserLike::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserLike::TargetTitle).string_len(200))
                    .col(ColumnDef::new(UserLike::TargetAuthorId).big_integer())
                    .col(ColumnDef::new(UserLike::UserNickname).string_len(100))
                    .col(ColumnDef::new(UserLike::UserAvatar).string_len(500))
                    .col(
                        ColumnDef::new(UserLike::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(UserLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserLike::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_like_user")
                            .from(UserLike::Table, UserLike::UserId)
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
                    .name("idx_user_like_user_type_target")
                    .table(UserLike::Table)
                    .col(UserLike::UserId)
                    .col(UserLike::LikeType)
                    .col(UserLike::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (type, target, status) for liker lists
        manager
            .create_index(
                Index::create()
                    .name("idx_user_like_target_status")
                    .table(UserLike::Table)
                    .col(UserLike::LikeType)
                    .col(UserLike::TargetId)
                    .col(UserLike::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLike {
    Table,
    Id,
    LikeType,
    TargetId,
    UserId,
    TargetTitle,
    TargetAuthorId,
    UserNickname,
    UserAvatar,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
