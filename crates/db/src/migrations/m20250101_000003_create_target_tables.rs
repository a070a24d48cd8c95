//! Create like/favorite target tables migration.
//!
//! Contents, comments, dynamics and goods are written by other services.
//! Only the columns read here are created.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn counter_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

fn timestamp_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(id_col(Content::Id))
                    .col(ColumnDef::new(Content::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Content::Description).text())
                    .col(ColumnDef::new(Content::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(Content::Tags).string_len(500))
                    .col(ColumnDef::new(Content::CoverUrl).string_len(500))
                    .col(ColumnDef::new(Content::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Content::AuthorNickname).string_len(100))
                    .col(
                        ColumnDef::new(Content::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Content::ReviewStatus)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(counter_col(Content::ViewCount))
                    .col(counter_col(Content::LikeCount))
                    .col(counter_col(Content::FavoriteCount))
                    .col(timestamp_col(Content::CreatedAt))
                    .col(timestamp_col(Content::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Index: (status, review_status) for search
        manager
            .create_index(
                Index::create()
                    .name("idx_content_status_review")
                    .table(Content::Table)
                    .col(Content::Status)
                    .col(Content::ReviewStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(id_col(Comment::Id))
                    .col(ColumnDef::new(Comment::ContentId).big_integer().not_null())
                    .col(ColumnDef::new(Comment::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Comment::Body).text().not_null())
                    .col(counter_col(Comment::LikeCount))
                    .col(timestamp_col(Comment::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SocialDynamic::Table)
                    .if_not_exists()
                    .col(id_col(SocialDynamic::Id))
                    .col(ColumnDef::new(SocialDynamic::UserId).big_integer().not_null())
                    .col(ColumnDef::new(SocialDynamic::Body).text().not_null())
                    .col(counter_col(SocialDynamic::LikeCount))
                    .col(timestamp_col(SocialDynamic::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Goods::Table)
                    .if_not_exists()
                    .col(id_col(Goods::Id))
                    .col(ColumnDef::new(Goods::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Goods::Description).text())
                    .col(ColumnDef::new(Goods::CoverUrl).string_len(500))
                    .col(ColumnDef::new(Goods::SellerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Goods::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(counter_col(Goods::FavoriteCount))
                    .col(timestamp_col(Goods::CreatedAt))
                    .col(timestamp_col(Goods::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Goods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialDynamic::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Content {
    Table,
    Id,
    Title,
    Description,
    ContentType,
    Tags,
    CoverUrl,
    AuthorId,
    AuthorNickname,
    Status,
    ReviewStatus,
    ViewCount,
    LikeCount,
    FavoriteCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    ContentId,
    UserId,
    Body,
    LikeCount,
    CreatedAt,
}

#[derive(Iden)]
enum SocialDynamic {
    Table,
    Id,
    UserId,
    Body,
    LikeCount,
    CreatedAt,
}

#[derive(Iden)]
enum Goods {
    Table,
    Id,
    Name,
    Description,
    CoverUrl,
    SellerId,
    Status,
    FavoriteCount,
    CreatedAt,
    UpdatedAt,
}
