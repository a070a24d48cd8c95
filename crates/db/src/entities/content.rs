//! Content entity.
//!
//! Contents are authored by another service; this crate reads them for
//! search and maintains their like/favorite counters.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    #[sea_orm(string_value = "OFFLINE")]
    Offline,
}

/// Moderation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Content entity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Free-form kind such as `NOVEL`, `COMIC` or `VIDEO`.
    pub content_type: String,

    /// Comma-separated tags.
    pub tags: Option<String>,

    pub cover_url: Option<String>,

    #[sea_orm(indexed)]
    pub author_id: i64,
    pub author_nickname: Option<String>,

    pub status: ContentStatus,
    pub review_status: ReviewStatus,

    pub view_count: i64,
    pub like_count: i64,
    pub favorite_count: i64,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
