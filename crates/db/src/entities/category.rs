//! Category entity.

use super::status::ActiveStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `parent_id` of a top-level category.
pub const ROOT_PARENT_ID: i64 = 0;

/// Content category. Categories form a forest through `parent_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Display name, unique among active siblings.
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Parent category, or [`ROOT_PARENT_ID`] for roots.
    #[sea_orm(indexed)]
    pub parent_id: i64,

    pub icon_url: Option<String>,

    /// Higher values are listed first.
    pub sort: i32,

    /// Denormalized number of contents filed under this category.
    pub content_count: i64,

    pub status: ActiveStatus,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this category has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }

    /// Whether this category is visible.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ActiveStatus::Active
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
