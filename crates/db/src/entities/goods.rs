//! Goods entity.

use super::status::ActiveStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item offered in the shop.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub cover_url: Option<String>,

    #[sea_orm(indexed)]
    pub seller_id: i64,

    pub status: ActiveStatus,

    pub favorite_count: i64,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
