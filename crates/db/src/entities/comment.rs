//! Comment entity. Only the like counter is maintained here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comment on a content.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(indexed)]
    pub content_id: i64,

    pub user_id: i64,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub like_count: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
