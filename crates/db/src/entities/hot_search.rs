//! Hot search keyword entity.

use super::status::ActiveStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Popularity counter for a literal search keyword.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hot_search")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The keyword exactly as users typed it.
    #[sea_orm(unique)]
    pub keyword: String,

    pub search_count: i64,

    /// Editorial ranking boost; not touched by searches.
    pub trend_score: f64,

    pub status: ActiveStatus,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
