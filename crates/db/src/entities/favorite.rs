//! Favorite entity.

use super::status::RelationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of object a favorite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum FavoriteType {
    #[sea_orm(string_value = "CONTENT")]
    Content,
    #[sea_orm(string_value = "GOODS")]
    Goods,
}

impl FavoriteType {
    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "CONTENT",
            Self::Goods => "GOODS",
        }
    }
}

impl fmt::Display for FavoriteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FavoriteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONTENT" => Ok(Self::Content),
            "GOODS" => Ok(Self::Goods),
            _ => Err(format!("unsupported favorite type: {s}")),
        }
    }
}

/// A user's favorite (bookmark) on a content or a goods item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_favorite")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub favorite_type: FavoriteType,

    #[sea_orm(indexed)]
    pub target_id: i64,

    #[sea_orm(indexed)]
    pub user_id: i64,

    pub target_title: Option<String>,
    pub target_cover: Option<String>,
    pub target_author_id: Option<i64>,
    pub user_nickname: Option<String>,

    pub status: RelationStatus,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
