//! Like entity.

use super::status::RelationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of object a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum LikeType {
    #[sea_orm(string_value = "CONTENT")]
    Content,
    #[sea_orm(string_value = "COMMENT")]
    Comment,
    #[sea_orm(string_value = "DYNAMIC")]
    Dynamic,
}

impl LikeType {
    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "CONTENT",
            Self::Comment => "COMMENT",
            Self::Dynamic => "DYNAMIC",
        }
    }
}

impl fmt::Display for LikeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LikeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONTENT" => Ok(Self::Content),
            "COMMENT" => Ok(Self::Comment),
            "DYNAMIC" => Ok(Self::Dynamic),
            _ => Err(format!("unsupported like type: {s}")),
        }
    }
}

/// A user's like on a content, comment or dynamic.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub like_type: LikeType,

    #[sea_orm(indexed)]
    pub target_id: i64,

    #[sea_orm(indexed)]
    pub user_id: i64,

    // Display fields copied at like time so lists need no joins.
    pub target_title: Option<String>,
    pub target_author_id: Option<i64>,
    pub user_nickname: Option<String>,
    pub user_avatar: Option<String>,

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
