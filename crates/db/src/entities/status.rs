//! Status columns shared by several tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a user-target relation such as a like or a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RelationStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RelationStatus {
    /// The status a toggle moves to.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Active => Self::Cancelled,
            Self::Cancelled => Self::Active,
        }
    }

    /// Whether the relation currently counts.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// On/off switch for catalog rows (categories, hot keywords, goods).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ActiveStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_is_an_involution() {
        assert_eq!(RelationStatus::Active.flipped(), RelationStatus::Cancelled);
        assert_eq!(RelationStatus::Cancelled.flipped(), RelationStatus::Active);
        assert_eq!(RelationStatus::Active.flipped().flipped(), RelationStatus::Active);
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&RelationStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        let status: ActiveStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, ActiveStatus::Inactive);
    }
}
