//! Favorite repository.

use std::sync::Arc;

use crate::counter::{CounterDelta, CounterTarget};
use crate::entities::favorite::{self, FavoriteType};
use crate::entities::{Favorite, RelationStatus};
use crate::map_db_err;
use chrono::Utc;
use plaza_common::{AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Display fields copied onto a favorite row.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSnapshot {
    pub target_title: Option<String>,
    pub target_cover: Option<String>,
    pub target_author_id: Option<i64>,
    pub user_nickname: Option<String>,
}

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the favorite row of a user on a target, whatever its status.
    pub async fn find_by_user_and_target(
        &self,
        user_id: i64,
        favorite_type: FavoriteType,
        target_id: i64,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::FavoriteType.eq(favorite_type))
            .filter(favorite::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Whether the user currently has the target in favorites.
    pub async fn is_favorited(
        &self,
        user_id: i64,
        favorite_type: FavoriteType,
        target_id: i64,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_target(user_id, favorite_type, target_id)
            .await?
            .is_some_and(|f| f.status.is_active()))
    }

    /// Flip the favorite of `user_id` on a target and adjust the target's counter.
    ///
    /// Both writes share one transaction, and the existing row is read
    /// `FOR UPDATE` so concurrent toggles of one favorite apply in turn.
    pub async fn toggle(
        &self,
        user_id: i64,
        favorite_type: FavoriteType,
        target_id: i64,
        snapshot: FavoriteSnapshot,
    ) -> AppResult<(favorite::Model, bool)> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        let existing = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::FavoriteType.eq(favorite_type))
            .filter(favorite::Column::TargetId.eq(target_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let row = if let Some(row) = existing {
            let next = row.status.flipped();
            let mut model: favorite::ActiveModel = row.into();
            model.status = Set(next);
            model.updated_at = Set(now.into());
            if snapshot.target_title.is_some() {
                model.target_title = Set(snapshot.target_title);
            }
            if snapshot.target_cover.is_some() {
                model.target_cover = Set(snapshot.target_cover);
            }
            model.update(&txn).await.map_err(map_db_err)?
        } else {
            favorite::ActiveModel {
                favorite_type: Set(favorite_type),
                target_id: Set(target_id),
                user_id: Set(user_id),
                target_title: Set(snapshot.target_title),
                target_cover: Set(snapshot.target_cover),
                target_author_id: Set(snapshot.target_author_id),
                user_nickname: Set(snapshot.user_nickname),
                status: Set(RelationStatus::Active),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(map_db_err)?
        };

        let active = row.status.is_active();
        CounterTarget::from(favorite_type)
            .apply(&txn, target_id, CounterDelta::for_state(active))
            .await?;

        txn.commit().await.map_err(map_db_err)?;
        Ok((row, active))
    }

    /// Favorites of a user with the given status, newest first.
    pub async fn find_by_user(
        &self,
        user_id: i64,
        favorite_type: Option<FavoriteType>,
        status: RelationStatus,
        page: Pagination,
    ) -> AppResult<(Vec<favorite::Model>, u64)> {
        let mut query = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::Status.eq(status));

        if let Some(kind) = favorite_type {
            query = query.filter(favorite::Column::FavoriteType.eq(kind));
        }

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }
}
