//! Like repository.

use std::sync::Arc;

use crate::counter::{CounterDelta, CounterTarget};
use crate::entities::like::{self, LikeType};
use crate::entities::{Like, RelationStatus};
use crate::map_db_err;
use chrono::Utc;
use plaza_common::{AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Display fields copied onto a like row.
#[derive(Debug, Clone, Default)]
pub struct LikeSnapshot {
    pub target_title: Option<String>,
    pub target_author_id: Option<i64>,
    pub user_nickname: Option<String>,
    pub user_avatar: Option<String>,
}

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the like row of a user on a target, whatever its status.
    pub async fn find_by_user_and_target(
        &self,
        user_id: i64,
        like_type: LikeType,
        target_id: i64,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::LikeType.eq(like_type))
            .filter(like::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Whether the user currently likes the target.
    pub async fn is_liked(
        &self,
        user_id: i64,
        like_type: LikeType,
        target_id: i64,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_target(user_id, like_type, target_id)
            .await?
            .is_some_and(|l| l.status.is_active()))
    }

    /// Flip the like of `user_id` on a target and adjust the target's counter.
    ///
    /// The relation change and the counter change commit together. The
    /// existing row is read `FOR UPDATE`, so concurrent toggles of one like
    /// apply one after the other. Returns the stored row and whether the like
    /// is now active.
    pub async fn toggle(
        &self,
        user_id: i64,
        like_type: LikeType,
        target_id: i64,
        snapshot: LikeSnapshot,
    ) -> AppResult<(like::Model, bool)> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        let existing = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::LikeType.eq(like_type))
            .filter(like::Column::TargetId.eq(target_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let row = match existing {
            None => {
                let model = like::ActiveModel {
                    like_type: Set(like_type),
                    target_id: Set(target_id),
                    user_id: Set(user_id),
                    target_title: Set(snapshot.target_title),
                    target_author_id: Set(snapshot.target_author_id),
                    user_nickname: Set(snapshot.user_nickname),
                    user_avatar: Set(snapshot.user_avatar),
                    status: Set(RelationStatus::Active),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                };
                model.insert(&txn).await.map_err(map_db_err)?
            }
            Some(row) => {
                let next = row.status.flipped();
                let mut model: like::ActiveModel = row.into();
                model.status = Set(next);
                model.updated_at = Set(now.into());
                if snapshot.user_nickname.is_some() {
                    model.user_nickname = Set(snapshot.user_nickname);
                }
                if snapshot.user_avatar.is_some() {
                    model.user_avatar = Set(snapshot.user_avatar);
                }
                model.update(&txn).await.map_err(map_db_err)?
            }
        };

        let active = row.status.is_active();
        CounterTarget::from(like_type)
            .apply(&txn, target_id, CounterDelta::for_state(active))
            .await?;

        txn.commit().await.map_err(map_db_err)?;
        Ok((row, active))
    }

    /// Active likes of a user, newest first.
    pub async fn find_active_by_user(
        &self,
        user_id: i64,
        like_type: Option<LikeType>,
        page: Pagination,
    ) -> AppResult<(Vec<like::Model>, u64)> {
        let mut query = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::Status.eq(RelationStatus::Active));

        if let Some(kind) = like_type {
            query = query.filter(like::Column::LikeType.eq(kind));
        }

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(like::Column::CreatedAt)
            .order_by_desc(like::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }

    /// Active likes on a target, newest first.
    pub async fn find_active_by_target(
        &self,
        like_type: LikeType,
        target_id: i64,
        page: Pagination,
    ) -> AppResult<(Vec<like::Model>, u64)> {
        let query = Like::find()
            .filter(like::Column::LikeType.eq(like_type))
            .filter(like::Column::TargetId.eq(target_id))
            .filter(like::Column::Status.eq(RelationStatus::Active));

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(like::Column::CreatedAt)
            .order_by_desc(like::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }
}
