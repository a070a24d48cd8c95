//! Like service.

use std::fmt::Display;

use plaza_common::{AppResult, Cache, PageData, Pagination};
use plaza_db::{
    counter::CounterTarget,
    entities::like::{self, LikeType},
    repositories::{LikeRepository, LikeSnapshot},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

const TOGGLE_ACTION: &str = "toggle_like";
const INVALIDATE_PATTERN: &str = "like:*";

/// Request to flip a like.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleLikeInput {
    pub like_type: LikeType,

    #[validate(range(min = 1))]
    pub target_id: i64,

    #[validate(length(max = 255))]
    pub target_title: Option<String>,

    pub target_author_id: Option<i64>,

    #[validate(length(max = 64))]
    pub user_nickname: Option<String>,

    #[validate(length(max = 512))]
    pub user_avatar: Option<String>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggleOutcome {
    /// Whether the like is active after the toggle.
    pub liked: bool,
    pub record: like::Model,
}

/// A user who likes a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikerInfo {
    pub user_id: i64,
    pub user_nickname: Option<String>,
    pub user_avatar: Option<String>,
    pub liked_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<like::Model> for LikerInfo {
    fn from(model: like::Model) -> Self {
        Self {
            user_id: model.user_id,
            user_nickname: model.user_nickname,
            user_avatar: model.user_avatar,
            liked_at: model.created_at,
        }
    }
}

/// Like service.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    cache: Cache,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, cache: Cache) -> Self {
        Self { like_repo, cache }
    }

    /// Flip the like of `user_id` on a target.
    ///
    /// A retry within the idempotency window replays the earlier outcome
    /// without touching the database. `request_id` narrows the replay to one
    /// logical client request.
    pub async fn toggle(
        &self,
        user_id: i64,
        input: ToggleLikeInput,
        request_id: Option<&str>,
    ) -> AppResult<LikeToggleOutcome> {
        input.validate()?;

        let mut args: Vec<&(dyn Display + Sync)> = vec![&input.like_type, &input.target_id];
        if let Some(request_id) = &request_id {
            args.push(request_id);
        }

        if let Some(replayed) = self
            .cache
            .check_idempotent::<LikeToggleOutcome>(user_id, TOGGLE_ACTION, &args)
            .await
        {
            return Ok(replayed);
        }

        let snapshot = LikeSnapshot {
            target_title: input.target_title.clone(),
            target_author_id: input.target_author_id,
            user_nickname: input.user_nickname.clone(),
            user_avatar: input.user_avatar.clone(),
        };

        let (record, liked) = self
            .like_repo
            .toggle(user_id, input.like_type, input.target_id, snapshot)
            .await?;

        self.cache
            .delete_patterns(&[
                INVALIDATE_PATTERN,
                CounterTarget::from(input.like_type).cache_pattern(),
            ])
            .await;

        let outcome = LikeToggleOutcome { liked, record };
        self.cache
            .set_idempotent_result(user_id, TOGGLE_ACTION, &outcome, &args)
            .await;

        info!(
            user_id,
            like_type = %input.like_type,
            target_id = input.target_id,
            liked,
            "Like toggled"
        );
        Ok(outcome)
    }

    /// Active likes of a user, newest first.
    pub async fn get_my_likes(
        &self,
        user_id: i64,
        like_type: Option<LikeType>,
        page: Pagination,
    ) -> AppResult<PageData<like::Model>> {
        let (rows, total) = self
            .like_repo
            .find_active_by_user(user_id, like_type, page)
            .await?;
        Ok(PageData::new(rows, total, page))
    }

    /// Users currently liking a target, newest first.
    pub async fn get_likers(
        &self,
        like_type: LikeType,
        target_id: i64,
        page: Pagination,
    ) -> AppResult<PageData<LikerInfo>> {
        let (rows, total) = self
            .like_repo
            .find_active_by_target(like_type, target_id, page)
            .await?;
        Ok(PageData::new(rows, total, page).map(LikerInfo::from))
    }

    /// Check if a user currently likes a target.
    pub async fn is_liked(
        &self,
        user_id: i64,
        like_type: LikeType,
        target_id: i64,
    ) -> AppResult<bool> {
        self.like_repo
            .is_liked(user_id, like_type, target_id)
            .await
    }
}
