//! Favorite service.

use std::fmt::Display;

use plaza_common::{AppResult, Cache, PageData, Pagination};
use plaza_db::{
    counter::CounterTarget,
    entities::{
        RelationStatus,
        favorite::{self, FavoriteType},
    },
    repositories::{FavoriteRepository, FavoriteSnapshot},
};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

const TOGGLE_ACTION: &str = "toggle_favorite";
const INVALIDATE_PATTERN: &str = "favorite:*";

/// Request to flip a favorite.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleFavoriteInput {
    pub favorite_type: FavoriteType,

    #[validate(range(min = 1))]
    pub target_id: i64,

    #[validate(length(max = 255))]
    pub target_title: Option<String>,

    #[validate(length(max = 512))]
    pub target_cover: Option<String>,

    pub target_author_id: Option<i64>,

    #[validate(length(max = 64))]
    pub user_nickname: Option<String>,
}

/// Result of a favorite toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggleOutcome {
    /// Whether the favorite is active after the toggle.
    pub favorited: bool,
    pub record: favorite::Model,
}

/// Filters for a user's favorites.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteListQuery {
    pub favorite_type: Option<FavoriteType>,
    /// Defaults to active favorites.
    pub status: Option<RelationStatus>,
}

/// Favorite service.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    cache: Cache,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, cache: Cache) -> Self {
        Self {
            favorite_repo,
            cache,
        }
    }

    /// Flip the favorite of `user_id` on a target.
    pub async fn toggle(
        &self,
        user_id: i64,
        input: ToggleFavoriteInput,
        request_id: Option<&str>,
    ) -> AppResult<FavoriteToggleOutcome> {
        input.validate()?;

        let mut args: Vec<&(dyn Display + Sync)> = vec![&input.favorite_type, &input.target_id];
        if let Some(request_id) = &request_id {
            args.push(request_id);
        }

        if let Some(replayed) = self
            .cache
            .check_idempotent::<FavoriteToggleOutcome>(user_id, TOGGLE_ACTION, &args)
            .await
        {
            return Ok(replayed);
        }

        let snapshot = FavoriteSnapshot {
            target_title: input.target_title.clone(),
            target_cover: input.target_cover.clone(),
            target_author_id: input.target_author_id,
            user_nickname: input.user_nickname.clone(),
        };

        let (record, favorited) = self
            .favorite_repo
            .toggle(user_id, input.favorite_type, input.target_id, snapshot)
            .await?;

        self.cache
            .delete_patterns(&[
                INVALIDATE_PATTERN,
                CounterTarget::from(input.favorite_type).cache_pattern(),
            ])
            .await;

        let outcome = FavoriteToggleOutcome { favorited, record };
        self.cache
            .set_idempotent_result(user_id, TOGGLE_ACTION, &outcome, &args)
            .await;

        info!(
            user_id,
            favorite_type = %input.favorite_type,
            target_id = input.target_id,
            favorited,
            "Favorite toggled"
        );
        Ok(outcome)
    }

    /// Favorites of a user, newest first. Read through the list cache.
    pub async fn list(
        &self,
        user_id: i64,
        query: &FavoriteListQuery,
        page: Pagination,
    ) -> AppResult<PageData<favorite::Model>> {
        let status = query.status.unwrap_or(RelationStatus::Active);
        let key = format!(
            "favorite:list:{user_id}:{}:{}:{}:{}",
            query.favorite_type.map_or("all", FavoriteType::as_str),
            status.to_value(),
            page.page,
            page.page_size,
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let (rows, total) = self
            .favorite_repo
            .find_by_user(user_id, query.favorite_type, status, page)
            .await?;
        let data = PageData::new(rows, total, page);

        self.cache.set(&key, &data, self.cache.list_ttl()).await;
        Ok(data)
    }

    /// Check if a user currently favorites a target.
    pub async fn is_favorited(
        &self,
        user_id: i64,
        favorite_type: FavoriteType,
        target_id: i64,
    ) -> AppResult<bool> {
        self.favorite_repo
            .is_favorited(user_id, favorite_type, target_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_favorite(status: RelationStatus) -> favorite::Model {
        favorite::Model {
            id: 1,
            favorite_type: FavoriteType::Content,
            target_id: 42,
            user_id: 1,
            target_title: Some("Guide".to_string()),
            target_cover: None,
            target_author_id: Some(3),
            user_nickname: None,
            status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn input() -> ToggleFavoriteInput {
        ToggleFavoriteInput {
            favorite_type: FavoriteType::Content,
            target_id: 42,
            target_title: Some("Guide".to_string()),
            target_cover: None,
            target_author_id: Some(3),
            user_nickname: None,
        }
    }

    fn service(db: MockDatabase) -> FavoriteService {
        FavoriteService::new(
            FavoriteRepository::new(Arc::new(db.into_connection())),
            Cache::memory(),
        )
    }

    #[tokio::test]
    async fn test_toggle_twice_cancels() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![],
                vec![create_test_favorite(RelationStatus::Active)],
                vec![create_test_favorite(RelationStatus::Active)],
                vec![create_test_favorite(RelationStatus::Cancelled)],
            ])
            .append_exec_results([exec(1), exec(1)]);
        let service = service(db);

        let first = service.toggle(1, input(), Some("a")).await.unwrap();
        assert!(first.favorited);
        assert_eq!(first.record.status, RelationStatus::Active);

        let second = service.toggle(1, input(), Some("b")).await.unwrap();
        assert!(!second.favorited);
        assert_eq!(second.record.status, RelationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_immediate_retry_is_replayed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![],
                vec![create_test_favorite(RelationStatus::Active)],
            ])
            .append_exec_results([exec(1)]);
        let service = service(db);

        let first = service.toggle(1, input(), None).await.unwrap();
        let second = service.toggle(1, input(), None).await.unwrap();
        assert_eq!(first, second);
        assert!(second.favorited);
    }

    #[tokio::test]
    async fn test_list_is_cached_until_toggle() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(1)) }]])
            .append_query_results([
                vec![create_test_favorite(RelationStatus::Active)],
                // Toggle: lookup then update.
                vec![create_test_favorite(RelationStatus::Active)],
                vec![create_test_favorite(RelationStatus::Cancelled)],
            ])
            .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
            .append_query_results([Vec::<favorite::Model>::new()])
            .append_exec_results([exec(1)]);
        let service = service(db);
        let query = FavoriteListQuery::default();

        let first = service.list(1, &query, Pagination::default()).await.unwrap();
        assert_eq!(first.total, 1);

        let cached = service.list(1, &query, Pagination::default()).await.unwrap();
        assert_eq!(first, cached);

        service.toggle(1, input(), None).await.unwrap();

        let after = service.list(1, &query, Pagination::default()).await.unwrap();
        assert_eq!(after.total, 0);
        assert!(after.datas.is_empty());
    }

    #[tokio::test]
    async fn test_is_favorited() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_favorite(RelationStatus::Active)]]);

        assert!(
            service(db)
                .is_favorited(1, FavoriteType::Content, 42)
                .await
                .unwrap()
        );
    }
}
