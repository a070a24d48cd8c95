//! Search service.

use super::user::UserProfile;
use plaza_common::{AppError, AppResult, PageData, Pagination};
use plaza_db::{
    entities::{
        content, goods, hot_search,
        search_history::{self, SearchType},
    },
    repositories::{CatalogRepository, HotSearchRepository, SearchHistoryRepository, UserRepository},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

const DEFAULT_HISTORY_LIMIT: u64 = 20;
const MAX_HISTORY_LIMIT: u64 = 100;
const DEFAULT_HOT_LIMIT: u64 = 10;
const MAX_HOT_LIMIT: u64 = 50;

/// A search request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchInput {
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,

    pub search_type: SearchType,
}

/// One matching item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchHit {
    Content(content::Model),
    Goods(goods::Model),
    User(UserProfile),
}

/// Results of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub keyword: String,
    pub search_type: SearchType,
    /// Total number of matches across all pages.
    pub result_count: u64,
    #[serde(flatten)]
    pub page: PageData<SearchHit>,
}

/// A popular keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotKeyword {
    pub keyword: String,
    pub search_count: i64,
    pub trend_score: f64,
}

impl From<hot_search::Model> for HotKeyword {
    fn from(model: hot_search::Model) -> Self {
        Self {
            keyword: model.keyword,
            search_count: model.search_count,
            trend_score: model.trend_score,
        }
    }
}

/// Search service. Dispatches keyword searches and keeps history and hot
/// keyword counters.
#[derive(Clone)]
pub struct SearchService {
    catalog_repo: CatalogRepository,
    user_repo: UserRepository,
    history_repo: SearchHistoryRepository,
    hot_repo: HotSearchRepository,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(
        catalog_repo: CatalogRepository,
        user_repo: UserRepository,
        history_repo: SearchHistoryRepository,
        hot_repo: HotSearchRepository,
    ) -> Self {
        Self {
            catalog_repo,
            user_repo,
            history_repo,
            hot_repo,
        }
    }

    /// Run a search.
    ///
    /// Signed-in users get a history entry. Every search bumps the hot
    /// counter of the keyword exactly as typed. Both side effects are
    /// best-effort and never fail the search.
    pub async fn search(
        &self,
        input: SearchInput,
        user_id: Option<i64>,
        page: Pagination,
    ) -> AppResult<SearchResult> {
        input.validate()?;
        if input.keyword.trim().is_empty() {
            return Err(AppError::BadRequest("Keyword must not be blank".to_string()));
        }

        let keyword = input.keyword.as_str();
        let (hits, total) = match input.search_type {
            SearchType::Content => {
                let (rows, total) = self.catalog_repo.search_contents(keyword, page).await?;
                (rows.into_iter().map(SearchHit::Content).collect(), total)
            }
            SearchType::Goods => {
                let (rows, total) = self.catalog_repo.search_goods(keyword, page).await?;
                (rows.into_iter().map(SearchHit::Goods).collect(), total)
            }
            SearchType::User => {
                let (rows, total) = self.user_repo.search_active(keyword, page).await?;
                let hits = rows
                    .into_iter()
                    .map(|u| SearchHit::User(UserProfile::public(u)))
                    .collect();
                (hits, total)
            }
        };

        if let Some(user_id) = user_id {
            if let Err(e) = self
                .history_repo
                .record(user_id, &input.keyword, input.search_type, total)
                .await
            {
                warn!(user_id, error = %e, "Failed to record search history");
            }
        }

        if let Err(e) = self.hot_repo.bump(&input.keyword).await {
            warn!(keyword = %input.keyword, error = %e, "Failed to bump hot keyword");
        }

        debug!(
            keyword = %input.keyword,
            search_type = %input.search_type,
            total,
            "Search completed"
        );

        Ok(SearchResult {
            keyword: input.keyword,
            search_type: input.search_type,
            result_count: total,
            page: PageData::new(hits, total, page),
        })
    }

    /// Recent searches of a user, newest first.
    pub async fn history(
        &self,
        user_id: i64,
        search_type: Option<SearchType>,
        limit: Option<u64>,
    ) -> AppResult<Vec<search_history::Model>> {
        let limit = checked_limit(limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT)?;
        self.history_repo
            .find_recent(user_id, search_type, limit)
            .await
    }

    /// Most searched keywords.
    pub async fn hot(&self, limit: Option<u64>) -> AppResult<Vec<HotKeyword>> {
        let limit = checked_limit(limit, DEFAULT_HOT_LIMIT, MAX_HOT_LIMIT)?;
        let rows = self.hot_repo.find_top(limit).await?;
        Ok(rows.into_iter().map(HotKeyword::from).collect())
    }
}

fn checked_limit(limit: Option<u64>, default: u64, max: u64) -> AppResult<u64> {
    match limit {
        None => Ok(default),
        Some(n) if (1..=max).contains(&n) => Ok(n),
        Some(n) => Err(AppError::Validation(format!(
            "limit must be between 1 and {max}, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use plaza_db::entities::{
        ActiveStatus,
        content::{ContentStatus, ReviewStatus},
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_content(id: i64, title: &str) -> content::Model {
        content::Model {
            id,
            title: title.to_string(),
            description: None,
            content_type: "article".to_string(),
            tags: None,
            cover_url: None,
            author_id: 1,
            author_nickname: Some("alice".to_string()),
            status: ContentStatus::Published,
            review_status: ReviewStatus::Approved,
            view_count: 0,
            like_count: 3,
            favorite_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_history(id: i64, keyword: &str) -> search_history::Model {
        search_history::Model {
            id,
            user_id: 1,
            keyword: keyword.to_string(),
            search_type: SearchType::Content,
            result_count: 1,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_hot(id: i64, keyword: &str, search_count: i64) -> hot_search::Model {
        hot_search::Model {
            id,
            keyword: keyword.to_string(),
            search_count,
            trend_score: 0.0,
            status: ActiveStatus::Active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn count(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> SearchService {
        SearchService::new(
            CatalogRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            SearchHistoryRepository::new(db.clone()),
            HotSearchRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_content_search_records_history_and_hot_keyword() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count(1)]])
                .append_query_results([[create_test_content(1, "Rust async")]])
                .append_query_results([[create_test_history(1, "Rust")]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let service = service(db.clone());

        let input = SearchInput {
            keyword: "Rust".to_string(),
            search_type: SearchType::Content,
        };
        let result = service
            .search(input, Some(1), Pagination::default())
            .await
            .unwrap();
        drop(service);

        assert_eq!(result.result_count, 1);
        assert_eq!(result.page.datas.len(), 1);
        assert!(matches!(result.page.datas[0], SearchHit::Content(_)));

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("search_history"));
        assert!(log.contains("hot_search"));
    }

    #[tokio::test]
    async fn test_keyword_is_queried_as_typed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count(0)]])
                .append_query_results([Vec::<content::Model>::new()])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let service = service(db.clone());

        let input = SearchInput {
            keyword: " Rust ".to_string(),
            search_type: SearchType::Content,
        };
        let result = service
            .search(input, None, Pagination::default())
            .await
            .unwrap();
        drop(service);

        assert_eq!(result.keyword, " Rust ");
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("% Rust %"));
    }

    #[tokio::test]
    async fn test_anonymous_search_skips_history() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count(0)]])
                .append_query_results([Vec::<content::Model>::new()])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let service = service(db.clone());

        let input = SearchInput {
            keyword: "nothing".to_string(),
            search_type: SearchType::Content,
        };
        let result = service
            .search(input, None, Pagination::default())
            .await
            .unwrap();
        drop(service);

        assert_eq!(result.result_count, 0);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains("search_history"));
    }

    #[tokio::test]
    async fn test_hot_keyword_failure_does_not_fail_search() {
        // No exec result queued for the hot keyword update.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count(0)]])
                .append_query_results([Vec::<content::Model>::new()])
                .into_connection(),
        );

        let input = SearchInput {
            keyword: "rust".to_string(),
            search_type: SearchType::Content,
        };
        let result = service(db).search(input, None, Pagination::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_blank_keyword_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SearchInput {
            keyword: "   ".to_string(),
            search_type: SearchType::Goods,
        };
        let result = service(db).search(input, None, Pagination::default()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_history_limit_bounds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_history(2, "b"), create_test_history(1, "a")]])
                .into_connection(),
        );
        let service = service(db);

        let rows = service.history(1, None, None).await.unwrap();
        assert_eq!(rows.len(), 2);

        let result = service.history(1, None, Some(101)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_hot_keywords() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_hot(1, "axum", 10), create_test_hot(2, "tokio", 4)]])
                .into_connection(),
        );
        let service = service(db);

        let hot = service.hot(Some(5)).await.unwrap();
        assert_eq!(hot[0].keyword, "axum");
        assert_eq!(hot[0].search_count, 10);

        assert!(matches!(service.hot(Some(0)).await, Err(AppError::Validation(_))));
        assert!(matches!(service.hot(Some(51)).await, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_checked_limit_defaults() {
        assert_eq!(checked_limit(None, 20, 100).unwrap(), 20);
        assert_eq!(checked_limit(Some(100), 20, 100).unwrap(), 100);
    }
}
