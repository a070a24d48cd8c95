//! Search history and hot keyword repositories.

use std::sync::Arc;

use crate::entities::search_history::{self, SearchType};
use crate::entities::{ActiveStatus, HotSearch, SearchHistory, hot_search};
use crate::map_db_err;
use chrono::Utc;
use plaza_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

/// Search history repository.
#[derive(Clone)]
pub struct SearchHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SearchHistoryRepository {
    /// Create a new search history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a history entry.
    pub async fn record(
        &self,
        user_id: i64,
        keyword: &str,
        search_type: SearchType,
        result_count: u64,
    ) -> AppResult<search_history::Model> {
        search_history::ActiveModel {
            user_id: Set(user_id),
            keyword: Set(keyword.to_string()),
            search_type: Set(search_type),
            result_count: Set(i64::try_from(result_count).unwrap_or(i64::MAX)),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(map_db_err)
    }

    /// Most recent entries of a user, newest first.
    pub async fn find_recent(
        &self,
        user_id: i64,
        search_type: Option<SearchType>,
        limit: u64,
    ) -> AppResult<Vec<search_history::Model>> {
        let mut query = SearchHistory::find().filter(search_history::Column::UserId.eq(user_id));

        if let Some(kind) = search_type {
            query = query.filter(search_history::Column::SearchType.eq(kind));
        }

        query
            .order_by_desc(search_history::Column::CreatedAt)
            .order_by_desc(search_history::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

/// Hot keyword repository.
#[derive(Clone)]
pub struct HotSearchRepository {
    db: Arc<DatabaseConnection>,
}

impl HotSearchRepository {
    /// Create a new hot search repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the counter of a keyword.
    pub async fn find_by_keyword(&self, keyword: &str) -> AppResult<Option<hot_search::Model>> {
        HotSearch::find()
            .filter(hot_search::Column::Keyword.eq(keyword))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn increment(&self, keyword: &str) -> AppResult<bool> {
        let result = HotSearch::update_many()
            .col_expr(
                hot_search::Column::SearchCount,
                Expr::col(hot_search::Column::SearchCount).add(1),
            )
            .col_expr(hot_search::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(hot_search::Column::Keyword.eq(keyword))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    /// Count one search for `keyword`, creating its counter on first use.
    ///
    /// The keyword is stored verbatim.
    pub async fn bump(&self, keyword: &str) -> AppResult<()> {
        if self.increment(keyword).await? {
            return Ok(());
        }

        let now = Utc::now();
        let inserted = hot_search::ActiveModel {
            keyword: Set(keyword.to_string()),
            search_count: Set(1),
            trend_score: Set(0.0),
            status: Set(ActiveStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(map_db_err);

        match inserted {
            Ok(_) => Ok(()),
            // A concurrent search created the row first.
            Err(AppError::Conflict(_)) => self.increment(keyword).await.map(|_| ()),
            Err(e) => Err(e),
        }
    }

    /// Active keywords by popularity.
    pub async fn find_top(&self, limit: u64) -> AppResult<Vec<hot_search::Model>> {
        HotSearch::find()
            .filter(hot_search::Column::Status.eq(ActiveStatus::Active))
            .order_by_desc(hot_search::Column::SearchCount)
            .order_by_desc(hot_search::Column::TrendScore)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
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

    #[tokio::test]
    async fn test_bump_increments_existing_keyword() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = HotSearchRepository::new(db.clone());
        repo.bump("rust").await.unwrap();
        drop(repo);

        // One UPDATE, no INSERT.
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_bump_inserts_new_keyword() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .append_query_results([[create_test_hot(1, "Rust ", 1)]])
                .into_connection(),
        );

        let repo = HotSearchRepository::new(db.clone());
        repo.bump("Rust ").await.unwrap();
        drop(repo);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("INSERT"));
        assert!(log.contains("Rust "));
    }

    #[tokio::test]
    async fn test_find_top() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_hot(2, "axum", 10),
                    create_test_hot(1, "tokio", 3),
                ]])
                .into_connection(),
        );

        let repo = HotSearchRepository::new(db);
        let top = repo.find_top(10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].keyword, "axum");
    }
}
