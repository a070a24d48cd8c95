//! Read-side queries over contents and goods.

use std::sync::Arc;

use crate::entities::content::{self, ContentStatus, ReviewStatus};
use crate::entities::{ActiveStatus, Content, Goods, goods};
use crate::map_db_err;
use plaza_common::{AppResult, Pagination};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Content and goods lookups used by search.
#[derive(Clone)]
pub struct CatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Published and approved contents whose title, description, tags or
    /// author nickname contain `keyword`. Newest first.
    pub async fn search_contents(
        &self,
        keyword: &str,
        page: Pagination,
    ) -> AppResult<(Vec<content::Model>, u64)> {
        let query = Content::find()
            .filter(content::Column::Status.eq(ContentStatus::Published))
            .filter(content::Column::ReviewStatus.eq(ReviewStatus::Approved))
            .filter(
                Condition::any()
                    .add(content::Column::Title.contains(keyword))
                    .add(content::Column::Description.contains(keyword))
                    .add(content::Column::Tags.contains(keyword))
                    .add(content::Column::AuthorNickname.contains(keyword)),
            );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(content::Column::CreatedAt)
            .order_by_desc(content::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }

    /// Active goods whose name or description contain `keyword`. Newest first.
    pub async fn search_goods(
        &self,
        keyword: &str,
        page: Pagination,
    ) -> AppResult<(Vec<goods::Model>, u64)> {
        let query = Goods::find()
            .filter(goods::Column::Status.eq(ActiveStatus::Active))
            .filter(
                Condition::any()
                    .add(goods::Column::Name.contains(keyword))
                    .add(goods::Column::Description.contains(keyword)),
            );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(goods::Column::CreatedAt)
            .order_by_desc(goods::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_content(id: i64) -> content::Model {
        content::Model {
            id,
            title: format!("post {id}"),
            description: None,
            content_type: "article".to_string(),
            tags: None,
            cover_url: None,
            author_id: 1,
            author_nickname: None,
            status: ContentStatus::Published,
            review_status: ReviewStatus::Approved,
            view_count: 0,
            like_count: 0,
            favorite_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// Statements sent to the mock, with SQL quoting stripped.
    fn sql_log(db: Arc<DatabaseConnection>) -> String {
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        format!("{log:?}").replace(['\\', '"'], "")
    }

    #[tokio::test]
    async fn test_content_search_is_newest_first() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(2)),
                }]])
                .append_query_results([[create_test_content(2), create_test_content(1)]])
                .into_connection(),
        );

        let repo = CatalogRepository::new(Arc::clone(&db));
        let (rows, total) = repo
            .search_contents(" Rust ", Pagination::default())
            .await
            .unwrap();
        drop(repo);

        assert_eq!(total, 2);
        assert_eq!(rows[0].id, 2);

        let log = sql_log(db);
        assert!(log.contains("ORDER BY content.created_at DESC, content.id DESC"));
        assert!(!log.contains("like_count DESC"));
        assert!(log.contains("% Rust %"));
    }
}
