//! Category repository.

use std::sync::Arc;

use crate::entities::{ActiveStatus, Category, category};
use crate::map_db_err;
use plaza_common::{AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn ordered(query: Select<Category>) -> Select<Category> {
        query
            .order_by_desc(category::Column::Sort)
            .order_by_desc(category::Column::CreatedAt)
            .order_by_desc(category::Column::Id)
    }

    /// Find a category by ID, whatever its status.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find an active sibling with the given name.
    pub async fn find_active_by_parent_and_name(
        &self,
        parent_id: i64,
        name: &str,
    ) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::ParentId.eq(parent_id))
            .filter(category::Column::Name.eq(name))
            .filter(category::Column::Status.eq(ActiveStatus::Active))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// All active categories, in display order.
    pub async fn find_all_active(&self) -> AppResult<Vec<category::Model>> {
        Self::ordered(Category::find().filter(category::Column::Status.eq(ActiveStatus::Active)))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Active categories matching an optional name fragment and parent.
    pub async fn search(
        &self,
        keyword: Option<&str>,
        parent_id: Option<i64>,
        page: Pagination,
    ) -> AppResult<(Vec<category::Model>, u64)> {
        let mut query = Category::find().filter(category::Column::Status.eq(ActiveStatus::Active));

        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            query = query.filter(category::Column::Name.contains(keyword));
        }
        if let Some(parent_id) = parent_id {
            query = query.filter(category::Column::ParentId.eq(parent_id));
        }

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = Self::ordered(query)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }

    /// Number of active direct children.
    pub async fn count_active_children(&self, id: i64) -> AppResult<u64> {
        Category::find()
            .filter(category::Column::ParentId.eq(id))
            .filter(category::Column::Status.eq(ActiveStatus::Active))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Insert a category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a category. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = Category::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_category(id: i64, parent_id: i64, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_string(),
            description: None,
            parent_id,
            icon_url: None,
            sort: 0,
            content_count: 0,
            status: ActiveStatus::Active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_active_by_parent_and_name() {
        let cat = create_test_category(1, 0, "Fiction");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[cat.clone()]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo
            .find_active_by_parent_and_name(0, "Fiction")
            .await
            .unwrap();

        assert_eq!(result, Some(cat));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }
}
