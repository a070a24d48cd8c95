//! Category service.

use std::collections::HashSet;

use super::category_tree::{CategoryNode, build_tree};
use chrono::Utc;
use plaza_common::{AppError, AppResult, Cache, PageData, Pagination};
use plaza_db::{
    entities::{ActiveStatus, category},
    repositories::CategoryRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

const TREE_KEY: &str = "category:tree";
const INVALIDATE_PATTERN: &str = "category:*";

fn info_key(id: i64) -> String {
    format!("category:info:{id}")
}

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(max = 512))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub parent_id: i64,

    #[validate(length(max = 512))]
    pub icon_url: Option<String>,

    #[serde(default)]
    pub sort: i32,
}

/// Input for updating a category. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,

    #[validate(length(max = 512))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub parent_id: Option<i64>,

    #[validate(length(max = 512))]
    pub icon_url: Option<String>,

    pub sort: Option<i32>,
    pub status: Option<ActiveStatus>,
}

/// Filters for the category list.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub keyword: Option<String>,
    pub parent_id: Option<i64>,
}

/// Category service for browsing and administering the category forest.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    cache: Cache,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository, cache: Cache) -> Self {
        Self {
            category_repo,
            cache,
        }
    }

    async fn find_active(&self, id: i64) -> AppResult<Option<category::Model>> {
        Ok(self
            .category_repo
            .find_by_id(id)
            .await?
            .filter(category::Model::is_active))
    }

    /// Get an active category.
    pub async fn get(&self, id: i64) -> AppResult<category::Model> {
        let key = info_key(id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let category = self
            .find_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;

        self.cache
            .set(&key, &category, self.cache.detail_ttl())
            .await;
        Ok(category)
    }

    /// List active categories, optionally filtered by name and parent.
    pub async fn list(
        &self,
        query: &CategoryListQuery,
        page: Pagination,
    ) -> AppResult<PageData<category::Model>> {
        let keyword = query.keyword.as_deref().map(str::trim);
        let (rows, total) = self
            .category_repo
            .search(keyword, query.parent_id, page)
            .await?;
        Ok(PageData::new(rows, total, page))
    }

    /// The full forest of active categories.
    pub async fn tree(&self) -> AppResult<Vec<CategoryNode>> {
        if let Some(cached) = self.cache.get(TREE_KEY).await {
            return Ok(cached);
        }

        let forest = build_tree(self.category_repo.find_all_active().await?)?;

        self.cache
            .set(TREE_KEY, &forest, self.cache.detail_ttl())
            .await;
        Ok(forest)
    }

    /// Ancestors of a category, root first, excluding the category itself.
    ///
    /// Returns an empty list when the category is missing or inactive. The
    /// walk stops at the first missing or inactive parent.
    pub async fn ancestors(&self, id: i64) -> AppResult<Vec<category::Model>> {
        let Some(mut current) = self.find_active(id).await? else {
            return Ok(Vec::new());
        };

        let mut visited = HashSet::from([current.id]);
        let mut chain = Vec::new();

        while !current.is_root() {
            if !visited.insert(current.parent_id) {
                return Err(AppError::Internal(format!(
                    "Category {id} has a cyclic parent chain through {}",
                    current.parent_id
                )));
            }

            let Some(parent) = self.find_active(current.parent_id).await? else {
                break;
            };
            chain.push(parent.clone());
            current = parent;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Whether `id` lies on the parent chain of `start`, counting inactive
    /// categories too, so reactivating one can never close a loop.
    async fn is_within_subtree(&self, start: i64, id: i64) -> AppResult<bool> {
        let mut visited = HashSet::new();
        let mut current = start;

        while current != category::ROOT_PARENT_ID {
            if current == id {
                return Ok(true);
            }
            if !visited.insert(current) {
                return Err(AppError::Internal(format!(
                    "Category {start} has a cyclic parent chain through {current}"
                )));
            }
            match self.category_repo.find_by_id(current).await? {
                Some(node) => current = node.parent_id,
                None => return Ok(false),
            }
        }

        Ok(false)
    }

    async fn ensure_parent(&self, parent_id: i64) -> AppResult<()> {
        if parent_id == category::ROOT_PARENT_ID {
            return Ok(());
        }
        match self.find_active(parent_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::BadRequest(format!(
                "Parent category {parent_id} does not exist"
            ))),
        }
    }

    async fn ensure_unique_name(
        &self,
        parent_id: i64,
        name: &str,
        except: Option<i64>,
    ) -> AppResult<()> {
        let existing = self
            .category_repo
            .find_active_by_parent_and_name(parent_id, name)
            .await?;

        match existing {
            Some(other) if Some(other.id) != except => Err(AppError::Conflict(format!(
                "Category '{name}' already exists under this parent"
            ))),
            _ => Ok(()),
        }
    }

    /// Create a category.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let name = input.name.trim().to_string();
        self.ensure_parent(input.parent_id).await?;
        self.ensure_unique_name(input.parent_id, &name, None).await?;

        let now = Utc::now();
        let model = category::ActiveModel {
            name: Set(name),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            icon_url: Set(input.icon_url),
            sort: Set(input.sort),
            content_count: Set(0),
            status: Set(ActiveStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let created = self.category_repo.create(model).await?;
        self.cache.delete_pattern(INVALIDATE_PATTERN).await;

        info!(category_id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    /// Update a category.
    pub async fn update(&self, id: i64, input: UpdateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let existing = self
            .category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;

        let name = input
            .name
            .as_deref()
            .map_or_else(|| existing.name.clone(), |n| n.trim().to_string());
        let parent_id = input.parent_id.unwrap_or(existing.parent_id);

        if parent_id != existing.parent_id {
            if parent_id == id {
                return Err(AppError::BadRequest(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            self.ensure_parent(parent_id).await?;
            if self.is_within_subtree(parent_id, id).await? {
                return Err(AppError::BadRequest(
                    "A category cannot be moved below its own descendant".to_string(),
                ));
            }
        }

        if name != existing.name || parent_id != existing.parent_id {
            self.ensure_unique_name(parent_id, &name, Some(id)).await?;
        }

        let mut model: category::ActiveModel = existing.into();
        model.name = Set(name);
        model.parent_id = Set(parent_id);
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(icon_url) = input.icon_url {
            model.icon_url = Set(Some(icon_url));
        }
        if let Some(sort) = input.sort {
            model.sort = Set(sort);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now().into());

        let updated = self.category_repo.update(model).await?;
        self.cache.delete_pattern(INVALIDATE_PATTERN).await;

        info!(category_id = id, "Category updated");
        Ok(updated)
    }

    /// Delete a category that has no active children.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.category_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {id} not found")));
        }

        let children = self.category_repo.count_active_children(id).await?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category {id} still has {children} active subcategories"
            )));
        }

        self.category_repo.delete(id).await?;
        self.cache.delete_pattern(INVALIDATE_PATTERN).await;

        info!(category_id = id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_category(id: i64, parent_id: i64) -> category::Model {
        category::Model {
            id,
            name: format!("cat-{id}"),
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

    fn service(db: MockDatabase) -> CategoryService {
        CategoryService::new(
            CategoryRepository::new(Arc::new(db.into_connection())),
            Cache::memory(),
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_get_is_cached() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(7, 0)]]);
        let service = service(db);

        let first = service.get(7).await.unwrap();
        // The mock has no more rows, so a second hit must come from the cache.
        let second = service.get(7).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_inactive_is_not_found() {
        let mut inactive = create_test_category(7, 0);
        inactive.status = ActiveStatus::Inactive;
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[inactive]]);

        let result = service(db).get(7).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ancestors_are_root_first() {
        // root(1) -> A(2) -> B(3) -> C(4)
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [create_test_category(4, 3)],
            [create_test_category(3, 2)],
            [create_test_category(2, 1)],
            [create_test_category(1, 0)],
        ]);

        let chain = service(db).ancestors(4).await.unwrap();
        let ids: Vec<i64> = chain.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ancestors_of_root_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(1, 0)]]);

        assert!(service(db).ancestors(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ancestors_of_missing_category_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()]);

        assert!(service(db).ancestors(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ancestors_stop_at_inactive_parent() {
        let mut inactive = create_test_category(2, 1);
        inactive.status = ActiveStatus::Inactive;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(3, 2)], [inactive]]);

        assert!(service(db).ancestors(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ancestors_detect_cycle() {
        // 1 -> 2 -> 1
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [create_test_category(1, 2)],
            [create_test_category(2, 1)],
        ]);

        let result = service(db).ancestors(1).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_tree_is_built_and_cached() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            create_test_category(1, 0),
            create_test_category(2, 1),
            create_test_category(3, 99),
        ]]);
        let service = service(db);

        let forest = service.tree().await.unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].children[0].category.id, 2);

        let again = service.tree().await.unwrap();
        assert_eq!(forest, again);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(5, 0)]]);

        let input = CreateCategoryInput {
            name: "cat-5".to_string(),
            description: None,
            parent_id: 0,
            icon_url: None,
            sort: 0,
        };
        let result = service(db).create(input).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_requires_existing_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()]);

        let input = CreateCategoryInput {
            name: "child".to_string(),
            description: None,
            parent_id: 42,
            icon_url: None,
            sort: 0,
        };
        let result = service(db).create(input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_category() {
        let mut created = create_test_category(8, 0);
        created.name = "books".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            Vec::<category::Model>::new(),
            vec![created],
        ]);

        let input = CreateCategoryInput {
            name: "  books ".to_string(),
            description: None,
            parent_id: 0,
            icon_url: None,
            sort: 3,
        };
        let category = service(db).create(input).await.unwrap();
        assert_eq!(category.name, "books");
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let input = CreateCategoryInput {
            name: String::new(),
            description: None,
            parent_id: 0,
            icon_url: None,
            sort: 0,
        };
        let result = service(db).create(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(3, 0)]]);

        let input = UpdateCategoryInput {
            parent_id: Some(3),
            ..Default::default()
        };
        let result = service(db).update(3, input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_moving_below_descendant() {
        // 1 -> 2 -> 3, move 1 under 3.
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [create_test_category(1, 0)],
            [create_test_category(3, 2)],
            [create_test_category(3, 2)],
            [create_test_category(2, 1)],
            [create_test_category(1, 0)],
        ]);

        let input = UpdateCategoryInput {
            parent_id: Some(3),
            ..Default::default()
        };
        let result = service(db).update(1, input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_moving_below_inactive_descendant() {
        // 1 -> 2 (inactive) -> 3, move 1 under 3.
        let mut inactive = create_test_category(2, 1);
        inactive.status = ActiveStatus::Inactive;
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [create_test_category(1, 0)],
            [create_test_category(3, 2)],
            [create_test_category(3, 2)],
            [inactive],
        ]);

        let input = UpdateCategoryInput {
            parent_id: Some(3),
            ..Default::default()
        };
        let result = service(db).update(1, input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_moves_under_unrelated_parent() {
        // 4 -> 5 is unrelated to 1.
        let moved = create_test_category(1, 5);
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            vec![create_test_category(1, 0)],
            vec![create_test_category(5, 4)],
            vec![create_test_category(5, 4)],
            vec![create_test_category(4, 0)],
            vec![],
            vec![moved],
        ]);

        let input = UpdateCategoryInput {
            parent_id: Some(5),
            ..Default::default()
        };
        let updated = service(db).update(1, input).await.unwrap();
        assert_eq!(updated.parent_id, 5);
    }

    #[tokio::test]
    async fn test_delete_refuses_with_children() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(1, 0)]])
            .append_query_results([[count_row(2)]]);

        let result = service(db).delete(1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_leaf() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(4, 1)]])
            .append_query_results([[count_row(0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        service(db).delete(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()]);

        let result = service(db).delete(4).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
