//! User repository.

use std::sync::Arc;

use crate::entities::user::{self, UserRole, UserStatus};
use crate::entities::User;
use crate::map_db_err;
use plaza_common::{AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};

/// Filters for the user list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Fragment of username, nickname or email.
    pub keyword: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a user by exact email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    fn keyword_condition(keyword: &str) -> Condition {
        Condition::any()
            .add(user::Column::Username.contains(keyword))
            .add(user::Column::Nickname.contains(keyword))
            .add(user::Column::Email.contains(keyword))
    }

    async fn page(
        &self,
        query: Select<User>,
        page: Pagination,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = query
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows, total))
    }

    /// Active users matching a keyword, for search.
    pub async fn search_active(
        &self,
        keyword: &str,
        page: Pagination,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let query = User::find()
            .filter(user::Column::Status.eq(UserStatus::Active))
            .filter(Self::keyword_condition(keyword));
        self.page(query, page).await
    }

    /// Users matching the given filters.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: Pagination,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let mut query = User::find();

        if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
            query = query.filter(Self::keyword_condition(keyword));
        }
        if let Some(status) = filter.status {
            query = query.filter(user::Column::Status.eq(status));
        }
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role));
        }

        self.page(query, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::Gender;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            phone: None,
            password_hash: None,
            nickname: None,
            avatar: None,
            bio: None,
            gender: Gender::Unknown,
            location: None,
            status: UserStatus::Active,
            role: UserRole::User,
            login_count: 0,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let user = create_test_user(7, "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_username("alice").await.unwrap();

        assert_eq!(result.map(|u| u.id), Some(7));
    }

    #[tokio::test]
    async fn test_find_by_email_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
