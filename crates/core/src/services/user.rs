//! User profile service.

use chrono::{DateTime, FixedOffset, Utc};
use plaza_common::{AppError, AppResult, Cache, PageData, Pagination};
use plaza_db::{
    entities::user::{self, Gender, UserRole, UserStatus},
    repositories::{UserFilter, UserRepository},
};
use sea_orm::{ActiveEnum, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

const LIST_PATTERN: &str = "user:list:*";

fn info_key(id: i64) -> String {
    format!("user:info:{id}")
}

/// A user as shown to clients.
///
/// Contact fields are only filled in for the owner of the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub gender: Gender,
    pub location: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    pub login_count: i32,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl UserProfile {
    /// Profile including contact fields.
    #[must_use]
    pub fn owned(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            nickname: user.nickname,
            avatar: user.avatar,
            bio: user.bio,
            gender: user.gender,
            location: user.location,
            status: user.status,
            role: user.role,
            login_count: user.login_count,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }

    /// Profile with contact fields removed.
    #[must_use]
    pub fn public(user: user::Model) -> Self {
        Self::owned(user).masked()
    }

    /// Drop contact fields.
    #[must_use]
    pub fn masked(mut self) -> Self {
        self.email = None;
        self.phone = None;
        self
    }
}

/// Input for updating the caller's own profile.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 64))]
    pub nickname: Option<String>,

    #[validate(length(max = 512))]
    pub avatar: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    pub gender: Option<Gender>,

    #[validate(length(max = 100))]
    pub location: Option<String>,
}

/// Filters for the user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub keyword: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

/// User service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    cache: Cache,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, cache: Cache) -> Self {
        Self { user_repo, cache }
    }

    /// Get a profile as seen by `viewer_id`.
    pub async fn get_profile(&self, id: i64, viewer_id: Option<i64>) -> AppResult<UserProfile> {
        let key = info_key(id);
        let profile = if let Some(cached) = self.cache.get::<UserProfile>(&key).await {
            cached
        } else {
            let user = self
                .user_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
            let profile = UserProfile::owned(user);
            self.cache
                .set(&key, &profile, self.cache.detail_ttl())
                .await;
            profile
        };

        if viewer_id == Some(id) {
            Ok(profile)
        } else {
            Ok(profile.masked())
        }
    }

    /// Update the caller's own profile.
    pub async fn update_me(&self, user_id: i64, input: UpdateProfileInput) -> AppResult<UserProfile> {
        input.validate()?;

        let existing = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        if let Some(username) = input.username.as_deref() {
            if username != existing.username
                && self.user_repo.find_by_username(username).await?.is_some()
            {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
        }

        if let Some(email) = input.email.as_deref() {
            if existing.email.as_deref() != Some(email)
                && self.user_repo.find_by_email(email).await?.is_some()
            {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let mut model: user::ActiveModel = existing.into();
        if let Some(username) = input.username {
            model.username = Set(username);
        }
        if let Some(email) = input.email {
            model.email = Set(Some(email));
        }
        if let Some(nickname) = input.nickname {
            model.nickname = Set(Some(nickname));
        }
        if let Some(avatar) = input.avatar {
            model.avatar = Set(Some(avatar));
        }
        if let Some(bio) = input.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(gender) = input.gender {
            model.gender = Set(gender);
        }
        if let Some(location) = input.location {
            model.location = Set(Some(location));
        }
        model.updated_at = Set(Utc::now().into());

        let updated = self.user_repo.update(model).await?;

        self.cache.delete(&info_key(user_id)).await;
        self.cache.delete_pattern(LIST_PATTERN).await;

        info!(user_id, "Profile updated");
        Ok(UserProfile::owned(updated))
    }

    /// List users. Contact fields are never included.
    pub async fn list(
        &self,
        query: &UserListQuery,
        page: Pagination,
    ) -> AppResult<PageData<UserProfile>> {
        let keyword = query.keyword.as_deref().map(str::trim).unwrap_or_default();
        let key = format!(
            "user:list:{keyword}:{}:{}:{}:{}",
            query.status.map(|s| s.to_value()).unwrap_or_default(),
            query.role.map(|r| r.to_value()).unwrap_or_default(),
            page.page,
            page.page_size,
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let filter = UserFilter {
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            status: query.status,
            role: query.role,
        };
        let (rows, total) = self.user_repo.list(&filter, page).await?;
        let data = PageData::new(rows, total, page).map(UserProfile::public);

        self.cache.set(&key, &data, self.cache.list_ttl()).await;
        Ok(data)
    }
}
