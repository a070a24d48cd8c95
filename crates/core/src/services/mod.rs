//! Business logic services.

#![allow(missing_docs)]

pub mod category;
pub mod category_tree;
pub mod favorite;
pub mod like;
pub mod search;
pub mod user;

pub use category::{CategoryListQuery, CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use category_tree::{CategoryNode, HierarchyError, build_tree};
pub use favorite::{
    FavoriteListQuery, FavoriteService, FavoriteToggleOutcome, ToggleFavoriteInput,
};
pub use like::{LikeService, LikeToggleOutcome, LikerInfo, ToggleLikeInput};
pub use search::{HotKeyword, SearchHit, SearchInput, SearchResult, SearchService};
pub use user::{UpdateProfileInput, UserListQuery, UserProfile, UserService};
