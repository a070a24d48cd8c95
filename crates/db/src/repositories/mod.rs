//! Database repositories.

pub mod catalog;
pub mod category;
pub mod favorite;
pub mod like;
pub mod search;
pub mod user;

pub use catalog::CatalogRepository;
pub use category::CategoryRepository;
pub use favorite::{FavoriteRepository, FavoriteSnapshot};
pub use like::{LikeRepository, LikeSnapshot};
pub use search::{HotSearchRepository, SearchHistoryRepository};
pub use user::{UserFilter, UserRepository};
