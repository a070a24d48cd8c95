//! Database entities.

pub mod category;
pub mod comment;
pub mod content;
pub mod favorite;
pub mod goods;
pub mod hot_search;
pub mod like;
pub mod search_history;
pub mod social_dynamic;
pub mod status;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use content::Entity as Content;
pub use favorite::Entity as Favorite;
pub use goods::Entity as Goods;
pub use hot_search::Entity as HotSearch;
pub use like::Entity as Like;
pub use search_history::Entity as SearchHistory;
pub use social_dynamic::Entity as SocialDynamic;
pub use status::{ActiveStatus, RelationStatus};
pub use user::Entity as User;
