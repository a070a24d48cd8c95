//! Denormalized counters on target entities.
//!
//! Likes and favorites keep a running count on the object they point at.
//! [`CounterTarget`] names every such column, so services never address a
//! table by a type string.

use crate::entities::favorite::FavoriteType;
use crate::entities::like::LikeType;
use crate::entities::{comment, content, goods, social_dynamic};
use crate::map_db_err;
use plaza_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// Direction of a counter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    /// Add one.
    Increment,
    /// Subtract one, never going below zero.
    Decrement,
}

impl CounterDelta {
    /// Delta for a relation that just became active (`true`) or inactive.
    #[must_use]
    pub const fn for_state(active: bool) -> Self {
        if active { Self::Increment } else { Self::Decrement }
    }
}

/// A denormalized counter column on some target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterTarget {
    /// `content.like_count`
    ContentLikes,
    /// `comment.like_count`
    CommentLikes,
    /// `social_dynamic.like_count`
    DynamicLikes,
    /// `content.favorite_count`
    ContentFavorites,
    /// `goods.favorite_count`
    GoodsFavorites,
}

impl From<LikeType> for CounterTarget {
    fn from(kind: LikeType) -> Self {
        match kind {
            LikeType::Content => Self::ContentLikes,
            LikeType::Comment => Self::CommentLikes,
            LikeType::Dynamic => Self::DynamicLikes,
        }
    }
}

impl From<FavoriteType> for CounterTarget {
    fn from(kind: FavoriteType) -> Self {
        match kind {
            FavoriteType::Content => Self::ContentFavorites,
            FavoriteType::Goods => Self::GoodsFavorites,
        }
    }
}

impl CounterTarget {
    /// Cache family holding copies of the target, invalidated after a change.
    #[must_use]
    pub const fn cache_pattern(self) -> &'static str {
        match self {
            Self::ContentLikes | Self::ContentFavorites => "content:*",
            Self::CommentLikes => "comment:*",
            Self::DynamicLikes => "social:*",
            Self::GoodsFavorites => "goods:*",
        }
    }

    /// Apply `delta` to the counter of row `target_id`.
    ///
    /// Runs on whatever connection it is given, so callers can put it in the
    /// same transaction as the relation change. A missing target row is
    /// reported as `NotFound`.
    pub async fn apply<C: ConnectionTrait>(
        self,
        conn: &C,
        target_id: i64,
        delta: CounterDelta,
    ) -> AppResult<()> {
        let rows = match self {
            Self::ContentLikes => {
                adjust::<content::Entity, _>(
                    conn,
                    content::Column::Id,
                    content::Column::LikeCount,
                    target_id,
                    delta,
                )
                .await?
            }
            Self::ContentFavorites => {
                adjust::<content::Entity, _>(
                    conn,
                    content::Column::Id,
                    content::Column::FavoriteCount,
                    target_id,
                    delta,
                )
                .await?
            }
            Self::CommentLikes => {
                adjust::<comment::Entity, _>(
                    conn,
                    comment::Column::Id,
                    comment::Column::LikeCount,
                    target_id,
                    delta,
                )
                .await?
            }
            Self::DynamicLikes => {
                adjust::<social_dynamic::Entity, _>(
                    conn,
                    social_dynamic::Column::Id,
                    social_dynamic::Column::LikeCount,
                    target_id,
                    delta,
                )
                .await?
            }
            Self::GoodsFavorites => {
                adjust::<goods::Entity, _>(
                    conn,
                    goods::Column::Id,
                    goods::Column::FavoriteCount,
                    target_id,
                    delta,
                )
                .await?
            }
        };

        if rows == 0 {
            return Err(AppError::NotFound(format!(
                "{} target {target_id}",
                self.label()
            )));
        }
        Ok(())
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ContentLikes | Self::ContentFavorites => "content",
            Self::CommentLikes => "comment",
            Self::DynamicLikes => "dynamic",
            Self::GoodsFavorites => "goods",
        }
    }
}

async fn adjust<E, C>(
    conn: &C,
    id: E::Column,
    counter: E::Column,
    target_id: i64,
    delta: CounterDelta,
) -> AppResult<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let expr: SimpleExpr = match delta {
        CounterDelta::Increment => Expr::col(counter).add(1),
        CounterDelta::Decrement => {
            Func::greatest([Expr::col(counter).sub(1), Expr::val(0).into()]).into()
        }
    };

    let result = E::update_many()
        .col_expr(counter, expr)
        .filter(id.eq(target_id))
        .exec(conn)
        .await
        .map_err(map_db_err)?;

    Ok(result.rows_affected)
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

    #[test]
    fn test_type_tags_map_to_counters() {
        assert_eq!(CounterTarget::from(LikeType::Comment), CounterTarget::CommentLikes);
        assert_eq!(CounterTarget::from(LikeType::Dynamic).cache_pattern(), "social:*");
        assert_eq!(
            CounterTarget::from(FavoriteType::Goods),
            CounterTarget::GoodsFavorites
        );
    }

    #[tokio::test]
    async fn test_increment_updates_like_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();

        CounterTarget::ContentLikes
            .apply(&db, 42, CounterDelta::Increment)
            .await
            .unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{log:?}");
        assert!(sql.contains("UPDATE"), "unexpected sql: {sql}");
        assert!(sql.contains("like_count"), "unexpected sql: {sql}");
        assert!(!sql.contains("GREATEST"), "unexpected sql: {sql}");
    }

    #[tokio::test]
    async fn test_decrement_is_clamped_at_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();

        CounterTarget::GoodsFavorites
            .apply(&db, 7, CounterDelta::Decrement)
            .await
            .unwrap();

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("GREATEST"), "unexpected sql: {sql}");
        assert!(sql.contains("favorite_count"), "unexpected sql: {sql}");
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let err = CounterTarget::CommentLikes
            .apply(&db, 99, CounterDelta::Increment)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
