//! Plaza server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plaza_api::AppState;
use plaza_common::{
    Cache, Config, MemoryStore, RedisStore,
    config::{LogFormat, LoggingConfig},
};
use plaza_core::{CategoryService, FavoriteService, LikeService, SearchService, UserService};
use plaza_db::repositories::{
    CatalogRepository, CategoryRepository, FavoriteRepository, HotSearchRepository,
    LikeRepository, SearchHistoryRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plaza=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Redis when enabled and reachable, otherwise the in-process store.
async fn build_cache(config: &Config) -> Cache {
    if !config.redis.enabled {
        info!("Redis disabled, using in-process cache");
        return Cache::new(MemoryStore::new(), &config.cache);
    }

    match RedisStore::connect(&config.redis).await {
        Ok(store) => Cache::new(store, &config.cache),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, falling back to in-process cache");
            Cache::new(MemoryStore::new(), &config.cache)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first so the log format can follow it.
    let config = Config::load()?;
    init_tracing(&config.logging);

    info!("Starting plaza server...");

    // Connect to database
    let db = plaza_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    plaza_db::migrate(&db).await?;
    info!("Migrations completed");

    let cache = build_cache(&config).await;
    let db = Arc::new(db);

    // Initialize repositories
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let catalog_repo = CatalogRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));
    let history_repo = SearchHistoryRepository::new(Arc::clone(&db));
    let hot_repo = HotSearchRepository::new(Arc::clone(&db));

    // Initialize services
    let state = AppState {
        category_service: CategoryService::new(category_repo, cache.clone()),
        like_service: LikeService::new(like_repo, cache.clone()),
        favorite_service: FavoriteService::new(favorite_repo, cache.clone()),
        search_service: SearchService::new(
            catalog_repo,
            user_repo.clone(),
            history_repo,
            hot_repo,
        ),
        user_service: UserService::new(user_repo, cache.clone()),
        gateway: config.gateway.clone(),
    };

    let app = plaza_api::app(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.close().await;
    info!("Server shutdown complete");
    Ok(())
}
