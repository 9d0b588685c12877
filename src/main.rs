use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studytrip_web::cache::{start_cache_warmer, AppCache};
use studytrip_web::config::Config;
use studytrip_web::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studytrip_web=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    info!("Database connection established");

    db::schema::apply(&pool)
        .await
        .context("failed to apply database schema")?;

    let cache = AppCache::new();
    tokio::spawn(start_cache_warmer(
        cache.clone(),
        pool.clone(),
        config.cache_warm_interval,
    ));

    let addr = config.bind_addr()?;
    let state = AppState {
        db: pool,
        cache,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
