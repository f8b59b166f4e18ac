use anyhow::Context;
use programari::{app, config::Config, db, state::AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "programari=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        business_hours = config.validator.business_hours.enabled,
        trainer_match = ?config.validator.trainer_match,
        "configuration loaded"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .context("failed to parse DATABASE_URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("failed to connect to db")?;

    db::init_schema(&pool).await.context("failed to create tables")?;
    db::seed_users_if_empty(&pool).await.context("failed to seed users")?;

    let app = app::router(AppState {
        pool,
        validator: config.validator,
    });

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
