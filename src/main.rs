mod config;
mod error;
mod identity;
mod routes;
mod session;
mod state;
mod tasks;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::identity::JwtIdentityProvider;
use crate::session::CookieSessionResolver;
use crate::tasks::{PgTaskStore, TaskService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskboard=info,tower_http=info")),
        )
        .init();

    let config = config::Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.request_timeout)
        .connect(&config.database_url)
        .await
        .context("Error connecting DB")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Error running migrations")?;

    let tokens = Arc::new(JwtIdentityProvider::new(
        &config.jwt_secret,
        config.token_ttl_hours,
    ));
    let tasks = TaskService::new(
        tokens.clone(),
        Arc::new(PgTaskStore::new(db.clone())),
        config.request_timeout,
    );

    let state = state::AppState {
        db,
        tokens,
        tasks: Arc::new(tasks),
        sessions: Arc::new(CookieSessionResolver::new(&config.jwt_secret)),
        token_ttl_hours: config.token_ttl_hours,
    };

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;

    info!("server is chilling at http://{}", config.addr());

    axum::serve(listener, app).await?;
    Ok(())
}
