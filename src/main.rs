mod accounts;
mod auth;
mod cache;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod extract;
mod models;
mod movies;
mod routes;
mod search;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    accounts::{AccountRepository, AccountService},
    auth::{LoginLimiter, TokenIssuer},
    cache::Cache,
    catalog::CatalogRepository,
    config::Config,
    movies::MovieService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub movies: MovieService,
    pub accounts: AccountService,
    pub tokens: TokenIssuer,
    pub login_limiter: Arc<LoginLimiter>,
}

pub fn build_state(config: Arc<Config>, db: DatabaseConnection) -> Arc<AppState> {
    let cache = Arc::new(Cache::new(config.cache_ttl_minutes));
    let movies = MovieService::new(CatalogRepository::new(db.clone()), cache);
    let accounts =
        AccountService::new(AccountRepository::new(db), config.rental_cost, config.signup_credits);

    Arc::new(AppState {
        movies,
        accounts,
        tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl_minutes),
        login_limiter: Arc::new(auth::login_limiter(config.login_rps)),
        config,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,filmloc=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url, config.database_max_connections).await?;
    let state = build_state(config.clone(), db);
    tracing::debug!(
        rental_cost = state.config.rental_cost,
        cache_ttl_minutes = state.config.cache_ttl_minutes,
        "services ready"
    );

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
