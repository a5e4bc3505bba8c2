use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cache_ttl_minutes: i64,
    pub rental_cost: i32,
    pub signup_credits: i32,
    pub login_rps: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://filmloc.db?mode=rwc".to_string());

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set");
        }

        let token_ttl_minutes =
            ttl_minutes("TOKEN_TTL_MINUTES", std::env::var("TOKEN_TTL_MINUTES").ok(), 30)?;

        let cache_ttl_minutes =
            ttl_minutes("CACHE_TTL_MINUTES", std::env::var("CACHE_TTL_MINUTES").ok(), 30)?;

        let rental_cost: i32 =
            std::env::var("RENTAL_COST").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let signup_credits: i32 =
            std::env::var("SIGNUP_CREDITS").ok().and_then(|s| s.parse().ok()).unwrap_or(0);

        let login_rps: u32 =
            std::env::var("LOGIN_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            database_max_connections,
            jwt_secret,
            token_ttl_minutes,
            cache_ttl_minutes,
            rental_cost,
            signup_credits,
            login_rps,
        })
    }
}

const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;

fn ttl_minutes(name: &str, raw: Option<String>, default: i64) -> anyhow::Result<i64> {
    let minutes = raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default);
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("{name} must be between 1 and {MAX_TTL_MINUTES} minutes, got {minutes}");
    }
    Ok(minutes)
}
