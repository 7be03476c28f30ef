use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    /// Window, counted from the original issue time, during which a token may be refreshed.
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub graphiql: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hackernews".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hackernews-users".into()),
            ttl_minutes: parse_var("JWT_TTL_MINUTES").unwrap_or(5),
            refresh_ttl_minutes: parse_var("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };
        Ok(Self {
            database_url,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            graphiql: parse_var("GRAPHIQL").unwrap_or(true),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
