use anyhow::Context;
use jsonwebtoken::Algorithm;

const ENV_PREFIX: &str = "CALC_";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

pub const DEFAULT_SECRET: &str = "change-me-in-prod";

/// Upper bound for the token lifetime: ten years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

impl AppConfig {
    /// Reads `CALC_*` variables from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Keys are passed with the `CALC_` prefix.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        let ttl_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid CALC_ACCESS_TOKEN_EXPIRE_MINUTES: {v}"))?,
            None => 60 * 24 * 7,
        };
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "CALC_ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {ttl_minutes}"
            );
        }

        let algorithm = match get("ALGORITHM") {
            Some(v) => parse_hmac_algorithm(v.trim())?,
            None => Algorithm::HS256,
        };

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid CALC_PORT: {v}"))?,
            None => 8000,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(v) => split_origins(&v),
            None => vec![
                "http://localhost:5173".to_string(),
                "http://localhost:4173".to_string(),
            ],
        };

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| "Taxi Calculator API".into()),
            database_url: get("DB_URL").unwrap_or_else(|| "sqlite://data.db".into()),
            cors_origins,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt: JwtConfig {
                secret: get("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET.into()),
                algorithm,
                ttl_minutes,
            },
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Only symmetric schemes make sense with a shared secret.
fn parse_hmac_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let alg: Algorithm = raw
        .parse()
        .with_context(|| format!("unknown CALC_ALGORITHM: {raw}"))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("CALC_ALGORITHM must be an HMAC scheme, got {other:?}"),
    }
}
