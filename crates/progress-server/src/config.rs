use anyhow::{Context, Result, bail};

use progress_api::auth::Credentials;

/// Runtime settings, read from the environment (and `.env`, if present).
#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub db_url: String,
    pub db_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => 3000,
        };

        let Some(db_url) = non_empty("TURSO_DB_URL") else {
            bail!("TURSO_DB_URL must be set");
        };

        Ok(Self {
            host,
            port,
            credentials: Credentials::from_parts(lookup("USERNAME"), lookup("PASSWORD")),
            db_url,
            db_token: non_empty("TURSO_DB_API_TOKEN"),
        })
    }
}
