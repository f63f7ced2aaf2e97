use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub brand: String,
}

impl MailConfig {
    /// Username/password pair, only when both are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Public path segment uploads are served under, without slashes.
    pub url_prefix: String,
    pub max_bytes: usize,
    pub reclaim_orphans: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub mail: MailConfig,
    pub uploads: UploadConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = match var("APP_PORT").or_else(|| var("PORT")) {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid port {p:?}"))?,
            None => 3000,
        };
        let max_connections = parse_or(var("DB_MAX_CONNECTIONS"), 10, "DB_MAX_CONNECTIONS")?;

        let username = var("EMAIL_USER");
        let mail = MailConfig {
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
            smtp_port: parse_or(var("SMTP_PORT"), 465, "SMTP_PORT")?,
            from: var("MAIL_FROM").or_else(|| username.clone()),
            username,
            password: var("EMAIL_PASS"),
            brand: var("MAIL_BRAND").unwrap_or_else(|| "The Recipe Book".into()),
        };

        let uploads = UploadConfig {
            dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            url_prefix: "uploads".into(),
            max_bytes: parse_or(var("UPLOAD_MAX_BYTES"), 20 * 1024 * 1024, "UPLOAD_MAX_BYTES")?,
            reclaim_orphans: var("UPLOAD_RECLAIM_ORPHANS")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        Ok(Self {
            database_url,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            max_connections,
            mail,
            uploads,
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T, key: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v.parse::<T>().with_context(|| format!("invalid {key}: {v:?}")),
        None => Ok(default),
    }
}
