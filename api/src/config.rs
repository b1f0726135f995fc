use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    /// Supabase project URL, e.g. https://xyz.supabase.co
    pub supabase_url: String,
    /// Public anon key, sent as `apikey` on every backend request
    pub supabase_anon_key: String,
    pub port: u16,
    /// Seconds between quota replenishments on the sign-up/sign-in routes
    pub auth_rate_per_second: u64,
    pub auth_rate_burst: u32,
    /// Local sessions unused for this long are dropped
    pub session_idle_timeout_secs: i64,
    /// Sign-ins beyond this drop the user's least recently used session
    pub max_sessions_per_user: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            port: parsed("PORT", 8080)?,
            auth_rate_per_second: parsed("AUTH_RATE_PER_SECOND", 2)?,
            auth_rate_burst: parsed("AUTH_RATE_BURST", 5)?,
            session_idle_timeout_secs: positive("SESSION_IDLE_TIMEOUT_SECS", 7 * 24 * 60 * 60)?,
            max_sessions_per_user: positive("MAX_SESSIONS_PER_USER", 5)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    parse_value(name, env::var(name).ok(), default)
}

/// Like `parsed`, but zero and negative values are invalid
fn positive<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default + ToString,
{
    let value = parsed(name, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_value<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
