use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use envie_core::ranking::{RankingConfig, RankingWeights, ThematicWeights, TierPolicy};
use thiserror::Error;

const DEFAULT_GEOCODER_URL: &str = "https://api-adresse.data.gouv.fr/search/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Postgres,
    Snapshot,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub snapshot_path: PathBuf,
    pub snapshot_refresh_interval: Duration,
    pub snapshot_max_age: Duration,
    pub request_timeout: Duration,
    pub store_timeout: Duration,
    pub max_results: usize,
    pub geocoder_url: Option<String>,
    pub cors_allow_origins: Vec<String>,
    pub admin_token: Option<String>,
    pub debug_errors: bool,
    pub ranking: RankingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Source { lookup };
        let http_addr_raw = env.string("ENVIE_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let store_raw = env.string("ENVIE_STORE", "snapshot");
        let store = StoreKind::from_str(store_raw.trim(), true)
            .map_err(|_| ConfigError::InvalidValue("ENVIE_STORE", store_raw.clone()))?;
        let database_url = env.optional_string("ENVIE_DATABASE_URL");
        let db_max_connections = env.u32("ENVIE_DB_MAX_CONNECTIONS", 5)?;
        let snapshot_path = PathBuf::from(env.string("ENVIE_SNAPSHOT_PATH", "./data/establishments.json"));
        let snapshot_refresh_secs = env.u64("ENVIE_SNAPSHOT_REFRESH_SECS", 60)?;
        let snapshot_max_age_secs = env.u64("ENVIE_SNAPSHOT_MAX_AGE_SECS", 300)?;
        let request_timeout_secs = env.u64("ENVIE_REQUEST_TIMEOUT_SECS", 10)?;
        let store_timeout_ms = env.u64("ENVIE_STORE_TIMEOUT_MS", 3000)?;
        let max_results = env.usize("ENVIE_MAX_RESULTS", 100)?;
        let geocoder_url = match env.raw("ENVIE_GEOCODER_URL") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(value.trim().to_string()),
            None => Some(DEFAULT_GEOCODER_URL.to_string()),
        };
        let cors_allow_origins = env.list("ENVIE_CORS_ALLOW_ORIGINS");
        let admin_token = env.optional_string("ENVIE_ADMIN_TOKEN");
        let debug_errors = env.bool("ENVIE_DEBUG_ERRORS", false)?;

        let defaults = RankingConfig::default();
        let ranking = RankingConfig {
            thematic: ThematicWeights {
                desire: env.f64("ENVIE_WEIGHT_DESIRE", defaults.thematic.desire)?,
                activity: env.f64("ENVIE_WEIGHT_ACTIVITY", defaults.thematic.activity)?,
                tag: env.f64("ENVIE_WEIGHT_TAG", defaults.thematic.tag)?,
                decay: env.f64("ENVIE_WEIGHT_DECAY", defaults.thematic.decay)?,
            },
            ranking: RankingWeights {
                thematic_factor: defaults.ranking.thematic_factor,
                distance: env.f64("ENVIE_WEIGHT_DISTANCE", defaults.ranking.distance)?,
                open_bonus: env.f64("ENVIE_OPEN_BONUS", defaults.ranking.open_bonus)?,
            },
            tiers: TierPolicy {
                premium_boost: env.f64("ENVIE_PREMIUM_BOOST", defaults.tiers.premium_boost)?,
            },
            utc_offset_minutes: env.i32("ENVIE_UTC_OFFSET_MINUTES", defaults.utc_offset_minutes)?,
        };
        ranking
            .validate()
            .map_err(|err| ConfigError::InvalidValue("ranking", err.to_string()))?;

        Ok(Self {
            http_addr,
            store,
            database_url,
            db_max_connections,
            snapshot_path,
            snapshot_refresh_interval: Duration::from_secs(snapshot_refresh_secs),
            snapshot_max_age: Duration::from_secs(snapshot_max_age_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            store_timeout: Duration::from_millis(store_timeout_ms),
            max_results,
            geocoder_url,
            cors_allow_origins,
            admin_token,
            debug_errors,
            ranking,
        })
    }
}

struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn string(&self, key: &'static str, default: &'static str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    fn optional_string(&self, key: &'static str) -> Option<String> {
        let value = self.raw(key).unwrap_or_default();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn list(&self, key: &'static str) -> Vec<String> {
        self.raw(key)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.raw(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber(key, raw)),
            None => Ok(default),
        }
    }

    fn u64(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        self.parsed(key, default)
    }

    fn u32(&self, key: &'static str, default: u32) -> Result<u32, ConfigError> {
        self.parsed(key, default)
    }

    fn i32(&self, key: &'static str, default: i32) -> Result<i32, ConfigError> {
        self.parsed(key, default)
    }

    fn usize(&self, key: &'static str, default: usize) -> Result<usize, ConfigError> {
        self.parsed(key, default)
    }

    fn f64(&self, key: &'static str, default: f64) -> Result<f64, ConfigError> {
        self.parsed(key, default)
    }

    fn bool(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(raw) = self.raw(key) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        }
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(parse_dotenv_line)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_dotenv_value(value.trim());
    Some((key.to_string(), value))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        return unescape_double_quoted(stripped);
    }
    if let Some(stripped) = value.strip_prefix('\'').and_then(|inner| inner.strip_suffix('\'')) {
        return stripped.to_string();
    }
    value.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => output.push('\n'),
                Some('t') => output.push('\t'),
                Some('\\') => output.push('\\'),
                Some('"') => output.push('"'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => output.push('\\'),
            }
        } else {
            output.push(ch);
        }
    }
    output
}
