use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the API server binary
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub swagger: SwaggerConfig,
}

/// Configuration for the crawler binary
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Requests running longer than this are answered with 408
    pub request_timeout: Duration,
    /// How long in-flight connections may drain after a shutdown signal
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Region cache settings. Without `REDIS_URL` the in-process cache is used.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub ttl: Duration,
    pub connect_timeout: Duration,
}

/// Per-client token bucket limits for the public API
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: f64,
    pub burst: u32,
    /// Clients idle for longer than this are dropped by the sweeper
    pub entry_ttl: Duration,
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Remote source endpoints and session
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub provinces_url: String,
    pub units_url: String,
    pub origin: String,
    pub cookie: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub politeness_delay: Duration,
}

/// Loads `.env` if present. A missing file is fine in production.
fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }
}

/// Reads `key`, falling back to `default` when unset, and parses it.
fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv();

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl CrawlerConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv();

        Ok(CrawlerConfig {
            database: DatabaseConfig::from_env()?,
            source: SourceConfig::from_env()?,
            ingestion: IngestionConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
    const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            parse_env("REQUEST_TIMEOUT_SECS", Self::DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be at least 1".to_string());
        }

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            request_timeout: Duration::from_secs(request_timeout_secs),
            shutdown_timeout: Duration::from_secs(parse_env(
                "SHUTDOWN_TIMEOUT_SECS",
                Self::DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl CacheConfig {
    const DEFAULT_TTL_SECS: u64 = 300; // 5 minutes
    const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

    pub fn from_env() -> Result<Self, String> {
        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());
        let ttl_secs = parse_env("CACHE_TTL_SECS", Self::DEFAULT_TTL_SECS)?;
        let connect_timeout_ms =
            parse_env("REDIS_CONNECT_TIMEOUT_MS", Self::DEFAULT_CONNECT_TIMEOUT_MS)?;

        Ok(Self {
            redis_url,
            ttl: Duration::from_secs(ttl_secs),
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        })
    }
}

impl RateLimitConfig {
    const DEFAULT_RPS: f64 = 100.0;
    const DEFAULT_BURST: u32 = 200;
    const DEFAULT_ENTRY_TTL_SECS: u64 = 180;
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            requests_per_second: parse_env("RATE_LIMIT_RPS", Self::DEFAULT_RPS)?,
            burst: parse_env("RATE_LIMIT_BURST", Self::DEFAULT_BURST)?,
            entry_ttl: Duration::from_secs(parse_env(
                "RATE_LIMIT_ENTRY_TTL_SECS",
                Self::DEFAULT_ENTRY_TTL_SECS,
            )?),
            sweep_interval: Duration::from_secs(parse_env(
                "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                Self::DEFAULT_SWEEP_INTERVAL_SECS,
            )?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects limits the token bucket cannot enforce
    pub fn validate(&self) -> Result<(), String> {
        // NaN fails both comparisons
        if !(self.requests_per_second.is_finite() && self.requests_per_second > 0.0) {
            return Err("RATE_LIMIT_RPS must be a finite number greater than zero".to_string());
        }
        if self.burst == 0 {
            return Err("RATE_LIMIT_BURST must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: Self::DEFAULT_RPS,
            burst: Self::DEFAULT_BURST,
            entry_ttl: Duration::from_secs(Self::DEFAULT_ENTRY_TTL_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "VN Admin API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Vietnamese provinces and administrative units".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SourceConfig {
    const DEFAULT_ORIGIN: &'static str = "https://sapnhap.bando.com.vn";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let cookie = env::var("API_COOKIE")
            .map_err(|_| "API_COOKIE environment variable is required".to_string())?;

        let origin =
            env::var("SOURCE_ORIGIN").unwrap_or_else(|_| Self::DEFAULT_ORIGIN.to_string());
        let provinces_url =
            env::var("SOURCE_PROVINCES_URL").unwrap_or_else(|_| format!("{}/pcotinh", origin));
        let units_url =
            env::var("SOURCE_UNITS_URL").unwrap_or_else(|_| format!("{}/ptracuu", origin));
        let timeout_secs = parse_env("SOURCE_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            provinces_url,
            units_url,
            origin,
            cookie,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Points both endpoints at `base` (`{base}/pcotinh`, `{base}/ptracuu`)
    pub fn for_base_url(base: &str, cookie: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            provinces_url: format!("{}/pcotinh", base),
            units_url: format!("{}/ptracuu", base),
            origin: base.to_string(),
            cookie: cookie.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl IngestionConfig {
    const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_RETRY_BASE_MS: u64 = 2000;
    const DEFAULT_POLITENESS_DELAY_MS: u64 = 500;

    pub fn from_env() -> Result<Self, String> {
        let max_attempts = parse_env("CRAWLER_MAX_ATTEMPTS", Self::DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err("CRAWLER_MAX_ATTEMPTS must be at least 1".to_string());
        }

        Ok(Self {
            max_attempts,
            retry_base_delay: Duration::from_millis(parse_env(
                "CRAWLER_RETRY_BASE_MS",
                Self::DEFAULT_RETRY_BASE_MS,
            )?),
            politeness_delay: Duration::from_millis(parse_env(
                "CRAWLER_POLITENESS_DELAY_MS",
                Self::DEFAULT_POLITENESS_DELAY_MS,
            )?),
        })
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(Self::DEFAULT_RETRY_BASE_MS),
            politeness_delay: Duration::from_millis(Self::DEFAULT_POLITENESS_DELAY_MS),
        }
    }
}
