use crate::util::common::{
    get_bool_from_env_or, get_env_or, get_size_from_env_or, get_vec_from_env_or, load_dotenv,
};
use anyhow::{bail, Result};
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

pub mod db;
pub mod rd;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Basic app info
    pub app_name: String,
    pub app_version: String,

    pub http: HTTPConfig,
    pub db: DBConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct HTTPConfig {
    pub ip: String,
    pub port: u16,
    pub max_body_size: u64,
    pub cors: CORSConfig,
}

#[derive(Debug, Clone)]
pub struct DBConfig {
    pub url: String,
    pub pool_size: u32,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub login_attempts: u64,
    pub login_window_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CORSConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: u64,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_requests: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(AppConfig {
            app_name: get_env_or("APP_NAME", "Agora".to_string())?,
            app_version: get_env_or("APP_VERSION", env!("CARGO_PKG_VERSION").to_string())?,

            http: HTTPConfig::from_env()?,
            db: DBConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            session: SessionConfig::from_env()?,
            log: LogConfig::from_env()?,
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.db.pool_size == 0 {
            bail!("DATABASE_POOL_SIZE must be at least 1");
        }
        if self.session.ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be at least 1");
        }
        if self.http.cors.allow_credentials && self.http.cors.allowed_origins.iter().any(|o| o == "*") {
            bail!("CORS_ALLOW_CREDENTIALS cannot be combined with a wildcard origin");
        }
        Ok(())
    }
}

impl HTTPConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(HTTPConfig {
            ip: get_env_or("HTTP_IP", "127.0.0.1".to_string())?,
            port: get_env_or("HTTP_PORT", 8000)?,
            max_body_size: get_size_from_env_or("HTTP_MAX_BODY_SIZE", 1024 * 1024)?,
            cors: CORSConfig::from_env()?,
        })
    }
}

impl DBConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(DBConfig {
            url: get_env_or("DATABASE_URL", "sqlite://app.db?mode=rwc".to_string())?,
            pool_size: get_env_or("DATABASE_POOL_SIZE", 5)?,
            auto_migrate: get_bool_from_env_or("DATABASE_AUTO_MIGRATE", true)?,
        })
    }
}

impl RedisConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        let url = get_env_or("REDIS_URL", "redis://localhost:6379".to_string())?;
        Ok(RedisConfig { url })
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(SessionConfig {
            ttl_secs: get_env_or("SESSION_TTL_SECS", 7 * 24 * 3600)?,
            login_attempts: get_env_or("LOGIN_MAX_ATTEMPTS", 5)?,
            login_window_secs: get_env_or("LOGIN_WINDOW_SECS", 60)?,
        })
    }
}

impl CORSConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(CORSConfig {
            allowed_origins: get_vec_from_env_or("CORS_ALLOWED_ORIGINS", vec![])?,
            allowed_methods: get_vec_from_env_or("CORS_ALLOWED_METHODS", strs_to_strings(vec!["GET", "POST", "PUT", "OPTIONS"]))?,
            allowed_headers: get_vec_from_env_or("CORS_ALLOWED_HEADERS", strs_to_strings(vec!["Content-Type", "Authorization"]))?,
            allow_credentials: get_bool_from_env_or("CORS_ALLOW_CREDENTIALS", false)?,
            max_age: get_env_or("CORS_MAX_AGE", 86400)?,
        })
    }

    pub fn into_layer(self) -> CorsLayer {
        let mut cors = CorsLayer::new();

        cors = if self.allowed_origins.contains(&"*".to_string()) {
            cors.allow_origin(Any)
        } else {
            cors.allow_origin(AllowOrigin::list(convert_vec(self.allowed_origins.clone())))
        };

        cors = if self.allowed_methods.contains(&"*".to_string()) {
            cors.allow_methods(Any)
        } else {
            cors.allow_methods(AllowMethods::list(convert_vec(self.allowed_methods.clone())))
        };

        cors = if self.allowed_headers.contains(&"*".to_string()) {
            cors.allow_headers(Any)
        } else {
            cors.allow_headers(AllowHeaders::list(convert_vec(self.allowed_headers.clone())))
        };

        cors.allow_credentials(self.allow_credentials)
            .max_age(Duration::from_secs(self.max_age))
    }
}

impl LogConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(LogConfig {
            log_requests: get_bool_from_env_or("LOG_REQUESTS", false)?,
        })
    }
}

// convert vectors of &str to owned Strings
fn strs_to_strings(vec: Vec<&str>) -> Vec<String> {
    vec.into_iter().map(|s| s.to_string()).collect()
}

// Values that do not parse as the target header type are skipped.
fn convert_vec<T: FromStr>(strings: Vec<String>) -> Vec<T>
where
    <T as FromStr>::Err: Debug,
{
    strings.into_iter().filter_map(|s| s.parse().ok()).collect()
}
