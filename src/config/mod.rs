use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub cache: CacheConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Источник событий
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
    pub events_path: String,
}

// Настройки headless-браузера
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    pub chromium_path: Option<PathBuf>,
    pub navigation_timeout_ms: u64,
    pub selector_timeout_ms: u64,
}

// Настройки кеша
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            rust_log: "event_scraper=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: None,
            ttl_seconds: 3600,
        }
    }
}

impl SiteConfig {
    /// Адрес страницы со списком, например `https://skillbloomer.com/events/`.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.events_path.trim_matches('/')
        )
    }

    /// Шаблон, которому должен соответствовать href карточки.
    pub fn events_pattern(&self) -> String {
        format!("/{}/", self.events_path.trim_matches('/'))
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}{}", self.listing_url(), slug)
    }

    pub fn booking_url(&self, slug: &str) -> String {
        self.detail_url(slug)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://skillbloomer.com".to_string(),
            events_path: "/events/".to_string(),
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chromium_path: None,
            navigation_timeout_ms: 30_000,
            selector_timeout_ms: 15_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

impl FromStr for CacheBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            _ => Err(()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let cache = CacheConfig {
            backend: parse_var("CACHE_BACKEND", "memory", "memory or redis")?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            ttl_seconds: parse_var("CACHE_TTL_SECONDS", "3600", "a number of seconds")?,
        };
        if cache.backend == CacheBackend::Redis && cache.redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "5000", "a valid port")?,
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "event_scraper=debug,tower_http=debug".to_string()),
                log_format: parse_var("LOG_FORMAT", "pretty", "pretty or json")?,
                cors_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string())
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            },
            site: SiteConfig {
                base_url: env::var("SOURCE_BASE_URL")
                    .unwrap_or_else(|_| "https://skillbloomer.com".to_string()),
                events_path: env::var("EVENTS_PATH").unwrap_or_else(|_| "/events/".to_string()),
            },
            browser: BrowserConfig {
                chromium_path: env::var("CHROMIUM_PATH").ok().map(PathBuf::from),
                navigation_timeout_ms: parse_var(
                    "NAVIGATION_TIMEOUT_MS",
                    "30000",
                    "a number of milliseconds",
                )?,
                selector_timeout_ms: parse_var(
                    "SELECTOR_TIMEOUT_MS",
                    "15000",
                    "a number of milliseconds",
                )?,
            },
            cache,
        })
    }
}

fn parse_var<T: FromStr>(
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_urls_are_normalized() {
        let site = SiteConfig {
            base_url: "https://skillbloomer.com/".into(),
            events_path: "events".into(),
        };
        assert_eq!(site.listing_url(), "https://skillbloomer.com/events/");
        assert_eq!(site.events_pattern(), "/events/");
        assert_eq!(
            site.booking_url("run-for-education"),
            "https://skillbloomer.com/events/run-for-education"
        );
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Redis".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
        assert!("sqlite".parse::<CacheBackend>().is_err());
    }
}
