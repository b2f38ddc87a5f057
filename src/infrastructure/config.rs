//! Configuration infrastructure
//!
//! Contains configuration loading and management for the RateBeer scraper.
//!
//! Configuration is layered:
//! 1. Built-in defaults (the `defaults` module)
//! 2. A JSON config file in the user's config directory
//! 3. `RATEBEER__*` environment variables (e.g. `RATEBEER__HTTP__TIMEOUT_SECONDS=10`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

use crate::domain::review::ReviewOrder;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Complete scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root every URL template is joined onto
    pub base_url: String,

    /// HTTP fetch layer settings
    pub http: HttpConfig,

    /// Bounded worker settings for per-row prefetching
    pub workers: WorkerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Settings for the reqwest-backed fetcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Attempts for transient (network / 5xx) failures
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,
}

/// Worker configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum concurrent detail fetches when prefetching search rows
    pub row_fetch_concurrency: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs (file output only)
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to the data directory when unset
    pub log_dir: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: ratebeer::BASE_URL.to_string(),
            http: HttpConfig::default(),
            workers: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            row_fetch_concurrency: defaults::ROW_FETCH_CONCURRENCY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// Loads and saves [`ScraperConfig`] as JSON
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory (logs live here by default)
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Create a configuration manager pointing at the default location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, writing the defaults on first run.
    ///
    /// Environment overrides are applied on top of the file contents.
    pub async fn load_config(&self) -> Result<ScraperConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            self.save_config(&ScraperConfig::default()).await?;
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.config_path.as_path())
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {:?}", self.config_path))?;

        let loaded: ScraperConfig = settings
            .try_deserialize()
            .context("Configuration file contains invalid settings")?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(loaded)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &ScraperConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }
}

/// RateBeer site constants and URL templates
pub mod ratebeer {
    use super::{ReviewOrder, ScrapeError, ScrapeResult, Url};

    /// Base URL for the RateBeer website
    pub const BASE_URL: &str = "https://www.ratebeer.com";

    /// Free-text search form endpoint
    pub const SEARCH_PATH: &str = "/findbeer.asp";

    /// Form field carrying the search query
    pub const SEARCH_FIELD: &str = "BeerName";

    /// Styles landing page
    pub const STYLES_PATH: &str = "/beerstyles/";

    /// Builds absolute URLs for every page shape the scraper reads
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SiteUrls {
        base: String,
    }

    impl SiteUrls {
        pub fn new(base_url: &str) -> ScrapeResult<Self> {
            let parsed = Url::parse(base_url).map_err(|e| {
                ScrapeError::invalid_argument(format!("invalid base URL {base_url}: {e}"))
            })?;
            Ok(Self {
                base: parsed.as_str().trim_end_matches('/').to_string(),
            })
        }

        fn join(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        /// Suffix for pages after the first of a paged listing
        fn page_query(page: u32) -> String {
            if page <= 1 {
                String::new()
            } else {
                format!("?page={page}")
            }
        }

        pub fn beer(&self, id: u32) -> String {
            self.join(&format!("/beer/a/{id}/"))
        }

        pub fn beer_reviews(&self, id: u32, order: ReviewOrder, page: u32) -> String {
            self.join(&format!("/beer/a/{id}/{}/{page}/", order.url_suffix()))
        }

        pub fn brewery(&self, id: u32) -> String {
            self.join(&format!("/brewers/a/{id}/"))
        }

        pub fn brewery_beers(&self, id: u32, page: u32) -> String {
            self.join(&format!("/brewers/a/{id}/beers/{}", Self::page_query(page)))
        }

        pub fn country(&self, id: u32, page: u32) -> String {
            self.join(&format!("/breweries/a/0/{id}/{}", Self::page_query(page)))
        }

        pub fn region(&self, id: u32, page: u32) -> String {
            self.join(&format!("/breweries/a/{id}/0/{}", Self::page_query(page)))
        }

        pub fn style(&self, id: u32) -> String {
            self.join(&format!("/beerstyles/a/{id}/"))
        }

        pub fn style_beers(&self, id: u32) -> String {
            self.join(&format!("/ajax/top-beer-by-style.asp?style={id}"))
        }

        pub fn styles(&self) -> String {
            self.join(STYLES_PATH)
        }

        pub fn search(&self) -> String {
            self.join(SEARCH_PATH)
        }
    }
}

/// Default values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "ratebeer-scraper";
    pub const CONFIG_FILE_NAME: &str = "ratebeer_scraper_config.json";
    pub const ENV_PREFIX: &str = "RATEBEER";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    pub const MAX_RETRIES: u32 = 3;
    pub const USER_AGENT: &str = "ratebeer-scraper/0.2 (+https://github.com/Chanseok)";

    /// Small pool: each row costs one page fetch against a public site
    pub const ROW_FETCH_CONCURRENCY: usize = 4;

    /// Reviews shown per review page
    pub const REVIEWS_PER_PAGE: usize = 10;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "ratebeer-scraper.log";
}

#[cfg(test)]
mod tests {
    use super::ratebeer::SiteUrls;
    use super::*;

    #[test]
    fn url_templates() {
        let urls = SiteUrls::new("https://www.ratebeer.com/").unwrap();
        assert_eq!(urls.beer(1411), "https://www.ratebeer.com/beer/a/1411/");
        assert_eq!(
            urls.beer_reviews(1411, ReviewOrder::TopRaters, 2),
            "https://www.ratebeer.com/beer/a/1411/2/2/"
        );
        assert_eq!(urls.brewery_beers(8, 1), "https://www.ratebeer.com/brewers/a/8/beers/");
        assert_eq!(
            urls.brewery_beers(8, 3),
            "https://www.ratebeer.com/brewers/a/8/beers/?page=3"
        );
        assert_eq!(urls.country(79, 1), "https://www.ratebeer.com/breweries/a/0/79/");
        assert_eq!(urls.region(12, 2), "https://www.ratebeer.com/breweries/a/12/0/?page=2");
        assert_eq!(
            urls.style_beers(17),
            "https://www.ratebeer.com/ajax/top-beer-by-style.asp?style=17"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(SiteUrls::new("not a url").is_err());
    }

    #[tokio::test]
    async fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded, ScraperConfig::default());
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "http": { "timeout_seconds": 5 } }"#).unwrap();

        let loaded = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(loaded.http.timeout_seconds, 5);
        assert_eq!(loaded.http.max_retries, defaults::MAX_RETRIES);
        assert_eq!(loaded.base_url, ratebeer::BASE_URL);
    }
}
