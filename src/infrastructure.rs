//! Infrastructure layer for fetching, parsing, configuration and logging
//!
//! This module provides the document fetch seam (with its HTTP and in-memory
//! implementations), the session every entity resolves through, the HTML
//! extraction rules, and the ambient configuration and logging setup.

pub mod config;  // Configuration, URL templates and defaults
pub mod fetcher;  // DocumentFetcher trait + in-memory fetcher
pub mod http_client;  // reqwest-backed fetcher
pub mod logging;  // Logging infrastructure
pub mod parsing;  // Per-page extraction rules
pub mod parsing_error;  // Error types
pub mod session;  // Shared fetch/parse handle
pub mod worker_pool;  // Bounded ordered fan-out

// Re-export commonly used items
pub use config::{ConfigManager, ScraperConfig};
pub use fetcher::{DocumentFetcher, InMemoryFetcher, Page};
pub use http_client::HttpFetcher;
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing_error::{ScrapeError, ScrapeResult};
pub use session::Session;
