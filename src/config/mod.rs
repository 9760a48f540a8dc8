//! Configuration module for Sumi-Spider
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. The seed address and depth bound come from the command
//! line; everything tunable about the crawl itself lives here.
//!
//! # Example
//!
//! ```no_run
//! use sumi_spider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
