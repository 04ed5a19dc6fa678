//! spacetraveling: a blog front-end for a headless content API
//!
//! The index shows a page of post summaries and grows one summary per
//! "load more"; post pages show the rendered body, reading time and links
//! to the neighbouring posts. All content comes from a [`source::ContentSource`].

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod helpers;
pub mod navigation;
pub mod pages;
pub mod server;
pub mod source;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use source::{ContentSource, HttpSource, MemorySource};

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Parsed locale and timezone
    pub date_settings: config::DateSettings,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Self::with_config(config, base_dir)
    }

    /// Create a Blog from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(config: config::SiteConfig, base_dir: P) -> Result<Self> {
        config.validate()?;
        let date_settings = config.date_settings()?;
        Ok(Self {
            config,
            base_dir: base_dir.as_ref().to_path_buf(),
            date_settings,
        })
    }

    /// The configured content source: the local fixture if set, else the API
    pub fn source(&self) -> Result<Arc<dyn ContentSource>> {
        match &self.config.fixture {
            Some(fixture) => {
                let path = self.base_dir.join(fixture);
                tracing::info!("Serving documents from fixture {:?}", path);
                Ok(Arc::new(MemorySource::load(&path)?))
            }
            None => {
                tracing::info!("Using content API at {}", self.config.api_endpoint);
                let source =
                    HttpSource::new(&self.config.api_endpoint, self.config.access_token.clone())?
                        .with_ref_ttl(Duration::from_secs(self.config.master_ref_ttl_secs));
                Ok(Arc::new(source))
            }
        }
    }
}
