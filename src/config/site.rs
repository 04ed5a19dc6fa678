//! Site configuration (_config.yml)

use chrono::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BlogError, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // Content source
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    /// Local JSON document set used instead of the remote API
    pub fixture: Option<PathBuf>,
    /// Seconds a resolved master ref is reused before asking the API again
    pub master_ref_ttl_secs: u64,

    // Listing
    pub page_size: usize,
    pub words_per_minute: usize,
    pub max_sessions: usize,

    // Date / Time format
    pub locale: String,
    pub timezone: String,
    pub summary_date_format: String,
    pub feed_date_format: String,
    pub post_date_format: String,

    #[serde(default)]
    pub labels: Labels,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),

            api_endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "post".to_string(),
            fixture: None,
            master_ref_ttl_secs: 5,

            page_size: 2,
            words_per_minute: crate::content::WORDS_PER_MINUTE,
            max_sessions: 1024,

            locale: "pt_BR".to_string(),
            timezone: "UTC".to_string(),
            summary_date_format: "dd MMM yyyy".to_string(),
            feed_date_format: "dd MMMM yyyy".to_string(),
            post_date_format: "dd MMM yyyy".to_string(),

            labels: Labels::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| BlogError::Config(format!("{:?}: {}", path.as_ref(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that cannot be expressed by serde defaults alone
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(BlogError::Config("page_size must be at least 1".into()));
        }
        if self.words_per_minute == 0 {
            return Err(BlogError::Config(
                "words_per_minute must be at least 1".into(),
            ));
        }
        self.date_settings()?;
        Ok(())
    }

    /// Parse locale and timezone into the values used by the date helpers
    pub fn date_settings(&self) -> Result<DateSettings> {
        let locale = Locale::try_from(self.locale.as_str())
            .map_err(|_| BlogError::Config(format!("unknown locale: {}", self.locale)))?;
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| BlogError::Config(format!("unknown timezone: {}", self.timezone)))?;
        Ok(DateSettings { locale, timezone })
    }
}

/// Locale and timezone used when displaying publication dates
#[derive(Debug, Clone, Copy)]
pub struct DateSettings {
    pub locale: Locale,
    pub timezone: Tz,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            locale: Locale::pt_BR,
            timezone: Tz::UTC,
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub load_more: String,
    pub loading: String,
    pub missing_date: String,
    pub reading_time_suffix: String,
    pub not_found: String,
    pub previous_post: String,
    pub next_post: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            missing_date: "Publication Date".to_string(),
            reading_time_suffix: "min".to_string(),
            not_found: "Post não encontrado".to_string(),
            previous_post: "Post anterior".to_string(),
            next_post: "Próximo post".to_string(),
        }
    }
}
