//! Post and summary models

use serde::{Deserialize, Deserializer, Serialize};

use super::RichTextSpan;
use crate::config::DateSettings;
use crate::error::{BlogError, Result};
use crate::helpers::format_timestamp;
use crate::source::Document;

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// First publication date of a summary.
///
/// Summaries from the initial page carry the raw timestamp and are formatted
/// when rendered. Summaries appended by "load more" are formatted when they
/// are fetched and only carry the display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PublicationDate {
    Timestamp(String),
    Display(String),
}

/// List-view representation of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<PublicationDate>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Normalize a query result, keeping the raw timestamp
    pub fn from_document(doc: &Document) -> Result<Self> {
        Ok(Self {
            uid: require_uid(doc)?,
            first_publication_date: doc
                .first_publication_date
                .clone()
                .map(PublicationDate::Timestamp),
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
        })
    }

    /// Date shown in the list; pre-formatted dates are returned untouched
    pub fn display_date(&self, pattern: &str, settings: DateSettings) -> Option<String> {
        match self.first_publication_date.as_ref()? {
            PublicationDate::Display(display) => Some(display.clone()),
            PublicationDate::Timestamp(raw) => {
                Some(format_timestamp(raw, pattern, settings).unwrap_or_else(|| raw.clone()))
            }
        }
    }
}

fn require_uid(doc: &Document) -> Result<String> {
    match doc.uid.as_deref() {
        Some(uid) if !uid.is_empty() => Ok(uid.to_string()),
        _ => Err(BlogError::Parse(format!("document {} has no uid", doc.id))),
    }
}

/// A titled section of a post body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichTextSpan>,
}

/// A fully resolved post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Content source document id, the cursor for navigation queries
    pub id: String,
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub content: Vec<ContentBlock>,
}

impl Post {
    pub fn from_document(doc: Document) -> Result<Self> {
        let uid = require_uid(&doc)?;
        let data = doc.data;
        Ok(Self {
            id: doc.id,
            uid,
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
            banner_url: data.banner.and_then(|b| b.url).filter(|u| !u.is_empty()),
            content: data.content,
        })
    }
}

/// Posts adjacent to the one being displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationResult {
    pub previous: Option<PostSummary>,
    pub next: Option<PostSummary>,
}
