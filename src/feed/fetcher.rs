//! Fetches one page of summaries from a pagination cursor

use crate::config::DateSettings;
use crate::content::{PostSummary, PublicationDate};
use crate::error::{BlogError, Result};
use crate::helpers::format_timestamp;
use crate::source::{ContentSource, Document, QueryResponse};

use super::FetchedPage;

/// Results taken from each fetched page.
///
/// A page may hold more results than this; the rest are dropped, so every
/// "load more" adds exactly one summary to the list whatever the page size.
pub const ITEMS_CONSUMED_PER_PAGE: usize = 1;

pub struct PaginationFetcher<'a> {
    source: &'a dyn ContentSource,
    date_pattern: String,
    settings: DateSettings,
}

impl<'a> PaginationFetcher<'a> {
    /// `date_pattern` is applied to each summary's timestamp at fetch time
    pub fn new(source: &'a dyn ContentSource, date_pattern: &str, settings: DateSettings) -> Self {
        Self {
            source,
            date_pattern: date_pattern.to_string(),
            settings,
        }
    }

    /// Read the page behind `cursor`.
    ///
    /// A `None` cursor fails with [`BlogError::NoMorePages`] without touching
    /// the network. Anything else is exactly one read of the cursor URL.
    pub async fn fetch_page(&self, cursor: Option<&str>) -> Result<FetchedPage> {
        let url = cursor.ok_or(BlogError::NoMorePages)?;
        tracing::debug!("Fetching feed page: {}", url);

        let body = self.source.get(url).await?;
        let response: QueryResponse = serde_json::from_str(&body)?;

        if response.results.len() > ITEMS_CONSUMED_PER_PAGE {
            tracing::debug!(
                "Page has {} results, consuming {}",
                response.results.len(),
                ITEMS_CONSUMED_PER_PAGE
            );
        }

        let items = response
            .results
            .iter()
            .take(ITEMS_CONSUMED_PER_PAGE)
            .map(|doc| self.normalize(doc))
            .collect::<Result<Vec<_>>>()?;

        Ok(FetchedPage {
            items,
            cursor: response.next_page,
        })
    }

    /// Summary with its date already formatted for display
    fn normalize(&self, doc: &Document) -> Result<PostSummary> {
        let mut summary = PostSummary::from_document(doc)?;
        summary.first_publication_date = match &doc.first_publication_date {
            Some(raw) => {
                let display = format_timestamp(raw, &self.date_pattern, self.settings)
                    .ok_or_else(|| {
                        BlogError::Parse(format!("invalid first_publication_date: {}", raw))
                    })?;
                Some(PublicationDate::Display(display))
            }
            // Left empty for the missing-date label, not formatted as the Unix epoch
            None => None,
        };
        Ok(summary)
    }
}
