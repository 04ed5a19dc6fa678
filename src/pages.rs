//! Data for the two page kinds: the post index and a single post

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::config::{DateSettings, SiteConfig};
use crate::content::{
    ContentRenderer, NavigationResult, Post, PostSummary, ReadingTimeEstimator, RenderedBlock,
};
use crate::error::{BlogError, Result};
use crate::feed::PostListState;
use crate::navigation::NavigationResolver;
use crate::source::{ContentSource, Query};

/// Characters kept as-is in a slug path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Fields requested for summaries
const SUMMARY_FIELDS: [&str; 3] = ["title", "subtitle", "author"];

/// Load the first page of summaries for the index
pub async fn load_index(source: &dyn ContentSource, config: &SiteConfig) -> Result<PostListState> {
    let query = Query::by_type(&config.document_type)
        .fetch(
            SUMMARY_FIELDS
                .iter()
                .map(|field| format!("{}.{}", config.document_type, field)),
        )
        .page_size(config.page_size);
    let response = source.query(&query).await?;
    tracing::debug!(
        "Index page: {} summaries, next page {:?}",
        response.results.len(),
        response.next_page
    );
    PostListState::from_response(&response)
}

/// A post together with its neighbours
#[derive(Debug, Clone)]
pub struct ResolvedPost {
    pub post: Post,
    pub navigation: NavigationResult,
}

/// Look a post up by slug and resolve its navigation.
///
/// An unknown slug is [`BlogError::NotResolved`] so the caller can show the
/// loading page instead of failing.
pub async fn resolve_post(
    source: &dyn ContentSource,
    document_type: &str,
    slug: &str,
) -> Result<ResolvedPost> {
    let document = source
        .get_by_uid(document_type, slug)
        .await?
        .ok_or_else(|| BlogError::NotResolved {
            slug: slug.to_string(),
        })?;
    let post = Post::from_document(document)?;
    let navigation = NavigationResolver::new(source, document_type)
        .resolve(&post.id)
        .await?;
    Ok(ResolvedPost { post, navigation })
}

/// Summary as shown in lists and navigation links
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
}

impl SummaryView {
    pub fn new(summary: &PostSummary, pattern: &str, settings: DateSettings) -> Self {
        Self {
            uid: summary.uid.clone(),
            path: post_path(&summary.uid),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            date: summary.display_date(pattern, settings),
        }
    }

    pub fn list(summaries: &[PostSummary], config: &SiteConfig, settings: DateSettings) -> Vec<Self> {
        summaries
            .iter()
            .map(|s| Self::new(s, &config.summary_date_format, settings))
            .collect()
    }
}

/// Everything the post template needs
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    /// Formatted first publication date, or the missing-date label
    pub date: String,
    pub reading_time: usize,
    pub blocks: Vec<RenderedBlock>,
    pub previous: Option<SummaryView>,
    pub next: Option<SummaryView>,
}

impl PostView {
    pub fn build(resolved: &ResolvedPost, config: &SiteConfig, settings: DateSettings) -> Self {
        let post = &resolved.post;
        let estimator = ReadingTimeEstimator::new(config.words_per_minute);
        let renderer = ContentRenderer::new();

        let date = post
            .first_publication_date
            .as_deref()
            .and_then(|raw| {
                crate::helpers::format_timestamp(raw, &config.post_date_format, settings)
            })
            .unwrap_or_else(|| config.labels.missing_date.clone());

        let nav = |summary: &Option<PostSummary>| {
            summary
                .as_ref()
                .map(|s| SummaryView::new(s, &config.summary_date_format, settings))
        };

        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            date,
            reading_time: estimator.estimate(&post.content),
            blocks: renderer.render_all(&post.content),
            previous: nav(&resolved.navigation.previous),
            next: nav(&resolved.navigation.next),
        }
    }
}

/// Route of a post, with the slug percent-encoded
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", utf8_percent_encode(uid, PATH_SEGMENT))
}
