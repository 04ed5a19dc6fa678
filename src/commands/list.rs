//! List post summaries, optionally loading more pages

use anyhow::Result;
use std::fmt::Write;

use crate::error::BlogError;
use crate::feed::{FeedSession, PaginationFetcher, PostListState};
use crate::pages::{self, SummaryView};
use crate::source::ContentSource;
use crate::Blog;

/// Print the index summaries after `more` load-more interactions
pub async fn run(blog: &Blog, more: usize) -> Result<()> {
    let source = blog.source()?;
    let state = collect(blog, source.as_ref(), more).await?;
    print!("{}", format_list(blog, &state));
    Ok(())
}

/// Load the index and drive up to `more` load-more interactions.
///
/// A failed load stops early and keeps what was listed so far.
pub async fn collect(blog: &Blog, source: &dyn ContentSource, more: usize) -> Result<PostListState> {
    let state = pages::load_index(source, &blog.config).await?;
    let mut session = FeedSession::new(state);
    let fetcher = PaginationFetcher::new(source, &blog.config.feed_date_format, blog.date_settings);

    for _ in 0..more {
        match session.load_more(&fetcher).await {
            Ok(added) => tracing::debug!("Loaded {} more post(s)", added),
            Err(BlogError::NoMorePages) => break,
            Err(e) => {
                tracing::warn!("Stopping after failed load: {}", e);
                break;
            }
        }
    }

    Ok(session.state().clone())
}

fn format_list(blog: &Blog, state: &PostListState) -> String {
    let posts = SummaryView::list(&state.items, &blog.config, blog.date_settings);
    let mut out = String::new();
    let _ = writeln!(out, "Posts ({}):", posts.len());
    for post in &posts {
        let _ = writeln!(
            out,
            "  {} - {} [{}] by {}",
            post.date.as_deref().unwrap_or("-"),
            post.title,
            post.uid,
            post.author
        );
    }
    if state.has_more() {
        let _ = writeln!(out, "More posts available: {}", blog.config.labels.load_more);
    }
    out
}
