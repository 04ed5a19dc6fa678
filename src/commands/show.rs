//! Show a single post

use anyhow::Result;
use std::fmt::Write;

use crate::error::BlogError;
use crate::pages::{self, PostView};
use crate::Blog;

/// Print a post's header, navigation and rendered body
pub async fn run(blog: &Blog, slug: &str) -> Result<()> {
    let source = blog.source()?;
    match pages::resolve_post(source.as_ref(), &blog.config.document_type, slug).await {
        Ok(resolved) => {
            let view = PostView::build(&resolved, &blog.config, blog.date_settings);
            print!("{}", format_post(blog, &view));
        }
        Err(BlogError::NotResolved { slug }) => {
            tracing::warn!("Post not resolved: {}", slug);
            println!("{}", blog.config.labels.loading);
            println!("{}: {}", blog.config.labels.not_found, slug);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn format_post(blog: &Blog, post: &PostView) -> String {
    let labels = &blog.config.labels;
    let mut out = String::new();
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(
        out,
        "{} | {} | {} {}",
        post.date, post.author, post.reading_time, labels.reading_time_suffix
    );
    if let Some(banner) = &post.banner_url {
        let _ = writeln!(out, "Banner: {}", banner);
    }
    if let Some(previous) = &post.previous {
        let _ = writeln!(out, "{}: {} ({})", labels.previous_post, previous.title, previous.path);
    }
    if let Some(next) = &post.next {
        let _ = writeln!(out, "{}: {} ({})", labels.next_post, next.title, next.path);
    }
    for block in &post.blocks {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", block.heading);
        let _ = writeln!(out, "{}", block.body_markup);
    }
    out
}
