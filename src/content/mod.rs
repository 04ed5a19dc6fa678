//! Content module - posts, summaries, rich text and reading time

mod post;
mod reading_time;
mod rich_text;

pub(crate) use post::null_as_default;
pub use post::{ContentBlock, NavigationResult, Post, PostSummary, PublicationDate};
pub use reading_time::{ReadingTimeEstimator, WORDS_PER_MINUTE};
pub use rich_text::{
    ContentRenderer, Embed, InlineMark, MarkData, MarkKind, RenderedBlock, RichTextSpan, SpanKind,
};
