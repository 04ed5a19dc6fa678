//! Rich text rendering
//!
//! Post bodies arrive as a sequence of typed spans (paragraphs, headings,
//! list items, images, embeds), each with optional inline marks over
//! character offsets. [`ContentRenderer`] turns them into HTML that is safe
//! to inject into a page: all text is escaped, link targets are limited to
//! web and mail URLs, and only `embed` spans carry provider HTML through.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use super::ContentBlock;

/// Block-level type of a span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpanKind {
    #[default]
    Paragraph,
    /// `heading1` to `heading6`
    Heading(u8),
    Preformatted,
    ListItem,
    OrderedListItem,
    Image,
    Embed,
    Unknown(String),
}

impl From<String> for SpanKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "paragraph" => SpanKind::Paragraph,
            "preformatted" => SpanKind::Preformatted,
            "list-item" => SpanKind::ListItem,
            "o-list-item" => SpanKind::OrderedListItem,
            "image" => SpanKind::Image,
            "embed" => SpanKind::Embed,
            _ => match s.strip_prefix("heading").and_then(|n| n.parse::<u8>().ok()) {
                Some(level @ 1..=6) => SpanKind::Heading(level),
                _ => SpanKind::Unknown(s),
            },
        }
    }
}

impl From<SpanKind> for String {
    fn from(kind: SpanKind) -> Self {
        match kind {
            SpanKind::Paragraph => "paragraph".to_string(),
            SpanKind::Heading(level) => format!("heading{}", level),
            SpanKind::Preformatted => "preformatted".to_string(),
            SpanKind::ListItem => "list-item".to_string(),
            SpanKind::OrderedListItem => "o-list-item".to_string(),
            SpanKind::Image => "image".to_string(),
            SpanKind::Embed => "embed".to_string(),
            SpanKind::Unknown(other) => other,
        }
    }
}

/// Inline formatting type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    Unknown(String),
}

impl From<String> for MarkKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "strong" => MarkKind::Strong,
            "em" => MarkKind::Em,
            "hyperlink" => MarkKind::Hyperlink,
            "label" => MarkKind::Label,
            _ => MarkKind::Unknown(s),
        }
    }
}

impl From<MarkKind> for String {
    fn from(kind: MarkKind) -> Self {
        match kind {
            MarkKind::Strong => "strong".to_string(),
            MarkKind::Em => "em".to_string(),
            MarkKind::Hyperlink => "hyperlink".to_string(),
            MarkKind::Label => "label".to_string(),
            MarkKind::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Inline mark over the character range `start..end` of a span's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMark {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(default)]
    pub data: Option<MarkData>,
}

/// oEmbed payload of an `embed` span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default)]
    pub embed_type: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
}

/// One structured fragment of a post body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    #[serde(rename = "type", default)]
    pub kind: SpanKind,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub spans: Vec<InlineMark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextSpan {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A content block ready for the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    pub heading: String,
    /// Fragment id derived from the heading
    pub anchor: String,
    pub body_markup: String,
}

/// Converts rich text into HTML markup, preserving span order
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentRenderer;

impl ContentRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, block: &ContentBlock) -> RenderedBlock {
        RenderedBlock {
            heading: block.heading.clone(),
            anchor: slug::slugify(&block.heading),
            body_markup: self.render_spans(&block.body),
        }
    }

    pub fn render_all(&self, blocks: &[ContentBlock]) -> Vec<RenderedBlock> {
        blocks.iter().map(|block| self.render(block)).collect()
    }

    /// Render a span sequence, grouping consecutive list items
    pub fn render_spans(&self, spans: &[RichTextSpan]) -> String {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for span in spans {
            let list_tag = match span.kind {
                SpanKind::ListItem => Some("ul"),
                SpanKind::OrderedListItem => Some("ol"),
                _ => None,
            };
            if open_list != list_tag {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list_tag {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list_tag;
            }
            html.push_str(&render_span(span));
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }
        html
    }
}

fn render_span(span: &RichTextSpan) -> String {
    match &span.kind {
        SpanKind::Paragraph | SpanKind::Unknown(_) => {
            format!("<p>{}</p>", render_inline(&span.text, &span.spans))
        }
        SpanKind::Heading(level) => format!(
            "<h{level}>{}</h{level}>",
            render_inline(&span.text, &span.spans),
            level = level
        ),
        SpanKind::Preformatted => {
            format!("<pre>{}</pre>", render_inline(&span.text, &span.spans))
        }
        SpanKind::ListItem | SpanKind::OrderedListItem => {
            format!("<li>{}</li>", render_inline(&span.text, &span.spans))
        }
        SpanKind::Image => match span.url.as_deref().filter(|u| is_safe_url(u)) {
            Some(url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                encode_double_quoted_attribute(url),
                encode_double_quoted_attribute(span.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        SpanKind::Embed => {
            let embed = span.oembed.clone().unwrap_or_default();
            format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                encode_double_quoted_attribute(embed.embed_url.as_deref().unwrap_or("")),
                encode_double_quoted_attribute(embed.embed_type.as_deref().unwrap_or("")),
                encode_double_quoted_attribute(embed.provider_name.as_deref().unwrap_or("")),
                embed.html.as_deref().unwrap_or("")
            )
        }
    }
}

/// Render text with inline marks.
///
/// The text is cut at every mark boundary; for each segment the covering
/// marks are opened outermost first. Marks that overlap without nesting are
/// closed and reopened so the output stays well formed.
fn render_inline(text: &str, marks: &[InlineMark]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let marks: Vec<&InlineMark> = marks
        .iter()
        .filter(|m| m.start < m.end && m.start < len)
        .collect();

    let mut boundaries: BTreeSet<usize> = BTreeSet::new();
    boundaries.insert(0);
    boundaries.insert(len);
    for mark in &marks {
        boundaries.insert(mark.start);
        boundaries.insert(mark.end.min(len));
    }
    let boundaries: Vec<usize> = boundaries.into_iter().collect();

    let mut html = String::new();
    let mut open: Vec<&InlineMark> = Vec::new();

    for window in boundaries.windows(2) {
        let (a, b) = (window[0], window[1]);

        let mut active: Vec<&InlineMark> = marks
            .iter()
            .copied()
            .filter(|m| m.start <= a && m.end.min(len) >= b)
            .collect();
        active.sort_by(|x, y| x.start.cmp(&y.start).then(y.end.cmp(&x.end)));

        let common = open
            .iter()
            .zip(&active)
            .take_while(|(x, y)| std::ptr::eq(**x, **y))
            .count();
        for mark in open[common..].iter().rev() {
            html.push_str(&close_tag(mark));
        }
        open.truncate(common);
        for &mark in &active[common..] {
            html.push_str(&open_tag(mark));
            open.push(mark);
        }

        let segment: String = chars[a..b].iter().collect();
        html.push_str(&encode_text(&segment).replace('\n', "<br />"));
    }

    for mark in open.iter().rev() {
        html.push_str(&close_tag(mark));
    }
    html
}

fn open_tag(mark: &InlineMark) -> String {
    match &mark.kind {
        MarkKind::Strong => "<strong>".to_string(),
        MarkKind::Em => "<em>".to_string(),
        MarkKind::Hyperlink => {
            let data = mark.data.as_ref();
            match data.and_then(|d| d.url.as_deref()).filter(|u| is_safe_url(u)) {
                Some(url) => {
                    let target = match data.and_then(|d| d.target.as_deref()) {
                        Some(target) => format!(
                            r#" target="{}" rel="noopener""#,
                            encode_double_quoted_attribute(target)
                        ),
                        None => String::new(),
                    };
                    format!(r#"<a href="{}"{}>"#, encode_double_quoted_attribute(url), target)
                }
                None => String::new(),
            }
        }
        MarkKind::Label => match mark.data.as_ref().and_then(|d| d.label.as_deref()) {
            Some(label) => format!(r#"<span class="{}">"#, encode_double_quoted_attribute(label)),
            None => "<span>".to_string(),
        },
        MarkKind::Unknown(_) => String::new(),
    }
}

fn close_tag(mark: &InlineMark) -> String {
    match &mark.kind {
        MarkKind::Strong => "</strong>".to_string(),
        MarkKind::Em => "</em>".to_string(),
        MarkKind::Hyperlink => {
            let has_link = mark
                .data
                .as_ref()
                .and_then(|d| d.url.as_deref())
                .is_some_and(is_safe_url);
            if has_link {
                "</a>".to_string()
            } else {
                String::new()
            }
        }
        MarkKind::Label => "</span>".to_string(),
        MarkKind::Unknown(_) => String::new(),
    }
}

/// Web and mail links plus relative paths
fn is_safe_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https" | "mailto"),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
