//! In-memory content source backed by an ordered document set

use std::cmp::Ordering as CmpOrdering;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use url::Url;

use super::{ContentSource, Document, OrderField, Ordering, Query, QueryResponse};
use crate::error::{BlogError, Result};
use crate::helpers::parse_timestamp;

const CURSOR_SCHEME: &str = "memory";
const DEFAULT_PAGE_SIZE: usize = 20;

/// Serves documents with the same query semantics as the remote API.
///
/// Documents keep their insertion order unless a query asks for an ordering;
/// equal sort keys keep insertion order too.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: Vec<Document>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            reads: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of documents
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Ok(Self::new(documents))
    }

    /// Number of cursor reads served through [`ContentSource::get`]
    pub fn reads(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    fn select(&self, query: &Query) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| d.document_type == query.document_type)
            .collect();

        if let Some(ordering) = query.orderings {
            docs.sort_by(|a, b| compare(a, b, ordering));
        }

        match &query.after {
            Some(after) => match docs.iter().position(|d| &d.id == after) {
                Some(pos) => docs.split_off(pos + 1),
                None => Vec::new(),
            },
            None => docs,
        }
    }

    fn run(&self, query: &Query) -> QueryResponse {
        let docs = self.select(query);
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page = query.page.unwrap_or(1).max(1);
        let start = (page - 1).saturating_mul(page_size);

        let results = docs
            .iter()
            .skip(start)
            .take(page_size)
            .map(|d| restrict_fields(d, &query.fetch))
            .collect();

        // An end past usize::MAX cannot have a successor
        let next_page = match start.checked_add(page_size) {
            Some(end) if end < docs.len() => {
                Some(cursor_url(query, page.saturating_add(1), page_size))
            }
            _ => None,
        };

        QueryResponse { results, next_page }
    }
}

fn compare(a: &Document, b: &Document, ordering: Ordering) -> CmpOrdering {
    let key = |d: &Document| {
        let raw = match ordering.field {
            OrderField::FirstPublicationDate => d.first_publication_date.as_deref(),
            OrderField::LastPublicationDate => d.last_publication_date.as_deref(),
        };
        raw.and_then(parse_timestamp)
    };
    let cmp = key(a).cmp(&key(b));
    if ordering.descending {
        cmp.reverse()
    } else {
        cmp
    }
}

/// Apply a `fetch` list such as `post.title` to a document's data
fn restrict_fields(doc: &Document, fetch: &[String]) -> Document {
    let mut doc = doc.clone();
    if fetch.is_empty() {
        return doc;
    }
    let wants = |field: &str| {
        fetch
            .iter()
            .any(|f| f.rsplit('.').next() == Some(field))
    };
    if !wants("title") {
        doc.data.title.clear();
    }
    if !wants("subtitle") {
        doc.data.subtitle.clear();
    }
    if !wants("author") {
        doc.data.author.clear();
    }
    if !wants("banner") {
        doc.data.banner = None;
    }
    if !wants("content") {
        doc.data.content.clear();
    }
    doc
}

fn cursor_url(query: &Query, page: usize, page_size: usize) -> String {
    let mut url = format!("{}://documents/search", CURSOR_SCHEME);
    let mut pairs = url::form_urlencoded::Serializer::new(String::new());
    pairs.append_pair("type", &query.document_type);
    pairs.append_pair("page", &page.to_string());
    pairs.append_pair("pageSize", &page_size.to_string());
    if !query.fetch.is_empty() {
        pairs.append_pair("fetch", &query.fetch.join(","));
    }
    if let Some(after) = &query.after {
        pairs.append_pair("after", after);
    }
    if let Some(ordering) = &query.orderings {
        pairs.append_pair("orderings", &ordering.to_query_string());
    }
    url.push('?');
    url.push_str(&pairs.finish());
    url
}

fn parse_cursor(url: &str) -> Result<Query> {
    let url = Url::parse(url)?;
    if url.scheme() != CURSOR_SCHEME {
        return Err(BlogError::Fetch(format!("unsupported cursor: {}", url)));
    }

    let mut query = Query::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "type" => query.document_type = value.into_owned(),
            "page" => query.page = value.parse().ok(),
            "pageSize" => query.page_size = value.parse().ok(),
            "fetch" => query.fetch = value.split(',').map(String::from).collect(),
            "after" => query.after = Some(value.into_owned()),
            "orderings" => query.orderings = Ordering::parse(&value),
            _ => {}
        }
    }
    Ok(query)
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query(&self, query: &Query) -> Result<QueryResponse> {
        Ok(self.run(query))
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<Option<Document>> {
        Ok(self
            .documents
            .iter()
            .find(|d| d.document_type == document_type && d.uid.as_deref() == Some(uid))
            .cloned())
    }

    async fn get(&self, url: &str) -> Result<String> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        let query = parse_cursor(url)?;
        Ok(serde_json::to_string(&self.run(&query))?)
    }
}
