//! Content source - the headless CMS the blog reads documents from
//!
//! The blog never stores posts itself. Summaries, post bodies and
//! navigation neighbours are all obtained through [`ContentSource`], which
//! is implemented over HTTP for a Prismic-style REST API and in memory for
//! fixtures and tests.

mod http;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::{null_as_default, ContentBlock};
use crate::error::Result;

pub use http::HttpSource;
pub use memory::MemorySource;

/// A document as returned by the content source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: DocumentData,
}

/// The custom fields of a post document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
}

/// One page of query results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Document>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Field a query result set is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    FirstPublicationDate,
    LastPublicationDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub descending: bool,
}

impl Ordering {
    pub fn ascending(field: OrderField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: OrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Wire form, e.g. `[document.last_publication_date desc]`
    pub fn to_query_string(&self) -> String {
        let field = match self.field {
            OrderField::FirstPublicationDate => "document.first_publication_date",
            OrderField::LastPublicationDate => "document.last_publication_date",
        };
        if self.descending {
            format!("[{} desc]", field)
        } else {
            format!("[{}]", field)
        }
    }

    /// Parse the wire form back into an ordering
    pub fn parse(s: &str) -> Option<Self> {
        let inner = s.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
        let (field, descending) = match inner.strip_suffix(" desc") {
            Some(field) => (field.trim(), true),
            None => (inner, false),
        };
        let field = match field {
            "document.first_publication_date" => OrderField::FirstPublicationDate,
            "document.last_publication_date" => OrderField::LastPublicationDate,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

/// A predicate query by document type
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub document_type: String,
    /// Restrict the returned fields, e.g. `post.title`
    pub fetch: Vec<String>,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    /// Content release ref, `None` for the published master ref
    pub reference: Option<String>,
    /// Only return documents strictly after this document id
    pub after: Option<String>,
    pub orderings: Option<Ordering>,
}

impl Query {
    pub fn by_type(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            ..Default::default()
        }
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn after(mut self, document_id: impl Into<String>) -> Self {
        self.after = Some(document_id.into());
        self
    }

    pub fn ordered_by(mut self, ordering: Ordering) -> Self {
        self.orderings = Some(ordering);
        self
    }
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a predicate query
    async fn query(&self, query: &Query) -> Result<QueryResponse>;

    /// Look a document up by its unique slug
    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<Option<Document>>;

    /// Read the raw body behind a pagination cursor
    async fn get(&self, url: &str) -> Result<String>;
}
