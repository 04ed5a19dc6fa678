//! HTTP content source for a Prismic-style REST API

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{ContentSource, Document, Query, QueryResponse};
use crate::error::{BlogError, Result};

/// API root description, only the refs are of interest
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// How long a resolved master ref is reused by default
pub const DEFAULT_REF_TTL: Duration = Duration::from_secs(5);

/// The master ref moves on every publish, so it is only kept for a while
#[derive(Debug)]
struct CachedRef {
    reference: String,
    fetched_at: Instant,
}

pub struct HttpSource {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: Mutex<Option<CachedRef>>,
    ref_ttl: Duration,
}

impl HttpSource {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join treats a path without a trailing slash as a file
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            client,
            endpoint,
            access_token,
            master_ref: Mutex::new(None),
            ref_ttl: DEFAULT_REF_TTL,
        })
    }

    /// Reuse a resolved master ref for `ttl`; zero resolves it on every query
    pub fn with_ref_ttl(mut self, ttl: Duration) -> Self {
        self.ref_ttl = ttl;
        self
    }

    fn cached_ref(&self) -> MutexGuard<'_, Option<CachedRef>> {
        self.master_ref.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The published master ref, re-read from the API root once the cached
    /// one is older than the TTL
    async fn master_ref(&self) -> Result<String> {
        let fresh = self
            .cached_ref()
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ref_ttl)
            .map(|cached| cached.reference.clone());
        if let Some(reference) = fresh {
            return Ok(reference);
        }

        let reference = self.fetch_master_ref().await?;
        tracing::debug!("Resolved master ref {}", reference);
        *self.cached_ref() = Some(CachedRef {
            reference: reference.clone(),
            fetched_at: Instant::now(),
        });
        Ok(reference)
    }

    async fn fetch_master_ref(&self) -> Result<String> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        let body = self.get(url.as_str()).await?;
        let info: ApiInfo = serde_json::from_str(&body)?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| BlogError::Parse("API root has no master ref".into()))
    }

    /// Build a `documents/search` URL for the given predicate
    async fn search_url(&self, predicate: &str, query: &Query) -> Result<Url> {
        let reference = match &query.reference {
            Some(reference) => reference.clone(),
            None => self.master_ref().await?,
        };

        let mut url = self.endpoint.join("documents/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", &reference);
            pairs.append_pair("q", &format!("[{}]", predicate));
            if !query.fetch.is_empty() {
                pairs.append_pair("fetch", &query.fetch.join(","));
            }
            if let Some(page_size) = query.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(after) = &query.after {
                pairs.append_pair("after", after);
            }
            if let Some(ordering) = &query.orderings {
                pairs.append_pair("orderings", &ordering.to_query_string());
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }
        Ok(url)
    }
}

/// `[at(path,"value")]` predicate with the value quoted
fn at_predicate(path: &str, value: &str) -> String {
    format!(r#"[at({},"{}")]"#, path, value.replace('"', "\\\""))
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn query(&self, query: &Query) -> Result<QueryResponse> {
        let predicate = at_predicate("document.type", &query.document_type);
        let url = self.search_url(&predicate, query).await?;
        tracing::debug!("Querying content source: {}", url);
        let body = self.get(url.as_str()).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<Option<Document>> {
        let predicate = at_predicate(&format!("my.{}.uid", document_type), uid);
        let url = self
            .search_url(&predicate, &Query::by_type(document_type).page_size(1))
            .await?;
        tracing::debug!("Looking up {} by uid {}", document_type, uid);
        let body = self.get(url.as_str()).await?;
        let response: QueryResponse = serde_json::from_str(&body)?;
        Ok(response.results.into_iter().next())
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{OrderField, Ordering};
    use axum::{
        extract::{Query as QueryParams, State},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
    use std::sync::Arc;

    /// Local API whose master ref moves from `r1` to `r2` on publish.
    /// `new-post` only exists under `r2`.
    #[derive(Clone, Default)]
    struct StubApi {
        published: Arc<AtomicBool>,
    }

    impl StubApi {
        fn publish(&self) {
            self.published.store(true, AtomicOrdering::SeqCst);
        }

        fn current_ref(&self) -> &'static str {
            if self.published.load(AtomicOrdering::SeqCst) {
                "r2"
            } else {
                "r1"
            }
        }
    }

    async fn api_root(State(api): State<StubApi>) -> Json<Value> {
        Json(json!({
            "refs": [{"id": "master", "ref": api.current_ref(), "isMasterRef": true}]
        }))
    }

    async fn search(QueryParams(params): QueryParams<HashMap<String, String>>) -> Json<Value> {
        let visible = params.get("ref").map(String::as_str) == Some("r2")
            && params.get("q").is_some_and(|q| q.contains("new-post"));
        let results = if visible {
            vec![json!({
                "id": "N1", "uid": "new-post", "type": "post",
                "first_publication_date": "2021-04-01T10:00:00+0000",
                "data": {"title": "New"}
            })]
        } else {
            vec![]
        };
        Json(json!({"results": results, "next_page": null}))
    }

    async fn unavailable() -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    /// Serve the stub on a random port, returning the API endpoint
    async fn serve_stub(api: StubApi) -> String {
        let app = Router::new()
            .route("/api/v2/", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .route("/unavailable", get(unavailable))
            .with_state(api);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v2", addr)
    }

    #[tokio::test]
    async fn test_publish_is_visible_once_ref_expires() {
        let api = StubApi::default();
        let endpoint = serve_stub(api.clone()).await;
        let source = HttpSource::new(&endpoint, None)
            .unwrap()
            .with_ref_ttl(Duration::ZERO);

        assert!(source.get_by_uid("post", "new-post").await.unwrap().is_none());

        api.publish();
        let found = source.get_by_uid("post", "new-post").await.unwrap();
        assert_eq!(found.and_then(|d| d.uid).as_deref(), Some("new-post"));
    }

    #[tokio::test]
    async fn test_ref_is_reused_within_ttl() {
        let api = StubApi::default();
        let endpoint = serve_stub(api.clone()).await;
        let source = HttpSource::new(&endpoint, None)
            .unwrap()
            .with_ref_ttl(Duration::from_secs(3600));

        assert_eq!(source.master_ref().await.unwrap(), "r1");
        api.publish();
        assert_eq!(source.master_ref().await.unwrap(), "r1");
        assert!(source.get_by_uid("post", "new-post").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let endpoint = serve_stub(StubApi::default()).await;
        let base = endpoint.trim_end_matches("/api/v2");
        let source = HttpSource::new(&endpoint, None).unwrap();

        let err = source
            .get(&format!("{}/unavailable", base))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Fetch(msg) if msg.contains("503")));
    }

    #[test]
    fn test_at_predicate_escapes_quotes() {
        assert_eq!(
            at_predicate("document.type", "post"),
            r#"[at(document.type,"post")]"#
        );
        assert_eq!(at_predicate("my.post.uid", r#"a"b"#), r#"[at(my.post.uid,"a\"b")]"#);
    }

    #[tokio::test]
    async fn test_search_url_with_explicit_ref() {
        let source = HttpSource::new("https://blog.cdn.prismic.io/api/v2", Some("tok".into()))
            .unwrap();
        let mut query = Query::by_type("post")
            .fetch(["post.title", "post.author"])
            .page_size(1)
            .after("XYZ")
            .ordered_by(Ordering::descending(OrderField::LastPublicationDate));
        query.reference = Some("preview-ref".into());

        let url = source
            .search_url(&at_predicate("document.type", "post"), &query)
            .await
            .unwrap();
        assert_eq!(url.path(), "/api/v2/documents/search");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("ref"), Some("preview-ref"));
        assert_eq!(get("q"), Some(r#"[[at(document.type,"post")]]"#));
        assert_eq!(get("fetch"), Some("post.title,post.author"));
        assert_eq!(get("pageSize"), Some("1"));
        assert_eq!(get("after"), Some("XYZ"));
        assert_eq!(get("orderings"), Some("[document.last_publication_date desc]"));
        assert_eq!(get("access_token"), Some("tok"));
    }
}
