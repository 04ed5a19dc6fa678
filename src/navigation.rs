//! Previous/next post lookup

use crate::content::{NavigationResult, PostSummary};
use crate::error::Result;
use crate::source::{ContentSource, OrderField, Ordering, Query, QueryResponse};

/// Finds the posts adjacent to a document.
///
/// Both neighbours are queried with the document id as the `after` cursor:
/// "previous" is the first result ordered by ascending first publication
/// date, "next" the first result ordered by descending last publication
/// date.
pub struct NavigationResolver<'a> {
    source: &'a dyn ContentSource,
    document_type: String,
}

impl<'a> NavigationResolver<'a> {
    pub fn new(source: &'a dyn ContentSource, document_type: &str) -> Self {
        Self {
            source,
            document_type: document_type.to_string(),
        }
    }

    fn neighbour_query(&self, post_id: &str, ordering: Ordering) -> Query {
        Query::by_type(&self.document_type)
            .page_size(1)
            .after(post_id)
            .ordered_by(ordering)
    }

    pub async fn resolve(&self, post_id: &str) -> Result<NavigationResult> {
        let previous_query =
            self.neighbour_query(post_id, Ordering::ascending(OrderField::FirstPublicationDate));
        let next_query =
            self.neighbour_query(post_id, Ordering::descending(OrderField::LastPublicationDate));

        let (previous, next) = tokio::try_join!(
            self.source.query(&previous_query),
            self.source.query(&next_query)
        )?;

        let navigation = NavigationResult {
            previous: first_summary(previous)?,
            next: first_summary(next)?,
        };
        tracing::debug!(
            "Navigation for {}: previous={:?} next={:?}",
            post_id,
            navigation.previous.as_ref().map(|p| &p.uid),
            navigation.next.as_ref().map(|p| &p.uid)
        );
        Ok(navigation)
    }
}

fn first_summary(response: QueryResponse) -> Result<Option<PostSummary>> {
    response
        .results
        .first()
        .map(PostSummary::from_document)
        .transpose()
}
