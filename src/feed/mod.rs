//! Paginated post feed: list state, page fetching and "load more" sessions

mod fetcher;
mod registry;
mod session;
mod store;

pub use fetcher::{PaginationFetcher, ITEMS_CONSUMED_PER_PAGE};
pub use registry::{LoadOutcome, SessionRegistry};
pub use session::FeedSession;
pub use store::{append, FetchedPage, PostListState};
