//! Trait surfaces for the external collaborators the browser core talks to:
//! the paginated query backend, the live change feed and the bulk mutation
//! endpoint.

pub mod error;
pub mod feed;
pub mod mutations;
pub mod query;

pub use error::TransportError;
pub use feed::{
    ChangeFeed, FeedEvent, FeedFilter, FeedLabel, FeedSink, SubscriptionHandle,
};
pub use mutations::BulkMutations;
pub use query::{AssetQuery, DocumentBody, PageRequest};

/// Frequently used collaborator types.
pub mod prelude {
    pub use super::error::TransportError;
    pub use super::feed::{
        ChangeFeed, FeedEvent, FeedFilter, FeedLabel, FeedSink,
        SubscriptionHandle,
    };
    pub use super::mutations::BulkMutations;
    pub use super::query::{AssetQuery, DocumentBody, PageRequest};
}
