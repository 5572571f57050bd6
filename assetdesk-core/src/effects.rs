//! Execution of effects against the external collaborators.

use std::fmt;
use std::sync::Arc;

use assetdesk_contracts::{AssetQuery, BulkMutations, ChangeFeed};

use crate::messages::{Effect, Message};

/// The three collaborator surfaces the browser depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub query: Arc<dyn AssetQuery>,
    pub feed: Arc<dyn ChangeFeed>,
    pub mutations: Arc<dyn BulkMutations>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    pub fn new(
        query: Arc<dyn AssetQuery>,
        feed: Arc<dyn ChangeFeed>,
        mutations: Arc<dyn BulkMutations>,
    ) -> Self {
        Self {
            query,
            feed,
            mutations,
        }
    }

    /// Use one backend for every surface.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AssetQuery + ChangeFeed + BulkMutations + 'static,
    {
        Self {
            query: backend.clone(),
            feed: backend.clone(),
            mutations: backend,
        }
    }

    /// Run `effect` and turn its completion into the message that reports it.
    pub async fn execute(&self, effect: Effect) -> Message {
        match effect {
            Effect::FetchPage { ticket, request } => {
                let result = self.query.fetch_page(request).await;
                if let Err(err) = &result {
                    log::error!("Fetching page {} failed: {}", request.index, err);
                }
                Message::PageLoaded { ticket, result }
            }
            Effect::FetchTags { ticket } => {
                let result = self.query.fetch_all_tags().await;
                if let Err(err) = &result {
                    log::error!("Fetching tags failed: {}", err);
                }
                Message::TagsLoaded { ticket, result }
            }
            Effect::DeleteAssets { ids } => {
                let result = self.mutations.delete_assets(&ids).await;
                if let Err(err) = &result {
                    log::error!("Deleting {} assets failed: {}", ids.len(), err);
                }
                Message::BulkActionFinished(result)
            }
            Effect::DeleteTag { id } => {
                let result = self.mutations.delete_tag(&id).await;
                if let Err(err) = &result {
                    log::error!("Deleting tag {} failed: {}", id, err);
                }
                Message::BulkActionFinished(result)
            }
        }
    }
}
