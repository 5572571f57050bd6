use assetdesk_model::{AssetId, TagId};
use async_trait::async_trait;

use crate::error::TransportError;

/// Destructive operations the confirmation gate may run.
#[async_trait]
pub trait BulkMutations: Send + Sync {
    async fn delete_assets(&self, ids: &[AssetId]) -> Result<(), TransportError>;

    async fn delete_tag(&self, id: &TagId) -> Result<(), TransportError>;
}
