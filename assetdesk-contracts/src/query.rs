use assetdesk_model::AssetOrder;
use async_trait::async_trait;

use crate::error::TransportError;

/// Raw document body as returned by the backend. Parsed record by record by
/// the core so one malformed document never sinks a whole page.
pub type DocumentBody = serde_json::Value;

/// One sequential page of the asset query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
    pub order: AssetOrder,
}

impl PageRequest {
    pub fn new(index: usize, size: usize, order: AssetOrder) -> Self {
        Self { index, size, order }
    }

    /// Offset of the first document in the page.
    pub fn start(&self) -> usize {
        self.index.saturating_mul(self.size)
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start().saturating_add(self.size)
    }
}

#[async_trait]
pub trait AssetQuery: Send + Sync {
    /// Fetch the documents in `[request.start(), request.end())` under
    /// `request.order`.
    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> Result<Vec<DocumentBody>, TransportError>;

    /// Fetch every tag document.
    async fn fetch_all_tags(&self) -> Result<Vec<DocumentBody>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets_follow_index_and_size() {
        let request = PageRequest::new(3, 50, AssetOrder::default());
        assert_eq!(request.start(), 150);
        assert_eq!(request.end(), 200);
    }
}
