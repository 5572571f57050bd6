//! Read-only projections handed to presentation.

use assetdesk_model::{Asset, AssetId, AssetOrder, Tag};
use serde::Serialize;

use crate::confirmation::ConfirmationDescriptor;
use crate::error::VisibleError;
use crate::tags::TagLabel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetView {
    pub asset: Asset,
    pub picked: bool,
    pub tags: Vec<TagLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationStatus {
    pub page_count: usize,
    pub loading_page: Option<usize>,
    pub exhausted: bool,
}

/// Everything a renderer needs, captured between two applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrowserSnapshot {
    pub order: AssetOrder,
    pub assets: Vec<AssetView>,
    pub tags: Vec<Tag>,
    pub tags_loading: bool,
    /// False until the first full tag load lands; an empty `tags` list
    /// before that means "not known yet", not "no tags".
    pub tags_loaded: bool,
    pub picked: Vec<AssetId>,
    pub pending_confirmation: Option<ConfirmationDescriptor>,
    pub pagination: PaginationStatus,
    pub error: Option<VisibleError>,
    /// Feed transitions received but not yet applied.
    pub queued_transitions: usize,
}

impl BrowserSnapshot {
    pub fn asset_ids(&self) -> Vec<&str> {
        self.assets.iter().map(|view| view.asset.id.as_str()).collect()
    }

    pub fn asset(&self, id: &str) -> Option<&AssetView> {
        self.assets.iter().find(|view| view.asset.id.as_str() == id)
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}
