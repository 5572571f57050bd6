use assetdesk_contracts::{DocumentBody, FeedEvent, PageRequest, TransportError};
use assetdesk_model::{AssetId, AssetOrder, EntityKind, TagId};

use crate::collection::PageTicket;
use crate::transition::Transition;

/// Everything the browser reacts to: user actions, collaborator completions
/// and feed deliveries all go through the same queue.
#[derive(Debug, Clone)]
pub enum Message {
    // Pagination
    LoadPage(usize),
    LoadNextPage,
    SetOrder(AssetOrder),
    PageLoaded {
        ticket: PageTicket,
        result: Result<Vec<DocumentBody>, TransportError>,
    },

    // Tags
    RefetchTags,
    TagsLoaded {
        ticket: u64,
        result: Result<Vec<DocumentBody>, TransportError>,
    },

    // Live feed
    Feed {
        kind: EntityKind,
        event: FeedEvent,
    },
    Transition(Transition),

    // Selection
    Pick(AssetId),
    Unpick(AssetId),
    PickAll,
    ClearPicked,

    // Bulk actions
    RequestDeletePicked,
    RequestDeleteAssets(Vec<AssetId>),
    RequestDeleteTag(TagId),
    Confirm,
    Cancel,
    BulkActionFinished(Result<(), TransportError>),

    DismissError,
}

impl Message {
    /// Feed deliveries are queued for the applier rather than handled inline.
    pub fn is_feed_delivery(&self) -> bool {
        matches!(self, Self::Feed { .. } | Self::Transition(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadPage(_) => "Browser::LoadPage",
            Self::LoadNextPage => "Browser::LoadNextPage",
            Self::SetOrder(_) => "Browser::SetOrder",
            Self::PageLoaded { .. } => "Browser::PageLoaded",
            Self::RefetchTags => "Browser::RefetchTags",
            Self::TagsLoaded { .. } => "Browser::TagsLoaded",
            Self::Feed { .. } => "Browser::Feed",
            Self::Transition(_) => "Browser::Transition",
            Self::Pick(_) => "Browser::Pick",
            Self::Unpick(_) => "Browser::Unpick",
            Self::PickAll => "Browser::PickAll",
            Self::ClearPicked => "Browser::ClearPicked",
            Self::RequestDeletePicked => "Browser::RequestDeletePicked",
            Self::RequestDeleteAssets(_) => "Browser::RequestDeleteAssets",
            Self::RequestDeleteTag(_) => "Browser::RequestDeleteTag",
            Self::Confirm => "Browser::Confirm",
            Self::Cancel => "Browser::Cancel",
            Self::BulkActionFinished(_) => "Browser::BulkActionFinished",
            Self::DismissError => "Browser::DismissError",
        }
    }
}

/// Collaborator calls requested by an update. Each completes by feeding a
/// message back into the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        ticket: PageTicket,
        request: PageRequest,
    },
    FetchTags {
        ticket: u64,
    },
    DeleteAssets {
        ids: Vec<AssetId>,
    },
    DeleteTag {
        id: TagId,
    },
}
