//! Live change feed boundary.
//!
//! The transport delivers events in order per document but in no particular
//! order across documents, and never re-delivers after a dropped connection.

use std::fmt;

use assetdesk_model::{DRAFTS_PREFIX, EntityKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::TransportError;
use crate::query::DocumentBody;

/// A raw feed notification, as received from the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub result: Option<DocumentBody>,
    pub transition: String,
}

impl FeedEvent {
    pub fn new(
        document_id: impl Into<String>,
        result: Option<DocumentBody>,
        transition: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            result,
            transition: transition.into(),
        }
    }

    pub fn label(&self) -> FeedLabel {
        FeedLabel::parse(&self.transition)
    }

    /// `_type` of the carried body, if any.
    pub fn document_type(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|body| body.get("_type"))
            .and_then(|ty| ty.as_str())
    }
}

/// Transition labels the transport may emit. The set is open; anything the
/// browser does not track lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLabel {
    Appear,
    Update,
    Disappear,
    Other(String),
}

impl FeedLabel {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "appear" => FeedLabel::Appear,
            "update" => FeedLabel::Update,
            "disappear" => FeedLabel::Disappear,
            other => FeedLabel::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for FeedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLabel::Appear => write!(f, "appear"),
            FeedLabel::Update => write!(f, "update"),
            FeedLabel::Disappear => write!(f, "disappear"),
            FeedLabel::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Filter predicate handed to the transport on subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedFilter {
    pub kind: EntityKind,
    pub include_drafts: bool,
}

impl FeedFilter {
    pub fn new(kind: EntityKind, include_drafts: bool) -> Self {
        Self {
            kind,
            include_drafts,
        }
    }

    /// Events without a body (deletions) can only be filtered by id.
    pub fn matches(&self, event: &FeedEvent) -> bool {
        if !self.include_drafts && event.document_id.starts_with(DRAFTS_PREFIX)
        {
            return false;
        }
        match event.document_type() {
            Some(document_type) => {
                self.kind.matches_document_type(document_type)
            }
            None => true,
        }
    }
}

/// Where the transport pushes events for one subscription.
pub type FeedSink = mpsc::UnboundedSender<FeedEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub Uuid);

impl SubscriptionHandle {
    pub fn new() -> Self {
        SubscriptionHandle(Uuid::now_v7())
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Start pushing events that pass `filter` into `sink`. A dropped
    /// connection yields silence on the sink, never an error.
    async fn subscribe(
        &self,
        filter: FeedFilter,
        sink: FeedSink,
    ) -> Result<SubscriptionHandle, TransportError>;

    /// Stop delivery for `handle`. Unknown handles are ignored.
    async fn unsubscribe(&self, handle: SubscriptionHandle);
}
