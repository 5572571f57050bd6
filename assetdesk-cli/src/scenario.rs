//! Scripted browser sessions.
//!
//! A scenario seeds the in-memory backend, then runs a list of steps. Steps
//! are either user actions dispatched to the browser or changes made on the
//! backend side, which reach the browser through its feed subscriptions.

use std::collections::BTreeMap;
use std::sync::Arc;

use assetdesk_config::BrowserConfig;
use assetdesk_contracts::{DocumentBody, FeedEvent, TransportError};
use assetdesk_core::{
    BrowserSnapshot, Collaborators, InlineDriver, MemoryBackend, Message,
};
use assetdesk_model::{AssetId, AssetOrder, EntityKind, TagId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub assets: Vec<DocumentBody>,
    pub tags: Vec<DocumentBody>,
    /// Fixed page contents keyed by page index.
    pub pages: BTreeMap<usize, Vec<DocumentBody>>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    LoadPage { index: usize },
    LoadNextPage,
    RefetchTags,
    SetOrder { order: AssetOrder },
    Pick { id: String },
    Unpick { id: String },
    PickAll,
    ClearPicked,
    RequestDeletePicked,
    RequestDeleteAssets { ids: Vec<String> },
    RequestDeleteTag { id: String },
    Confirm,
    Cancel,
    DismissError,
    /// Deliver a raw feed event to subscribers of `kind`.
    Feed { kind: EntityKind, event: FeedEvent },
    PutAsset { document: DocumentBody },
    RemoveAsset { id: String },
    PutTag { document: DocumentBody },
    RemoveTag { id: String },
    FailNextPage { message: String },
    FailNextTags { message: String },
    FailNextMutation { message: String },
}

impl Step {
    /// The browser message for user actions; `None` for backend changes.
    fn message(&self) -> Option<Message> {
        let message = match self {
            Step::LoadPage { index } => Message::LoadPage(*index),
            Step::LoadNextPage => Message::LoadNextPage,
            Step::RefetchTags => Message::RefetchTags,
            Step::SetOrder { order } => Message::SetOrder(*order),
            Step::Pick { id } => Message::Pick(AssetId::new(id.as_str())),
            Step::Unpick { id } => Message::Unpick(AssetId::new(id.as_str())),
            Step::PickAll => Message::PickAll,
            Step::ClearPicked => Message::ClearPicked,
            Step::RequestDeletePicked => Message::RequestDeletePicked,
            Step::RequestDeleteAssets { ids } => Message::RequestDeleteAssets(
                ids.iter().map(|id| AssetId::new(id.as_str())).collect(),
            ),
            Step::RequestDeleteTag { id } => {
                Message::RequestDeleteTag(TagId::new(id.as_str()))
            }
            Step::Confirm => Message::Confirm,
            Step::Cancel => Message::Cancel,
            Step::DismissError => Message::DismissError,
            _ => return None,
        };
        Some(message)
    }

    fn apply_to_backend(&self, backend: &MemoryBackend) {
        match self {
            Step::Feed { kind, event } => backend.emit(*kind, event.clone()),
            Step::PutAsset { document } => backend.put_asset(document.clone()),
            Step::RemoveAsset { id } => backend.remove_asset(id),
            Step::PutTag { document } => backend.put_tag(document.clone()),
            Step::RemoveTag { id } => backend.remove_tag(id),
            Step::FailNextPage { message } => {
                backend.fail_next_page(TransportError::Unavailable(message.clone()))
            }
            Step::FailNextTags { message } => {
                backend.fail_next_tags(TransportError::Unavailable(message.clone()))
            }
            Step::FailNextMutation { message } => backend
                .fail_next_mutation(TransportError::Rejected(message.clone())),
            _ => {}
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub snapshot: BrowserSnapshot,
    pub rejections: Vec<Rejection>,
}

pub async fn replay(
    scenario: Scenario,
    config: BrowserConfig,
) -> anyhow::Result<ReplayReport> {
    let backend =
        Arc::new(MemoryBackend::with_documents(scenario.assets, scenario.tags));
    for (index, documents) in scenario.pages {
        backend.pin_page(index, documents);
    }

    let mut driver =
        InlineDriver::start(config, Collaborators::from_backend(backend.clone()))
            .await?;
    let mut rejections = Vec::new();

    for (index, step) in scenario.steps.iter().enumerate() {
        match step.message() {
            Some(message) => {
                if let Some(error) = driver.dispatch(message).await {
                    log::info!("Step {} rejected: {}", index, error);
                    rejections.push(Rejection {
                        step: index,
                        error: error.to_string(),
                    });
                }
            }
            None => {
                step.apply_to_backend(&backend);
                driver.settle();
            }
        }
    }

    let snapshot = driver.shutdown().await;
    Ok(ReplayReport {
        snapshot,
        rejections,
    })
}
