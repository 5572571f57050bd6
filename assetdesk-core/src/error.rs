use assetdesk_contracts::TransportError;
use assetdesk_model::{AssetId, EntityKind, ParseError};
use serde::Serialize;
use thiserror::Error;

/// Rejections raised by the paginated collection store. The store is left
/// untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("page {requested} requested out of order (next page is {expected})")]
    OutOfOrderPage { requested: usize, expected: usize },

    #[error("page {0} is already loading")]
    PageInFlight(usize),

    #[error("collection is exhausted, page {0} will not be fetched")]
    Exhausted(usize),

    #[error("result for page {index} belongs to a superseded view")]
    Superseded { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("another bulk action is already awaiting confirmation")]
    AlreadyPending,

    #[error("no bulk action is awaiting confirmation")]
    NothingPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("target {0} no longer exists")]
    StaleTarget(AssetId),

    #[error("{0} feed subscription failed: {1}")]
    Subscribe(EntityKind, TransportError),

    #[error("browser has been shut down")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Where a user-visible error came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ErrorOrigin {
    PageLoad { index: usize },
    TagLoad,
    DeleteAssets { count: usize },
    DeleteTag,
}

/// A recoverable failure surfaced to the user. Stays until dismissed or
/// until the failing operation succeeds on retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleError {
    pub origin: ErrorOrigin,
    pub message: String,
    pub retryable: bool,
}

impl VisibleError {
    pub fn new(origin: ErrorOrigin, error: &TransportError) -> Self {
        Self {
            origin,
            message: error.to_string(),
            retryable: !matches!(error, TransportError::Rejected(_)),
        }
    }
}
