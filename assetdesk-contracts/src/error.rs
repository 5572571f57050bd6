use thiserror::Error;

/// Failure of a collaborator call. Local state is never left half-applied;
/// only `Rejected` calls are pointless to retry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("subscription closed")]
    Closed,
}
