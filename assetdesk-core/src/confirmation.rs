//! Confirmation gate for destructive bulk actions.
//!
//! `Idle -> Pending -> Executing -> Idle`, with `Pending -> Idle` on cancel.
//! The target set is frozen when the request is made and never changes
//! afterwards; targets that vanished in the meantime are skipped when the
//! request is confirmed.

use std::collections::HashSet;
use std::sync::Arc;

use assetdesk_model::{Asset, AssetId, Tag, TagId};
use serde::Serialize;

use crate::error::GateError;

/// Immutable, duplicate-free list of asset identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenTargets(Arc<[AssetId]>);

impl FrozenTargets {
    /// Keeps the first occurrence of each id, in input order.
    pub fn new(ids: impl IntoIterator<Item = AssetId>) -> Self {
        let mut seen = HashSet::new();
        let unique: Vec<AssetId> = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        FrozenTargets(unique.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetId> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.0.contains(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    DeleteAssets(FrozenTargets),
    DeleteTag(TagId),
}

impl BulkAction {
    pub fn kind(&self) -> BulkActionKind {
        match self {
            BulkAction::DeleteAssets(_) => BulkActionKind::DeleteAssets,
            BulkAction::DeleteTag(_) => BulkActionKind::DeleteTag,
        }
    }

    fn target_ids(&self) -> Vec<String> {
        match self {
            BulkAction::DeleteAssets(targets) => {
                targets.iter().map(|id| id.to_string()).collect()
            }
            BulkAction::DeleteTag(id) => vec![id.to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionKind {
    DeleteAssets,
    DeleteTag,
}

/// Entities removed optimistically while a bulk action runs. Restored if the
/// action fails, minus anything the feed confirmed deleted in between.
#[derive(Debug, Clone, PartialEq)]
pub enum Tentative {
    Assets(Vec<Asset>),
    Tag(Option<Tag>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub action: BulkAction,
    /// Targets that were still present when the action was confirmed.
    pub handled: Vec<AssetId>,
    pub tentative: Tentative,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GateState {
    #[default]
    Idle,
    Pending(BulkAction),
    Executing(Execution),
}

/// Read-only view of the gate for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationDescriptor {
    pub action: BulkActionKind,
    pub targets: Vec<String>,
    pub executing: bool,
}

#[derive(Debug, Default)]
pub struct ConfirmationGate {
    state: GateState,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::Idle)
    }

    pub fn pending(&self) -> Option<&BulkAction> {
        match &self.state {
            GateState::Pending(action) => Some(action),
            _ => None,
        }
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.state, GateState::Executing(_))
    }

    /// Freeze `action` for confirmation. Only accepted from Idle.
    pub fn request(&mut self, action: BulkAction) -> Result<(), GateError> {
        if !self.is_idle() {
            return Err(GateError::AlreadyPending);
        }
        self.state = GateState::Pending(action);
        Ok(())
    }

    /// Drop the pending action without any side effect.
    pub fn cancel(&mut self) -> Result<BulkAction, GateError> {
        match std::mem::take(&mut self.state) {
            GateState::Pending(action) => Ok(action),
            other => {
                self.state = other;
                Err(GateError::NothingPending)
            }
        }
    }

    /// Move the pending action into execution.
    pub fn begin_execution(
        &mut self,
        handled: Vec<AssetId>,
        tentative: Tentative,
    ) -> Result<(), GateError> {
        match std::mem::take(&mut self.state) {
            GateState::Pending(action) => {
                self.state = GateState::Executing(Execution {
                    action,
                    handled,
                    tentative,
                });
                Ok(())
            }
            other => {
                self.state = other;
                Err(GateError::NothingPending)
            }
        }
    }

    /// Resolve a pending action whose targets have all vanished.
    pub fn resolve_without_execution(&mut self) -> Result<BulkAction, GateError> {
        self.cancel()
    }

    /// The feed confirmed `id` deleted; it must not come back on rollback.
    pub fn note_asset_deleted(&mut self, id: &AssetId) {
        if let GateState::Executing(Execution {
            tentative: Tentative::Assets(assets),
            ..
        }) = &mut self.state
        {
            assets.retain(|asset| &asset.id != id);
        }
    }

    pub fn note_tag_deleted(&mut self, id: &TagId) {
        if let GateState::Executing(Execution {
            tentative: Tentative::Tag(tag),
            ..
        }) = &mut self.state
            && tag.as_ref().is_some_and(|tag| &tag.id == id)
        {
            *tag = None;
        }
    }

    /// Leave Executing. Returns `None` when nothing was executing.
    pub fn finish(&mut self) -> Option<Execution> {
        match std::mem::take(&mut self.state) {
            GateState::Executing(execution) => Some(execution),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn descriptor(&self) -> Option<ConfirmationDescriptor> {
        match &self.state {
            GateState::Idle => None,
            GateState::Pending(action) => Some(ConfirmationDescriptor {
                action: action.kind(),
                targets: action.target_ids(),
                executing: false,
            }),
            GateState::Executing(execution) => Some(ConfirmationDescriptor {
                action: execution.action.kind(),
                targets: execution.action.target_ids(),
                executing: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete(ids: &[&str]) -> BulkAction {
        BulkAction::DeleteAssets(FrozenTargets::new(
            ids.iter().map(|id| AssetId::new(*id)),
        ))
    }

    #[test]
    fn request_only_from_idle() {
        let mut gate = ConfirmationGate::new();
        gate.request(delete(&["a"])).expect("first request");

        assert_eq!(
            gate.request(BulkAction::DeleteTag(TagId::new("t"))),
            Err(GateError::AlreadyPending)
        );
        assert_eq!(gate.pending(), Some(&delete(&["a"])));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut gate = ConfirmationGate::new();
        assert_eq!(gate.cancel(), Err(GateError::NothingPending));

        gate.request(delete(&["a", "b"])).expect("request");
        assert_eq!(gate.cancel(), Ok(delete(&["a", "b"])));
        assert!(gate.is_idle());
    }

    #[test]
    fn executing_blocks_new_requests_and_cancel() {
        let mut gate = ConfirmationGate::new();
        gate.request(delete(&["a"])).expect("request");
        gate.begin_execution(vec![AssetId::new("a")], Tentative::Assets(vec![]))
            .expect("execution");

        assert!(gate.is_executing());
        assert_eq!(gate.cancel(), Err(GateError::NothingPending));
        assert_eq!(
            gate.request(delete(&["b"])),
            Err(GateError::AlreadyPending)
        );
        assert!(gate.descriptor().is_some_and(|d| d.executing));

        let execution = gate.finish().expect("was executing");
        assert_eq!(execution.handled, vec![AssetId::new("a")]);
        assert!(gate.is_idle());
    }

    #[test]
    fn frozen_targets_drop_duplicates() {
        let targets = FrozenTargets::new(
            ["a", "b", "a"].into_iter().map(AssetId::new),
        );
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&AssetId::new("b")));
    }

    #[test]
    fn frozen_targets_keep_first_occurrence_order() {
        let ids = (0..5_000)
            .chain(0..5_000)
            .map(|n| AssetId::new(format!("asset-{}", n % 2_500)));
        let targets = FrozenTargets::new(ids);

        assert_eq!(targets.len(), 2_500);
        let order: Vec<&str> = targets.iter().take(3).map(AssetId::as_str).collect();
        assert_eq!(order, vec!["asset-0", "asset-1", "asset-2"]);
    }
}
