//! Queued mutation applier.
//!
//! Feed transitions are buffered here and folded into the view in arrival
//! order, a bounded batch at a time, independently of page loads.

use std::collections::{HashSet, VecDeque};

use assetdesk_model::{AssetId, TagId};

use crate::collection::UpsertOutcome;
use crate::state::BrowserState;
use crate::transition::{Entity, EntityRef, Transition};

/// FIFO of transitions waiting to be applied. Enqueueing never blocks and
/// never fails.
#[derive(Debug, Default)]
pub struct MutationQueue {
    pending: VecDeque<Transition>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, transition: Transition) {
        self.pending.push_back(transition);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn pop(&mut self) -> Option<Transition> {
        self.pending.pop_front()
    }
}

/// Result of applying transitions to the view.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: usize,
    pub upserted_assets: HashSet<AssetId>,
    pub removed_assets: HashSet<AssetId>,
    pub upserted_tags: HashSet<TagId>,
    pub removed_tags: HashSet<TagId>,
    /// Older than the copy already held; ignored.
    pub stale: usize,
    /// Deletions for identities the view never held.
    pub ignored_deletes: usize,
}

impl ApplyOutcome {
    pub fn is_empty(&self) -> bool {
        self.applied == 0
    }

    fn merge(&mut self, other: ApplyOutcome) {
        self.applied += other.applied;
        self.upserted_assets.extend(other.upserted_assets);
        self.removed_assets.extend(other.removed_assets);
        self.upserted_tags.extend(other.upserted_tags);
        self.removed_tags.extend(other.removed_tags);
        self.stale += other.stale;
        self.ignored_deletes += other.ignored_deletes;
    }
}

impl BrowserState {
    pub fn enqueue_transition(&mut self, transition: Transition) {
        self.queue.enqueue(transition);
    }

    /// Apply up to `limit` queued transitions in arrival order.
    pub fn flush_transitions(&mut self, limit: usize) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        for _ in 0..limit {
            let Some(transition) = self.queue.pop() else {
                break;
            };
            outcome.merge(self.apply_transition(transition));
        }
        if !outcome.is_empty() {
            log::debug!(
                "Applied {} transitions ({} stale, {} still queued)",
                outcome.applied,
                outcome.stale,
                self.queue.len()
            );
        }
        outcome
    }

    /// Apply everything queued.
    pub fn flush_all(&mut self) -> ApplyOutcome {
        self.flush_transitions(usize::MAX)
    }

    /// Fold one transition into the store, directory, selection and gate.
    pub fn apply_transition(&mut self, transition: Transition) -> ApplyOutcome {
        let mut outcome = ApplyOutcome {
            applied: 1,
            ..ApplyOutcome::default()
        };

        match transition {
            Transition::Created(Entity::Asset(asset))
            | Transition::Updated(Entity::Asset(asset)) => {
                let id = asset.id.clone();
                match self.collection.upsert(asset) {
                    UpsertOutcome::Inserted => {
                        log::debug!("Asset {} entered view through the feed", id);
                        outcome.upserted_assets.insert(id);
                    }
                    UpsertOutcome::Replaced => {
                        outcome.upserted_assets.insert(id);
                    }
                    UpsertOutcome::Stale => outcome.stale += 1,
                }
            }
            Transition::Created(Entity::Tag(tag))
            | Transition::Updated(Entity::Tag(tag)) => {
                let id = tag.id.clone();
                match self.tags.upsert(tag) {
                    UpsertOutcome::Stale => outcome.stale += 1,
                    _ => {
                        outcome.upserted_tags.insert(id);
                    }
                }
            }
            Transition::Deleted(EntityRef::Asset(id)) => {
                self.gate.note_asset_deleted(&id);
                if self.remove_asset(&id).is_some() {
                    outcome.removed_assets.insert(id);
                } else {
                    outcome.ignored_deletes += 1;
                }
            }
            Transition::Deleted(EntityRef::Tag(id)) => {
                self.gate.note_tag_deleted(&id);
                if self.tags.remove(&id).is_some() {
                    outcome.removed_tags.insert(id);
                } else {
                    outcome.ignored_deletes += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_config::BrowserConfig;
    use assetdesk_model::{Asset, AssetKind, Revision, Tag};
    use chrono::{TimeZone, Utc};

    fn asset(id: &str, minute: u32) -> Asset {
        Asset {
            id: AssetId::new(id),
            kind: AssetKind::Image,
            revision: Revision::new(
                format!("r{minute}"),
                Utc.with_ymd_and_hms(2026, 2, 1, 8, minute, 0).unwrap(),
            ),
            original_filename: None,
            mime_type: None,
            size: None,
            dimensions: None,
            tags: Vec::new(),
        }
    }

    fn tag(id: &str) -> Tag {
        Tag {
            id: TagId::new(id),
            name: id.to_uppercase(),
            usage_hint: Some(3),
            revision: Revision::new("t", Utc::now()),
        }
    }

    #[test]
    fn same_identity_applies_in_arrival_order() {
        let mut state = BrowserState::new(BrowserConfig::default());
        state.enqueue_transition(Transition::Updated(Entity::Asset(asset("a", 1))));
        state.enqueue_transition(Transition::Deleted(EntityRef::Asset(
            AssetId::new("a"),
        )));
        state.enqueue_transition(Transition::Updated(Entity::Asset(asset("a", 3))));
        assert_eq!(state.queued_transitions(), 3);

        let outcome = state.flush_all();
        assert_eq!(outcome.applied, 3);
        assert_eq!(
            state
                .collection()
                .get(&AssetId::new("a"))
                .map(|a| a.revision.rev.as_str()),
            Some("r3")
        );
    }

    #[test]
    fn flush_respects_batch_limit() {
        let mut state = BrowserState::new(BrowserConfig::default());
        for id in ["a", "b", "c"] {
            state.enqueue_transition(Transition::Updated(Entity::Asset(asset(id, 0))));
        }

        assert_eq!(state.flush_transitions(2).applied, 2);
        assert_eq!(state.queued_transitions(), 1);
        assert_eq!(state.collection().len(), 2);
    }

    #[test]
    fn delete_of_absent_identity_is_a_no_op() {
        let mut state = BrowserState::new(BrowserConfig::default());
        let outcome = state.apply_transition(Transition::Deleted(
            EntityRef::Tag(TagId::new("missing")),
        ));
        assert_eq!(outcome.ignored_deletes, 1);
        assert!(state.tags().is_empty());
    }

    #[test]
    fn delete_prunes_selection_with_store() {
        let mut state = BrowserState::new(BrowserConfig::default());
        state.apply_transition(Transition::Updated(Entity::Asset(asset("a", 0))));
        assert!(state.pick(&AssetId::new("a")));

        state.apply_transition(Transition::Deleted(EntityRef::Asset(
            AssetId::new("a"),
        )));
        assert!(!state.collection().contains(&AssetId::new("a")));
        assert!(!state.is_picked(&AssetId::new("a")));
    }

    #[test]
    fn tag_created_lands_in_directory() {
        let mut state = BrowserState::new(BrowserConfig::default());
        let outcome =
            state.apply_transition(Transition::Created(Entity::Tag(tag("t1"))));
        assert!(outcome.upserted_tags.contains(&TagId::new("t1")));
        assert!(state.tags().contains(&TagId::new("t1")));
    }
}
