use std::collections::HashSet;

use assetdesk_model::AssetId;

use crate::collection::CollectionStore;

/// Picked assets. Only identities currently held by the collection store can
/// be members.
#[derive(Debug, Default)]
pub struct SelectionSet {
    picked: HashSet<AssetId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picking an identity the store does not hold is a silent no-op.
    pub fn pick(&mut self, id: &AssetId, store: &CollectionStore) -> bool {
        if !store.contains(id) {
            log::debug!("Ignoring pick of {}: not in view", id);
            return false;
        }
        self.picked.insert(id.clone())
    }

    pub fn unpick(&mut self, id: &AssetId) -> bool {
        self.picked.remove(id)
    }

    /// Pick every asset currently in view. Returns how many were added.
    pub fn pick_all(&mut self, store: &CollectionStore) -> usize {
        let before = self.picked.len();
        self.picked.extend(store.view_ids().cloned());
        self.picked.len() - before
    }

    pub fn clear(&mut self) -> usize {
        let count = self.picked.len();
        self.picked.clear();
        count
    }

    pub fn is_picked(&self, id: &AssetId) -> bool {
        self.picked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    /// Members in view order.
    pub fn ordered(&self, store: &CollectionStore) -> Vec<AssetId> {
        store
            .view_ids()
            .filter(|id| self.picked.contains(*id))
            .cloned()
            .collect()
    }
}
