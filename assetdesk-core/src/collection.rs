//! Paginated collection store.
//!
//! Assets live in sequential pages plus an unpaged front bucket holding
//! entities that arrived through the feed before (or without) their page.
//! The front bucket followed by every page in index order is the canonical
//! view order. An identity is held in exactly one slot.

use std::collections::{HashMap, HashSet, VecDeque};

use assetdesk_model::{Asset, AssetId};

use crate::error::StoreError;

/// Result of writing a single entity into a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    /// The incoming copy predates the one already held and was ignored.
    Stale,
}

/// One fetched page. Indices are assigned at append time and never shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: usize,
    ids: Vec<AssetId>,
    exhausted: bool,
}

impl Page {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    /// The fetch that produced this page came back short.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Claim on an in-flight page fetch. A result is only accepted for the
/// ticket that is currently loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageTicket {
    pub generation: u64,
    pub index: usize,
}

/// What appending a page did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAppend {
    pub index: usize,
    pub inserted: usize,
    /// Already held elsewhere in the view; the held copy was kept in place.
    pub duplicates: Vec<AssetId>,
    /// Removed by a deletion that arrived before the page did.
    pub tombstoned: Vec<AssetId>,
    /// Duplicates whose entity data was newer than the held copy.
    pub refreshed: usize,
    pub exhausted: bool,
}

/// Tombstones kept when no capacity is configured.
pub const DEFAULT_TOMBSTONE_CAPACITY: usize = 1_024;

/// Identities deleted while a page may still carry them. Past `capacity`
/// the oldest entries are forgotten first.
#[derive(Debug)]
struct Tombstones {
    capacity: usize,
    ids: HashSet<AssetId>,
    order: VecDeque<AssetId>,
}

impl Tombstones {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ids: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    fn contains(&self, id: &AssetId) -> bool {
        self.ids.contains(id)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn insert(&mut self, id: &AssetId) {
        if !self.ids.insert(id.clone()) {
            return;
        }
        self.order.push_back(id.clone());
        while self.ids.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.ids.remove(&oldest) {
                log::trace!("Forgetting tombstone for {}", oldest);
            }
        }
    }

    fn lift(&mut self, id: &AssetId) {
        if self.ids.remove(id) {
            self.order.retain(|held| held != id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Front,
    Page(usize),
}

#[derive(Debug)]
pub struct CollectionStore {
    page_size: usize,
    generation: u64,
    assets: HashMap<AssetId, Asset>,
    slots: HashMap<AssetId, Slot>,
    front: Vec<AssetId>,
    pages: Vec<Page>,
    loading: Option<PageTicket>,
    exhausted: bool,
    tombstones: Tombstones,
}

impl CollectionStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            generation: 0,
            assets: HashMap::new(),
            slots: HashMap::new(),
            front: Vec::new(),
            pages: Vec::new(),
            loading: None,
            exhausted: false,
            tombstones: Tombstones::new(DEFAULT_TOMBSTONE_CAPACITY),
        }
    }

    /// Bound the number of remembered deletions. Existing tombstones are
    /// dropped.
    pub fn with_tombstone_capacity(mut self, capacity: usize) -> Self {
        self.tombstones = Tombstones::new(capacity);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index the next `begin_page` call must ask for.
    pub fn next_page_index(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn front(&self) -> &[AssetId] {
        &self.front
    }

    pub fn loading_page(&self) -> Option<usize> {
        self.loading.map(|ticket| ticket.index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn is_tombstoned(&self, id: &AssetId) -> bool {
        self.tombstones.contains(id)
    }

    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }

    /// Identities in view order: front bucket first, then pages by index.
    pub fn view_ids(&self) -> impl Iterator<Item = &AssetId> + '_ {
        self.front
            .iter()
            .chain(self.pages.iter().flat_map(|page| page.ids.iter()))
    }

    /// Entities in view order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.view_ids().filter_map(|id| self.assets.get(id))
    }

    /// Reserve the fetch of page `index`. Only the next sequential page may
    /// be requested, one at a time, and never past exhaustion.
    pub fn begin_page(&mut self, index: usize) -> Result<PageTicket, StoreError> {
        let expected = self.pages.len();
        if index != expected {
            return Err(StoreError::OutOfOrderPage {
                requested: index,
                expected,
            });
        }
        if self.loading.is_some() {
            return Err(StoreError::PageInFlight(index));
        }
        if self.exhausted {
            return Err(StoreError::Exhausted(index));
        }

        let ticket = PageTicket {
            generation: self.generation,
            index,
        };
        self.loading = Some(ticket);
        Ok(ticket)
    }

    /// Release a failed fetch so the same index can be retried. Returns
    /// false when the ticket is no longer current.
    pub fn fail_page(&mut self, ticket: PageTicket) -> bool {
        if self.loading == Some(ticket) {
            self.loading = None;
            true
        } else {
            false
        }
    }

    /// Append the fetched page for `ticket`.
    ///
    /// `fetched` is the raw record count returned by the backend, before
    /// malformed records were dropped; exhaustion is judged on it.
    pub fn append_page(
        &mut self,
        ticket: PageTicket,
        assets: Vec<Asset>,
        fetched: usize,
    ) -> Result<PageAppend, StoreError> {
        if ticket.generation != self.generation {
            return Err(StoreError::Superseded {
                index: ticket.index,
            });
        }
        let expected = self.pages.len();
        if ticket.index != expected {
            return Err(StoreError::OutOfOrderPage {
                requested: ticket.index,
                expected,
            });
        }
        if self.loading != Some(ticket) {
            return Err(StoreError::Superseded {
                index: ticket.index,
            });
        }
        self.loading = None;

        let index = ticket.index;
        let exhausted = fetched < self.page_size;
        let mut append = PageAppend {
            index,
            exhausted,
            ..PageAppend::default()
        };
        let mut ids = Vec::with_capacity(assets.len());

        for asset in assets {
            if self.tombstones.contains(&asset.id) {
                log::debug!(
                    "Skipping {} in page {}: deleted before the page arrived",
                    asset.id,
                    index
                );
                append.tombstoned.push(asset.id);
                continue;
            }

            if let Some(current) = self.assets.get_mut(&asset.id) {
                log::debug!(
                    "Skipping duplicate {} in page {}: already in view",
                    asset.id,
                    index
                );
                if current.revision.is_older_than(&asset.revision) {
                    *current = asset.clone();
                    append.refreshed += 1;
                }
                append.duplicates.push(asset.id);
                continue;
            }

            self.slots.insert(asset.id.clone(), Slot::Page(index));
            ids.push(asset.id.clone());
            self.assets.insert(asset.id.clone(), asset);
        }

        append.inserted = ids.len();
        self.pages.push(Page {
            index,
            ids,
            exhausted,
        });
        self.exhausted = exhausted;
        Ok(append)
    }

    /// Replace in place when present, otherwise add to the front bucket.
    /// Lifts any tombstone for the identity.
    pub fn upsert(&mut self, asset: Asset) -> UpsertOutcome {
        self.tombstones.lift(&asset.id);

        match self.assets.get_mut(&asset.id) {
            Some(current) if asset.is_stale_against(current) => {
                log::debug!(
                    "Ignoring stale copy of {} (rev {} older than {})",
                    asset.id,
                    asset.revision.rev,
                    current.revision.rev
                );
                UpsertOutcome::Stale
            }
            Some(current) => {
                *current = asset;
                UpsertOutcome::Replaced
            }
            None => {
                self.slots.insert(asset.id.clone(), Slot::Front);
                self.front.push(asset.id.clone());
                self.assets.insert(asset.id.clone(), asset);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Remove `id` from whichever slot holds it. The identity is tombstoned
    /// even when absent so a page fetched later cannot bring it back.
    pub fn remove(&mut self, id: &AssetId) -> Option<Asset> {
        self.tombstones.insert(id);

        let slot = self.slots.remove(id)?;
        match slot {
            Slot::Front => self.front.retain(|held| held != id),
            Slot::Page(index) => {
                if let Some(page) = self.pages.get_mut(index) {
                    page.ids.retain(|held| held != id);
                }
            }
        }
        self.assets.remove(id)
    }

    /// Drop every page and entity and start a new generation. Results for
    /// tickets of the previous generation are rejected from now on.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.assets.clear();
        self.slots.clear();
        self.front.clear();
        self.pages.clear();
        self.loading = None;
        self.exhausted = false;
    }
}
