//! Browser context owning every reconciliation component.
//!
//! All mutation goes through methods on [`BrowserState`] so that removals
//! from the store and pruning of the selection always happen together.

use assetdesk_config::BrowserConfig;
use assetdesk_contracts::{FeedFilter, PageRequest, TransportError};
use assetdesk_model::{
    Asset, AssetId, AssetOrder, DRAFTS_PREFIX, EntityKind, TagId,
};

use crate::applier::MutationQueue;
use crate::collection::{CollectionStore, PageTicket};
use crate::confirmation::{
    BulkAction, ConfirmationGate, FrozenTargets, Tentative,
};
use crate::error::{BrowserError, ErrorOrigin, GateError, VisibleError};
use crate::messages::Effect;
use crate::selection::SelectionSet;
use crate::snapshot::{AssetView, BrowserSnapshot, PaginationStatus};
use crate::tags::TagDirectory;

#[derive(Debug)]
pub struct BrowserState {
    pub(crate) config: BrowserConfig,
    pub(crate) order: AssetOrder,
    pub(crate) collection: CollectionStore,
    pub(crate) tags: TagDirectory,
    pub(crate) selection: SelectionSet,
    pub(crate) gate: ConfirmationGate,
    pub(crate) queue: MutationQueue,
    pub(crate) error: Option<VisibleError>,
    pub(crate) disposed: bool,
}

impl BrowserState {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            order: config.order,
            collection: CollectionStore::new(config.page_size)
                .with_tombstone_capacity(config.tombstone_capacity),
            tags: TagDirectory::new(),
            selection: SelectionSet::new(),
            gate: ConfirmationGate::new(),
            queue: MutationQueue::new(),
            error: None,
            disposed: false,
            config,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn order(&self) -> AssetOrder {
        self.order
    }

    pub fn collection(&self) -> &CollectionStore {
        &self.collection
    }

    pub fn tags(&self) -> &TagDirectory {
        &self.tags
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn queued_transitions(&self) -> usize {
        self.queue.len()
    }

    pub fn error(&self) -> Option<&VisibleError> {
        self.error.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Subscription filter for one feed.
    pub fn feed_filter(&self, kind: EntityKind) -> FeedFilter {
        FeedFilter::new(kind, self.config.include_drafts)
    }

    pub fn page_request(&self, ticket: PageTicket) -> PageRequest {
        PageRequest::new(ticket.index, self.collection.page_size(), self.order)
    }

    /// Whether an entity id passes the draft policy.
    pub(crate) fn admits(&self, id: &str) -> bool {
        self.config.include_drafts || !id.starts_with(DRAFTS_PREFIX)
    }

    pub fn pick(&mut self, id: &AssetId) -> bool {
        self.selection.pick(id, &self.collection)
    }

    pub fn unpick(&mut self, id: &AssetId) -> bool {
        self.selection.unpick(id)
    }

    pub fn pick_all(&mut self) -> usize {
        self.selection.pick_all(&self.collection)
    }

    pub fn clear_picked(&mut self) -> usize {
        self.selection.clear()
    }

    pub fn is_picked(&self, id: &AssetId) -> bool {
        self.selection.is_picked(id)
    }

    /// Remove an asset from the store and the selection in one step.
    pub(crate) fn remove_asset(&mut self, id: &AssetId) -> Option<Asset> {
        let removed = self.collection.remove(id);
        if self.selection.unpick(id) {
            log::debug!("Unpicked {} after removal", id);
        }
        removed
    }

    pub(crate) fn set_error(&mut self, error: VisibleError) {
        log::warn!("{:?}: {}", error.origin, error.message);
        self.error = Some(error);
    }

    /// Clear the visible error if `from` matches its origin.
    pub(crate) fn clear_error_where(
        &mut self,
        from: impl Fn(&ErrorOrigin) -> bool,
    ) {
        if self.error.as_ref().is_some_and(|err| from(&err.origin)) {
            self.error = None;
        }
    }

    pub fn dismiss_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Drop the loaded view and start over under `order`. Tombstones and the
    /// tag directory survive; the selection does not.
    pub(crate) fn reset_view(&mut self, order: AssetOrder) {
        self.order = order;
        self.collection.reset();
        let cleared = self.selection.clear();
        log::info!(
            "Reset view to order '{}' (generation {}, {} unpicked)",
            order,
            self.collection.generation(),
            cleared
        );
    }

    /// Freeze the current selection for deletion. An empty selection is
    /// not worth confirming and is ignored.
    pub fn request_delete_picked(&mut self) -> Result<bool, GateError> {
        let targets = self.selection.ordered(&self.collection);
        self.request_delete_assets(targets)
    }

    pub fn request_delete_assets(
        &mut self,
        ids: Vec<AssetId>,
    ) -> Result<bool, GateError> {
        if ids.is_empty() {
            return Ok(false);
        }
        self.gate
            .request(BulkAction::DeleteAssets(FrozenTargets::new(ids)))?;
        Ok(true)
    }

    pub fn request_delete_tag(
        &mut self,
        id: TagId,
    ) -> Result<(), GateError> {
        self.gate.request(BulkAction::DeleteTag(id))
    }

    pub fn cancel_confirmation(&mut self) -> Result<(), GateError> {
        self.gate.cancel().map(|_| ())
    }

    /// Confirm the pending action.
    ///
    /// Targets that are gone are skipped. The rest are removed locally right
    /// away and the returned effect performs the remote mutation. `None`
    /// means nothing was left to act on and the gate is idle again.
    pub fn confirm(&mut self) -> Result<Option<Effect>, GateError> {
        let action = self
            .gate
            .pending()
            .cloned()
            .ok_or(GateError::NothingPending)?;

        match action {
            BulkAction::DeleteAssets(targets) => {
                let mut handled = Vec::with_capacity(targets.len());
                let mut tentative = Vec::with_capacity(targets.len());
                for id in targets.iter() {
                    match self.remove_asset(id) {
                        Some(asset) => {
                            handled.push(id.clone());
                            tentative.push(asset);
                        }
                        None => log::debug!(
                            "Skipping target: {}",
                            BrowserError::StaleTarget(id.clone())
                        ),
                    }
                }

                if handled.is_empty() {
                    self.gate.resolve_without_execution()?;
                    log::info!("Bulk delete confirmed with no live targets");
                    return Ok(None);
                }

                log::info!("Deleting {} assets", handled.len());
                self.gate.begin_execution(
                    handled.clone(),
                    Tentative::Assets(tentative),
                )?;
                Ok(Some(Effect::DeleteAssets { ids: handled }))
            }
            BulkAction::DeleteTag(id) => {
                let removed = self.tags.remove(&id);
                if removed.is_none() {
                    log::debug!("Tag {} already gone; deleting remotely anyway", id);
                }
                log::info!("Deleting tag {}", id);
                self.gate.begin_execution(Vec::new(), Tentative::Tag(removed))?;
                Ok(Some(Effect::DeleteTag { id }))
            }
        }
    }

    /// Settle the executing bulk action with the collaborator's result.
    /// On failure every optimistically removed entity the feed has not since
    /// confirmed deleted is put back.
    pub fn finish_bulk_action(&mut self, result: Result<(), TransportError>) {
        let Some(execution) = self.gate.finish() else {
            log::warn!("Bulk action result arrived with nothing executing");
            return;
        };

        match result {
            Ok(()) => {
                for id in &execution.handled {
                    self.selection.unpick(id);
                }
                self.clear_error_where(|origin| {
                    matches!(
                        origin,
                        ErrorOrigin::DeleteAssets { .. } | ErrorOrigin::DeleteTag
                    )
                });
                log::info!("Bulk {:?} completed", execution.action.kind());
            }
            Err(err) => {
                let origin = match execution.tentative {
                    Tentative::Assets(assets) => {
                        let count = execution.handled.len();
                        for asset in assets {
                            self.collection.upsert(asset);
                        }
                        ErrorOrigin::DeleteAssets { count }
                    }
                    Tentative::Tag(tag) => {
                        if let Some(tag) = tag {
                            self.tags.upsert(tag);
                        }
                        ErrorOrigin::DeleteTag
                    }
                };
                self.set_error(VisibleError::new(origin, &err));
            }
        }
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        let assets = self
            .collection
            .iter()
            .map(|asset| AssetView {
                picked: self.selection.is_picked(&asset.id),
                tags: asset.tags.iter().map(|id| self.tags.resolve(id)).collect(),
                asset: asset.clone(),
            })
            .collect();

        BrowserSnapshot {
            order: self.order,
            assets,
            tags: self.tags.sorted().into_iter().cloned().collect(),
            tags_loading: self.tags.is_loading(),
            tags_loaded: self.tags.is_loaded(),
            picked: self.selection.ordered(&self.collection),
            pending_confirmation: self.gate.descriptor(),
            pagination: PaginationStatus {
                page_count: self.collection.page_count(),
                loading_page: self.collection.loading_page(),
                exhausted: self.collection.is_exhausted(),
            },
            error: self.error.clone(),
            queued_transitions: self.queue.len(),
        }
    }
}
