use assetdesk_contracts::{DocumentBody, FeedEvent, TransportError};
use assetdesk_model::{AssetOrder, EntityKind};

use crate::collection::PageTicket;
use crate::error::{BrowserError, ErrorOrigin, StoreError, VisibleError};
use crate::messages::{Effect, Message};
use crate::normalize::{normalize_event, parse_asset_document, parse_tag_document};
use crate::state::BrowserState;

/// Effects requested by one update, plus the reason the message was refused
/// when it was. A refused message leaves state untouched.
#[derive(Debug, Default, PartialEq)]
pub struct UpdateResult {
    pub effects: Vec<Effect>,
    pub rejection: Option<BrowserError>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            rejection: None,
        }
    }

    pub fn rejected(error: impl Into<BrowserError>) -> Self {
        Self {
            effects: Vec::new(),
            rejection: Some(error.into()),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Handle one message against the browser state.
///
/// Feed deliveries are only queued here; they reach the view when the
/// caller flushes the applier, or at the latest when the next non-feed
/// message arrives. Messages therefore always take effect in arrival order.
pub fn update(state: &mut BrowserState, message: Message) -> UpdateResult {
    if state.is_disposed() {
        log::debug!("Dropping {} after shutdown", message.name());
        return UpdateResult::rejected(BrowserError::Disposed);
    }

    if !message.is_feed_delivery() && state.queued_transitions() > 0 {
        let outcome = state.flush_all();
        log::trace!(
            "Applied {} queued transitions ahead of {}",
            outcome.applied,
            message.name()
        );
    }

    match message {
        Message::LoadPage(index) => handle_load_page(state, index),
        Message::LoadNextPage => {
            let collection = state.collection();
            if collection.is_exhausted() || collection.loading_page().is_some()
            {
                return UpdateResult::none();
            }
            let index = collection.next_page_index();
            handle_load_page(state, index)
        }
        Message::SetOrder(order) => handle_set_order(state, order),
        Message::PageLoaded { ticket, result } => {
            handle_page_loaded(state, ticket, result)
        }

        Message::RefetchTags => {
            let ticket = state.tags.begin_load();
            UpdateResult::effect(Effect::FetchTags { ticket })
        }
        Message::TagsLoaded { ticket, result } => {
            handle_tags_loaded(state, ticket, result)
        }

        Message::Feed { kind, event } => handle_feed_event(state, kind, event),
        Message::Transition(transition) => {
            state.enqueue_transition(transition);
            UpdateResult::none()
        }

        Message::Pick(id) => {
            state.pick(&id);
            UpdateResult::none()
        }
        Message::Unpick(id) => {
            state.unpick(&id);
            UpdateResult::none()
        }
        Message::PickAll => {
            let added = state.pick_all();
            log::debug!("Picked {} more assets", added);
            UpdateResult::none()
        }
        Message::ClearPicked => {
            state.clear_picked();
            UpdateResult::none()
        }

        Message::RequestDeletePicked => match state.request_delete_picked() {
            Ok(true) => UpdateResult::none(),
            Ok(false) => {
                log::debug!("Nothing picked; delete request ignored");
                UpdateResult::none()
            }
            Err(err) => UpdateResult::rejected(err),
        },
        Message::RequestDeleteAssets(ids) => {
            match state.request_delete_assets(ids) {
                Ok(_) => UpdateResult::none(),
                Err(err) => UpdateResult::rejected(err),
            }
        }
        Message::RequestDeleteTag(id) => match state.request_delete_tag(id) {
            Ok(()) => UpdateResult::none(),
            Err(err) => UpdateResult::rejected(err),
        },
        Message::Confirm => match state.confirm() {
            Ok(Some(effect)) => UpdateResult::effect(effect),
            Ok(None) => UpdateResult::none(),
            Err(err) => UpdateResult::rejected(err),
        },
        Message::Cancel => match state.cancel_confirmation() {
            Ok(()) => UpdateResult::none(),
            Err(err) => UpdateResult::rejected(err),
        },
        Message::BulkActionFinished(result) => {
            state.finish_bulk_action(result);
            UpdateResult::none()
        }

        Message::DismissError => {
            state.dismiss_error();
            UpdateResult::none()
        }
    }
}

fn handle_load_page(state: &mut BrowserState, index: usize) -> UpdateResult {
    match state.collection.begin_page(index) {
        Ok(ticket) => {
            log::debug!("Fetching page {} ({})", index, state.order());
            let request = state.page_request(ticket);
            UpdateResult::effect(Effect::FetchPage { ticket, request })
        }
        Err(err) => {
            log::debug!("Page request rejected: {}", err);
            UpdateResult::rejected(err)
        }
    }
}

fn handle_set_order(state: &mut BrowserState, order: AssetOrder) -> UpdateResult {
    if state.order() == order {
        return UpdateResult::none();
    }
    state.reset_view(order);
    handle_load_page(state, 0)
}

fn handle_page_loaded(
    state: &mut BrowserState,
    ticket: PageTicket,
    result: Result<Vec<DocumentBody>, TransportError>,
) -> UpdateResult {
    let origin = ErrorOrigin::PageLoad {
        index: ticket.index,
    };

    let bodies = match result {
        Ok(bodies) => bodies,
        Err(err) => {
            if state.collection.fail_page(ticket) {
                state.set_error(VisibleError::new(origin, &err));
            } else {
                log::debug!(
                    "Ignoring failure of superseded page {}: {}",
                    ticket.index,
                    err
                );
            }
            return UpdateResult::none();
        }
    };

    let fetched = bodies.len();
    let mut assets = Vec::with_capacity(fetched);
    for body in bodies {
        match parse_asset_document(body) {
            Ok(asset) if state.admits(asset.id.as_str()) => assets.push(asset),
            Ok(asset) => {
                log::debug!("Skipping draft {} in page {}", asset.id, ticket.index)
            }
            Err(err) => log::warn!(
                "Dropping malformed record in page {}: {}",
                ticket.index,
                err
            ),
        }
    }

    match state.collection.append_page(ticket, assets, fetched) {
        Ok(append) => {
            state.clear_error_where(|o| matches!(o, ErrorOrigin::PageLoad { .. }));
            log::info!(
                "Page {} appended: {} new, {} duplicate, {} deleted{}",
                append.index,
                append.inserted,
                append.duplicates.len(),
                append.tombstoned.len(),
                if append.exhausted { ", collection exhausted" } else { "" }
            );
            UpdateResult::none()
        }
        Err(StoreError::Superseded { index }) => {
            log::debug!("Discarding page {} from a superseded view", index);
            UpdateResult::none()
        }
        Err(err) => UpdateResult::rejected(err),
    }
}

fn handle_tags_loaded(
    state: &mut BrowserState,
    ticket: u64,
    result: Result<Vec<DocumentBody>, TransportError>,
) -> UpdateResult {
    match result {
        Ok(bodies) => {
            let mut tags = Vec::with_capacity(bodies.len());
            for body in bodies {
                match parse_tag_document(body) {
                    Ok(tag) if state.admits(tag.id.as_str()) => tags.push(tag),
                    Ok(_) => {}
                    Err(err) => log::warn!("Dropping malformed tag: {}", err),
                }
            }
            let count = tags.len();
            if state.tags.complete_load(ticket, tags) {
                state.clear_error_where(|o| matches!(o, ErrorOrigin::TagLoad));
                log::info!("Loaded {} tags", count);
            }
        }
        Err(err) => {
            if state.tags.fail_load(ticket) {
                state.set_error(VisibleError::new(ErrorOrigin::TagLoad, &err));
            }
        }
    }
    UpdateResult::none()
}

fn handle_feed_event(
    state: &mut BrowserState,
    kind: EntityKind,
    event: FeedEvent,
) -> UpdateResult {
    if !state.feed_filter(kind).matches(&event) {
        log::trace!("Filtered {} event for {}", kind, event.document_id);
        return UpdateResult::none();
    }

    match normalize_event(kind, event) {
        Ok(Some(transition)) => state.enqueue_transition(transition),
        Ok(None) => {}
        Err(err) => log::warn!("Dropping {} feed event: {}", kind, err),
    }
    UpdateResult::none()
}
