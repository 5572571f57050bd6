//! In-memory backend implementing every collaborator surface.
//!
//! Holds asset and tag documents, answers page and tag queries, and pushes
//! feed events to subscribers when documents change. Failures and latency
//! can be scripted, and pages can be pinned to fixed contents to reproduce
//! overlapping fetches.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use assetdesk_contracts::{
    AssetQuery, BulkMutations, ChangeFeed, DocumentBody, FeedEvent, FeedFilter,
    FeedSink, PageRequest, SubscriptionHandle, TransportError,
};
use assetdesk_model::{AssetId, AssetOrder, EntityKind, SortDirection, TagId};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Inner {
    assets: Vec<DocumentBody>,
    tags: Vec<DocumentBody>,
    pinned_pages: HashMap<usize, Vec<DocumentBody>>,
    subscribers: HashMap<SubscriptionHandle, (FeedFilter, FeedSink)>,
    page_failures: VecDeque<TransportError>,
    tag_failures: VecDeque<TransportError>,
    mutation_failures: VecDeque<TransportError>,
    subscribe_failures: VecDeque<TransportError>,
    latency: Option<Duration>,
    page_requests: Vec<PageRequest>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(
        assets: Vec<DocumentBody>,
        tags: Vec<DocumentBody>,
    ) -> Self {
        let backend = Self::new();
        {
            let mut inner = backend.inner.lock();
            inner.assets = assets;
            inner.tags = tags;
        }
        backend
    }

    /// Serve `documents` for page `index` regardless of the stored assets.
    pub fn pin_page(&self, index: usize, documents: Vec<DocumentBody>) {
        self.inner.lock().pinned_pages.insert(index, documents);
    }

    pub fn fail_next_page(&self, error: TransportError) {
        self.inner.lock().page_failures.push_back(error);
    }

    pub fn fail_next_tags(&self, error: TransportError) {
        self.inner.lock().tag_failures.push_back(error);
    }

    pub fn fail_next_mutation(&self, error: TransportError) {
        self.inner.lock().mutation_failures.push_back(error);
    }

    pub fn fail_next_subscribe(&self, error: TransportError) {
        self.inner.lock().subscribe_failures.push_back(error);
    }

    /// Delay every query by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().latency = Some(latency);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Every page request received so far.
    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.inner.lock().page_requests.clone()
    }

    pub fn asset_count(&self) -> usize {
        self.inner.lock().assets.len()
    }

    /// Drop every subscriber sink without notice, as a lost connection would.
    pub fn disconnect(&self) {
        self.inner.lock().subscribers.clear();
    }

    /// Store or replace an asset document and announce it as an update.
    pub fn put_asset(&self, document: DocumentBody) {
        let mut inner = self.inner.lock();
        let Some(id) = document_id(&document) else {
            log::warn!("Ignoring asset document without _id");
            return;
        };
        upsert_document(&mut inner.assets, &id, document.clone());
        broadcast(
            &mut inner,
            EntityKind::Asset,
            FeedEvent::new(id, Some(document), "update"),
        );
    }

    pub fn remove_asset(&self, id: &str) {
        let mut inner = self.inner.lock();
        inner.assets.retain(|doc| document_id(doc).as_deref() != Some(id));
        broadcast(
            &mut inner,
            EntityKind::Asset,
            FeedEvent::new(id, None, "disappear"),
        );
    }

    /// Store a tag document; new tags are announced with `appear`.
    pub fn put_tag(&self, document: DocumentBody) {
        let mut inner = self.inner.lock();
        let Some(id) = document_id(&document) else {
            log::warn!("Ignoring tag document without _id");
            return;
        };
        let label = if upsert_document(&mut inner.tags, &id, document.clone()) {
            "update"
        } else {
            "appear"
        };
        broadcast(
            &mut inner,
            EntityKind::Tag,
            FeedEvent::new(id, Some(document), label),
        );
    }

    pub fn remove_tag(&self, id: &str) {
        let mut inner = self.inner.lock();
        inner.tags.retain(|doc| document_id(doc).as_deref() != Some(id));
        broadcast(
            &mut inner,
            EntityKind::Tag,
            FeedEvent::new(id, None, "disappear"),
        );
    }

    /// Push a raw event to every matching subscriber of `kind`.
    pub fn emit(&self, kind: EntityKind, event: FeedEvent) {
        broadcast(&mut self.inner.lock(), kind, event);
    }

    fn latency(&self) -> Option<Duration> {
        self.inner.lock().latency
    }
}

#[async_trait]
impl AssetQuery for MemoryBackend {
    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> Result<Vec<DocumentBody>, TransportError> {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.inner.lock();
        inner.page_requests.push(request);
        if let Some(error) = inner.page_failures.pop_front() {
            return Err(error);
        }
        if let Some(pinned) = inner.pinned_pages.get(&request.index) {
            return Ok(pinned.clone());
        }

        let mut sorted = inner.assets.clone();
        sorted.sort_by(|a, b| compare_documents(a, b, request.order));
        Ok(sorted
            .into_iter()
            .skip(request.start())
            .take(request.size)
            .collect())
    }

    async fn fetch_all_tags(&self) -> Result<Vec<DocumentBody>, TransportError> {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.inner.lock();
        if let Some(error) = inner.tag_failures.pop_front() {
            return Err(error);
        }
        Ok(inner.tags.clone())
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(
        &self,
        filter: FeedFilter,
        sink: FeedSink,
    ) -> Result<SubscriptionHandle, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.subscribe_failures.pop_front() {
            return Err(error);
        }
        let handle = SubscriptionHandle::new();
        inner.subscribers.insert(handle, (filter, sink));
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner.lock().subscribers.remove(&handle);
    }
}

#[async_trait]
impl BulkMutations for MemoryBackend {
    async fn delete_assets(&self, ids: &[AssetId]) -> Result<(), TransportError> {
        let failure = self.inner.lock().mutation_failures.pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        for id in ids {
            self.remove_asset(id.as_str());
        }
        Ok(())
    }

    async fn delete_tag(&self, id: &TagId) -> Result<(), TransportError> {
        let failure = self.inner.lock().mutation_failures.pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        self.remove_tag(id.as_str());
        Ok(())
    }
}

fn document_id(document: &DocumentBody) -> Option<String> {
    document.get("_id")?.as_str().map(str::to_owned)
}

/// Returns true when a document with `id` was replaced.
fn upsert_document(
    documents: &mut Vec<DocumentBody>,
    id: &str,
    document: DocumentBody,
) -> bool {
    match documents
        .iter_mut()
        .find(|doc| document_id(doc).as_deref() == Some(id))
    {
        Some(existing) => {
            *existing = document;
            true
        }
        None => {
            documents.push(document);
            false
        }
    }
}

fn broadcast(inner: &mut Inner, kind: EntityKind, event: FeedEvent) {
    // Sinks whose receiver is gone are pruned.
    inner.subscribers.retain(|handle, (filter, sink)| {
        if filter.kind != kind || !filter.matches(&event) {
            return true;
        }
        let delivered = sink.send(event.clone()).is_ok();
        if !delivered {
            log::debug!("Dropping closed subscription {}", handle);
        }
        delivered
    });
}

/// Order documents by the field behind `order`. Missing values sort last in
/// either direction; ties fall back to `_id`.
fn compare_documents(
    a: &DocumentBody,
    b: &DocumentBody,
    order: AssetOrder,
) -> Ordering {
    let field = order.field();
    let by_field = match (a.get(field), b.get(field)) {
        (Some(left), Some(right)) if !left.is_null() && !right.is_null() => {
            let ordering = compare_values(left, right);
            match order.direction() {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
        (Some(left), _) if !left.is_null() => Ordering::Less,
        (_, Some(right)) if !right.is_null() => Ordering::Greater,
        _ => Ordering::Equal,
    };
    by_field.then_with(|| {
        let left = a.get("_id").and_then(|id| id.as_str()).unwrap_or_default();
        let right = b.get("_id").and_then(|id| id.as_str()).unwrap_or_default();
        left.cmp(right)
    })
}

fn compare_values(left: &DocumentBody, right: &DocumentBody) -> Ordering {
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => {
            let l = left.as_str().unwrap_or_default();
            let r = right.as_str().unwrap_or_default();
            l.to_lowercase().cmp(&r.to_lowercase())
        }
    }
}
