#![allow(dead_code)]

use assetdesk_config::BrowserConfig;
use assetdesk_contracts::{DocumentBody, FeedEvent, TransportError};
use assetdesk_core::{
    BrowserState, Effect, Message, PageTicket, UpdateResult, update,
};
use assetdesk_model::EntityKind;
use serde_json::json;

pub fn config(page_size: usize) -> BrowserConfig {
    BrowserConfig {
        page_size,
        ..BrowserConfig::default()
    }
}

/// Image document updated `minute` minutes past noon.
pub fn image(id: &str, minute: u32) -> DocumentBody {
    image_tagged(id, minute, &[])
}

pub fn image_tagged(id: &str, minute: u32, tags: &[&str]) -> DocumentBody {
    let refs: Vec<_> = tags
        .iter()
        .map(|tag| json!({ "_ref": tag, "_type": "reference" }))
        .collect();
    json!({
        "_id": id,
        "_type": "sanity.imageAsset",
        "_rev": format!("{id}-{minute}"),
        "_updatedAt": format!("2026-06-01T12:{minute:02}:00Z"),
        "originalFilename": format!("{id}.png"),
        "mimeType": "image/png",
        "size": 1000 + minute,
        "metadata": { "dimensions": { "width": 800, "height": 600 } },
        "opt": { "media": { "tags": refs } },
    })
}

pub fn tag(id: &str, name: &str) -> DocumentBody {
    json!({
        "_id": id,
        "_type": "media.tag",
        "_rev": format!("{id}-rev"),
        "_updatedAt": "2026-06-01T12:00:00Z",
        "name": { "current": name },
    })
}

pub fn asset_update(doc: DocumentBody) -> Message {
    let id = doc["_id"].as_str().unwrap_or_default().to_owned();
    Message::Feed {
        kind: EntityKind::Asset,
        event: FeedEvent::new(id, Some(doc), "update"),
    }
}

pub fn asset_disappear(id: &str) -> Message {
    Message::Feed {
        kind: EntityKind::Asset,
        event: FeedEvent::new(id, None, "disappear"),
    }
}

pub fn tag_event(id: &str, body: Option<DocumentBody>, label: &str) -> Message {
    Message::Feed {
        kind: EntityKind::Tag,
        event: FeedEvent::new(id, body, label),
    }
}

/// Dispatch and apply everything queued, like one actor turn.
pub fn step(state: &mut BrowserState, message: Message) -> UpdateResult {
    let result = update(state, message);
    state.flush_all();
    result
}

pub fn begin_page(state: &mut BrowserState, index: usize) -> PageTicket {
    let result = step(state, Message::LoadPage(index));
    match result.effects.as_slice() {
        [Effect::FetchPage { ticket, .. }] => *ticket,
        other => panic!("expected a page fetch, got {other:?}"),
    }
}

pub fn complete_page(
    state: &mut BrowserState,
    ticket: PageTicket,
    documents: Vec<DocumentBody>,
) -> UpdateResult {
    step(
        state,
        Message::PageLoaded {
            ticket,
            result: Ok(documents),
        },
    )
}

pub fn load_page(
    state: &mut BrowserState,
    index: usize,
    documents: Vec<DocumentBody>,
) {
    let ticket = begin_page(state, index);
    let result = complete_page(state, ticket, documents);
    assert!(!result.is_rejected(), "page {index} rejected: {result:?}");
}

pub fn load_tags(state: &mut BrowserState, documents: Vec<DocumentBody>) {
    let result = step(state, Message::RefetchTags);
    let ticket = match result.effects.as_slice() {
        [Effect::FetchTags { ticket }] => *ticket,
        other => panic!("expected a tag fetch, got {other:?}"),
    };
    step(
        state,
        Message::TagsLoaded {
            ticket,
            result: Ok(documents),
        },
    );
}

pub fn unavailable() -> TransportError {
    TransportError::Unavailable("backend offline".into())
}

pub fn view(state: &BrowserState) -> Vec<String> {
    state
        .collection()
        .view_ids()
        .map(|id| id.to_string())
        .collect()
}
