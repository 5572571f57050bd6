//! Turns raw feed events and fetched document bodies into typed values.
//!
//! Every record is parsed on its own. A failure is returned for that record
//! only; callers log it and move on.

use assetdesk_contracts::{DocumentBody, FeedEvent, FeedLabel};
use assetdesk_model::{
    Asset, AssetDocument, AssetId, EntityKind, ParseError, Tag, TagDocument,
    TagId,
};

use crate::transition::{Entity, EntityRef, Transition};

/// Map one feed event onto a transition.
///
/// `appear` only yields a transition for tags. New assets reach the view
/// through pagination, so an asset `appear` is dropped here. Labels the
/// browser does not track are dropped as well.
pub fn normalize_event(
    kind: EntityKind,
    event: FeedEvent,
) -> Result<Option<Transition>, ParseError> {
    let FeedEvent {
        document_id,
        result,
        transition,
    } = event;

    match FeedLabel::parse(&transition) {
        FeedLabel::Appear => match kind {
            EntityKind::Tag => {
                let tag = parse_tag_event(&document_id, result)?;
                Ok(Some(Transition::Created(Entity::Tag(tag))))
            }
            EntityKind::Asset => {
                log::debug!(
                    "Ignoring appear for asset {}; assets arrive through pagination",
                    document_id
                );
                Ok(None)
            }
        },
        FeedLabel::Update => {
            let entity = match kind {
                EntityKind::Asset => {
                    Entity::Asset(parse_asset_event(&document_id, result)?)
                }
                EntityKind::Tag => {
                    Entity::Tag(parse_tag_event(&document_id, result)?)
                }
            };
            Ok(Some(Transition::Updated(entity)))
        }
        FeedLabel::Disappear => {
            let reference = match kind {
                EntityKind::Asset => EntityRef::Asset(AssetId(document_id)),
                EntityKind::Tag => EntityRef::Tag(TagId(document_id)),
            };
            Ok(Some(Transition::Deleted(reference)))
        }
        FeedLabel::Other(label) => {
            log::trace!("Dropping {} event '{}' for {}", kind, label, document_id);
            Ok(None)
        }
    }
}

fn parse_asset_event(
    document_id: &str,
    body: Option<DocumentBody>,
) -> Result<Asset, ParseError> {
    let body = require_body(document_id, body)?;
    let asset = parse_asset_document(body)?;
    check_identity(document_id, asset.id.as_str())?;
    Ok(asset)
}

fn parse_tag_event(
    document_id: &str,
    body: Option<DocumentBody>,
) -> Result<Tag, ParseError> {
    let body = require_body(document_id, body)?;
    let tag = parse_tag_document(body)?;
    check_identity(document_id, tag.id.as_str())?;
    Ok(tag)
}

/// Parse an asset document body, as returned by a page fetch or carried by a
/// feed event.
pub fn parse_asset_document(body: DocumentBody) -> Result<Asset, ParseError> {
    let document_id = body_id(&body);
    let document: AssetDocument = serde_json::from_value(body)
        .map_err(|err| ParseError::malformed(document_id, err))?;
    Asset::try_from(document)
}

/// Parse a tag document body.
pub fn parse_tag_document(body: DocumentBody) -> Result<Tag, ParseError> {
    let document_id = body_id(&body);
    let document: TagDocument = serde_json::from_value(body)
        .map_err(|err| ParseError::malformed(document_id, err))?;
    Tag::try_from(document)
}

fn require_body(
    document_id: &str,
    body: Option<DocumentBody>,
) -> Result<DocumentBody, ParseError> {
    match body {
        Some(body) if !body.is_null() => Ok(body),
        _ => Err(ParseError::MissingBody {
            document_id: document_id.to_owned(),
        }),
    }
}

fn check_identity(expected: &str, found: &str) -> Result<(), ParseError> {
    if expected == found {
        Ok(())
    } else {
        Err(ParseError::IdentityMismatch {
            expected: expected.to_owned(),
            found: found.to_owned(),
        })
    }
}

fn body_id(body: &DocumentBody) -> String {
    body.get("_id")
        .and_then(|id| id.as_str())
        .unwrap_or("<unknown>")
        .to_owned()
}
