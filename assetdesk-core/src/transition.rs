//! Typed change transitions produced from feed events.

use assetdesk_model::{Asset, AssetId, EntityKind, Tag, TagId};

/// A fully parsed entity carried by a Created or Updated transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Asset(Asset),
    Tag(Tag),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Asset(_) => EntityKind::Asset,
            Entity::Tag(_) => EntityKind::Tag,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Asset(asset) => asset.id.as_str(),
            Entity::Tag(tag) => tag.id.as_str(),
        }
    }
}

/// Identity of a removed entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Asset(AssetId),
    Tag(TagId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Asset(_) => EntityKind::Asset,
            EntityRef::Tag(_) => EntityKind::Tag,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRef::Asset(id) => id.as_str(),
            EntityRef::Tag(id) => id.as_str(),
        }
    }
}

/// One change to apply to the local view. Consumed exactly once by the
/// applier.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Created(Entity),
    Updated(Entity),
    Deleted(EntityRef),
}

impl Transition {
    pub fn kind(&self) -> EntityKind {
        match self {
            Transition::Created(entity) | Transition::Updated(entity) => {
                entity.kind()
            }
            Transition::Deleted(reference) => reference.kind(),
        }
    }

    /// Identity of the document the transition was derived from.
    pub fn source_id(&self) -> &str {
        match self {
            Transition::Created(entity) | Transition::Updated(entity) => {
                entity.id()
            }
            Transition::Deleted(reference) => reference.id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Created(_) => "created",
            Transition::Updated(_) => "updated",
            Transition::Deleted(_) => "deleted",
        }
    }
}
