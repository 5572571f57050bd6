//! Core data model definitions shared across assetdesk crates.
#![allow(missing_docs)]

pub mod asset;
#[cfg(feature = "serde")]
pub mod document;
pub mod entity;
pub mod error;
pub mod ids;
pub mod order;
pub mod tag;

pub use asset::{Asset, AssetKind, Dimensions, Revision};
#[cfg(feature = "serde")]
pub use document::{AssetDocument, TagDocument};
pub use entity::EntityKind;
pub use error::{ParseError, Result as ModelResult};
pub use ids::{AssetId, DRAFTS_PREFIX, TagId};
pub use order::{AssetOrder, SortDirection};
pub use tag::Tag;
