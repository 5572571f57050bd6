use chrono::{DateTime, Utc};
use std::fmt::{self, Display, Formatter};

use crate::ids::{AssetId, TagId};

/// Binary family of an asset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AssetKind {
    Image,
    File,
}

impl AssetKind {
    pub const IMAGE_DOCUMENT_TYPE: &'static str = "sanity.imageAsset";
    pub const FILE_DOCUMENT_TYPE: &'static str = "sanity.fileAsset";

    pub fn from_document_type(document_type: &str) -> Option<Self> {
        match document_type {
            Self::IMAGE_DOCUMENT_TYPE => Some(AssetKind::Image),
            Self::FILE_DOCUMENT_TYPE => Some(AssetKind::File),
            _ => None,
        }
    }

    pub fn document_type(&self) -> &'static str {
        match self {
            AssetKind::Image => Self::IMAGE_DOCUMENT_TYPE,
            AssetKind::File => Self::FILE_DOCUMENT_TYPE,
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Revision marker of a document. `updated_at` orders revisions, `rev` is the
/// opaque backend token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Revision {
    pub rev: String,
    pub updated_at: DateTime<Utc>,
}

impl Revision {
    pub fn new(rev: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            rev: rev.into(),
            updated_at,
        }
    }

    /// True when `self` was written strictly before `other`.
    pub fn is_older_than(&self, other: &Revision) -> bool {
        self.updated_at < other.updated_at
    }
}

/// An image or file asset as the browser sees it. Binary metadata is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub revision: Revision,
    pub original_filename: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub dimensions: Option<Dimensions>,
    /// Ordered, duplicate free.
    pub tags: Vec<TagId>,
}

impl Asset {
    pub fn has_tag(&self, tag: &TagId) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// An incoming copy is stale when it predates the copy already held.
    pub fn is_stale_against(&self, current: &Asset) -> bool {
        self.revision.is_older_than(&current.revision)
    }
}
