use std::fmt::{self, Display, Formatter};

use crate::asset::AssetKind;
use crate::tag::TAG_DOCUMENT_TYPE;

/// The two document families the browser tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EntityKind {
    Asset,
    Tag,
}

impl EntityKind {
    /// Document `_type` values that belong to this kind.
    pub fn document_types(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Asset => &[
                AssetKind::IMAGE_DOCUMENT_TYPE,
                AssetKind::FILE_DOCUMENT_TYPE,
            ],
            EntityKind::Tag => &[TAG_DOCUMENT_TYPE],
        }
    }

    pub fn matches_document_type(&self, document_type: &str) -> bool {
        self.document_types().contains(&document_type)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Asset => write!(f, "asset"),
            EntityKind::Tag => write!(f, "tag"),
        }
    }
}
