use crate::asset::Revision;
use crate::ids::TagId;

pub const TAG_DOCUMENT_TYPE: &str = "media.tag";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Number of assets referencing the tag when the backend last counted.
    /// Only a hint: it is not kept in step with local changes.
    pub usage_hint: Option<u64>,
    pub revision: Revision,
}

impl Tag {
    pub fn is_stale_against(&self, current: &Tag) -> bool {
        self.revision.is_older_than(&current.revision)
    }

    /// Key used for the directory listing order.
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}
