//! Tag directory. Tags are loaded in full, never paged.

use std::collections::HashMap;

use assetdesk_model::{Tag, TagId};
use serde::Serialize;

use crate::collection::UpsertOutcome;

/// How an asset's tag reference resolves against the directory. References
/// to tags the directory does not hold are dangling and render as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TagLabel {
    Known { id: TagId, name: String },
    Unknown { id: TagId },
}

impl TagLabel {
    pub fn id(&self) -> &TagId {
        match self {
            TagLabel::Known { id, .. } | TagLabel::Unknown { id } => id,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, TagLabel::Known { .. })
    }
}

#[derive(Debug, Default)]
pub struct TagDirectory {
    tags: HashMap<TagId, Tag>,
    load_generation: u64,
    loading: Option<u64>,
    loaded: bool,
}

impl TagDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: &TagId) -> Option<&Tag> {
        self.tags.get(id)
    }

    pub fn contains(&self, id: &TagId) -> bool {
        self.tags.contains_key(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// A full load has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Start a full load. A newer load supersedes any still in flight.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation = self.load_generation.wrapping_add(1);
        self.loading = Some(self.load_generation);
        self.load_generation
    }

    /// Finish the load identified by `ticket`. Superseded loads are
    /// discarded and leave the directory unchanged.
    pub fn complete_load(&mut self, ticket: u64, tags: Vec<Tag>) -> bool {
        if self.loading != Some(ticket) {
            log::debug!("Discarding superseded tag load {}", ticket);
            return false;
        }
        self.loading = None;
        self.load_all(tags);
        true
    }

    pub fn fail_load(&mut self, ticket: u64) -> bool {
        if self.loading == Some(ticket) {
            self.loading = None;
            true
        } else {
            false
        }
    }

    /// Replace the whole directory.
    pub fn load_all(&mut self, tags: Vec<Tag>) {
        self.tags = tags.into_iter().map(|tag| (tag.id.clone(), tag)).collect();
        self.loaded = true;
    }

    pub fn upsert(&mut self, tag: Tag) -> UpsertOutcome {
        match self.tags.get_mut(&tag.id) {
            Some(current) if tag.is_stale_against(current) => {
                log::debug!("Ignoring stale copy of tag {}", tag.id);
                UpsertOutcome::Stale
            }
            Some(current) => {
                *current = tag;
                UpsertOutcome::Replaced
            }
            None => {
                self.tags.insert(tag.id.clone(), tag);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Remove a tag. Assets that reference it are left alone; their
    /// reference becomes dangling.
    pub fn remove(&mut self, id: &TagId) -> Option<Tag> {
        self.tags.remove(id)
    }

    pub fn resolve(&self, id: &TagId) -> TagLabel {
        match self.tags.get(id) {
            Some(tag) => TagLabel::Known {
                id: id.clone(),
                name: tag.name.clone(),
            },
            None => TagLabel::Unknown { id: id.clone() },
        }
    }

    /// Tags ordered by case-insensitive name, ties broken by id.
    pub fn sorted(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by(|a, b| {
            a.sort_key()
                .cmp(&b.sort_key())
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_model::Revision;
    use chrono::{TimeZone, Utc};

    fn tag(id: &str, name: &str, minute: u32) -> Tag {
        Tag {
            id: TagId::new(id),
            name: name.into(),
            usage_hint: None,
            revision: Revision::new(
                format!("t{minute}"),
                Utc.with_ymd_and_hms(2026, 5, 1, 9, minute, 0).unwrap(),
            ),
        }
    }

    #[test]
    fn load_all_replaces_everything() {
        let mut directory = TagDirectory::new();
        directory.upsert(tag("old", "Old", 0));
        directory.load_all(vec![tag("b", "beta", 0), tag("a", "Alpha", 0)]);

        let names: Vec<_> =
            directory.sorted().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
        assert!(!directory.contains(&TagId::new("old")));
        assert!(directory.is_loaded());
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut directory = TagDirectory::new();
        let first = directory.begin_load();
        let second = directory.begin_load();

        assert!(!directory.complete_load(first, vec![tag("a", "a", 0)]));
        assert!(directory.is_empty());
        assert!(directory.complete_load(second, vec![tag("b", "b", 0)]));
        assert!(!directory.is_loading());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn removed_tag_resolves_as_unknown() {
        let mut directory = TagDirectory::new();
        directory.upsert(tag("t1", "Cats", 0));
        assert!(directory.resolve(&TagId::new("t1")).is_known());

        directory.remove(&TagId::new("t1"));
        assert_eq!(
            directory.resolve(&TagId::new("t1")),
            TagLabel::Unknown {
                id: TagId::new("t1")
            }
        );
    }

    #[test]
    fn stale_tag_update_is_ignored() {
        let mut directory = TagDirectory::new();
        directory.upsert(tag("t1", "New name", 20));
        assert_eq!(
            directory.upsert(tag("t1", "Old name", 5)),
            UpsertOutcome::Stale
        );
        assert_eq!(
            directory.get(&TagId::new("t1")).map(|t| t.name.as_str()),
            Some("New name")
        );
    }
}
