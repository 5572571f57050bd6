use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::browser::BrowserConfig;

/// Upper bound on the page size accepted by the query backend.
pub const MAX_PAGE_SIZE: usize = 1_000;

/// Page sizes below this make scrolling a long chain of round trips.
const SMALL_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("page_size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidPageSize(usize),
    #[error("apply_batch_limit must be at least 1")]
    ZeroApplyBatchLimit,
    #[error("tombstone_capacity must be at least 1")]
    ZeroTombstoneCapacity,
}

/// A setting that works but is likely to make the browser behave worse than
/// intended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    SmallPages { page_size: usize },
    DraftsVisible,
    /// A page worth of feed traffic takes several publishes to apply.
    BatchBelowPageSize {
        apply_batch_limit: usize,
        page_size: usize,
    },
    /// Deletions during a single page fetch can outnumber the remembered
    /// tombstones.
    TombstonesBelowPageSize {
        tombstone_capacity: usize,
        page_size: usize,
    },
}

impl ConfigWarning {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConfigWarning::SmallPages { .. } => {
                Some("small pages mean many sequential fetches while scrolling")
            }
            ConfigWarning::DraftsVisible => None,
            ConfigWarning::BatchBelowPageSize { .. } => {
                Some("raise apply_batch_limit to at least page_size")
            }
            ConfigWarning::TombstonesBelowPageSize { .. } => Some(
                "deleted assets may reappear when a page fetched before the delete lands",
            ),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::SmallPages { page_size } => {
                write!(f, "page_size {page_size} is very small")
            }
            ConfigWarning::DraftsVisible => write!(
                f,
                "include_drafts is enabled; draft documents will show up in the browser"
            ),
            ConfigWarning::BatchBelowPageSize {
                apply_batch_limit,
                page_size,
            } => write!(
                f,
                "apply_batch_limit {apply_batch_limit} is below page_size {page_size}"
            ),
            ConfigWarning::TombstonesBelowPageSize {
                tombstone_capacity,
                page_size,
            } => write!(
                f,
                "tombstone_capacity {tombstone_capacity} is below page_size {page_size}"
            ),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigWarnings(Vec<ConfigWarning>);

impl ConfigWarnings {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> + '_ {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, warning: &ConfigWarning) -> bool {
        self.0.contains(warning)
    }
}

/// Reject settings the core cannot run with and collect the ones worth a
/// second look.
pub fn apply_guard_rails(
    config: &BrowserConfig,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let BrowserConfig {
        page_size,
        apply_batch_limit,
        tombstone_capacity,
        include_drafts,
        ..
    } = *config;

    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigGuardRailError::InvalidPageSize(page_size));
    }
    if apply_batch_limit == 0 {
        return Err(ConfigGuardRailError::ZeroApplyBatchLimit);
    }
    if tombstone_capacity == 0 {
        return Err(ConfigGuardRailError::ZeroTombstoneCapacity);
    }

    let mut warnings = Vec::new();
    if page_size < SMALL_PAGE_SIZE {
        warnings.push(ConfigWarning::SmallPages { page_size });
    }
    if include_drafts {
        warnings.push(ConfigWarning::DraftsVisible);
    }
    if apply_batch_limit < page_size {
        warnings.push(ConfigWarning::BatchBelowPageSize {
            apply_batch_limit,
            page_size,
        });
    }
    if tombstone_capacity < page_size {
        warnings.push(ConfigWarning::TombstonesBelowPageSize {
            tombstone_capacity,
            page_size,
        });
    }
    if !warnings.is_empty() {
        log::debug!("browser config produced {} warning(s)", warnings.len());
    }

    Ok(ConfigWarnings(warnings))
}
