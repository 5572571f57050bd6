//! Live-collection reconciliation engine for the assetdesk browser.
//!
//! Keeps a paginated view of assets and the full tag list correct while
//! pages load asynchronously, a change feed pushes creates, updates and
//! deletes out of band, and the user picks assets and runs guarded bulk
//! actions on them.
//!
//! [`BrowserState`] owns every component and is driven by [`update`].
//! [`Browser`] runs it as a single tokio actor; [`InlineDriver`] runs it
//! step by step without spawning.
#![allow(missing_docs)]

pub mod applier;
pub mod collection;
pub mod confirmation;
pub mod driver;
pub mod effects;
pub mod error;
pub mod memory;
pub mod messages;
pub mod normalize;
pub mod runtime;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod tags;
pub mod transition;
pub mod update;

pub use applier::{ApplyOutcome, MutationQueue};
pub use collection::{CollectionStore, Page, PageAppend, PageTicket, UpsertOutcome};
pub use confirmation::{
    BulkAction, BulkActionKind, ConfirmationDescriptor, ConfirmationGate,
    FrozenTargets, GateState,
};
pub use driver::InlineDriver;
pub use effects::Collaborators;
pub use error::{
    BrowserError, ErrorOrigin, GateError, Result, StoreError, VisibleError,
};
pub use memory::MemoryBackend;
pub use messages::{Effect, Message};
pub use normalize::{normalize_event, parse_asset_document, parse_tag_document};
pub use runtime::Browser;
pub use selection::SelectionSet;
pub use snapshot::{AssetView, BrowserSnapshot, PaginationStatus};
pub use state::BrowserState;
pub use tags::{TagDirectory, TagLabel};
pub use transition::{Entity, EntityRef, Transition};
pub use update::{UpdateResult, update};
