//! Relation configuration table and the relation manager state machine.
//!
//! A [`RelationConfigTable`] describes, per [`auto_store::RelationType`], how
//! children are listed, created, linked, edited and unlinked for one parent.
//! The [`RelationManager`] drives the modal workflow on top of it.

mod config;
mod manager;
mod state;

pub use config::{
    CreateFn,
    CreateFormDefaults,
    CreateFormDefaultsFn,
    EditFn,
    ExcludeIdsFn,
    FetchForEditFn,
    LinkFn,
    LinkMode,
    ListFn,
    OpFuture,
    ParentAccessor,
    RelationConfig,
    RelationConfigTable,
    RelationOps,
    RelationTitles,
    UnlinkFn,
    create_fn,
    edit_fn,
    fetch_fn,
    link_fn,
    list_fn,
    unlink_fn,
};
pub use manager::{ErrorCallback, RelationManager, SuccessCallback};
pub use state::{
    LinkStep,
    RelationEntity,
    RelationModalState,
    SelectedEntity,
    UnlinkState,
    name_or_fqdn,
};
