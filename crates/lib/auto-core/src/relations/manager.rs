use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use auto_store::RelationType;
use serde_json::{Value, json};
use tracing::debug;

use super::config::{RelationConfig, RelationConfigTable};
use super::state::{LinkStep, RelationEntity, RelationModalState, SelectedEntity, UnlinkState};
use crate::api::ApiError;

pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Default)]
struct ManagerState {
    modals: BTreeMap<RelationType, RelationModalState>,
    unlink: UnlinkState,
    in_flight: BTreeSet<RelationType>,
    unlink_in_flight: bool,
}

/// Drives the link/create/edit/unlink workflow for every configured
/// relation type of one parent entity.
///
/// Upstream failures never escape: they are reported through the error
/// callback and the affected modal stays open. While an operation is pending
/// for a relation type, further operations on that type are ignored.
pub struct RelationManager {
    table: RelationConfigTable,
    state: Mutex<ManagerState>,
    on_success: SuccessCallback,
    on_error: ErrorCallback,
}

/// Clears the in-flight marker for one relation type when dropped.
struct InFlight<'a> {
    manager: &'a RelationManager,
    kind: Option<RelationType>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.manager.lock();
        match self.kind {
            Some(kind) => {
                state.in_flight.remove(&kind);
            }
            None => state.unlink_in_flight = false,
        }
    }
}

impl RelationManager {
    pub fn new(
        table: RelationConfigTable,
        on_success: impl Fn() + Send + Sync + 'static,
        on_error: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        let modals = table
            .kinds()
            .map(|kind| (kind, RelationModalState::default()))
            .collect();
        Self {
            table,
            state: Mutex::new(ManagerState {
                modals,
                ..ManagerState::default()
            }),
            on_success: Arc::new(on_success),
            on_error: Arc::new(on_error),
        }
    }

    #[must_use]
    pub const fn table(&self) -> &RelationConfigTable {
        &self.table
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, kind: RelationType, apply: impl FnOnce(&mut RelationModalState)) {
        if let Some(modal) = self.lock().modals.get_mut(&kind) {
            apply(modal);
        }
    }

    fn begin(&self, kind: RelationType, operation: &str) -> Option<InFlight<'_>> {
        let mut state = self.lock();
        if state.in_flight.insert(kind) {
            Some(InFlight {
                manager: self,
                kind: Some(kind),
            })
        } else {
            debug!(relation = %kind, operation, "ignored while another operation is pending");
            None
        }
    }

    fn succeed(&self) {
        (self.on_success)();
    }

    fn fail(&self, err: &ApiError, fallback: String) {
        let message = match err {
            ApiError::Unexpected(_) => fallback,
            _ => err.to_string(),
        };
        (self.on_error)(message);
    }

    /// Snapshot of the modal state for `kind`, if configured.
    #[must_use]
    pub fn modal_state(&self, kind: RelationType) -> Option<RelationModalState> {
        self.lock().modals.get(&kind).cloned()
    }

    #[must_use]
    pub fn unlink_state(&self) -> UnlinkState {
        self.lock().unlink.clone()
    }

    /// True while any operation is awaiting the backend.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        let state = self.lock();
        !state.in_flight.is_empty() || state.unlink_in_flight
    }

    /// Text for the unlink confirmation dialog.
    #[must_use]
    pub fn unlink_message(&self) -> String {
        let unlink = self.unlink_state();
        if unlink.kind == Some(RelationType::Health) {
            format!(
                "Are you sure you want to remove healthcheck '{}'?",
                unlink.entity_name
            )
        } else {
            format!(
                "Are you sure you want to unlink '{}' from this application?",
                unlink.entity_name
            )
        }
    }

    pub fn open_link(&self, kind: RelationType) {
        self.update(kind, |modal| {
            modal.link_step = LinkStep::Select;
            modal.selected_entity = None;
            modal.initial_name.clear();
            modal.is_link_open = true;
        });
    }

    pub fn close_link(&self, kind: RelationType) {
        self.update(kind, |modal| modal.is_link_open = false);
    }

    pub fn set_link_step(&self, kind: RelationType, step: LinkStep) {
        self.update(kind, |modal| modal.link_step = step);
    }

    /// Remembers the search term and moves to the create step.
    pub fn request_create(&self, kind: RelationType, search_term: &str) {
        self.update(kind, |modal| {
            modal.initial_name = search_term.to_string();
            modal.link_step = LinkStep::Create;
        });
    }

    /// Advances to the link form, or links right away when the relation type
    /// has no link metadata.
    pub async fn select_entity(&self, kind: RelationType, entity: SelectedEntity) {
        let Some(config) = self.table.get(kind) else {
            return;
        };
        if config.has_link_form() {
            self.update(kind, |modal| {
                modal.selected_entity = Some(entity);
                modal.link_step = LinkStep::Form;
            });
            return;
        }

        let Some(guard) = self.begin(kind, "select") else {
            return;
        };
        let result = config.link(entity.id, json!({})).await;
        drop(guard);
        self.finish_link(&config, result);
    }

    /// Creates a child entity, then continues the flow according to the
    /// relation's link mode.
    pub async fn create(&self, kind: RelationType, payload: Value) {
        let Some(config) = self.table.get(kind) else {
            return;
        };
        let Some(guard) = self.begin(kind, "create") else {
            return;
        };

        let created = match config.create(payload).await {
            Ok(created) => created,
            Err(err) => {
                drop(guard);
                self.fail(&err, format!("Failed to create {}", config.singular_title()));
                return;
            }
        };
        debug!(relation = %kind, id = %created.id, "created related entity");

        if config.create_only() {
            drop(guard);
            self.close_link(kind);
            self.succeed();
        } else if config.has_link_form() {
            let selected = SelectedEntity::new(created.id.clone(), created.display_name());
            self.update(kind, |modal| {
                modal.selected_entity = Some(selected);
                modal.link_step = LinkStep::Form;
            });
        } else {
            let result = config.link(created.id, json!({})).await;
            drop(guard);
            match result {
                Ok(()) => {
                    self.close_link(kind);
                    self.succeed();
                }
                Err(err) => {
                    self.fail(&err, format!("Failed to create {}", config.singular_title()));
                }
            }
        }
    }

    /// Links the selected entity with the submitted metadata. Does nothing
    /// when no entity is selected.
    pub async fn submit_link(&self, kind: RelationType, metadata: Value) {
        let Some(config) = self.table.get(kind) else {
            return;
        };
        let Some(selected) = self
            .modal_state(kind)
            .and_then(|modal| modal.selected_entity)
        else {
            return;
        };
        let Some(guard) = self.begin(kind, "link") else {
            return;
        };
        let result = config.link(selected.id, metadata).await;
        drop(guard);
        self.finish_link(&config, result);
    }

    fn finish_link(&self, config: &RelationConfig, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.close_link(config.kind());
                self.succeed();
            }
            Err(err) => self.fail(&err, format!("Failed to link {}", config.singular_title())),
        }
    }

    /// Opens the edit modal, loading the full entity first when the relation
    /// type needs it. A failed load leaves the modal closed.
    pub async fn open_edit(&self, kind: RelationType, entity: RelationEntity) {
        let Some(config) = self.table.get(kind) else {
            return;
        };
        let entity = if config.has_fetch_for_edit() {
            let Some(guard) = self.begin(kind, "fetch_for_edit") else {
                return;
            };
            let result = config.fetch_for_edit(entity).await;
            drop(guard);
            match result {
                Ok(full) => full,
                Err(err) => {
                    self.fail(&err, format!("Failed to load {kind}"));
                    return;
                }
            }
        } else {
            entity
        };

        self.update(kind, |modal| {
            modal.editing = Some(entity);
            modal.is_edit_open = true;
        });
    }

    pub fn close_edit(&self, kind: RelationType) {
        self.update(kind, |modal| {
            modal.is_edit_open = false;
            modal.editing = None;
        });
    }

    /// Saves edited link metadata for the entity being edited.
    pub async fn submit_edit(&self, kind: RelationType, metadata: Value) {
        let Some(config) = self.table.get(kind) else {
            return;
        };
        let Some(editing) = self.modal_state(kind).and_then(|modal| modal.editing) else {
            return;
        };
        let Some(guard) = self.begin(kind, "edit") else {
            return;
        };
        let result = config.update(editing.id, metadata).await;
        drop(guard);
        match result {
            Ok(()) => {
                self.close_edit(kind);
                self.succeed();
            }
            Err(err) => self.fail(
                &err,
                format!("Failed to update {} link", config.singular_title()),
            ),
        }
    }

    /// Opens the shared unlink confirmation, replacing any pending one.
    pub fn confirm_unlink(&self, kind: RelationType, entity_id: &str, entity_name: &str) {
        self.lock().unlink = UnlinkState {
            kind: Some(kind),
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            is_open: true,
        };
    }

    /// Unlinks the confirmed entity. On failure the dialog stays open so the
    /// operator can retry.
    pub async fn perform_unlink(&self) {
        let (kind, entity_id, guard) = {
            let mut state = self.lock();
            let Some(kind) = state.unlink.kind.filter(|_| state.unlink.is_open) else {
                return;
            };
            if state.unlink_in_flight {
                debug!(relation = %kind, "unlink ignored while another is pending");
                return;
            }
            state.unlink_in_flight = true;
            let guard = InFlight {
                manager: self,
                kind: None,
            };
            (kind, state.unlink.entity_id.clone(), guard)
        };
        let Some(config) = self.table.get(kind) else {
            return;
        };

        let result = config.unlink(entity_id.clone()).await;
        drop(guard);
        match result {
            Ok(()) => {
                {
                    // A confirmation opened meanwhile for another target stays up.
                    let mut state = self.lock();
                    if state.unlink.kind == Some(kind) && state.unlink.entity_id == entity_id {
                        state.unlink.is_open = false;
                    }
                }
                self.succeed();
            }
            Err(err) => self.fail(&err, "Failed to unlink".to_string()),
        }
    }

    pub fn cancel_unlink(&self) {
        self.lock().unlink.is_open = false;
    }
}
