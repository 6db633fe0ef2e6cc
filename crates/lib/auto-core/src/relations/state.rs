use auto_store::RelationType;
use serde_json::Value;

/// Step of the link flow: pick an entity, create one, then fill link metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStep {
    #[default]
    Select,
    Create,
    Form,
}

/// Entity chosen mid-flow, identified by id and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntity {
    pub id: String,
    pub name: String,
}

impl SelectedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A linked relation as shown on the parent, or the full entity loaded for
/// editing. `data` holds the raw record.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationEntity {
    pub id: String,
    pub name: String,
    pub data: Value,
}

impl RelationEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: Value::Null,
        }
    }

    /// Wraps a raw record; `None` when it has no string `id`.
    pub fn from_value(data: Value, display_name: fn(&Value) -> String) -> Option<Self> {
        let id = data.get("id")?.as_str()?.to_string();
        let name = display_name(&data);
        Some(Self { id, name, data })
    }
}

/// Modal state for one relation type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationModalState {
    pub is_link_open: bool,
    pub is_edit_open: bool,
    pub editing: Option<RelationEntity>,
    pub link_step: LinkStep,
    pub selected_entity: Option<SelectedEntity>,
    pub initial_name: String,
}

/// The single unlink confirmation shared by every relation type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlinkState {
    pub kind: Option<RelationType>,
    pub entity_id: String,
    pub entity_name: String,
    pub is_open: bool,
}

/// Reads `name`, falling back to `fqdn` for domain records.
#[must_use]
pub fn name_or_fqdn(value: &Value) -> String {
    ["name", "fqdn"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
