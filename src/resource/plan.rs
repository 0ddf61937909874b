//! Classify a declared change the way the host will apply it

use serde::Serialize;
use serde_json::Value;

use super::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedChange {
    /// No prior record: the resource will be created
    Create,
    /// Nothing the practitioner controls changed
    NoOp,
    /// Only in-place attributes changed
    Update { changed: Vec<String> },
    /// An immutable attribute changed; destroy then create
    Replace { attributes: Vec<String> },
}

impl PlannedChange {
    pub fn requires_replace(&self) -> bool {
        matches!(self, PlannedChange::Replace { .. })
    }
}

/// Compare configurable attributes of two serialized records
///
/// `prior` of `None` plans a create. Computed-only attributes never drive a
/// change.
pub fn plan_change(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlannedChange {
    let Some(prior) = prior else {
        return PlannedChange::Create;
    };

    let mut changed = Vec::new();
    let mut replace = Vec::new();
    for attr in schema.attributes().filter(|a| a.is_configurable()) {
        let before = prior.get(attr.name).unwrap_or(&Value::Null);
        let after = proposed.get(attr.name).unwrap_or(&Value::Null);
        if before == after {
            continue;
        }
        if attr.requires_replace() {
            replace.push(attr.name.to_string());
        } else {
            changed.push(attr.name.to_string());
        }
    }

    if !replace.is_empty() {
        PlannedChange::Replace {
            attributes: replace,
        }
    } else if !changed.is_empty() {
        PlannedChange::Update { changed }
    } else {
        PlannedChange::NoOp
    }
}
