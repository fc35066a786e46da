//! Sections: a grouping view over the task list.
//!
//! Sections are not a separate server resource. They are task rows whose
//! name ends in a colon, used as headers for the rows that follow. A
//! section query hits the tasks endpoint and folds the flat, ordered result
//! into marker groups, each carrying its trailing tasks as `subtasks`.

use serde_json::{Map, Value};

use crate::entity::{query, Descriptor, Entity, FieldValue, Kind, Query, Resource};
use crate::error::Result;

use super::task::{self, Task};

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "Section",
    endpoint: "tasks",
    fields: task::FIELDS,
    filter_keys: task::FILTER_KEYS,
    // No sub-collections: a section's tasks arrive as its subtasks field.
    children: &[],
    links: true,
};

/// A section marker with the tasks grouped under it.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    entity: Entity,
}

impl Resource for Section {
    const KIND: Kind = Kind::Section;

    fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl Section {
    pub fn name(&self) -> Option<&str> {
        self.entity.get("name").and_then(FieldValue::as_str)
    }

    /// Same marker classification tasks use.
    pub fn is_section_name(name: &str) -> bool {
        task::is_section_name(name)
    }

    /// The tasks grouped under this section, in server order.
    pub fn subtasks(&self) -> Vec<Task> {
        self.entity
            .get("subtasks")
            .and_then(FieldValue::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(FieldValue::as_entity)
                    .cloned()
                    .map(Task::from_entity)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fold a flat, ordered task list into section groups.
///
/// A marker row closes any open group and opens a new one when it passes
/// the client-side filter. Ordinary rows join the open group's `subtasks`
/// unfiltered, and are dropped when no group is open. The final open group
/// is flushed at end of input.
pub(crate) fn build_grouped(query: &Query, rows: Vec<Value>) -> Result<Vec<Entity>> {
    let mut open: Option<Map<String, Value>> = None;
    let mut groups = Vec::new();

    for row in rows {
        let Value::Object(map) = row else {
            continue;
        };

        if task::is_section_row(&map) {
            if let Some(done) = open.take() {
                groups.push(Entity::from_map(Kind::Section, done));
            }
            if query::filter_row(Kind::Section, &map, query)? {
                let mut group = map;
                group.insert("subtasks".to_string(), Value::Array(Vec::new()));
                open = Some(group);
            }
        } else if let Some(group) = open.as_mut() {
            if let Some(Value::Array(subtasks)) = group.get_mut("subtasks") {
                subtasks.push(Value::Object(map));
            }
        }
    }

    if let Some(done) = open {
        groups.push(Entity::from_map(Kind::Section, done));
    }

    Ok(groups)
}
