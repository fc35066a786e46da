//! Tasks, and the project-link operations that act on them.

use serde_json::{Map, Value};

use crate::client::Api;
use crate::entity::kind::FindMode;
use crate::entity::{query, Descriptor, Entity, FieldValue, Kind, Query, Resource};
use crate::error::{Error, Result};

use super::project::Project;
use super::section::Section;

pub(crate) const FIELDS: &[&str] = &[
    "assignee",
    "created_by",
    "created_at",
    "completed",
    "completed_at",
    "followers",
    "modified_at",
    "name",
    "notes",
    "projects",
    "parent",
    "workspace",
];

pub(crate) const FILTER_KEYS: &[&str] = &[
    "project",
    "assignee",
    "workspace",
    "completed_since",
    "modified_since",
];

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "Task",
    endpoint: "tasks",
    fields: FIELDS,
    filter_keys: FILTER_KEYS,
    children: &[("tags", Kind::Tag)],
    links: true,
};

/// A single task.
///
/// `find` skips section-marker rows (names ending in `:`); use
/// [`Task::find_with_sections`] when the markers themselves matter.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    entity: Entity,
}

impl Resource for Task {
    const KIND: Kind = Kind::Task;

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

/// Reference to a project: either a [`Project`] instance or a raw id.
pub struct ProjectRef(Value);

impl ProjectRef {
    fn into_id(self) -> Result<Value> {
        if self.0.is_null() {
            Err(Error::MissingId)
        } else {
            Ok(self.0)
        }
    }
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        ProjectRef(project.id().cloned().unwrap_or(Value::Null))
    }
}

impl From<i64> for ProjectRef {
    fn from(id: i64) -> Self {
        ProjectRef(Value::from(id))
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        ProjectRef(Value::from(id))
    }
}

impl From<&str> for ProjectRef {
    fn from(id: &str) -> Self {
        ProjectRef(Value::from(id))
    }
}

impl From<String> for ProjectRef {
    fn from(id: String) -> Self {
        ProjectRef(Value::from(id))
    }
}

impl From<Value> for ProjectRef {
    fn from(id: Value) -> Self {
        ProjectRef(id)
    }
}

impl Task {
    /// Find tasks without excluding section-marker rows.
    pub fn find_with_sections(api: &Api, query: Query) -> Result<Vec<Task>> {
        let found = query::run_find_with_mode(
            api,
            Kind::Task,
            DESCRIPTOR.endpoint,
            query,
            FindMode::Plain,
        )?;
        Ok(found.into_iter().map(Task::from_entity).collect())
    }

    pub fn name(&self) -> Option<&str> {
        self.entity.get("name").and_then(FieldValue::as_str)
    }

    pub fn notes(&self) -> Option<&str> {
        self.entity.get("notes").and_then(FieldValue::as_str)
    }

    pub fn completed(&self) -> Option<bool> {
        self.entity
            .get("completed")
            .and_then(FieldValue::as_scalar)
            .and_then(Value::as_bool)
    }

    /// Whether this task is really a section marker.
    pub fn is_section(&self) -> bool {
        self.name().map(is_section_name).unwrap_or(false)
    }

    /// Same classification, applicable to any candidate name.
    pub fn is_section_name(name: &str) -> bool {
        is_section_name(name)
    }

    /// Tags on this task, fetched once and cached on the instance.
    pub fn tags(&mut self, api: &Api) -> Result<Vec<super::Tag>> {
        let related = self.entity.relation(api, "tags")?;
        Ok(related.into_iter().map(super::Tag::from_entity).collect())
    }

    /// Add this task to a project.
    pub fn add_project(&self, api: &Api, project: impl Into<ProjectRef>) -> Result<Value> {
        self.edit_project(api, "addProject", project.into(), None)
    }

    /// Remove this task from a project.
    pub fn remove_project(&self, api: &Api, project: impl Into<ProjectRef>) -> Result<Value> {
        self.edit_project(api, "removeProject", project.into(), None)
    }

    /// Move this task under a section, inside a project both share.
    ///
    /// When the task and section share more than one project the choice is
    /// arbitrary (the first shared id in this task's project order); callers
    /// that care should add the task to the intended project explicitly.
    pub fn move_to_section(&mut self, api: &Api, section: &mut Section) -> Result<Value> {
        let anchor = section.id().cloned().ok_or(Error::MissingId)?;
        let mine = project_ids(&mut self.entity, api)?;
        let theirs = project_ids(section.entity_mut(), api)?;
        let shared = mine
            .into_iter()
            .find(|id| theirs.contains(id))
            .ok_or(Error::NoCommonProject)?;

        self.edit_project(api, "addProject", ProjectRef(shared), Some(anchor))
    }

    fn edit_project(
        &self,
        api: &Api,
        operation: &str,
        project: ProjectRef,
        insert_after: Option<Value>,
    ) -> Result<Value> {
        let project_id = project.into_id()?;
        let path = format!("{}/{}", self.entity.item_path()?, operation);

        let mut payload = Map::new();
        payload.insert("project".to_string(), project_id);
        if let Some(anchor) = insert_after {
            payload.insert("insert_after".to_string(), anchor);
        }

        api.post(&path, Value::Object(payload))
    }
}

/// A non-empty name ending in `:` marks a section row.
pub fn is_section_name(name: &str) -> bool {
    !name.is_empty() && name.ends_with(':')
}

/// Whether a raw result row is a section marker. Rows without a string
/// name never are.
pub(crate) fn is_section_row(row: &Map<String, Value>) -> bool {
    row.get("name")
        .and_then(Value::as_str)
        .map(is_section_name)
        .unwrap_or(false)
}

/// The project ids attached to an entity's `projects` field, in payload
/// order. Typed sub-entities contribute their ids; raw scalar ids pass
/// through.
pub(crate) fn project_ids(entity: &mut Entity, api: &Api) -> Result<Vec<Value>> {
    let projects = entity.fetch(api, "projects")?;
    let mut ids = Vec::new();
    match projects {
        FieldValue::List(items) => {
            for item in items {
                match item {
                    FieldValue::Entity(project) => {
                        if let Some(id) = project.id() {
                            ids.push(id.clone());
                        }
                    }
                    FieldValue::Scalar(value) if !value.is_null() => ids.push(value),
                    _ => {}
                }
            }
        }
        FieldValue::Scalar(Value::Array(values)) => ids.extend(values),
        _ => {}
    }
    Ok(ids)
}
