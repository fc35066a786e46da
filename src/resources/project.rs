//! Projects.

use serde_json::Value;

use crate::client::Api;
use crate::entity::{Descriptor, Entity, FieldValue, Kind, Resource};
use crate::error::{Error, Result};

use super::task::Task;

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "Project",
    endpoint: "projects",
    fields: &["name", "notes", "workspace", "team"],
    filter_keys: &[],
    children: &[("tasks", Kind::Task)],
    links: true,
};

/// A project: a named collection of tasks inside a workspace.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    entity: Entity,
}

impl Resource for Project {
    const KIND: Kind = Kind::Project;

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

impl Project {
    pub fn name(&self) -> Option<&str> {
        self.entity.get("name").and_then(FieldValue::as_str)
    }

    /// Tasks in this project, fetched once and cached on the instance.
    pub fn tasks(&mut self, api: &Api) -> Result<Vec<Task>> {
        let related = self.entity.relation(api, "tasks")?;
        Ok(related.into_iter().map(Task::from_entity).collect())
    }

    /// Add a task to this project.
    ///
    /// A task that already exists server-side is linked through its own
    /// add-to-project operation. A pending task is instead assigned to this
    /// project and workspace and created in one request.
    pub fn add_task(&mut self, api: &Api, task: &mut Task) -> Result<()> {
        if task.id().is_some() {
            task.add_project(api, &*self)?;
            return Ok(());
        }

        let project_id = self.entity.id().cloned().ok_or(Error::MissingId)?;
        let workspace_id = self.workspace_id(api)?;
        task.set("projects", Value::Array(vec![project_id]))?;
        task.set("workspace", workspace_id)?;
        task.save(api)
    }

    /// The id of this project's workspace, loading the project if the
    /// workspace field is not present yet.
    fn workspace_id(&mut self, api: &Api) -> Result<Value> {
        match self.entity.fetch(api, "workspace")? {
            FieldValue::Scalar(Value::Object(map)) => {
                map.get("id").cloned().ok_or(Error::MissingId)
            }
            FieldValue::Entity(workspace) => workspace.id().cloned().ok_or(Error::MissingId),
            FieldValue::Scalar(other) if !other.is_null() => Ok(other),
            _ => Err(Error::MissingId),
        }
    }
}
