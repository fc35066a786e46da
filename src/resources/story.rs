//! Stories: the activity feed attached to other resources.

use crate::entity::{Descriptor, Entity, FieldValue, Kind, Resource};

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "Story",
    endpoint: "stories",
    fields: &["created_at", "created_by", "text", "source", "type"],
    filter_keys: &[],
    children: &[],
    links: true,
};

/// One story: a comment or system-generated activity record.
#[derive(Clone, Debug, PartialEq)]
pub struct Story {
    entity: Entity,
}

impl Resource for Story {
    const KIND: Kind = Kind::Story;

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

impl Story {
    pub fn text(&self) -> Option<&str> {
        self.entity.get("text").and_then(FieldValue::as_str)
    }
}
