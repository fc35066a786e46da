//! Tags.

use crate::entity::{Descriptor, Entity, FieldValue, Kind, Resource};

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "Tag",
    endpoint: "tags",
    // No declared field whitelist: tag queries take the server's default
    // payload and no opt_fields parameter is sent.
    fields: &[],
    filter_keys: &[],
    children: &[],
    links: true,
};

/// A tag attached to tasks.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    entity: Entity,
}

impl Resource for Tag {
    const KIND: Kind = Kind::Tag;

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

impl Tag {
    pub fn name(&self) -> Option<&str> {
        self.entity.get("name").and_then(FieldValue::as_str)
    }
}
