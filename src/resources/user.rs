//! Users.

use crate::entity::{Descriptor, Entity, FieldValue, Kind, Resource};

pub(crate) static DESCRIPTOR: Descriptor = Descriptor {
    name: "User",
    endpoint: "users",
    fields: &["name", "email", "workspaces"],
    filter_keys: &[],
    children: &[],
    // User links do not end in the user's id, so deferred-load construction
    // is unsupported for this kind.
    links: false,
};

/// A user account. Wraps the payloads matched under assignee/follower/
/// created-by style field names.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    entity: Entity,
}

impl Resource for User {
    const KIND: Kind = Kind::User;

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

impl User {
    pub fn name(&self) -> Option<&str> {
        self.entity.get("name").and_then(FieldValue::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.entity.get("email").and_then(FieldValue::as_str)
    }
}
