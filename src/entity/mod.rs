//! Entity base: backing store, dirty tracking, coercion, lazy loading,
//! and persistence.
//!
//! An [`Entity`] is the dynamic half of every resource: an ordered mapping
//! from field name to [`FieldValue`], a set of locally modified ("dirty")
//! field names, and a per-instance cache of resolved child relations. The
//! typed half is a thin wrapper struct per resource implementing
//! [`Resource`], which ties a [`Kind`] to the machinery here and inherits
//! the whole query/persistence protocol from the trait's provided methods.
//!
//! Incoming payloads are coerced as they land: any non-empty field whose
//! name matches the coercion table has its nested objects wrapped in typed
//! sub-entities, one by one for collection values. Values written through
//! [`Entity::set`] are stored raw and marked dirty; values merged in by a
//! load never are.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use crate::client::Api;
use crate::error::{Error, Result};

pub mod kind;
pub mod query;

pub use kind::{Descriptor, FieldMatcher, Kind};
pub use query::{Predicate, Query};

/// One stored field value: a plain JSON scalar/array/object, a typed
/// sub-entity, or a list mixing the two.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Entity(Box<Entity>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// The raw JSON this value serializes back to.
    pub fn as_value(&self) -> Value {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Entity(entity) => Value::Object(entity.to_map()),
            FieldValue::List(items) => {
                Value::Array(items.iter().map(FieldValue::as_value).collect())
            }
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            FieldValue::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Dynamic resource instance tagged with its concrete kind.
#[derive(Clone, Debug)]
pub struct Entity {
    kind: Kind,
    /// Ordered backing store; server field order is preserved
    data: Vec<(String, FieldValue)>,
    /// Fields written locally since the last successful save
    dirty: BTreeSet<String>,
    /// Child relations resolved so far, cached per instance
    children: HashMap<String, Vec<Entity>>,
}

impl Entity {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            data: Vec::new(),
            dirty: BTreeSet::new(),
            children: HashMap::new(),
        }
    }

    /// Build an instance from a payload map, coercing nested values.
    pub fn from_map(kind: Kind, map: Map<String, Value>) -> Self {
        let mut entity = Self::new(kind);
        entity.init(map);
        entity
    }

    /// Build a minimal instance from a resource link, taking the trailing
    /// path segment as the id. Fails for kinds whose identity cannot be
    /// derived this way.
    pub fn from_link(kind: Kind, link: &str) -> Result<Self> {
        if !kind.descriptor().links {
            return Err(Error::LinkUnsupported(kind.name()));
        }
        let id = link
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or(Error::MissingId)?;

        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Self::from_map(kind, map))
    }

    /// Replace the backing store with a fresh payload and reset dirty state.
    fn init(&mut self, map: Map<String, Value>) {
        self.data.clear();
        self.dirty.clear();
        for (key, value) in map {
            let coerced = coerce(&key, value);
            self.data.push((key, coerced));
        }
    }

    /// Merge a payload into the store: only missing keys are filled, except
    /// `id`, which the incoming (authoritative) payload always wins. Never
    /// touches the dirty set, so local edits survive a refresh.
    fn merge(&mut self, map: Map<String, Value>) {
        for (key, value) in map {
            if key == "id" || !self.contains(&key) {
                let coerced = coerce(&key, value);
                self.put(key, coerced);
            }
        }
    }

    /// Internal write: replaces in place or appends, never marks dirty.
    fn put(&mut self, key: String, value: FieldValue) {
        match self.data.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.data.push((key, value)),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.iter().any(|(name, _)| name == field)
    }

    /// The stored value for a field, without triggering any loading.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.data
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// The instance id, when one is set. Never errors: identity checks on
    /// unsaved instances are expected.
    pub fn id(&self) -> Option<&Value> {
        match self.get("id")? {
            FieldValue::Scalar(value) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    fn id_segment(&self) -> Result<String> {
        let id = self.id().ok_or(Error::MissingId)?;
        Ok(match id {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    /// Path to this instance's single-item endpoint.
    pub(crate) fn item_path(&self) -> Result<String> {
        Ok(format!("{}/{}", self.kind.endpoint(), self.id_segment()?))
    }

    /// Write a declared field and mark it dirty. Unknown fields are
    /// rejected outright.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        if !self.kind.descriptor().fields.contains(&field) {
            return Err(Error::UnknownField {
                field: field.to_string(),
                kind: self.kind.name(),
            });
        }
        self.put(field.to_string(), FieldValue::Scalar(value.into()));
        self.dirty.insert(field.to_string());
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Fetch all of this item's data by id and merge it in. Present keys
    /// keep their current (possibly locally edited) values.
    pub fn load(&mut self, api: &Api) -> Result<()> {
        let path = self.item_path()?;
        let data = api.get(&path, &[])?;
        if let Value::Object(map) = data {
            self.merge(map);
        }
        Ok(())
    }

    /// Create or update depending on whether an id is set.
    pub fn save(&mut self, api: &Api) -> Result<()> {
        if self.id().is_some() {
            self.update(api)
        } else {
            self.create(api)
        }
    }

    fn update(&mut self, api: &Api) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let mut payload = Map::new();
        for field in &self.dirty {
            if let Some(value) = self.get(field) {
                payload.insert(field.clone(), value.as_value());
            }
        }

        let path = self.item_path()?;
        api.put(&path, Value::Object(payload))?;
        self.dirty.clear();
        Ok(())
    }

    fn create(&mut self, api: &Api) -> Result<()> {
        let payload = Value::Object(self.to_map());
        let data = api.post(self.kind.endpoint(), payload)?;

        // A dry run (or an empty response) leaves local state untouched so
        // the pending create can be retried for real.
        if let Value::Object(map) = data {
            if !map.is_empty() {
                self.init(map);
            }
        }
        Ok(())
    }

    /// Delete the server-side resource. Local state is left to the caller
    /// to discard.
    pub fn delete(&self, api: &Api) -> Result<()> {
        let path = self.item_path()?;
        api.delete(&path)?;
        Ok(())
    }

    /// Serialize the backing store back to a JSON map.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in &self.data {
            map.insert(key.clone(), value.as_value());
        }
        map
    }

    /// Read a property through the lazy chain: a present value wins; a
    /// declared-but-missing field triggers a full [`Entity::load`]; a
    /// declared child relation resolves (once) via its sub-collection
    /// endpoint; `id` on an id-less instance reads as null. Anything else
    /// is an unknown property.
    pub fn fetch(&mut self, api: &Api, field: &str) -> Result<FieldValue> {
        if let Some(value) = self.get(field) {
            return Ok(value.clone());
        }

        let descriptor = self.kind.descriptor();

        if descriptor.fields.contains(&field) {
            self.load(api)?;
            if let Some(value) = self.get(field) {
                return Ok(value.clone());
            }
        }

        if descriptor.children.iter().any(|(name, _)| *name == field) {
            let related = self.relation(api, field)?;
            return Ok(FieldValue::List(
                related
                    .into_iter()
                    .map(|entity| FieldValue::Entity(Box::new(entity)))
                    .collect(),
            ));
        }

        if field == "id" {
            return Ok(FieldValue::Scalar(Value::Null));
        }

        Err(Error::UnknownProperty {
            field: field.to_string(),
            kind: self.kind.name(),
        })
    }

    /// Resolve a declared child relation, fetching it on first access and
    /// answering from the instance cache afterwards.
    pub fn relation(&mut self, api: &Api, name: &str) -> Result<Vec<Entity>> {
        if let Some(cached) = self.children.get(name) {
            return Ok(cached.clone());
        }

        let child = self
            .kind
            .descriptor()
            .children
            .iter()
            .find(|(child_name, _)| *child_name == name)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| Error::UnknownProperty {
                field: name.to_string(),
                kind: self.kind.name(),
            })?;

        let target = format!("{}/{}", self.item_path()?, child.endpoint());
        let related = query::run_find(api, child, &target, Query::new())?;
        self.children.insert(name.to_string(), related.clone());
        Ok(related)
    }
}

/// Same concrete kind, then same id when both sides have one, otherwise
/// identical backing data.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => self.data == other.data,
        }
    }
}

/// Typed face of a resource: a wrapper struct per kind, with the whole
/// query/persistence protocol provided by this trait.
pub trait Resource: Sized {
    const KIND: Kind;

    fn from_entity(entity: Entity) -> Self;
    fn entity(&self) -> &Entity;
    fn entity_mut(&mut self) -> &mut Entity;

    fn endpoint() -> &'static str {
        Self::KIND.endpoint()
    }

    /// Build an instance from a payload map.
    fn from_map(map: Map<String, Value>) -> Self {
        Self::from_entity(Entity::from_map(Self::KIND, map))
    }

    /// Build a deferred-load instance from a resource link.
    fn from_link(link: &str) -> Result<Self> {
        Entity::from_link(Self::KIND, link).map(Self::from_entity)
    }

    /// Find instances of this resource matching a query.
    fn find(api: &Api, query: Query) -> Result<Vec<Self>> {
        let found = query::run_find(api, Self::KIND, Self::KIND.endpoint(), query)?;
        Ok(found.into_iter().map(Self::from_entity).collect())
    }

    fn id(&self) -> Option<&Value> {
        self.entity().id()
    }

    fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entity().get(field)
    }

    fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        self.entity_mut().set(field, value)
    }

    fn fetch(&mut self, api: &Api, field: &str) -> Result<FieldValue> {
        self.entity_mut().fetch(api, field)
    }

    fn relation(&mut self, api: &Api, name: &str) -> Result<Vec<Entity>> {
        self.entity_mut().relation(api, name)
    }

    fn load(&mut self, api: &Api) -> Result<()> {
        self.entity_mut().load(api)
    }

    fn save(&mut self, api: &Api) -> Result<()> {
        self.entity_mut().save(api)
    }

    fn delete(&self, api: &Api) -> Result<()> {
        self.entity().delete(api)
    }
}

/// Coerce one incoming field value. Empty values never match; objects (and
/// objects inside collections) under a matching field name become typed
/// sub-entities; scalars always pass through untouched.
fn coerce(field: &str, raw: Value) -> FieldValue {
    if value_is_empty(&raw) {
        return FieldValue::Scalar(raw);
    }

    let Some(kind) = kind::matchon_for(field) else {
        return FieldValue::Scalar(raw);
    };

    match raw {
        Value::Array(items) => FieldValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => FieldValue::Entity(Box::new(Entity::from_map(kind, map))),
                    other => FieldValue::Scalar(other),
                })
                .collect(),
        ),
        Value::Object(map) => FieldValue::Entity(Box::new(Entity::from_map(kind, map))),
        other => FieldValue::Scalar(other),
    }
}

fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
