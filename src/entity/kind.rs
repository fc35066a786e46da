//! Resource kinds and their static descriptors.
//!
//! Each concrete resource (Project, Task, ...) is tagged with a [`Kind`]
//! and described by a `'static` [`Descriptor`]: its endpoint, declared
//! fields, server-side filter keys, child relations, and whether an id can
//! be read off the tail of a resource link. The nested-payload coercion
//! table lives here too, as a declarative list instead of anything built by
//! runtime introspection.

use crate::resources;

/// Tag identifying the concrete resource type of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Project,
    Task,
    Section,
    Story,
    User,
    Tag,
}

/// Per-kind description of how a resource maps onto the API.
pub struct Descriptor {
    /// Human-readable type name, used in error messages
    pub name: &'static str,
    /// Collection endpoint, e.g. `tasks`
    pub endpoint: &'static str,
    /// Declared fields: requested via `opt_fields` and eligible for lazy
    /// loading and attribute writes
    pub fields: &'static [&'static str],
    /// Query keys the server handles natively; everything else filters
    /// client-side
    pub filter_keys: &'static [&'static str],
    /// One-to-many relations fetched via `{endpoint}/{id}/{child endpoint}`
    pub children: &'static [(&'static str, Kind)],
    /// Whether the trailing path segment of a resource link is this kind's id
    pub links: bool,
}

impl Kind {
    pub fn descriptor(self) -> &'static Descriptor {
        match self {
            Kind::Project => &resources::project::DESCRIPTOR,
            Kind::Task => &resources::task::DESCRIPTOR,
            Kind::Section => &resources::section::DESCRIPTOR,
            Kind::Story => &resources::story::DESCRIPTOR,
            Kind::User => &resources::user::DESCRIPTOR,
            Kind::Tag => &resources::tag::DESCRIPTOR,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn endpoint(self) -> &'static str {
        self.descriptor().endpoint
    }

    /// How result rows for this kind are assembled by a query.
    pub(crate) fn find_mode(self) -> FindMode {
        match self {
            Kind::Task => FindMode::ExcludeSections,
            Kind::Section => FindMode::Grouped,
            _ => FindMode::Plain,
        }
    }
}

/// Result-building strategy for a collection query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FindMode {
    /// One entity per passing row
    Plain,
    /// One entity per passing row, section-marker rows skipped entirely
    ExcludeSections,
    /// Marker rows become groups with the following rows as their subtasks
    Grouped,
}

/// Field-name pattern used by the coercion table.
#[derive(Clone, Copy, Debug)]
pub enum FieldMatcher {
    Contains(&'static str),
    EndsWith(&'static str),
}

impl FieldMatcher {
    pub fn matches(self, field: &str) -> bool {
        match self {
            FieldMatcher::Contains(needle) => field.contains(needle),
            FieldMatcher::EndsWith(suffix) => field.ends_with(suffix),
        }
    }
}

/// Ordered coercion table: the first row with a matching pattern decides
/// which kind wraps a nested payload under that field name.
static MATCHONS: &[(&[FieldMatcher], Kind)] = &[
    (&[FieldMatcher::Contains("project")], Kind::Project),
    (&[FieldMatcher::Contains("task")], Kind::Task),
    (
        &[
            FieldMatcher::EndsWith("assignee"),
            FieldMatcher::Contains("followers"),
            FieldMatcher::Contains("_by"),
        ],
        Kind::User,
    ),
];

/// The kind wrapping nested payloads under this field name, if any.
pub(crate) fn matchon_for(field: &str) -> Option<Kind> {
    MATCHONS
        .iter()
        .find(|(matchers, _)| matchers.iter().any(|matcher| matcher.matches(field)))
        .map(|(_, kind)| *kind)
}
