//! Query building and the find/filter protocol.
//!
//! A [`Query`] is an ordered set of key/predicate pairs. Keys the resource
//! declares as filter keys (with plain scalar predicates) are sent to the
//! server as request parameters; everything else is applied client-side to
//! each returned row. A client-side key missing from a row is a query
//! error, not a silent skip — it points at a typo in the caller's query.

use std::fmt;

use serde_json::{Map, Value};

use crate::client::Api;
use crate::constants::OPT_FIELDS_PARAM;
use crate::error::{Error, Result};
use crate::resources::section;
use crate::resources::task;

use super::kind::{FindMode, Kind};
use super::Entity;

/// Predicate a row value must satisfy.
pub enum Predicate {
    /// Exact equality against a plain value
    Equals(Value),
    /// Arbitrary test over the row value
    Test(Box<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Predicate {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Predicate::Equals(expected) => expected == value,
            Predicate::Test(test) => test(value),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Predicate::Test(_) => f.write_str("Test(..)"),
        }
    }
}

/// Ordered key/predicate pairs for a find call.
#[derive(Debug, Default)]
pub struct Query {
    pub(crate) entries: Vec<(String, Predicate)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require exact equality on a key.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((key.into(), Predicate::Equals(value.into())));
        self
    }

    /// Require an arbitrary test to pass on a key.
    pub fn test<F>(mut self, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.entries
            .push((key.into(), Predicate::Test(Box::new(predicate))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run a find against a target using the kind's default result building.
pub(crate) fn run_find(api: &Api, kind: Kind, target: &str, query: Query) -> Result<Vec<Entity>> {
    run_find_with_mode(api, kind, target, query, kind.find_mode())
}

/// Run a find with an explicit result-building mode.
pub(crate) fn run_find_with_mode(
    api: &Api,
    kind: Kind,
    target: &str,
    query: Query,
    mode: FindMode,
) -> Result<Vec<Entity>> {
    let descriptor = kind.descriptor();

    let mut params: Vec<(String, String)> = Vec::new();
    if !descriptor.fields.is_empty() {
        params.push((OPT_FIELDS_PARAM.to_string(), descriptor.fields.join(",")));
    }

    // Scalar equality predicates on declared filter keys are the server's
    // job; everything else stays a local filter.
    let mut local = Query::new();
    for (key, predicate) in query.entries {
        match predicate {
            Predicate::Equals(value) if descriptor.filter_keys.contains(&key.as_str()) => {
                match value_as_param(&value) {
                    Some(param) => params.push((key, param)),
                    None => local.entries.push((key, Predicate::Equals(value))),
                }
            }
            other => local.entries.push((key, other)),
        }
    }

    let data = api.get(target, &params)?;
    let rows = match data {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        _ => {
            return Err(Error::UnexpectedPayload {
                kind: descriptor.name,
            })
        }
    };

    build_result(kind, &local, rows, mode)
}

fn build_result(kind: Kind, query: &Query, rows: Vec<Value>, mode: FindMode) -> Result<Vec<Entity>> {
    match mode {
        FindMode::Plain => build_plain(kind, query, rows, false),
        FindMode::ExcludeSections => build_plain(kind, query, rows, true),
        FindMode::Grouped => section::build_grouped(query, rows),
    }
}

fn build_plain(
    kind: Kind,
    query: &Query,
    rows: Vec<Value>,
    exclude_sections: bool,
) -> Result<Vec<Entity>> {
    let mut out = Vec::new();
    for row in rows {
        let Value::Object(map) = row else {
            return Err(Error::UnexpectedPayload { kind: kind.name() });
        };
        if exclude_sections && task::is_section_row(&map) {
            continue;
        }
        if filter_row(kind, &map, query)? {
            out.push(Entity::from_map(kind, map));
        }
    }
    Ok(out)
}

/// Apply the client-side part of a query to a single row.
pub(crate) fn filter_row(kind: Kind, row: &Map<String, Value>, query: &Query) -> Result<bool> {
    for (key, predicate) in &query.entries {
        let value = row.get(key).ok_or_else(|| Error::InvalidFilterKey {
            key: key.clone(),
            kind: kind.name(),
        })?;
        if !predicate.accepts(value) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// String form of a scalar for the query string; non-scalars are not
/// eligible for server-side filtering.
fn value_as_param(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
