mod common;

use serde_json::{json, Map};
use tasklink::resources::{Project, Section, Task, User};
use tasklink::transport::Method;
use tasklink::{Error, FieldValue, Kind, Query, Resource};

use common::{api, api_url, object};

#[test]
fn test_entity_data_getter() {
    let task = Task::from_map(object(json!({"name": "bar", "completed": false})));

    assert_eq!(task.get("name").and_then(FieldValue::as_str), Some("bar"));
    assert_eq!(task.name(), Some("bar"));
    assert_eq!(task.completed(), Some(false));
    assert!(task.get("missing").is_none());
}

#[test]
fn test_find_splits_server_and_client_filters() {
    let t = api();
    t.transport.push_data(json!([
        {"id": 1, "name": "alpha"},
        {"id": 2, "name": "beta"},
    ]));

    let tasks = Task::find(&t.api, Query::new().eq("workspace", 3).eq("name", "alpha")).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name(), Some("alpha"));

    let requests = t.transport.requests();
    let params = &requests[0].params;
    assert!(params.contains(&("workspace".to_string(), "3".to_string())));
    // local filter keys never reach the wire
    assert!(!params.iter().any(|(key, _)| key == "name"));
    let fields = params
        .iter()
        .find(|(key, _)| key == "opt_fields")
        .map(|(_, value)| value.clone())
        .unwrap();
    assert!(fields.split(',').any(|field| field == "name"));
    assert!(fields.split(',').any(|field| field == "workspace"));
}

#[test]
fn test_callable_predicates_filter_client_side() {
    let t = api();
    t.transport.push_data(json!([
        {"id": 1, "name": "urgent fix"},
        {"id": 2, "name": "later"},
    ]));

    let tasks = Task::find(
        &t.api,
        Query::new().test("name", |name| {
            name.as_str().is_some_and(|n| n.contains("urgent"))
        }),
    )
    .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name(), Some("urgent fix"));
}

#[test]
fn test_unknown_filter_key_is_a_query_error() {
    let t = api();
    t.transport.push_data(json!([{"id": 1, "name": "a"}]));

    let err = Task::find(&t.api, Query::new().eq("bogus", "x")).unwrap_err();
    match err {
        Error::InvalidFilterKey { key, kind } => {
            assert_eq!(key, "bogus");
            assert_eq!(kind, "Task");
        }
        other => panic!("expected an invalid filter key error, got {other}"),
    }
}

#[test]
fn test_update_sends_exactly_the_dirty_fields() {
    let t = api();
    t.transport.push_data(json!({}));

    let mut task = Task::from_map(object(json!({"id": 1, "name": "old", "notes": "keep"})));
    task.set("name", "new").unwrap();
    task.save(&t.api).unwrap();

    let requests = t.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Put);
    assert_eq!(requests[0].url, api_url("tasks/1"));
    assert_eq!(requests[0].body, Some(json!({"data": {"name": "new"}})));
    assert!(!task.entity().is_dirty());
}

#[test]
fn test_save_with_no_changes_sends_no_request() {
    let t = api();
    let mut task = Task::from_map(object(json!({"id": 1, "name": "same"})));

    task.save(&t.api).unwrap();

    assert_eq!(t.transport.request_count(), 0);
}

#[test]
fn test_fields_from_the_payload_are_not_dirty() {
    let task = Task::from_map(object(json!({"id": 1, "name": "fresh"})));
    assert!(!task.entity().is_dirty());
}

#[test]
fn test_unknown_field_writes_are_rejected() {
    let mut task = Task::from_map(Map::new());

    let err = task.set("bogus", 1).unwrap_err();
    match err {
        Error::UnknownField { field, kind } => {
            assert_eq!(field, "bogus");
            assert_eq!(kind, "Task");
        }
        other => panic!("expected an unknown field error, got {other}"),
    }
}

#[test]
fn test_create_sends_everything_and_refreshes_from_response() {
    let t = api();
    t.transport
        .push_data(json!({"id": 9, "name": "created", "notes": ""}));

    let mut task = Task::from_map(object(json!({"name": "created"})));
    task.set("notes", "hello").unwrap();
    task.save(&t.api).unwrap();

    let requests = t.transport.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, api_url("tasks"));
    assert_eq!(
        requests[0].body,
        Some(json!({"data": {"name": "created", "notes": "hello"}}))
    );

    assert_eq!(task.id(), Some(&json!(9)));
    assert_eq!(task.name(), Some("created"));
    assert!(!task.entity().is_dirty());
}

#[test]
fn test_failed_update_keeps_the_dirty_set() {
    let t = api();
    t.transport.push(common::status_response(500));

    let mut task = Task::from_map(object(json!({"id": 1})));
    task.set("name", "new").unwrap();

    assert!(task.save(&t.api).is_err());
    assert!(task.entity().is_dirty());

    // the retry resends the same field
    t.transport.push_data(json!({}));
    task.save(&t.api).unwrap();
    let requests = t.transport.requests();
    assert_eq!(
        requests[1].body,
        Some(json!({"data": {"name": "new"}}))
    );
}

#[test]
fn test_load_merges_without_clobbering_local_state() {
    let t = api();
    t.transport
        .push_data(json!({"id": "new", "name": "server", "notes": "filled"}));

    let mut task = Task::from_map(object(json!({"id": "me", "name": "local"})));
    task.load(&t.api).unwrap();

    // a fresh load replaces a placeholder id with the authoritative one
    assert_eq!(task.id(), Some(&json!("new")));
    // present keys keep their local values
    assert_eq!(task.name(), Some("local"));
    // gaps are filled
    assert_eq!(task.notes(), Some("filled"));

    let requests = t.transport.requests();
    assert_eq!(requests[0].url, api_url("tasks/me"));
    assert!(requests[0].params.is_empty());
}

#[test]
fn test_reading_a_declared_missing_field_loads_the_item() {
    let t = api();
    t.transport.push_data(json!({"id": 1, "name": "lazy"}));

    let mut task = Task::from_map(object(json!({"id": 1})));
    let name = task.fetch(&t.api, "name").unwrap();

    assert_eq!(name.as_str(), Some("lazy"));
    assert_eq!(t.transport.request_count(), 1);

    // a second read answers from the store
    let again = task.fetch(&t.api, "name").unwrap();
    assert_eq!(again.as_str(), Some("lazy"));
    assert_eq!(t.transport.request_count(), 1);
}

#[test]
fn test_unknown_property_reads_fail_except_id() {
    let t = api();
    let mut task = Task::from_map(Map::new());

    let err = task.fetch(&t.api, "bogus").unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { .. }));

    // identity checks never throw
    assert!(task.id().is_none());
    let id = task.fetch(&t.api, "id").unwrap();
    assert_eq!(id, FieldValue::Scalar(json!(null)));
    assert_eq!(t.transport.request_count(), 0);
}

#[test]
fn test_children_fetch_once_and_cache_on_the_instance() {
    let t = api();
    t.transport.push_data(json!([{"id": 5, "name": "only"}]));

    let mut project = Project::from_map(object(json!({"id": 1})));
    let tasks = project.tasks(&t.api).unwrap();
    assert_eq!(tasks.len(), 1);

    let requests = t.transport.requests();
    assert_eq!(requests[0].url, api_url("projects/1/tasks"));
    let fields = requests[0]
        .params
        .iter()
        .find(|(key, _)| key == "opt_fields")
        .map(|(_, value)| value.clone())
        .unwrap();
    assert!(fields.split(',').any(|field| field == "name"));

    // second access is served from the instance cache
    let again = project.tasks(&t.api).unwrap();
    assert_eq!(again, tasks);
    assert_eq!(t.transport.request_count(), 1);
}

#[test]
fn test_delete_requires_an_id() {
    let t = api();

    let unsaved = Task::from_map(Map::new());
    assert!(matches!(unsaved.delete(&t.api), Err(Error::MissingId)));
    assert_eq!(t.transport.request_count(), 0);

    t.transport.push_data(json!({}));
    let saved = Task::from_map(object(json!({"id": 1})));
    saved.delete(&t.api).unwrap();
    let requests = t.transport.requests();
    assert_eq!(requests[0].method, Method::Delete);
    assert_eq!(requests[0].url, api_url("tasks/1"));
}

#[test]
fn test_equality() {
    let by_name_a = Task::from_map(object(json!({"name": "a"})));
    let by_name_b = Task::from_map(object(json!({"name": "b"})));
    let by_id_1 = Task::from_map(object(json!({"id": 1})));
    let by_id_2 = Task::from_map(object(json!({"id": 2})));

    assert_eq!(by_name_a, by_name_a.clone());
    assert_eq!(by_id_1, by_id_1.clone());
    assert_ne!(by_name_a, by_name_b);
    assert_ne!(by_id_1, by_id_2);

    // same id wins over differing fields
    let richer = Task::from_map(object(json!({"id": 1, "name": "whatever"})));
    assert_eq!(by_id_1, richer);

    // different concrete kinds are never equal, same id or not
    let project = Project::from_map(object(json!({"id": 1})));
    assert_ne!(project.entity(), by_id_1.entity());
    let section = Section::from_map(object(json!({"id": 1})));
    assert_ne!(section.entity(), by_id_1.entity());
}

#[test]
fn test_from_link_defers_loading_until_first_use() {
    let t = api();
    t.transport.push_data(json!({"id": "1", "name": "linked"}));

    let mut task = Task::from_link("https://example.com/0/23/1").unwrap();
    assert_eq!(task.id(), Some(&json!("1")));
    assert_eq!(t.transport.request_count(), 0);

    task.load(&t.api).unwrap();
    let requests = t.transport.requests();
    assert_eq!(requests[0].url, api_url("tasks/1"));
}

#[test]
fn test_user_links_are_unsupported() {
    let err = User::from_link("https://example.com/users/someone").unwrap_err();
    assert!(matches!(err, Error::LinkUnsupported("User")));
}

#[test]
fn test_nested_payloads_become_typed_entities() {
    let task = Task::from_map(object(json!({
        "id": 1,
        "projects": [{"id": 3}, {"id": 4}],
        "assignee": {"id": 5},
        "created_by": {"id": 6},
        "followers": [{"id": 7}],
        "workspace": {"id": 8},
    })));

    let projects = task.get("projects").and_then(FieldValue::as_list).unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].as_entity().unwrap().kind(), Kind::Project);

    let assignee = task.get("assignee").and_then(FieldValue::as_entity).unwrap();
    assert_eq!(assignee.kind(), Kind::User);
    let author = task.get("created_by").and_then(FieldValue::as_entity).unwrap();
    assert_eq!(author.kind(), Kind::User);
    let followers = task.get("followers").and_then(FieldValue::as_list).unwrap();
    assert_eq!(followers[0].as_entity().unwrap().kind(), Kind::User);

    // no pattern matches workspace; the raw object stays a scalar
    assert!(task.get("workspace").and_then(FieldValue::as_scalar).is_some());
}

#[test]
fn test_coercion_skips_empty_values() {
    let task = Task::from_map(object(json!({"id": 1, "projects": [], "assignee": null})));

    assert_eq!(
        task.get("projects"),
        Some(&FieldValue::Scalar(json!([])))
    );
    assert_eq!(task.get("assignee"), Some(&FieldValue::Scalar(json!(null))));
}

#[test]
fn test_serialization_round_trips_nested_entities() {
    let payload = json!({
        "id": 1,
        "name": "with children",
        "projects": [{"id": 3, "name": "p"}],
    });
    let task = Task::from_map(object(payload.clone()));

    assert_eq!(serde_json::Value::Object(task.entity().to_map()), payload);
}
