//! Tests for event module

use super::*;
use chrono::{Datelike, Timelike};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn sample_event() -> serde_json::Value {
    json!({
        "id": "7189ce80-6e73-5ad9-bdc5-dcc47f176378",
        "eventTime": "2024-03-05T10:11:12.345+00:00",
        "action": "create/role_assignment",
        "eventType": "activity",
        "outcome": "success",
        "typeURI": "http://schemas.dmtf.org/cloud/audit/1.0/event",
        "requestPath": "/v3/projects/abc/users/def/roles/ghi",
        "initiator": {
            "id": "user-1",
            "typeURI": "service/security/account/user",
            "name": "alice",
            "domain": "Default",
            "host": {"address": "10.0.0.1", "agent": "curl/8.0"}
        },
        "target": {
            "id": "project-1",
            "typeURI": "service/security/account/user",
            "attachments": [{"name": "payload", "typeURI": "mime:application/json", "content": "{\"role\":\"admin\"}"}]
        },
        "observer": {
            "id": "keystone-1",
            "typeURI": "service/security",
            "name": "keystone"
        },
        "unknownField": 42
    })
}

// ============================================================================
// Time Parsing Tests
// ============================================================================

#[test_case("2024-03-05T10:11:12Z", 0 ; "rfc3339 utc")]
#[test_case("2024-03-05T10:11:12+02:00", 7200 ; "rfc3339 offset")]
#[test_case("2024-03-05T10:11:12+0200", 7200 ; "compact offset")]
#[test_case("2024-03-05T10:11:12", 0 ; "naive is utc")]
fn test_parse_time_formats(input: &str, offset_secs: i32) {
    let t = parse_time(input).unwrap();
    assert_eq!(t.year(), 2024);
    assert_eq!(t.hour(), 10);
    assert_eq!(t.second(), 12);
    assert_eq!(t.offset().local_minus_utc(), offset_secs);
}

#[test]
fn test_parse_time_rejects_garbage() {
    let err = parse_time("yesterday").unwrap_err();
    assert!(err.to_string().contains("Invalid time 'yesterday'"));
}

#[test]
fn test_format_time_keeps_fractions() {
    let t = parse_time("2024-03-05T10:11:12.345+00:00").unwrap();
    assert_eq!(format_time(&t), "2024-03-05T10:11:12.345Z");

    let t = parse_time("2024-03-05T10:11:12+00:00").unwrap();
    assert_eq!(format_time(&t), "2024-03-05T10:11:12Z");
}

// ============================================================================
// Event Decoding Tests
// ============================================================================

#[test]
fn test_event_deserialize() {
    let event: Event = serde_json::from_value(sample_event()).unwrap();
    assert_eq!(event.id, "7189ce80-6e73-5ad9-bdc5-dcc47f176378");
    assert_eq!(event.action, "create/role_assignment");
    assert_eq!(event.initiator.name, "alice");
    assert_eq!(
        event.initiator.host,
        Some(Host {
            address: "10.0.0.1".into(),
            agent: "curl/8.0".into()
        })
    );
    assert_eq!(event.observer.type_uri, "service/security");
    assert_eq!(event.target.attachments.len(), 1);
    assert!(event.reason.is_none());
}

#[test]
fn test_event_requires_time() {
    let result: std::result::Result<Event, _> =
        serde_json::from_value(json!({"id": "no-time"}));
    assert!(result.is_err());
}

#[test]
fn test_event_serialize_uses_wire_names() {
    let event: Event = serde_json::from_value(sample_event()).unwrap();
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["eventTime"], "2024-03-05T10:11:12.345Z");
    assert_eq!(value["typeURI"], "http://schemas.dmtf.org/cloud/audit/1.0/event");
    assert_eq!(value["requestPath"], "/v3/projects/abc/users/def/roles/ghi");
    assert!(value.get("resource_id").is_none());
    assert!(value.get("unknownField").is_none());
}

// ============================================================================
// Column Tests
// ============================================================================

#[test]
fn test_event_columns() {
    let event: Event = serde_json::from_value(sample_event()).unwrap();
    let columns = event.columns();

    assert_eq!(columns["ID"], "7189ce80-6e73-5ad9-bdc5-dcc47f176378");
    assert_eq!(columns["Time"], "2024-03-05T10:11:12.345Z");
    assert_eq!(columns["Source"], "service/security");
    assert_eq!(columns["Observer"], "keystone");
    assert_eq!(columns["Target"], "service/security/account/user project-1");
    assert_eq!(columns["Initiator"], "alice");
    assert_eq!(columns["InitiatorAddress"], "10.0.0.1");
    assert_eq!(columns["Attachments"], "{\"role\":\"admin\"}");
    assert!(!columns.contains_key("InitiatorAppCredential"));
}

#[test]
fn test_default_columns_are_known() {
    for column in DEFAULT_COLUMNS {
        assert!(Event::all_columns().contains(column), "{column}");
    }
}

#[test]
fn test_event_without_id_is_rejected() {
    let mut value = sample_event();
    value.as_object_mut().unwrap().remove("id");

    let err = serde_json::from_value::<Event>(value).unwrap_err();
    assert!(err.to_string().contains("missing field `id`"));
}
