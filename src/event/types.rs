//! CADF event types
//!
//! Field names follow the audit API wire format verbatim.

use super::time::{event_time, format_time};
use crate::types::{JsonValue, StringMap};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Columns printed by `list` when none are selected
pub const DEFAULT_COLUMNS: &[&str] = &[
    "ID",
    "Time",
    "Source",
    "Action",
    "Outcome",
    "RequestPath",
    "Target",
    "Initiator",
];

/// An audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier; required on the wire
    pub id: String,

    #[serde(rename = "typeURI", default, skip_serializing_if = "String::is_empty")]
    pub type_uri: String,

    /// When the event happened
    #[serde(rename = "eventTime", with = "event_time")]
    pub event_time: DateTime<FixedOffset>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    #[serde(rename = "eventType", default, skip_serializing_if = "String::is_empty")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub outcome: String,

    #[serde(rename = "requestPath", default, skip_serializing_if = "String::is_empty")]
    pub request_path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,

    #[serde(default)]
    pub initiator: Initiator,

    #[serde(default)]
    pub target: Target,

    #[serde(default)]
    pub observer: Observer,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Outcome reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    #[serde(rename = "reasonCode", default, skip_serializing_if = "String::is_empty")]
    pub reason_code: String,
    #[serde(rename = "reasonType", default, skip_serializing_if = "String::is_empty")]
    pub reason_type: String,
}

/// Network origin of an initiator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent: String,
}

/// The actor that caused the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiator {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "typeURI", default)]
    pub type_uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_credential_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
}

/// The resource acted upon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "typeURI", default)]
    pub type_uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// The service that reported the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observer {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "typeURI", default)]
    pub type_uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Free-form payload attached to an event or target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "typeURI", default, skip_serializing_if = "String::is_empty")]
    pub type_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<JsonValue>,
}

impl Event {
    /// Create an event with only an identifier and a time
    pub fn new(id: impl Into<String>, event_time: DateTime<FixedOffset>) -> Self {
        Self {
            id: id.into(),
            type_uri: String::new(),
            event_time,
            action: String::new(),
            event_type: String::new(),
            outcome: String::new(),
            request_path: String::new(),
            resource_id: String::new(),
            reason: None,
            initiator: Initiator::default(),
            target: Target::default(),
            observer: Observer::default(),
            attachments: Vec::new(),
        }
    }

    /// Flatten the event into printable columns
    ///
    /// Optional columns are only present when the event carries a value.
    pub fn columns(&self) -> StringMap {
        let mut columns = StringMap::new();
        columns.insert("ID".into(), self.id.clone());
        columns.insert("Type".into(), self.event_type.clone());
        columns.insert("Time".into(), format_time(&self.event_time));

        if !self.observer.name.is_empty() {
            columns.insert("Observer".into(), self.observer.name.clone());
        }
        columns.insert("TypeURI".into(), self.observer.type_uri.clone());
        // "Source" has always been the observer type
        columns.insert("Source".into(), self.observer.type_uri.clone());

        columns.insert("Action".into(), self.action.clone());
        columns.insert("Outcome".into(), self.outcome.clone());
        columns.insert(
            "Target".into(),
            format!("{} {}", self.target.type_uri, self.target.id),
        );

        if !self.initiator.name.is_empty() {
            columns.insert("Initiator".into(), self.initiator.name.clone());
        }
        if !self.initiator.domain.is_empty() {
            columns.insert("InitiatorDomain".into(), self.initiator.domain.clone());
        }
        if let Some(host) = &self.initiator.host {
            columns.insert("InitiatorAddress".into(), host.address.clone());
            columns.insert("InitiatorAgent".into(), host.agent.clone());
        }
        if !self.initiator.app_credential_id.is_empty() {
            columns.insert(
                "InitiatorAppCredential".into(),
                self.initiator.app_credential_id.clone(),
            );
        }
        if !self.request_path.is_empty() {
            columns.insert("RequestPath".into(), self.request_path.clone());
        }

        let attachments: Vec<String> = self
            .attachments
            .iter()
            .chain(&self.target.attachments)
            .filter_map(|a| a.content.as_ref())
            .map(|content| match content {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if !attachments.is_empty() {
            columns.insert("Attachments".into(), attachments.join("\n"));
        }

        columns
    }

    /// Every column name `columns()` can produce, in display order
    pub fn all_columns() -> &'static [&'static str] {
        &[
            "ID",
            "Type",
            "Time",
            "Observer",
            "TypeURI",
            "Source",
            "Action",
            "Outcome",
            "Target",
            "Initiator",
            "InitiatorDomain",
            "InitiatorAddress",
            "InitiatorAgent",
            "InitiatorAppCredential",
            "RequestPath",
            "Attachments",
        ]
    }
}
