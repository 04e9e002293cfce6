use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    dispatch::EventParser,
    event::{EventType, NormalizedEvent, ParseResponse, Resource, Severity},
    Error, Result,
};

/// Raw field names propagated verbatim into `additional_info`.
const ADDITIONAL_INFO_KEYS: [&str; 6] = [
    "id",
    "account",
    "region",
    "service",
    "eventTypeCode",
    "affectedEntities",
];

/// Parser for AWS Personal Health Dashboard events.
///
/// Produces exactly one [`NormalizedEvent`] per payload. All field accessors
/// default missing keys to empty values; only a missing or unparseable
/// `startTime` (and a payload of the wrong JSON shape) fails the parse.
pub struct PhdParser;

/// A raw PHD event as delivered by EventBridge. Only the fields the
/// normalizer reads are modeled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhdEvent {
    #[serde(default)]
    account: String,
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    detail: PhdDetail,
}

fn default_source() -> String {
    "aws.health".to_owned()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhdDetail {
    #[serde(default)]
    event_arn: String,
    #[serde(default)]
    event_type_code: String,
    #[serde(default)]
    event_type_category: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    event_description: Vec<DescriptionFragment>,
    #[serde(default)]
    affected_entities: Vec<AffectedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionFragment {
    #[serde(default)]
    latest_description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AffectedEntity {
    #[serde(default)]
    entity_value: String,
}

impl EventParser for PhdParser {
    fn parse(&self, raw: &Value) -> Result<ParseResponse> {
        log::trace!(target: "phd_webhook", raw:serde; "parsing raw payload");

        let payload: PhdEvent =
            serde_json::from_value(raw.clone()).map_err(Error::MalformedPayload)?;
        let detail = &payload.detail;

        let event = NormalizedEvent {
            event_key: detail.event_arn.clone(),
            event_type: EventType::Alert,
            title: format_title(&detail.event_type_code),
            description: generate_description(&payload),
            severity: classify_severity(&detail.event_type_category),
            resource: Resource {
                resource_id: detail.event_arn.clone(),
                resource_type: payload.source.clone(),
            },
            rule: detail.event_type_category.clone(),
            occurred_at: convert_to_utc(&detail.start_time)?,
            account: payload.account.clone(),
            additional_info: additional_info(raw),
            image_url: None,
        };

        log::debug!(target: "phd_webhook",
                    event_key:display = event.event_key,
                    title:display = event.title,
                    severity:serde = event.severity;
                    "normalized event");

        Ok(ParseResponse {
            results: vec![event],
        })
    }
}

/// Map `detail.eventTypeCategory` onto the backend severity vocabulary.
///
/// `issue` and `scheduledChange` alert as errors; `accountNotification` and
/// every other value (including absent) is informational.
fn classify_severity(event_type_category: &str) -> Severity {
    match event_type_category {
        "issue" | "scheduledChange" => Severity::Error,
        _ => Severity::Info,
    }
}

/// Turn an event type code like `AWS_EC2_OPERATIONAL_NOTIFICATION` into
/// `Aws Ec2 Operational Notification`.
fn format_title(event_type_code: &str) -> String {
    title_case(&event_type_code.replace('_', " "))
}

/// Title-case: an alphabetic character is uppercased when the preceding
/// character is non-alphabetic and lowercased otherwise. Idempotent.
fn title_case(text: &str) -> String {
    let mut title = String::with_capacity(text.len());
    let mut prev_alphabetic = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            title.push(c);
            prev_alphabetic = false;
        }
    }
    title
}

/// Normalize the two escaped-newline spellings seen in PHD description text
/// into real newlines. Double-backslash first so it is not half-consumed by
/// the single-backslash pass.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\\\n", "\n").replace("\\n", "\n")
}

/// Assemble the free-text description: all description fragments joined with
/// spaces, the owning account in parentheses, then the affected-entities
/// block (or `None`).
fn generate_description(payload: &PhdEvent) -> String {
    let fragments: Vec<String> = payload
        .detail
        .event_description
        .iter()
        .map(|fragment| unescape_newlines(&fragment.latest_description))
        .collect();
    let full_text = fragments.join(" ");

    let entities: Vec<&str> = payload
        .detail
        .affected_entities
        .iter()
        .map(|entity| entity.entity_value.as_str())
        .collect();

    if entities.is_empty() {
        format!(
            "{} (Account:{})\n\nAffected Entities: None",
            full_text, payload.account
        )
    } else {
        format!(
            "{} (Account:{})\n\nAffected Entities:\n - {}",
            full_text,
            payload.account,
            entities.join("\n - ")
        )
    }
}

/// Collect allow-listed raw fields into the metadata bag.
///
/// Two passes over the raw object: top level first, then `detail`. The
/// `detail` pass deliberately overwrites top-level values on key collisions,
/// keeping the override deterministic. Null/empty values are skipped in both
/// passes, and `detail.affectedEntities` is flattened to its `entityValue`
/// strings.
fn additional_info(raw: &Value) -> Map<String, Value> {
    let mut info = Map::new();
    let Some(payload) = raw.as_object() else {
        return info;
    };

    for key in ADDITIONAL_INFO_KEYS {
        if let Some(value) = payload.get(key) {
            if !is_empty_value(value) {
                info.insert(key.to_owned(), value.clone());
            }
        }
    }

    let Some(detail) = payload.get("detail").and_then(Value::as_object) else {
        return info;
    };
    for key in ADDITIONAL_INFO_KEYS {
        let Some(value) = detail.get(key) else {
            continue;
        };
        if is_empty_value(value) {
            continue;
        }
        let value = if key == "affectedEntities" {
            Value::Array(entity_values(value))
        } else {
            value.clone()
        };
        info.insert(key.to_owned(), value);
    }

    info
}

fn entity_values(entities: &Value) -> Vec<Value> {
    entities
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    let value = entry.get("entityValue").and_then(Value::as_str).unwrap_or("");
                    Value::String(value.to_owned())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Whether a raw JSON value counts as empty for allow-list and envelope
/// purposes: null, an empty string, or an empty container.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(entries) => entries.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse `detail.startTime` into UTC. PHD delivers RFC 2822 timestamps
/// (`Wed, 07 Jul 2021 08:00:00 GMT`); RFC 3339 is accepted as a fallback.
fn convert_to_utc(start_time: &str) -> Result<DateTime<Utc>> {
    if start_time.is_empty() {
        return Err(Error::MissingTimestamp);
    }
    match DateTime::parse_from_rfc2822(start_time) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(rfc2822_error) => DateTime::parse_from_rfc3339(start_time)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .map_err(|_| Error::InvalidTimestamp {
                value: start_time.to_owned(),
                source: rfc2822_error,
            }),
    }
}
