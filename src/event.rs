use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification tag of a normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// An active condition the backend should alert on.
    Alert,
    /// A previously alerted condition that has cleared.
    Recovery,
}

/// Severity vocabulary accepted by the monitoring backend.
///
/// Personal Health Dashboard classification only ever produces
/// [`Severity::Error`] or [`Severity::Info`]; the remaining variants exist so
/// the schema covers everything the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Service-impacting and urgent.
    Critical,
    /// Actionable failure; PHD `issue` and `scheduledChange` map here.
    Error,
    /// Degraded but not failing.
    Warning,
    /// Informational; every other PHD category maps here.
    Info,
    /// The source did not convey a severity.
    NotAvailable,
}

/// The resource an event pertains to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier of the affected resource (the event ARN for PHD events).
    pub resource_id: String,
    /// Type tag of the affected resource (the payload `source`, defaulting
    /// to `aws.health`).
    pub resource_type: String,
}

/// A webhook payload normalized into the fixed schema the monitoring backend
/// ingests.
///
/// Every instance is created and discarded within a single
/// [`parse_event`](crate::WebhookPlugin::parse_event) call; nothing persists
/// across invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Unique identifier of the event, sourced from the event ARN. Empty if
    /// the payload carried none.
    pub event_key: String,
    /// Fixed classification tag; always [`EventType::Alert`] for PHD events.
    pub event_type: EventType,
    /// Human-readable title derived from the event type code.
    pub title: String,
    /// Assembled free-text description, including the owning account and the
    /// affected-entities block.
    pub description: String,
    /// Classified severity.
    pub severity: Severity,
    /// The affected resource.
    pub resource: Resource,
    /// Category tag, taken verbatim from `detail.eventTypeCategory`.
    pub rule: String,
    /// When the event occurred. Serializes as an ISO-8601 timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Owning AWS account id. Empty if the payload carried none.
    pub account: String,
    /// Allow-listed raw fields propagated verbatim for the backend's benefit.
    pub additional_info: serde_json::Map<String, serde_json::Value>,
    /// Optional image attachment. Never set by the PHD parser; part of the
    /// response schema for other webhook types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The outcome of a successful parse: zero or more normalized events.
///
/// The PHD parser always emits exactly one, but the contract allows a single
/// webhook delivery to fan out into several events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Normalized events extracted from the payload.
    pub results: Vec<NormalizedEvent>,
}
