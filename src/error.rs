use thiserror::Error;

use crate::dispatch::WebhookType;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while normalizing a webhook payload.
///
/// Missing non-critical fields (event key, title, rule, affected entities)
/// are never errors; they default to empty values. A parse either fully
/// succeeds or fails with one of the variants below.
#[derive(Error, Debug)]
pub enum Error {
    /// The SNS `Message` field held a string that is not valid JSON.
    #[error("malformed SNS message envelope")]
    MalformedEnvelope(#[source] serde_json::Error),
    /// The SNS `Message` field held a non-empty value that is not a string.
    #[error("SNS message envelope is not a string")]
    EnvelopeNotString,
    /// The payload (or one of its nested fields) has the wrong JSON shape.
    #[error("malformed webhook payload")]
    MalformedPayload(#[source] serde_json::Error),
    /// The event carried no `startTime`.
    #[error("event timestamp is missing")]
    MissingTimestamp,
    /// The event `startTime` is neither RFC 2822 nor RFC 3339.
    #[error("unparseable event timestamp {value:?}")]
    InvalidTimestamp {
        /// The raw `startTime` value as it appeared in the payload.
        value: String,
        /// The RFC 2822 parse failure (the primary wire format).
        #[source]
        source: chrono::ParseError,
    },
    /// No parser is registered for the classified webhook type.
    #[error("no parser registered for webhook type {0}")]
    UnsupportedWebhookType(WebhookType),
}
