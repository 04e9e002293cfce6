use std::collections::HashMap;

use derive_more::Display;
use serde_json::Value;

use crate::{
    event::ParseResponse,
    phd::{is_empty_value, PhdParser},
    Error, Result,
};

/// A webhook shape this plugin knows how to handle.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookType {
    /// An AWS SNS subscription-confirmation envelope.
    #[display(fmt = "AWS_SNS")]
    AwsSns,
    /// A Personal Health Dashboard event, possibly wrapped in an SNS
    /// notification envelope.
    #[display(fmt = "AWS_PHD")]
    AwsPhd,
}

impl WebhookType {
    /// Classify a raw payload by its `Type` field.
    ///
    /// Any payload that is not a subscription confirmation falls back to
    /// [`WebhookType::AwsPhd`] — classification never fails, even for
    /// unrecognizable shapes.
    pub fn classify(data: &Value) -> WebhookType {
        match data.get("Type").and_then(Value::as_str) {
            Some("SubscriptionConfirmation") => WebhookType::AwsSns,
            _ => WebhookType::AwsPhd,
        }
    }
}

/// A parser that turns one raw webhook payload into normalized events.
pub trait EventParser {
    /// Normalize `raw` into the backend event schema.
    fn parse(&self, raw: &Value) -> Result<ParseResponse>;
}

/// Routes raw payloads to the parser registered for their webhook type.
///
/// The lookup table is built once at construction. [`WebhookType`] is a
/// closed enum, so parsers are registered here rather than discovered at
/// runtime; adding a webhook type means adding a variant and a table entry.
pub struct Dispatcher {
    parsers: HashMap<WebhookType, Box<dyn EventParser + Send + Sync>>,
}

impl Dispatcher {
    /// Build the dispatch table. Both webhook types currently route to the
    /// Personal Health Dashboard parser.
    pub fn new() -> Self {
        let mut parsers: HashMap<WebhookType, Box<dyn EventParser + Send + Sync>> = HashMap::new();
        parsers.insert(WebhookType::AwsSns, Box::new(PhdParser));
        parsers.insert(WebhookType::AwsPhd, Box::new(PhdParser));
        Dispatcher { parsers }
    }

    /// Classify `data`, unwrap the SNS notification envelope if present, and
    /// run the registered parser.
    pub fn dispatch(&self, data: &Value) -> Result<ParseResponse> {
        let webhook_type = WebhookType::classify(data);
        log::debug!(target: "phd_webhook", webhook_type:display; "classified webhook payload");

        let parser = self
            .parsers
            .get(&webhook_type)
            .ok_or(Error::UnsupportedWebhookType(webhook_type))?;

        match webhook_type {
            // Subscription confirmations are parsed as-is.
            WebhookType::AwsSns => parser.parse(data),
            WebhookType::AwsPhd => match unwrap_sns_message(data)? {
                Some(inner) => parser.parse(&inner),
                None => parser.parse(data),
            },
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new()
    }
}

/// Decode the JSON-encoded `Message` string of an SNS notification envelope.
///
/// Returns `None` when the payload carries no usable `Message`, in which case
/// the payload itself is the event. An empty string or empty container counts
/// as absent; any other non-string value is rejected.
fn unwrap_sns_message(data: &Value) -> Result<Option<Value>> {
    match data.get("Message") {
        Some(Value::String(message)) if !message.is_empty() => {
            let inner = serde_json::from_str(message).map_err(Error::MalformedEnvelope)?;
            Ok(Some(inner))
        }
        Some(value) if is_empty_value(value) => Ok(None),
        Some(_) => Err(Error::EnvelopeNotString),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{unwrap_sns_message, WebhookType};
    use crate::Error;

    #[test]
    fn subscription_confirmation_classifies_as_sns() {
        let data = json!({"Type": "SubscriptionConfirmation", "Token": "abc"});
        assert_eq!(WebhookType::classify(&data), WebhookType::AwsSns);
    }

    #[test]
    fn notification_envelope_classifies_as_phd() {
        let data = json!({"Type": "Notification", "Message": "{}"});
        assert_eq!(WebhookType::classify(&data), WebhookType::AwsPhd);
    }

    #[test]
    fn unrecognized_shape_falls_back_to_phd() {
        assert_eq!(WebhookType::classify(&json!({})), WebhookType::AwsPhd);
        assert_eq!(
            WebhookType::classify(&json!({"Type": 42, "foo": "bar"})),
            WebhookType::AwsPhd
        );
    }

    #[test]
    fn unwraps_json_encoded_message() {
        let data = json!({
            "Type": "Notification",
            "Message": "{\"account\":\"123456789012\",\"source\":\"aws.health\"}"
        });
        let inner = unwrap_sns_message(&data).unwrap().unwrap();
        assert_eq!(inner, json!({"account": "123456789012", "source": "aws.health"}));
    }

    #[test]
    fn missing_or_empty_message_means_no_envelope() {
        assert!(unwrap_sns_message(&json!({"account": "123"})).unwrap().is_none());
        assert!(unwrap_sns_message(&json!({"Message": ""})).unwrap().is_none());
        assert!(unwrap_sns_message(&json!({"Message": null})).unwrap().is_none());
        assert!(unwrap_sns_message(&json!({"Message": {}})).unwrap().is_none());
    }

    #[test]
    fn malformed_message_json_is_an_error() {
        let data = json!({"Message": "{not json"});
        assert!(matches!(
            unwrap_sns_message(&data),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn non_string_message_is_an_error() {
        let data = json!({"Message": {"nested": "object"}});
        assert!(matches!(
            unwrap_sns_message(&data),
            Err(Error::EnvelopeNotString)
        ));
    }
}
