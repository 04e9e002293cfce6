use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{dispatch::Dispatcher, event::ParseResponse, Result};

/// Opaque plugin configuration passed by the host on `init` and `verify`.
///
/// No options are interpreted today; the mapping is accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginOptions {
    /// Raw option fields, passed through as-is.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Per-parse options passed by the host alongside the raw payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseOptions {
    /// Dotted path to the event inside the webhook body, e.g.
    /// `message.detail`. Reserved for webhooks that nest the event under a
    /// custom root; the PHD parser does not use it.
    #[serde(default)]
    pub message_root: Option<String>,
}

/// Metadata returned from [`WebhookPlugin::init`]. Empty today.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InitMetadata {
    /// Plugin metadata for the host to record.
    pub metadata: HashMap<String, Value>,
}

/// The webhook normalization plugin.
///
/// Stateless per invocation: each call is independent and side-effect-free
/// aside from diagnostic logging, so a single instance can be shared freely
/// across threads.
pub struct WebhookPlugin {
    dispatcher: Dispatcher,
}

impl WebhookPlugin {
    /// Create a plugin instance with the parser dispatch table built.
    pub fn new() -> Self {
        WebhookPlugin {
            dispatcher: Dispatcher::new(),
        }
    }

    /// Initialize the plugin with host-supplied options.
    ///
    /// Options are currently ignored; the returned metadata is empty.
    pub fn init(&self, _options: &PluginOptions) -> InitMetadata {
        InitMetadata::default()
    }

    /// Validate host-supplied options. No validation is performed today;
    /// this always succeeds.
    pub fn verify(&self, _options: &PluginOptions) -> Result<()> {
        Ok(())
    }

    /// Normalize a raw webhook payload into backend events.
    ///
    /// The payload is classified, unwrapped from its SNS notification
    /// envelope if present, and handed to the registered parser. See
    /// [`Error`](crate::Error) for the failure modes; unrecognized payload
    /// shapes are not among them — they fall back to PHD parsing.
    pub fn parse_event(&self, options: &ParseOptions, data: &Value) -> Result<ParseResponse> {
        if let Some(message_root) = &options.message_root {
            log::trace!(target: "phd_webhook", message_root:display; "message_root hint ignored by the PHD parser");
        }
        self.dispatcher.dispatch(data)
    }
}

impl Default for WebhookPlugin {
    fn default() -> Self {
        WebhookPlugin::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ParseOptions, PluginOptions, WebhookPlugin};

    #[test]
    fn init_returns_empty_metadata() {
        let plugin = WebhookPlugin::new();
        let metadata = plugin.init(&PluginOptions::default());
        assert!(metadata.metadata.is_empty());
    }

    #[test]
    fn verify_always_succeeds() {
        let plugin = WebhookPlugin::new();
        assert!(plugin.verify(&PluginOptions::default()).is_ok());
    }

    #[test]
    fn parse_options_deserialize_with_message_root() {
        let options: ParseOptions =
            serde_json::from_value(json!({"message_root": "message.detail"})).unwrap();
        assert_eq!(options.message_root.as_deref(), Some("message.detail"));

        let options: ParseOptions = serde_json::from_value(json!({})).unwrap();
        assert!(options.message_root.is_none());
    }

    #[test]
    fn parse_event_normalizes_a_direct_payload() {
        let plugin = WebhookPlugin::new();
        let data = json!({
            "account": "111122223333",
            "source": "aws.health",
            "detail": {
                "eventArn": "arn:aws:health:us-east-1::event/EC2/x/y",
                "eventTypeCode": "AWS_EC2_INSTANCE_STORE_DRIVE_PERFORMANCE_DEGRADED",
                "eventTypeCategory": "issue",
                "startTime": "Wed, 07 Jul 2021 08:00:00 GMT",
                "eventDescription": [{"latestDescription": "Degraded drive."}],
                "affectedEntities": [{"entityValue": "i-abc"}]
            }
        });

        let response = plugin.parse_event(&ParseOptions::default(), &data).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(
            response.results[0].title,
            "Aws Ec2 Instance Store Drive Performance Degraded"
        );
    }
}
