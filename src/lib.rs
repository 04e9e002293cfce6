//! Webhook-event normalization for AWS Personal Health Dashboard (PHD)
//! events.
//!
//! # Overview
//!
//! The crate revolves around a [`WebhookPlugin`] that a plugin host invokes
//! synchronously: raw webhook payloads — PHD events, optionally wrapped in an
//! AWS SNS subscription/notification envelope — go in, and a
//! [`ParseResponse`] of [`NormalizedEvent`] records comes out, ready for a
//! monitoring backend to ingest.
//!
//! Internally, a [`Dispatcher`] classifies each payload into a
//! [`WebhookType`], unwraps the SNS `Message` envelope where one is present,
//! and routes to the parser registered for that type (today, always the
//! [`PhdParser`]). Parsing is single-threaded, synchronous, and stateless per
//! invocation.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Missing non-critical fields
//! are silently defaulted and never fail a parse; a malformed envelope, a
//! mis-shaped payload, or a bad timestamp aborts the call with no partial
//! results.
//!
//! # Logging
//!
//! The crate uses the [`log`](https://docs.rs/log/latest/log/) facade with
//! structured key-value fields under the `phd_webhook` target. It never
//! configures logging itself — install a `log`-compatible implementation in
//! the host to capture diagnostics.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod dispatch;
mod error;
mod event;
mod phd;
mod plugin;

pub use dispatch::{Dispatcher, EventParser, WebhookType};
pub use error::{Error, Result};
pub use event::{EventType, NormalizedEvent, ParseResponse, Resource, Severity};
pub use phd::PhdParser;
pub use plugin::{InitMetadata, ParseOptions, PluginOptions, WebhookPlugin};
