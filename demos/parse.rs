use std::io::Read;

use phd_webhook::{ParseOptions, WebhookPlugin};

/// Reads a raw webhook payload (a PHD event or an SNS envelope) from stdin
/// and prints the normalized events as JSON.
///
/// Try: `cargo run --example parse < tests/data/phd_event.json`
pub fn main() {
    env_logger::init();

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .expect("failed to read stdin");
    let data: serde_json::Value = serde_json::from_str(&body).expect("stdin is not valid JSON");

    let plugin = WebhookPlugin::new();
    let response = plugin
        .parse_event(&ParseOptions::default(), &data)
        .expect("failed to normalize payload");

    println!("{}", serde_json::to_string_pretty(&response).unwrap());
}
