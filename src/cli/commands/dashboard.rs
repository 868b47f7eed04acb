use serde_json::json;

use crate::cli::utils::{output_error, output_value, warn_if_expired};
use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::dashboard;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppContext::initialize()?;

    match dashboard::load(ctx.client()).await {
        Ok(snapshot) => {
            match output_format {
                OutputFormat::Json => output_value(
                    &output_format,
                    &json!({
                        "status": snapshot.status,
                        "ping": snapshot.ping,
                        "unreadCount": snapshot.unread_count,
                        "fetchedAt": snapshot.fetched_at,
                    }),
                )?,
                OutputFormat::Text => {
                    println!("Backend health:");
                    match &snapshot.status {
                        Some(status) => println!("{}", serde_json::to_string_pretty(status)?),
                        None => println!("  (unavailable)"),
                    }
                    println!("Ping:");
                    match &snapshot.ping {
                        Some(ping) => println!("{}", serde_json::to_string_pretty(ping)?),
                        None => println!("  (unavailable)"),
                    }
                    println!("Unread notifications: {}", snapshot.unread_count);
                }
            }
        }
        Err(e) => output_error(&output_format, &e.to_string())?,
    }

    warn_if_expired(&ctx, &output_format)
}
