//! Dashboard probes: backend health, ping, and the unread-notification
//! count, fetched concurrently. Each panel is independent; a probe that
//! answers with an error status just leaves its panel empty.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ConsoleError;

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub status: Option<Value>,
    pub ping: Option<Value>,
    pub unread_count: u64,
    pub fetched_at: DateTime<Utc>,
}

pub async fn load(client: &ApiClient) -> Result<DashboardSnapshot, ConsoleError> {
    let (status, ping, unread) = tokio::join!(
        client.get("/helper/status"),
        client.get("/ping"),
        client.get("/notification/unreadcount"),
    );
    let (status, ping, unread) = (status?, ping?, unread?);

    let status = (!status.is_error()).then(|| status.body.clone());
    let ping = (!ping.is_error()).then(|| unwrap_data(&ping.body));
    let unread_count = if unread.is_error() {
        0
    } else {
        unread.body["count"]
            .as_u64()
            .or_else(|| unread.body["data"]["count"].as_u64())
            .unwrap_or(0)
    };

    Ok(DashboardSnapshot { status, ping, unread_count, fetched_at: Utc::now() })
}

/// These endpoints are pass-through integrations; some nest their payload
/// under `data`, some do not.
fn unwrap_data(body: &Value) -> Value {
    match &body["data"] {
        Value::Null => body.clone(),
        data => data.clone(),
    }
}
