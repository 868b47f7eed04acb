//! AI workbench: a thin panel over the backend's `/ai/*` endpoints,
//! consumed as opaque JSON-in/JSON-out calls.

use serde_json::{json, Value};

use crate::client::{api_error, ApiClient, ApiResponse};
use crate::error::ConsoleError;

pub async fn assistant_query(client: &ApiClient, query: &str) -> Result<Value, ConsoleError> {
    let response = client.post("/ai/assistant/query", &json!({ "query": query })).await?;
    unwrap(response, "Assistant query failed")
}

pub async fn suggest_list_items(client: &ApiClient, prompt: &str) -> Result<Value, ConsoleError> {
    let response = client.post("/ai/list/suggest-items", &json!({ "prompt": prompt })).await?;
    unwrap(response, "List suggestion failed")
}

pub async fn categorize_text(client: &ApiClient, text: &str) -> Result<Value, ConsoleError> {
    let response = client.post("/ai/item/categorize", &json!({ "text": text })).await?;
    unwrap(response, "Categorize text failed")
}

pub async fn moderate_text(client: &ApiClient, text: &str) -> Result<Value, ConsoleError> {
    let response = client.post("/ai/moderate", &json!({ "text": text })).await?;
    unwrap(response, "Moderate text failed")
}

pub async fn election_summary(client: &ApiClient, election_id: &str) -> Result<Value, ConsoleError> {
    let response = client.get(&format!("/ai/election/{}/summary", election_id)).await?;
    unwrap(response, "Election summary failed")
}

pub async fn election_recommendations(
    client: &ApiClient,
    election_id: &str,
) -> Result<Value, ConsoleError> {
    let response = client
        .get(&format!("/ai/election/{}/recommendations", election_id))
        .await?;
    unwrap(response, "Election recommendations failed")
}

pub async fn election_participants(
    client: &ApiClient,
    election_id: &str,
) -> Result<Value, ConsoleError> {
    let response = client
        .get(&format!("/ai/election/{}/suggest-participants", election_id))
        .await?;
    unwrap(response, "Participant suggestions failed")
}

pub async fn describe_image(client: &ApiClient, image_id: &str) -> Result<Value, ConsoleError> {
    let response = client.get(&format!("/ai/image/{}/describe", image_id)).await?;
    unwrap(response, "Image description failed")
}

pub async fn notification_digest(client: &ApiClient) -> Result<Value, ConsoleError> {
    let response = client.get("/ai/notification/digest").await?;
    unwrap(response, "Notification digest failed")
}

fn unwrap(mut response: ApiResponse, fallback: &str) -> Result<Value, ConsoleError> {
    if response.is_error() {
        return Err(api_error(&response, fallback));
    }
    let data = response
        .body
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null);
    if data.is_null() {
        Ok(response.body)
    } else {
        Ok(data)
    }
}
