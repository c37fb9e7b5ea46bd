//! HTTP helpers shared by the network commands.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use enova_core::models::config::{RetryPolicy, ReviewConfig};

/// Build a client with the given per-request timeout.
pub fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("enova/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a request, retrying transient failures according to `policy`.
///
/// `build` is called once per attempt. Returns the final response and the
/// number of attempts made. A retried status that never clears is returned as
/// a response, not an error.
pub async fn send_with_retry<F>(policy: &RetryPolicy, mut build: F) -> reqwest::Result<(Response, u32)>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        let retry = attempt; // retry number if this attempt fails
        let can_retry = attempt <= policy.max_retries;

        match build().send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if can_retry && policy.should_retry(status) {
                    let delay = policy.backoff_delay(retry);
                    debug!("HTTP {} on attempt {}, retrying in {:?}", status, attempt, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok((response, attempt));
            }
            Err(e) if can_retry && (e.is_connect() || e.is_timeout()) => {
                let delay = policy.backoff_delay(retry);
                warn!("Request failed on attempt {}: {}, retrying in {:?}", attempt, e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Answer format requested from the chat model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatFormat {
    Text,
    JsonObject,
}

/// Send one user prompt to an OpenAI-compatible chat endpoint and return the
/// content of the first choice.
pub async fn chat_completion(
    client: &Client,
    config: &ReviewConfig,
    api_key: &str,
    prompt: &str,
    format: ChatFormat,
) -> anyhow::Result<String> {
    let request = ChatRequest {
        model: &config.model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        temperature: config.temperature,
        response_format: match format {
            ChatFormat::Text => None,
            ChatFormat::JsonObject => Some(ResponseFormat { kind: "json_object" }),
        },
    };

    let response = client
        .post(&config.endpoint)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    let body: ChatResponse = response.json().await?;
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow::anyhow!("Empty completion"))?;

    debug!("Completion: {} chars", content.len());
    Ok(content)
}
