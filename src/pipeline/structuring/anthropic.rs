use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::types::{LlmClient, LlmConnector, ModelRequest};
use super::StructuringError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Blocking client for the Anthropic Messages API.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, StructuringError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(StructuringError::MissingCredential);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::RemoteService(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    fn headers(&self) -> Result<HeaderMap, StructuringError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| StructuringError::RemoteService("API key contains invalid characters".into()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

/// Request body for POST /v1/messages
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from POST /v1/messages
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

fn request_body(request: &ModelRequest) -> MessagesRequest<'_> {
    MessagesRequest {
        model: &request.model,
        max_tokens: request.max_tokens,
        system: request.system.as_deref(),
        messages: request
            .messages
            .iter()
            .map(|m| MessageParam {
                role: m.role.as_str(),
                content: &m.text,
            })
            .collect(),
    }
}

fn response_text(parsed: MessagesResponse) -> Result<String, StructuringError> {
    let text = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        return Err(StructuringError::RemoteService(
            "Model response contained no text".into(),
        ));
    }
    Ok(text)
}

fn error_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => format!("status {status}, {}: {}", env.error.kind, env.error.message),
        Err(_) => format!("status {status}: {}", body.chars().take(300).collect::<String>()),
    }
}

impl LlmClient for AnthropicClient {
    fn complete(&self, request: &ModelRequest) -> Result<String, StructuringError> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "Calling model"
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request_body(request))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    StructuringError::RemoteService(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    StructuringError::RemoteService(format!("Cannot reach {}", self.base_url))
                } else {
                    StructuringError::RemoteService(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::RemoteService(error_detail(
                status.as_u16(),
                &body,
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| StructuringError::RemoteService(format!("Undecodable response: {e}")))?;

        response_text(parsed)
    }
}

/// Builds Anthropic clients per resolved key.
pub struct AnthropicConnector {
    base_url: String,
    timeout_secs: u64,
}

impl AnthropicConnector {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout_secs,
        }
    }
}

impl LlmConnector for AnthropicConnector {
    fn connect(&self, api_key: &str) -> Result<Box<dyn LlmClient + Send + Sync>, StructuringError> {
        Ok(Box::new(AnthropicClient::new(
            &self.base_url,
            api_key,
            self.timeout_secs,
        )?))
    }
}

// ═══════════════════════════════════════════════════════════
// Mocks
// ═══════════════════════════════════════════════════════════

/// Mock LLM client for testing: replays scripted replies and records
/// every request it receives.
///
/// Scripted entries are consumed in order; once exhausted, the default
/// reply (if any) is returned. `Err` entries surface as remote failures.
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_reply: Option<String>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockLlmClient {
    /// Always reply with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: Some(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(replies: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            default_reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, request: &ModelRequest) -> Result<String, StructuringError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        let next = self
            .script
            .lock()
            .map_err(|_| StructuringError::RemoteService("mock script lock poisoned".into()))?
            .pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(StructuringError::RemoteService(message)),
            None => self
                .default_reply
                .clone()
                .ok_or_else(|| StructuringError::RemoteService("mock script exhausted".into())),
        }
    }
}

/// Hands out one shared mock regardless of key; records the keys used.
pub struct MockConnector {
    client: Arc<MockLlmClient>,
    keys: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(client: Arc<MockLlmClient>) -> Self {
        Self {
            client,
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().map(|k| k.clone()).unwrap_or_default()
    }
}

impl LlmConnector for MockConnector {
    fn connect(&self, api_key: &str) -> Result<Box<dyn LlmClient + Send + Sync>, StructuringError> {
        if let Ok(mut keys) = self.keys.lock() {
            keys.push(api_key.to_string());
        }
        Ok(Box::new(Arc::clone(&self.client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::pipeline::structuring::types::ModelMessage;

    fn sample_request() -> ModelRequest {
        ModelRequest {
            model: "claude-test".into(),
            system: Some("Return JSON".into()),
            max_tokens: 4096,
            messages: vec![
                ModelMessage { role: ChatRole::User, text: "Q1".into() },
                ModelMessage { role: ChatRole::Assistant, text: "A1".into() },
            ],
        }
    }

    #[test]
    fn request_body_shape() {
        let request = sample_request();
        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], "Return JSON");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"], "A1");
    }

    #[test]
    fn system_omitted_when_absent() {
        let mut request = sample_request();
        request.system = None;
        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert!(body.get("system").is_none());
    }

    #[test]
    fn text_blocks_joined_and_others_ignored() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "first"},
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "second"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response_text(parsed).unwrap(), "first\nsecond");
    }

    #[test]
    fn empty_content_is_remote_error() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(
            response_text(parsed),
            Err(StructuringError::RemoteService(_))
        ));
    }

    #[test]
    fn error_envelope_is_summarised() {
        let detail = error_detail(
            401,
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        );
        assert_eq!(detail, "status 401, authentication_error: invalid x-api-key");
        assert_eq!(error_detail(502, "Bad Gateway"), "status 502: Bad Gateway");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = AnthropicClient::new("http://localhost:4000/", "sk-test", 30).unwrap();
        assert_eq!(client.base_url, "http://localhost:4000");
        assert_eq!(client.timeout_secs, 30);
    }

    #[test]
    fn blank_key_is_missing_credential() {
        assert!(matches!(
            AnthropicClient::new("http://localhost", "  ", 30),
            Err(StructuringError::MissingCredential)
        ));
    }

    #[test]
    fn unreachable_host_is_remote_error() {
        let client = AnthropicClient::new("http://127.0.0.1:9", "sk-test", 5).unwrap();
        assert!(matches!(
            client.complete(&sample_request()),
            Err(StructuringError::RemoteService(_))
        ));
    }

    #[test]
    fn mock_replays_script_then_default() {
        let mock = MockLlmClient::scripted(vec![Ok("one".into()), Err("quota".into())]);
        assert_eq!(mock.complete(&sample_request()).unwrap(), "one");
        assert!(matches!(
            mock.complete(&sample_request()),
            Err(StructuringError::RemoteService(m)) if m == "quota"
        ));
        assert!(mock.complete(&sample_request()).is_err());
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn mock_connector_shares_client_and_records_keys() {
        let mock = Arc::new(MockLlmClient::new("ok"));
        let connector = MockConnector::new(Arc::clone(&mock));
        let client = connector.connect("sk-a").unwrap();
        assert_eq!(client.complete(&sample_request()).unwrap(), "ok");
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(connector.keys(), vec!["sk-a".to_string()]);
    }
}
