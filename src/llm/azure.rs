//! Azure OpenAI chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall, ToolSchema};
use crate::config::{AzureConfig, ConfigError};

/// Client bound to a single Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
    temperature: f32,
}

impl AzureOpenAiClient {
    /// Build a client for `config`, falling back to `default_api_version`
    /// when the configuration does not pin one.
    pub fn new(
        config: &AzureConfig,
        default_api_version: &str,
        temperature: f32,
    ) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("AZURE_OPENAI_ENDPOINT".to_string()))?;
        let deployment = config
            .deployment
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DEPLOYMENT_NAME".to_string()))?;
        let api_version = config.api_version.as_deref().unwrap_or(default_api_version);

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            url: completions_url(endpoint, deployment, api_version),
            temperature,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

impl CompletionResponse {
    fn into_chat_response(self) -> Result<ChatResponse, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls,
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmClient for AzureOpenAiClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ChatResponse, LlmError> {
        let request = CompletionRequest {
            messages,
            tools: tools.filter(|t| !t.is_empty()),
            temperature: self.temperature,
        };

        debug!(
            "Sending {} messages to Azure OpenAI with {} tools",
            messages.len(),
            tools.map_or(0, |t| t.len())
        );

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)?;
        parsed.into_chat_response()
    }
}
