//! Core agent loop implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::{Config, ConfigError};
use crate::llm::{AzureOpenAiClient, ChatMessage, LlmClient, ToolCall};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;
use super::types::{AgentRole, AgentRun, LogEntryType, TaskLogEntry};

/// A model client, a role prompt and a toolset behind one `run` entry point.
pub struct Agent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    workspace_path: PathBuf,
    max_iterations: usize,
}

impl Agent {
    /// Create an agent for `role` backed by Azure OpenAI.
    pub fn new(config: &Config, role: AgentRole) -> Result<Self, ConfigError> {
        let llm = Arc::new(AzureOpenAiClient::new(
            &config.azure,
            role.default_api_version(),
            config.temperature,
        )?);
        let tools = match role {
            AgentRole::SiteCreator => ToolRegistry::site_tools(),
            AgentRole::DevOps => ToolRegistry::devops_tools(&config.github),
        };

        Ok(Self::with_client(
            role,
            llm,
            tools,
            config.workspace_path.clone(),
            config.max_iterations,
        ))
    }

    /// Create an agent with an explicit client and toolset.
    pub fn with_client(
        role: AgentRole,
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        workspace_path: PathBuf,
        max_iterations: usize,
    ) -> Self {
        Self {
            role,
            llm,
            tools,
            workspace_path,
            max_iterations,
        }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Forward a natural-language instruction to the model and run the tools
    /// it asks for until it answers in plain text.
    pub async fn run(&self, query: &str) -> anyhow::Result<AgentRun> {
        let mut log = Vec::new();
        let workspace_str = self.workspace_path.to_string_lossy().to_string();

        let system_prompt = build_system_prompt(self.role, &workspace_str, &self.tools);
        let mut messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];

        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("{:?} agent iteration {}", self.role, iteration + 1);

            let response = self
                .llm
                .chat_completion(&messages, Some(tool_schemas.as_slice()))
                .await?;

            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                messages.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    tool_calls.clone(),
                ));

                for tool_call in &tool_calls {
                    log.push(log_entry(
                        LogEntryType::ToolCall,
                        Some(tool_call.function.name.as_str()),
                        format!("args: {}", tool_call.function.arguments),
                    ));

                    let result = self
                        .execute_tool_call(tool_call, &self.workspace_path)
                        .await;
                    let result_str = match result {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!("Tool {} failed: {:#}", tool_call.function.name, e);
                            format!("Error: {:#}", e)
                        }
                    };

                    log.push(log_entry(
                        LogEntryType::ToolResult,
                        Some(tool_call.function.name.as_str()),
                        truncate_for_log(&result_str, 1000),
                    ));

                    messages.push(ChatMessage::tool_result(tool_call.id.clone(), result_str));
                }

                continue;
            }

            // No tool calls - this is the final response
            if let Some(content) = response.content {
                log.push(log_entry(
                    LogEntryType::Response,
                    None,
                    truncate_for_log(&content, 2000),
                ));
                return Ok(AgentRun {
                    id: Uuid::new_v4(),
                    role: self.role,
                    output: content,
                    iterations: iteration + 1,
                    log,
                });
            }

            return Err(anyhow::anyhow!("LLM returned empty response"));
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.max_iterations
        ))
    }

    /// Execute a single tool call.
    async fn execute_tool_call(
        &self,
        tool_call: &ToolCall,
        workspace_path: &Path,
    ) -> anyhow::Result<String> {
        let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)
            .unwrap_or(serde_json::Value::Null);

        tracing::info!("Calling tool {}", tool_call.function.name);
        self.tools
            .execute(&tool_call.function.name, args, workspace_path)
            .await
    }
}

fn log_entry(entry_type: LogEntryType, tool: Option<&str>, content: String) -> TaskLogEntry {
    TaskLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        entry_type,
        tool: tool.map(str::to_string),
        content,
    }
}

/// Truncate a string for logging purposes, on a char boundary.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
