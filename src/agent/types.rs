//! Agent run results and execution log types.

use serde::Serialize;
use uuid::Uuid;

/// Which shell is running: selects prompt, toolset and API version.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Front-end developer writing the site files
    SiteCreator,
    /// Commits, pushes and provisions the deploy workflow
    DevOps,
}

impl AgentRole {
    /// Azure OpenAI API version used when the configuration does not pin one.
    pub fn default_api_version(&self) -> &'static str {
        match self {
            Self::SiteCreator => "2025-01-01-preview",
            Self::DevOps => "2024-05-01-preview",
        }
    }
}

/// Outcome of one `Agent::run` call.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub id: Uuid,

    pub role: AgentRole,

    /// Final text produced by the model
    pub output: String,

    /// Number of model turns taken
    pub iterations: usize,

    /// Tool calls, their results and the final response, in order
    pub log: Vec<TaskLogEntry>,
}

impl AgentRun {
    /// Tool names called during the run, in call order.
    pub fn tool_calls(&self) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|e| match &e.entry_type {
                LogEntryType::ToolCall => e.tool.as_deref(),
                _ => None,
            })
            .collect()
    }
}

/// A single entry in the run log.
#[derive(Debug, Clone, Serialize)]
pub struct TaskLogEntry {
    /// Timestamp (RFC 3339)
    pub timestamp: String,

    pub entry_type: LogEntryType,

    /// Tool the entry refers to, for tool calls and results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    pub content: String,
}

/// Types of log entries.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    ToolCall,
    ToolResult,
    Response,
}
