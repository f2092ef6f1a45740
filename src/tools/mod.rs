//! Tools the agents can call.
//!
//! Each tool is a named, independently invocable operation with a JSON
//! Schema for its arguments. The model picks which ones to run; the registry
//! dispatches by name.

mod git;
mod site;
mod workflow;

pub use git::{
    classify_paths, commit_message, CommitChanges, CommitOutcome, CommitType, GitToolError,
    PushToGitHub,
};
pub use site::{normalize_asset_paths, CreateCss, CreateHtml, CreateJs, CSS_PATH, HTML_PATH, JS_PATH};
pub use workflow::{
    deploy_descriptor, provision_workflow, InfraAsCode, ProvisionOutcome, WorkflowDescriptor,
    WORKFLOW_PATH, WORKFLOW_VERSION,
};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GitHubConfig;
use crate::llm::{FunctionSchema, ToolSchema};

/// A callable side-effecting operation exposed to an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the accepted arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool against `workspace` and describe what happened.
    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered set of tools available to one agent.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML, CSS and JS emitters.
    pub fn site_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CreateHtml));
        registry.register(Arc::new(CreateCss));
        registry.register(Arc::new(CreateJs));
        registry
    }

    /// Commit, push and workflow provisioning.
    pub fn devops_tools(github: &GitHubConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CommitChanges::new(github)));
        registry.register(Arc::new(PushToGitHub::new(github)));
        registry.register(Arc::new(InfraAsCode));
        registry
    }

    /// Add a tool, replacing any tool already registered under its name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema {
                tool_type: "function".to_string(),
                function: FunctionSchema {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tool.execute(args, workspace).await
    }
}
