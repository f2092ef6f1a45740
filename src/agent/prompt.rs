//! System prompt templates for the agents.

use super::AgentRole;
use crate::tools::ToolRegistry;

/// Build the system prompt for `role` with tool definitions.
pub fn build_system_prompt(role: AgentRole, workspace_path: &str, tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = match role {
        AgentRole::SiteCreator => SITE_CREATOR_RULES,
        AgentRole::DevOps => DEVOPS_RULES,
    };

    format!(
        r#"{rules}

You operate in the project directory: {workspace_path}

## Your Tools

{tool_descriptions}

Use the tools to make changes; don't describe file contents without writing them. When you are done, reply with a short summary of what you did and anything that failed."#,
        rules = rules,
        workspace_path = workspace_path,
        tool_descriptions = tool_descriptions
    )
}

const SITE_CREATOR_RULES: &str = r#"You are an expert front-end web developer building a static portfolio site.

## Mandatory Rules

1. Every stylesheet reference must use the path 'css/style.css'.
2. Every script reference must use the path 'js/main.js'.
3. Use semantic HTML5 tags.
4. Build a responsive layout with media queries.
5. Include meta tags for SEO."#;

const DEVOPS_RULES: &str = r#"You are a DevOps and CI/CD automation expert.

## Responsibilities

1. Manage semantic (Conventional Commits) commits.
2. Push to the main branch.
3. Keep the repository intact: never force-push, never rewrite history.
4. Keep the GitHub Pages deploy workflow configured."#;
