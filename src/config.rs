//! Configuration management for the portfolio agents.
//!
//! Configuration is read once from environment variables:
//! - `AZURE_OPENAI_API_KEY` - Required. Key for the Azure OpenAI deployment.
//! - `GITHUB_USERNAME` - Required. Commit author name and GitHub account.
//! - `GITHUB_EMAIL` - Required. Commit author email.
//! - `GITHUB_TOKEN` - Required. Personal access token used for pushing.
//! - `GITHUB_REPO` - Required. Target repository name.
//! - `AZURE_OPENAI_ENDPOINT` - Optional here, required to build a chat client.
//! - `DEPLOYMENT_NAME` - Optional here, required to build a chat client.
//! - `OPENAI_API_VERSION` - Optional. Overrides the per-agent API version.
//! - `WORKSPACE_PATH` - Optional. Project root. Defaults to current directory.
//! - `MAX_ITERATIONS` - Optional. Agent loop bound. Defaults to `25`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.7`.
//! - `GITHUB_REMOTE_BASE` - Optional. Defaults to `https://github.com`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Variables that must be present before any agent runs, in report order.
pub const REQUIRED_VARS: [&str; 5] = [
    "AZURE_OPENAI_API_KEY",
    "GITHUB_USERNAME",
    "GITHUB_EMAIL",
    "GITHUB_TOKEN",
    "GITHUB_REPO",
];

pub const DEFAULT_REMOTE_BASE: &str = "https://github.com";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Azure OpenAI connection settings.
#[derive(Clone)]
pub struct AzureConfig {
    pub api_key: String,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    /// Explicit API version; when unset each agent role picks its own default.
    pub api_version: Option<String>,
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("api_key", &"***")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// GitHub identity and push target.
#[derive(Clone)]
pub struct GitHubConfig {
    pub username: String,
    pub email: String,
    pub token: String,
    pub repo: String,
    /// Base URL the remote is derived from (`{base}/{username}/{repo}.git`).
    pub remote_base: String,
}

impl GitHubConfig {
    /// Public GitHub Pages address of the deployed site.
    pub fn pages_url(&self) -> String {
        format!("https://{}.github.io/{}", self.username, self.repo)
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("token", &"***")
            .field("repo", &self.repo)
            .field("remote_base", &self.remote_base)
            .finish()
    }
}

/// Process-wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub azure: AzureConfig,
    pub github: GitHubConfig,

    /// Project root; every tool resolves its paths against it
    pub workspace_path: PathBuf,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    pub temperature: f32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVars` listing every absent entry of
    /// [`REQUIRED_VARS`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing = missing_required_vars(&get);
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }
        let required =
            |name: &str| get(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()));

        let azure = AzureConfig {
            api_key: required("AZURE_OPENAI_API_KEY")?,
            endpoint: get("AZURE_OPENAI_ENDPOINT"),
            deployment: get("DEPLOYMENT_NAME"),
            api_version: get("OPENAI_API_VERSION"),
        };

        let github = GitHubConfig {
            username: required("GITHUB_USERNAME")?,
            email: required("GITHUB_EMAIL")?,
            token: required("GITHUB_TOKEN")?,
            repo: required("GITHUB_REPO")?,
            remote_base: get("GITHUB_REMOTE_BASE")
                .unwrap_or_else(|| DEFAULT_REMOTE_BASE.to_string()),
        };

        let workspace_path = get("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let max_iterations = get("MAX_ITERATIONS")
            .unwrap_or_else(|| "25".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e)))?;

        let temperature = get("LLM_TEMPERATURE")
            .unwrap_or_else(|| "0.7".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("LLM_TEMPERATURE".to_string(), format!("{}", e)))?;

        Ok(Self {
            azure,
            github,
            workspace_path,
            max_iterations,
            temperature,
        })
    }

    /// Return a copy rooted at a different workspace.
    pub fn with_workspace(mut self, workspace_path: PathBuf) -> Self {
        self.workspace_path = workspace_path;
        self
    }
}

/// Names from [`REQUIRED_VARS`] the lookup cannot resolve to a non-empty value.
pub fn missing_required_vars<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARS
        .iter()
        .filter(|&&name| lookup(name).map_or(true, |v| v.trim().is_empty()))
        .map(|name| name.to_string())
        .collect()
}
