//! Git operation tools: semantic commits and pushing to GitHub.
//!
//! Both tools report every outcome as text. Failures come back as
//! `Error: ...` strings so the model can react to them instead of the
//! agent loop aborting.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

use super::Tool;
use crate::config::GitHubConfig;

const BRANCH: &str = "main";
const REMOTE: &str = "origin";

/// Path groups checked in priority order; first match wins.
const CONTENT_PATHS: &[&str] = &["site/content/", "site/docs/"];
const UI_PATHS: &[&str] = &["site/styles/", "site/components/"];
const DEVOPS_PATHS: &[&str] = &["src/agent/", "src/tools/", ".github/workflows/"];

/// Closed set of Git tool failures.
#[derive(Debug, Error)]
pub enum GitToolError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("authentication failure: {0}")]
    Auth(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("git failure: {0}")]
    Command(String),
}

impl GitToolError {
    /// Classify a failed git invocation from its stderr.
    fn from_stderr(stderr: &str) -> Self {
        const AUTH_MARKERS: &[&str] = &[
            "authentication failed",
            "could not read username",
            "could not read password",
            "permission denied",
            "403",
            "401",
        ];
        const NETWORK_MARKERS: &[&str] = &[
            "could not resolve host",
            "failed to connect",
            "connection refused",
            "connection reset",
            "timed out",
            "network is unreachable",
        ];

        let message = stderr.trim().to_string();
        let lower = message.to_lowercase();
        if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::Auth(message)
        } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::Network(message)
        } else {
            Self::Command(message)
        }
    }
}

/// Conventional commit type derived from the staged paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    DocsContent,
    FeatUi,
    ChoreDevops,
    Chore,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocsContent => "docs(content)",
            Self::FeatUi => "feat(ui)",
            Self::ChoreDevops => "chore(devops)",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the commit type for a diff (or list of changed paths).
pub fn classify_paths(diff: &str) -> CommitType {
    let touches = |group: &[&str]| group.iter().any(|prefix| diff.contains(prefix));

    if touches(CONTENT_PATHS) {
        CommitType::DocsContent
    } else if touches(UI_PATHS) {
        CommitType::FeatUi
    } else if touches(DEVOPS_PATHS) {
        CommitType::ChoreDevops
    } else {
        CommitType::Chore
    }
}

/// `<type>: automated update YYYYMMDD-HHMMSS`, timestamp in UTC.
pub fn commit_message(kind: CommitType, at: DateTime<Utc>) -> String {
    format!("{}: automated update {}", kind, at.format("%Y%m%d-%H%M%S"))
}

/// What the commit tool did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    NothingToCommit,
    Committed { message: String },
}

/// Stage everything and commit it with a generated conventional message.
pub struct CommitChanges {
    author_name: String,
    author_email: String,
}

impl CommitChanges {
    pub fn new(github: &GitHubConfig) -> Self {
        Self {
            author_name: github.username.clone(),
            author_email: github.email.clone(),
        }
    }

    pub async fn commit(&self, workspace: &Path) -> Result<CommitOutcome, GitToolError> {
        ensure_repository(workspace).await?;

        let status = run_git_command(&["status", "--porcelain"], workspace).await?;
        if status.trim().is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }

        run_git_command(&["add", "-A"], workspace).await?;
        let staged = run_git_command(&["diff", "--cached", "--name-only"], workspace).await?;
        // Dirty but unstageable, e.g. untracked content inside a submodule.
        if staged.trim().is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }
        let message = commit_message(classify_paths(&staged), Utc::now());

        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        run_git_command(
            &["-c", name.as_str(), "-c", email.as_str(), "commit", "-m", message.as_str()],
            workspace,
        )
        .await?;

        info!("Committed: {}", message);
        Ok(CommitOutcome::Committed { message })
    }
}

#[async_trait]
impl Tool for CommitChanges {
    fn name(&self) -> &str {
        "commit_changes"
    }

    fn description(&self) -> &str {
        "Stage all changes and commit them with a Conventional Commits message derived from the changed paths."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value, workspace: &Path) -> anyhow::Result<String> {
        Ok(match self.commit(workspace).await {
            Ok(CommitOutcome::NothingToCommit) => "No changes detected to commit".to_string(),
            Ok(CommitOutcome::Committed { message }) => format!("Commit created: {}", message),
            Err(e) => {
                warn!("Commit failed: {}", e);
                format!("Error: commit failed: {}", e)
            }
        })
    }
}

/// Point `origin` at the GitHub repository and push `main` to it.
pub struct PushToGitHub {
    username: String,
    token: String,
    remote_url: String,
}

impl PushToGitHub {
    pub fn new(github: &GitHubConfig) -> Self {
        Self {
            username: github.username.clone(),
            token: github.token.clone(),
            remote_url: format!(
                "{}/{}/{}.git",
                github.remote_base.trim_end_matches('/'),
                github.username,
                github.repo
            ),
        }
    }

    /// Credential-free remote URL stored in the repository config.
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub async fn push(&self, workspace: &Path) -> Result<(), GitToolError> {
        let remotes = run_git_command(&["remote"], workspace).await?;
        let action = if remotes.lines().any(|r| r.trim() == REMOTE) {
            "set-url"
        } else {
            "add"
        };
        run_git_command(&["remote", action, REMOTE, self.remote_url.as_str()], workspace).await?;

        let refspec = format!("{}:{}", BRANCH, BRANCH);
        let mut args: Vec<String> = Vec::new();
        if let Some(header) = self.auth_header_config()? {
            args.push("-c".to_string());
            args.push(header);
        }
        args.extend(["push", REMOTE, refspec.as_str()].map(String::from));

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git_command(&args, workspace)
            .await
            .map_err(|e| self.redact(e))?;

        info!("Pushed {} to {}/{} ({})", BRANCH, REMOTE, BRANCH, self.remote_url);
        Ok(())
    }

    /// Per-invocation basic-auth header scoped to the remote's origin.
    /// Returns `None` for non-HTTP remotes.
    fn auth_header_config(&self) -> Result<Option<String>, GitToolError> {
        let url = url::Url::parse(&self.remote_url).map_err(|e| {
            GitToolError::Command(format!("invalid remote URL {}: {}", self.remote_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(None);
        }

        let host = url.host_str().unwrap_or_default();
        let scope = match url.port() {
            Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
            None => format!("{}://{}/", url.scheme(), host),
        };
        Ok(Some(format!(
            "http.{}.extraheader=AUTHORIZATION: basic {}",
            scope,
            self.encoded_credentials()
        )))
    }

    fn encoded_credentials(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", self.username, self.token))
    }

    /// Scrub both the raw token and its basic-auth encoding.
    fn redact(&self, err: GitToolError) -> GitToolError {
        let encoded = self.encoded_credentials();
        let scrub = |s: String| redact_secret(&redact_secret(&s, &encoded), &self.token);
        match err {
            GitToolError::Auth(s) => GitToolError::Auth(scrub(s)),
            GitToolError::Network(s) => GitToolError::Network(scrub(s)),
            GitToolError::Command(s) => GitToolError::Command(scrub(s)),
            other => other,
        }
    }
}

#[async_trait]
impl Tool for PushToGitHub {
    fn name(&self) -> &str {
        "push_to_github"
    }

    fn description(&self) -> &str {
        "Push the local main branch to the main branch of the configured GitHub repository (never forced)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value, workspace: &Path) -> anyhow::Result<String> {
        Ok(match self.push(workspace).await {
            Ok(()) => format!("Pushed successfully to branch {}", BRANCH),
            Err(e) => {
                warn!("Push failed: {}", e);
                format!("Error: push failed: {}", e)
            }
        })
    }
}

/// Replace every occurrence of `secret` with `***`.
fn redact_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}

/// Initialize a repository whose unborn branch is `main` unless `workspace`
/// already sits inside a work tree (its own or an enclosing one).
async fn ensure_repository(workspace: &Path) -> Result<(), GitToolError> {
    let inside = run_git_command(&["rev-parse", "--is-inside-work-tree"], workspace).await;
    if matches!(inside.as_deref().map(str::trim), Ok("true")) {
        return Ok(());
    }

    info!("Initializing Git repository at {}", workspace.display());
    run_git_command(&["init"], workspace).await?;
    let head = format!("refs/heads/{}", BRANCH);
    run_git_command(&["symbolic-ref", "HEAD", head.as_str()], workspace).await?;
    Ok(())
}

/// Run a git command and return its output.
async fn run_git_command(args: &[&str], workspace: &Path) -> Result<String, GitToolError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workspace)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        if stderr.trim().is_empty() {
            return Err(GitToolError::Command(format!(
                "git {} exited with {}: {}",
                subcommand(args),
                output.status,
                stdout.trim()
            )));
        }
        return Err(GitToolError::from_stderr(&stderr));
    }

    Ok(stdout.to_string())
}

/// The git subcommand in `args`, skipping global options and `-c` values.
fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut args = args.iter().copied();
    while let Some(arg) = args.next() {
        if arg == "-c" {
            args.next();
        } else if !arg.starts_with('-') {
            return arg;
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn github(remote_base: &str) -> GitHubConfig {
        GitHubConfig {
            username: "octo".to_string(),
            email: "octo@example.com".to_string(),
            token: "ghp_secret".to_string(),
            repo: "portfolio".to_string(),
            remote_base: remote_base.to_string(),
        }
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git runs");
        assert!(output.status.success(), "git {:?} failed: {:?}", args, output);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[test]
    fn content_paths_win_over_everything() {
        let diff = "site/styles/main.css\nsite/content/about.md\nsrc/tools/git.rs\n";
        assert_eq!(classify_paths(diff), CommitType::DocsContent);
    }

    #[test]
    fn ui_paths_win_over_devops() {
        let diff = "src/agent/prompt.rs\nsite/components/card.html\n";
        assert_eq!(classify_paths(diff), CommitType::FeatUi);
    }

    #[test]
    fn devops_and_generic_classification() {
        assert_eq!(classify_paths("src/tools/workflow.rs\n"), CommitType::ChoreDevops);
        assert_eq!(classify_paths(".github/workflows/deploy.yml\n"), CommitType::ChoreDevops);
        assert_eq!(classify_paths("site/index.html\nREADME.md\n"), CommitType::Chore);
        assert_eq!(classify_paths(""), CommitType::Chore);
    }

    #[test]
    fn message_embeds_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            commit_message(CommitType::FeatUi, at),
            "feat(ui): automated update 20240307-090502"
        );

        let now = commit_message(CommitType::Chore, Utc::now());
        let pattern = regex::Regex::new(r"^chore: automated update \d{8}-\d{6}$").unwrap();
        assert!(pattern.is_match(&now), "unexpected message: {}", now);
    }

    #[test]
    fn stderr_classification() {
        assert!(matches!(
            GitToolError::from_stderr("fatal: Authentication failed for 'https://github.com/x'"),
            GitToolError::Auth(_)
        ));
        assert!(matches!(
            GitToolError::from_stderr("fatal: unable to access 'https://x/': The requested URL returned error: 403"),
            GitToolError::Auth(_)
        ));
        assert!(matches!(
            GitToolError::from_stderr("fatal: unable to access 'https://x/': Could not resolve host: x"),
            GitToolError::Network(_)
        ));
        assert!(matches!(
            GitToolError::from_stderr("error: src refspec main does not match any"),
            GitToolError::Command(_)
        ));
    }

    #[test]
    fn remote_url_carries_no_credentials() {
        let push = PushToGitHub::new(&github("https://github.com/"));
        assert_eq!(push.remote_url(), "https://github.com/octo/portfolio.git");
        assert!(!push.remote_url().contains("ghp_secret"));
    }

    #[test]
    fn auth_header_is_scoped_to_remote_host() {
        let push = PushToGitHub::new(&github("https://github.com"));
        let header = push.auth_header_config().unwrap().unwrap();

        let expected = base64::engine::general_purpose::STANDARD.encode("octo:ghp_secret");
        assert_eq!(
            header,
            format!("http.https://github.com/.extraheader=AUTHORIZATION: basic {}", expected)
        );

        let local = PushToGitHub::new(&github("file:///tmp/remotes"));
        assert!(local.auth_header_config().unwrap().is_none());
    }

    #[test]
    fn errors_are_redacted() {
        let push = PushToGitHub::new(&github("https://github.com"));
        let err = push.redact(GitToolError::Auth("bad token ghp_secret".to_string()));
        assert_eq!(err.to_string(), "authentication failure: bad token ***");

        let header = push.auth_header_config().unwrap().unwrap();
        let err = push.redact(GitToolError::Command(format!("bad config: {}", header)));
        let text = err.to_string();
        assert!(!text.contains(&push.encoded_credentials()), "{}", text);
        assert!(text.ends_with("AUTHORIZATION: basic ***"), "{}", text);
    }

    #[test]
    fn failure_text_names_the_subcommand() {
        assert_eq!(
            subcommand(&["-c", "user.name=octo", "-c", "user.email=o@x", "commit", "-m", "x"]),
            "commit"
        );
        assert_eq!(subcommand(&["-c", "http.extraheader=x", "push", "origin"]), "push");
        assert_eq!(subcommand(&["status", "--porcelain"]), "status");
        assert_eq!(subcommand(&["--version"]), "");
    }

    #[tokio::test]
    async fn clean_repository_is_a_noop() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let tool = CommitChanges::new(&github("https://github.com"));

        std::fs::write(dir.path().join("README.md"), "hello").unwrap();
        let first = tool.commit(dir.path()).await.unwrap();
        assert!(matches!(first, CommitOutcome::Committed { .. }));
        let head = git(dir.path(), &["rev-parse", "HEAD"]);

        let report = tool.execute(json!({}), dir.path()).await.unwrap();
        assert_eq!(report, "No changes detected to commit");
        assert_eq!(git(dir.path(), &["rev-parse", "HEAD"]), head);
    }

    #[tokio::test]
    async fn commit_initializes_main_and_uses_configured_author() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("site/styles")).unwrap();
        std::fs::write(dir.path().join("site/styles/theme.css"), "body{}").unwrap();

        let report = CommitChanges::new(&github("https://github.com"))
            .execute(json!({}), dir.path())
            .await
            .unwrap();

        assert!(report.starts_with("Commit created: feat(ui): automated update "), "{}", report);
        assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
        assert_eq!(
            git(dir.path(), &["log", "-1", "--format=%an <%ae>"]),
            "octo <octo@example.com>"
        );
    }

    #[tokio::test]
    async fn workspace_inside_existing_repository_commits_there() {
        if !git_available() {
            return;
        }
        let outer = tempfile::tempdir().unwrap();
        git(outer.path(), &["init"]);
        let workspace = outer.path().join("portfolio");
        std::fs::create_dir_all(workspace.join("site")).unwrap();
        std::fs::write(workspace.join("site/index.html"), "<html></html>").unwrap();

        let outcome = CommitChanges::new(&github("https://github.com"))
            .commit(&workspace)
            .await
            .unwrap();

        assert!(matches!(outcome, CommitOutcome::Committed { .. }));
        assert!(!workspace.join(".git").exists());
        assert_eq!(git(outer.path(), &["rev-list", "--count", "HEAD"]), "1");
        assert_eq!(
            git(outer.path(), &["log", "-1", "--name-only", "--format="]),
            "portfolio/site/index.html"
        );
    }

    #[tokio::test]
    async fn untracked_files_count_as_changes() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let tool = CommitChanges::new(&github("https://github.com"));
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        tool.commit(dir.path()).await.unwrap();

        std::fs::create_dir_all(dir.path().join("site/docs")).unwrap();
        std::fs::write(dir.path().join("site/docs/intro.md"), "# Intro").unwrap();

        match tool.commit(dir.path()).await.unwrap() {
            CommitOutcome::Committed { message } => assert!(message.starts_with("docs(content): ")),
            other => panic!("expected a commit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn push_creates_origin_and_updates_remote_main() {
        if !git_available() {
            return;
        }
        let remotes = tempfile::tempdir().unwrap();
        let bare = remotes.path().join("octo/portfolio.git");
        std::fs::create_dir_all(&bare).unwrap();
        git(&bare, &["init", "--bare"]);

        let work = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join("index.html"), "<html></html>").unwrap();
        let base = format!("file://{}", remotes.path().display());
        let config = github(&base);
        CommitChanges::new(&config).commit(work.path()).await.unwrap();

        let push = PushToGitHub::new(&config);
        let report = push.execute(json!({}), work.path()).await.unwrap();
        assert_eq!(report, "Pushed successfully to branch main");

        assert_eq!(git(work.path(), &["remote", "get-url", "origin"]), push.remote_url());
        assert_eq!(
            git(&bare, &["rev-parse", "main"]),
            git(work.path(), &["rev-parse", "HEAD"])
        );

        // Second push reuses the existing remote.
        let again = push.execute(json!({}), work.path()).await.unwrap();
        assert_eq!(again, "Pushed successfully to branch main");
    }

    #[tokio::test]
    async fn push_failure_is_reported_not_raised() {
        if !git_available() {
            return;
        }
        let work = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join("x"), "x").unwrap();
        let config = github("file:///nonexistent-remote-root");
        CommitChanges::new(&config).commit(work.path()).await.unwrap();

        let report = PushToGitHub::new(&config)
            .execute(json!({}), work.path())
            .await
            .unwrap();
        assert!(report.starts_with("Error: push failed: "), "{}", report);
        assert!(!report.contains("ghp_secret"));
    }

    #[tokio::test]
    async fn outside_a_repository_push_reports_error() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let report = PushToGitHub::new(&github("https://github.com"))
            .execute(json!({}), dir.path())
            .await
            .unwrap();
        assert!(report.starts_with("Error: push failed: git failure: "), "{}", report);
    }
}
