//! Idempotent provisioning of the GitHub Pages deploy workflow.
//!
//! The generator version is persisted as a leading YAML comment rather than
//! a `metadata` key, because GitHub Actions rejects unknown top-level keys.
//! A descriptor is rewritten only when that marker is missing, differs from
//! [`WORKFLOW_VERSION`], or the file no longer parses as a workflow.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::Tool;

pub const WORKFLOW_PATH: &str = ".github/workflows/deploy.yml";
pub const WORKFLOW_VERSION: &str = "1.2.0";

const VERSION_MARKER: &str = "# generator-version:";

/// GitHub Actions workflow, restricted to the fields this generator emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDescriptor {
    pub name: String,
    pub on: Triggers,
    pub env: BTreeMap<String, String>,
    pub jobs: BTreeMap<String, Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    pub push: PushTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushTrigger {
    pub branches: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    pub permissions: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub uses: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<BTreeMap<String, String>>,
}

/// Deploy `site/` to GitHub Pages on every push to `main` touching it.
pub fn deploy_descriptor() -> WorkflowDescriptor {
    let job = Job {
        runs_on: "ubuntu-latest".to_string(),
        permissions: strings(&[("contents", "write"), ("pages", "write"), ("id-token", "write")]),
        steps: vec![
            Step {
                name: "Checkout".to_string(),
                uses: "actions/checkout@v4".to_string(),
                with: None,
            },
            Step {
                name: "Deploy to GitHub Pages".to_string(),
                uses: "JamesIves/github-pages-deploy-action@v4".to_string(),
                with: Some(strings(&[("folder", "site")])),
            },
        ],
    };

    WorkflowDescriptor {
        name: "Deploy to GitHub Pages".to_string(),
        on: Triggers {
            push: PushTrigger {
                branches: vec!["main".to_string()],
                paths: vec!["site/**".to_string()],
            },
        },
        env: strings(&[("GH_TOKEN", "${{ secrets.GITHUB_TOKEN }}"), ("TZ", "America/Sao_Paulo")]),
        jobs: BTreeMap::from([("build-and-deploy".to_string(), job)]),
    }
}

fn strings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Serialized workflow file, version marker first.
pub fn render_workflow(descriptor: &WorkflowDescriptor) -> anyhow::Result<String> {
    let body = serde_yaml::to_string(descriptor)?;
    Ok(format!("{} {}\n{}", VERSION_MARKER, WORKFLOW_VERSION, body))
}

/// Version recorded in the file's leading comment block, if any.
fn recorded_version(text: &str) -> Option<&str> {
    text.lines()
        .take_while(|line| line.trim_start().starts_with('#'))
        .find_map(|line| line.trim().strip_prefix(VERSION_MARKER))
        .map(str::trim)
}

/// What provisioning did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    UpToDate,
    /// Written fresh; `previous` is the version it replaced, if one was recorded.
    Written { previous: Option<String> },
}

/// Write the deploy workflow under `workspace` unless an identical-version
/// descriptor is already present.
pub async fn provision_workflow(workspace: &Path) -> anyhow::Result<ProvisionOutcome> {
    let path = workspace.join(WORKFLOW_PATH);

    let previous = match tokio::fs::read(&path).await {
        // Non-UTF-8 content is just another unreadable descriptor.
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(existing) => {
                let version = recorded_version(&existing).map(str::to_string);
                let parses = serde_yaml::from_str::<WorkflowDescriptor>(&existing).is_ok();
                if parses && version.as_deref() == Some(WORKFLOW_VERSION) {
                    return Ok(ProvisionOutcome::UpToDate);
                }
                version
            }
            Err(_) => None,
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, render_workflow(&deploy_descriptor())?).await?;
    info!(
        "Wrote {} (version {}, previous {:?})",
        WORKFLOW_PATH, WORKFLOW_VERSION, previous
    );

    Ok(ProvisionOutcome::Written { previous })
}

/// Tool wrapper around [`provision_workflow`].
pub struct InfraAsCode;

#[async_trait]
impl Tool for InfraAsCode {
    fn name(&self) -> &str {
        "infra_as_code"
    }

    fn description(&self) -> &str {
        "Idempotently configure the CI/CD workflow (.github/workflows/deploy.yml) that deploys site/ to GitHub Pages on pushes to main."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value, workspace: &Path) -> anyhow::Result<String> {
        Ok(match provision_workflow(workspace).await? {
            ProvisionOutcome::UpToDate => {
                format!("Workflow is already up to date (version {})", WORKFLOW_VERSION)
            }
            ProvisionOutcome::Written { .. } => format!(
                "Deploy workflow configured at {} (version {})",
                WORKFLOW_PATH, WORKFLOW_VERSION
            ),
        })
    }
}
