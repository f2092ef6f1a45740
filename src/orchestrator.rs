//! Sequences the two agents: build the site, then ship it.

use serde::Serialize;
use tracing::info;

use crate::agent::{Agent, AgentRole, AgentRun};
use crate::config::Config;

/// Brief handed to the site creator.
pub const SITE_BRIEF: &str = r#"Build a professional, responsive portfolio website with:

1. Semantic HTML structure:
   - Fixed header with a logo (the owner's name) and smooth-scrolling navigation (Home, Projects, Skills, Contact).
   - Hero section: two-column grid on large screens (text / image), headline, subtitle and a "View Projects" call to action; circular avatar with a softly glowing gradient border.
   - Projects section: responsive grid (3 columns on desktop, 1 on mobile) of clickable cards, each with a featured image (placeholder from https://placehold.co), technology tags with hover effects, and a modal with the project description opened from JavaScript.
   - Contact section: form with name, email and message fields, basic validation and a CSS loading spinner on submit.
2. Modern CSS:
   - CSS variables for the main colours (e.g. --primary-color: #2ecc71;).
   - Subtle gradients on buttons and borders.
   - Fade-in on scroll (Intersection Observer) and cards lifting with transform: translateY(-5px) on hover.
   - Mobile-first media queries at 768px and 1024px.
3. JavaScript:
   - Smooth scrolling with scrollIntoView({behavior: 'smooth'}).
   - Project modal populated from data.
   - Form submit that prevents the default action, simulates sending with setTimeout() and shows a success message.
4. Technical requirements: SEO meta tags (description, keywords) and an optimized title, Font Awesome icons for social links in a fixed footer, clean commented code organized by section.
5. Personalization: use placeholders such as [YOUR_NAME] and [YOUR_EMAIL], and mark customizable areas with "// EDIT HERE" comments.

Write the three files with the create_html, create_css and create_js tools."#;

/// Instruction for the full DevOps stage after the site exists.
pub const DEVOPS_BRIEF: &str = "Set up a Git repository for this project, commit the changes and \
configure GitHub Actions to deploy automatically to GitHub Pages whenever there is a push to the \
main branch.";

/// Instruction for committing pending work only.
pub const COMMIT_BRIEF: &str = "Commit the current changes following Conventional Commits.";

/// Instruction for provisioning the pipeline on its own.
pub const DEPLOY_BRIEF: &str = "Configure the complete pipeline with deployment to GitHub Pages.";

/// Result of the full site-then-deploy flow.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub site: AgentRun,
    pub devops: AgentRun,
    /// Where GitHub Pages will serve the site
    pub pages_url: String,
}

/// Owns both agent shells and runs them with fixed instructions.
pub struct Orchestrator {
    site_creator: Agent,
    devops: Agent,
    pages_url: String,
}

impl Orchestrator {
    /// Build both shells from configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_agents(
            config,
            Agent::new(config, AgentRole::SiteCreator)?,
            Agent::new(config, AgentRole::DevOps)?,
        ))
    }

    /// Use pre-built shells.
    pub fn with_agents(config: &Config, site_creator: Agent, devops: Agent) -> Self {
        Self {
            site_creator,
            devops,
            pages_url: config.github.pages_url(),
        }
    }

    /// Create the site, then commit, push and provision the deploy workflow.
    pub async fn run(&self) -> anyhow::Result<PipelineReport> {
        info!("Site creator agent starting");
        let site = self.create_site().await?;
        info!("Site creator finished: {}", site.output);

        info!("DevOps agent starting");
        let devops = self.devops.run(DEVOPS_BRIEF).await?;
        info!("DevOps agent finished: {}", devops.output);

        Ok(PipelineReport {
            site,
            devops,
            pages_url: self.pages_url.clone(),
        })
    }

    /// Only generate the site files.
    pub async fn create_site(&self) -> anyhow::Result<AgentRun> {
        self.site_creator.run(SITE_BRIEF).await
    }

    /// Commit pending changes through the DevOps agent.
    pub async fn commit(&self) -> anyhow::Result<AgentRun> {
        self.devops.run(COMMIT_BRIEF).await
    }

    /// Configure the deploy pipeline through the DevOps agent.
    pub async fn deploy(&self) -> anyhow::Result<AgentRun> {
        self.devops.run(DEPLOY_BRIEF).await
    }

    pub fn pages_url(&self) -> &str {
        &self.pages_url
    }
}
