//! # Portfolio Agents
//!
//! Two LLM-driven agents that scaffold a static portfolio website and ship it
//! to GitHub Pages.
//!
//! This library provides:
//! - A site creator agent whose tools write `site/index.html`,
//!   `site/css/style.css` and `site/js/main.js`
//! - A DevOps agent whose tools commit with Conventional Commits messages,
//!   push `main` to GitHub and provision the Pages deploy workflow
//! - An orchestrator running both with fixed instructions
//!
//! ## Architecture
//!
//! Each agent follows the "tools in a loop" pattern:
//! 1. Build context with the role's system prompt and the instruction
//! 2. Call the chat-completion model with the role's tools
//! 3. Execute any requested tool calls and feed the results back
//! 4. Repeat until the model answers in plain text
//!
//! ## Example
//!
//! ```rust,ignore
//! use portfolio_agents::{config::Config, orchestrator::Orchestrator};
//!
//! let config = Config::from_env()?;
//! let report = Orchestrator::new(&config)?.run().await?;
//! println!("{}", report.pages_url);
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod orchestrator;
pub mod tools;

pub use config::Config;
