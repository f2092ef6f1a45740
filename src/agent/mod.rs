//! Agent shells - one per role.
//!
//! Each shell follows a "tools in a loop" pattern:
//! 1. Build context with the role's system prompt and the user instruction
//! 2. Call the LLM with the role's tools
//! 3. If the LLM requests tool calls, execute them and feed results back
//! 4. Repeat until the LLM produces a final response or max iterations reached

mod agent_loop;
mod prompt;
mod types;

pub use agent_loop::Agent;
pub use prompt::build_system_prompt;
pub use types::{AgentRole, AgentRun, LogEntryType, TaskLogEntry};
