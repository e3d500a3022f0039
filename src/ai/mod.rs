//! LLM client, prompt templates and reply parsing

pub mod claude;
pub mod prompts;
pub mod response;

pub use claude::{ClaudeClient, Completion};
pub use response::{parse_files, GeneratedFile};
