//! Context management for AI operations
//!
//! Selects, scores, compresses and packs project context into the token
//! budget left over by the fixed prompts.

pub mod compression;
pub mod configured;
pub mod fragment;
pub mod loader;
pub mod manager;
pub mod relevance;

pub use configured::ConfigurationAwareContextManager;
pub use fragment::{ContextBudget, ContextCategory, ContextFragment, Priority};
pub use loader::PackingStrategy;
pub use manager::{ContextManager, ContextSettings, ContextStats, OptimizedContext};
