//! Context fragments and token budgets

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PaletteError, PaletteResult};

/// Tokens kept free for the model's response
pub const DEFAULT_RESERVED_TOKENS: usize = 500;

/// Default ceiling for a whole generation request
pub const DEFAULT_TOTAL_TOKENS: usize = 4000;

/// Estimate tokens (rough approximation, never below one)
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

/// What a fragment describes; drives base relevance and output section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    DesignTokens,
    FrameworkPatterns,
    ComponentExamples,
    ProjectStructure,
    AvailableImports,
    ConfigurationGuidelines,
    ValidationRules,
    CompatibilityWarnings,
    QualityRequirements,
    AccessibilityGuidelines,
    PerformanceHints,
    UserRequest,
}

impl ContextCategory {
    /// Section order used when formatting the packed context
    pub const ALL: [ContextCategory; 12] = [
        ContextCategory::DesignTokens,
        ContextCategory::FrameworkPatterns,
        ContextCategory::ComponentExamples,
        ContextCategory::ProjectStructure,
        ContextCategory::AvailableImports,
        ContextCategory::ConfigurationGuidelines,
        ContextCategory::ValidationRules,
        ContextCategory::CompatibilityWarnings,
        ContextCategory::QualityRequirements,
        ContextCategory::AccessibilityGuidelines,
        ContextCategory::PerformanceHints,
        ContextCategory::UserRequest,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ContextCategory::DesignTokens => "design_tokens",
            ContextCategory::FrameworkPatterns => "framework_patterns",
            ContextCategory::ComponentExamples => "component_examples",
            ContextCategory::ProjectStructure => "project_structure",
            ContextCategory::AvailableImports => "available_imports",
            ContextCategory::ConfigurationGuidelines => "configuration_guidelines",
            ContextCategory::ValidationRules => "validation_rules",
            ContextCategory::CompatibilityWarnings => "compatibility_warnings",
            ContextCategory::QualityRequirements => "quality_requirements",
            ContextCategory::AccessibilityGuidelines => "accessibility_guidelines",
            ContextCategory::PerformanceHints => "performance_hints",
            ContextCategory::UserRequest => "user_request",
        }
    }

    /// Heading printed above this category's fragments
    pub fn heading(&self) -> &'static str {
        match self {
            ContextCategory::DesignTokens => "DESIGN TOKENS",
            ContextCategory::FrameworkPatterns => "FRAMEWORK PATTERNS",
            ContextCategory::ComponentExamples => "EXISTING COMPONENTS",
            ContextCategory::ProjectStructure => "PROJECT STRUCTURE",
            ContextCategory::AvailableImports => "AVAILABLE IMPORTS",
            ContextCategory::ConfigurationGuidelines => "CONFIGURATION GUIDELINES",
            ContextCategory::ValidationRules => "VALIDATION RULES",
            ContextCategory::CompatibilityWarnings => "COMPATIBILITY WARNINGS",
            ContextCategory::QualityRequirements => "QUALITY REQUIREMENTS",
            ContextCategory::AccessibilityGuidelines => "ACCESSIBILITY",
            ContextCategory::PerformanceHints => "PERFORMANCE HINTS",
            ContextCategory::UserRequest => "REQUEST",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Coarse packing tier. Declaration order is packing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Always retained, even over budget
    Critical,
    High,
    Medium,
    Low,
}

/// A candidate piece of prompt context
#[derive(Debug, Clone, Serialize)]
pub struct ContextFragment {
    pub content: String,
    pub category: ContextCategory,
    pub priority: Priority,
    pub token_estimate: usize,
    pub relevance_score: f32,
    pub compression_ratio: f32,
    pub metadata: BTreeMap<String, Value>,
}

impl ContextFragment {
    pub fn new(content: impl Into<String>, category: ContextCategory, priority: Priority) -> Self {
        let content = content.into();
        let token_estimate = estimate_tokens(&content);
        Self {
            content,
            category,
            priority,
            token_estimate,
            relevance_score: 0.0,
            compression_ratio: 1.0,
            metadata: BTreeMap::new(),
        }
    }

    /// Override the computed token estimate (clamped to at least one)
    pub fn with_token_estimate(mut self, tokens: usize) -> Self {
        self.token_estimate = tokens.max(1);
        self
    }

    /// Record where the fragment came from
    pub fn with_source(self, source: &str) -> Self {
        self.with_metadata("source", Value::from(source))
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    pub fn is_compressed(&self) -> bool {
        self.metadata
            .get("compressed")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Replace the content with a compressed rendition
    pub fn compressed(mut self, content: String, ratio: f32) -> Self {
        let original = self.token_estimate;
        self.token_estimate = estimate_tokens(&content);
        self.content = content;
        self.compression_ratio = ratio;
        self.metadata.insert("compressed".to_string(), Value::Bool(true));
        self.metadata
            .insert("original_tokens".to_string(), Value::from(original));
        self
    }
}

/// Token budget for a single generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextBudget {
    pub total_tokens: usize,
    pub system_prompt_tokens: usize,
    pub user_prompt_tokens: usize,
    pub reserved_tokens: usize,
}

impl ContextBudget {
    pub fn new(
        total_tokens: usize,
        system_prompt_tokens: usize,
        user_prompt_tokens: usize,
        reserved_tokens: usize,
    ) -> PaletteResult<Self> {
        if total_tokens <= reserved_tokens {
            return Err(PaletteError::InvalidBudget {
                total: total_tokens,
                reserved: reserved_tokens,
            });
        }

        Ok(Self {
            total_tokens,
            system_prompt_tokens,
            user_prompt_tokens,
            reserved_tokens,
        })
    }

    /// Budget measured from the fixed prompt strings
    pub fn for_prompts(
        total_tokens: usize,
        reserved_tokens: usize,
        system_prompt: &str,
        user_prompt: &str,
    ) -> PaletteResult<Self> {
        Self::new(
            total_tokens,
            estimate_tokens(system_prompt),
            estimate_tokens(user_prompt),
            reserved_tokens,
        )
    }

    pub fn available_tokens(&self) -> usize {
        self.total_tokens.saturating_sub(self.reserved_tokens)
    }

    /// Tokens left for injected context
    pub fn context_tokens(&self) -> usize {
        self.available_tokens()
            .saturating_sub(self.system_prompt_tokens)
            .saturating_sub(self.user_prompt_tokens)
    }
}
