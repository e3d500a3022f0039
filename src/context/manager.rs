//! Context manager - turns a project context into a bounded prompt addendum

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use super::compression::truncate_token_list;
use super::fragment::{
    ContextBudget, ContextCategory, ContextFragment, Priority, DEFAULT_RESERVED_TOKENS,
    DEFAULT_TOTAL_TOKENS,
};
use super::loader::{HierarchicalLoader, PackStats, PackingStrategy};
use super::relevance::RelevanceScorer;
use crate::error::PaletteResult;
use crate::project::{ComponentInfo, DesignTokens, ProjectContext, ProjectStructure};

pub const DEFAULT_MAX_COMPONENT_EXAMPLES: usize = 5;

/// Knobs for a context optimization pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextSettings {
    pub total_tokens: usize,
    pub reserved_tokens: usize,
    pub max_component_examples: usize,
    pub strategy: PackingStrategy,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            total_tokens: DEFAULT_TOTAL_TOKENS,
            reserved_tokens: DEFAULT_RESERVED_TOKENS,
            max_component_examples: DEFAULT_MAX_COMPONENT_EXAMPLES,
            strategy: PackingStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenBudgetStats {
    pub total: usize,
    pub available: usize,
    pub system_prompt: usize,
    pub user_prompt: usize,
    pub reserved: usize,
    pub context: usize,
}

impl From<&ContextBudget> for TokenBudgetStats {
    fn from(budget: &ContextBudget) -> Self {
        Self {
            total: budget.total_tokens,
            available: budget.available_tokens(),
            system_prompt: budget.system_prompt_tokens,
            user_prompt: budget.user_prompt_tokens,
            reserved: budget.reserved_tokens,
            context: budget.context_tokens(),
        }
    }
}

/// Configuration metadata merged in by the configuration-aware manager
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationStats {
    pub framework: String,
    pub styling_system: String,
    pub component_library: String,
    pub confidence: f32,
    pub strategy: String,
    pub fragments_filtered: usize,
    pub fragments_force_kept: usize,
    pub fragments_synthesized: usize,
    pub weight_overrides: BTreeMap<String, f32>,
}

/// Informational stats about one optimization pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextStats {
    pub token_budget: TokenBudgetStats,
    pub packing: PackStats,
    pub chunks_by_type: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ConfigurationStats>,
}

/// Prompts ready to send plus what went into them
#[derive(Debug, Clone)]
pub struct OptimizedContext {
    pub system_prompt: String,
    pub user_prompt: String,
    pub selected: Vec<ContextFragment>,
    pub stats: ContextStats,
}

/// Packs project context into the system prompt within a token budget
#[derive(Debug, Clone, Default)]
pub struct ContextManager {
    settings: ContextSettings,
}

impl ContextManager {
    pub fn new(settings: ContextSettings) -> Self {
        Self { settings }
    }

    /// Optimize `project` into `system_base` for `request`
    pub fn optimize_context(
        &self,
        request: &str,
        project: &ProjectContext,
        system_base: &str,
        user_base: &str,
    ) -> PaletteResult<OptimizedContext> {
        let fragments = self.build_fragments(project);
        self.pack_and_format(request, fragments, RelevanceScorer::new(), system_base, user_base)
    }

    /// Fragments drawn from a project context, in a stable order
    pub fn build_fragments(&self, project: &ProjectContext) -> Vec<ContextFragment> {
        let mut fragments = Vec::new();

        if let Some(tokens) = project.design_tokens.as_ref().filter(|t| !t.is_empty()) {
            fragments.push(
                ContextFragment::new(
                    format_design_tokens(tokens),
                    ContextCategory::DesignTokens,
                    Priority::High,
                )
                    .with_source("design_tokens"),
            );
        }

        if let Some(framework) = project.framework.as_deref() {
            fragments.push(
                ContextFragment::new(
                    format_framework(framework, project.styling.as_deref(), project.typescript),
                    ContextCategory::FrameworkPatterns,
                    Priority::High,
                )
                .with_source("framework"),
            );
        }

        for component in project.components.iter().take(self.settings.max_component_examples) {
            fragments.push(
                ContextFragment::new(
                    format_component(component),
                    ContextCategory::ComponentExamples,
                    Priority::Medium,
                )
                .with_source(&format!("components.{}", component.name)),
            );
        }

        if let Some(structure) = project.project_structure.as_ref() {
            fragments.push(
                ContextFragment::new(
                    format_structure(
                        structure,
                        project.framework.as_deref(),
                        project.styling.as_deref(),
                    ),
                    ContextCategory::ProjectStructure,
                    Priority::Medium,
                )
                .with_source("project_structure"),
            );
        }

        if !project.available_imports.is_empty() {
            let content = project
                .available_imports
                .iter()
                .map(|path| format!("- {}", path))
                .collect::<Vec<_>>()
                .join("\n");
            fragments.push(
                ContextFragment::new(content, ContextCategory::AvailableImports, Priority::Medium)
                    .with_source("available_imports"),
            );
        }

        fragments
    }

    /// Pack `fragments` and append the result to `system_base`
    pub fn pack_and_format(
        &self,
        request: &str,
        fragments: Vec<ContextFragment>,
        scorer: RelevanceScorer,
        system_base: &str,
        user_base: &str,
    ) -> PaletteResult<OptimizedContext> {
        let budget = ContextBudget::for_prompts(
            self.settings.total_tokens,
            self.settings.reserved_tokens,
            system_base,
            user_base,
        )?;

        let loader = HierarchicalLoader::new(scorer).with_strategy(self.settings.strategy);
        let outcome = loader.pack(fragments, &budget, request);

        let mut chunks_by_type = BTreeMap::new();
        for fragment in &outcome.selected {
            *chunks_by_type.entry(fragment.category.key().to_string()).or_insert(0) += 1;
        }

        let block = format_context_block(&outcome.selected);
        let system_prompt = if block.is_empty() {
            system_base.to_string()
        } else {
            format!("{}\n\n{}", system_base.trim_end(), block)
        };

        info!(
            selected = outcome.stats.selected_fragments,
            total = outcome.stats.total_fragments,
            tokens = outcome.stats.tokens_used,
            budget = budget.context_tokens(),
            "context optimized"
        );

        Ok(OptimizedContext {
            system_prompt,
            user_prompt: user_base.to_string(),
            selected: outcome.selected,
            stats: ContextStats {
                token_budget: TokenBudgetStats::from(&budget),
                packing: outcome.stats,
                chunks_by_type,
                configuration: None,
            },
        })
    }
}

/// `key: a, b, c` per token group, long groups shortened
pub fn format_design_tokens(tokens: &DesignTokens) -> String {
    tokens
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(kind, values)| {
            let items: Vec<&str> = values.iter().map(String::as_str).collect();
            format!("{}: {}", kind, truncate_token_list(&items))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_framework(framework: &str, styling: Option<&str>, typescript: bool) -> String {
    let mut lines = vec![format!("Framework: {}", framework)];
    if let Some(styling) = styling {
        lines.push(format!("Styling: {}", styling));
    }
    lines.push(format!("TypeScript: {}", if typescript { "yes" } else { "no" }));
    lines.join("\n")
}

fn format_component(component: &ComponentInfo) -> String {
    let mut lines = Vec::new();
    if component.purpose.is_empty() {
        lines.push(component.name.clone());
    } else {
        lines.push(format!("{}: {}", component.name, component.purpose));
    }
    if !component.props.is_empty() {
        lines.push(format!("Props: {}", component.props.join(", ")));
        let usage = component
            .props
            .iter()
            .take(3)
            .map(|prop| format!("{}={{...}}", prop))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Usage: <{} {} />", component.name, usage));
    } else {
        lines.push(format!("Usage: <{} />", component.name));
    }
    lines.join("\n")
}

fn format_structure(
    structure: &ProjectStructure,
    framework: Option<&str>,
    styling: Option<&str>,
) -> String {
    let mut lines = vec![format!("Framework: {}", framework.unwrap_or("unknown"))];
    if let Some(styling) = styling {
        lines.push(format!("Styling: {}", styling));
    }
    lines.push(format!("Components: {}", structure.component_count));
    if !structure.key_features.is_empty() {
        lines.push(format!("Key features: {}", structure.key_features.join(", ")));
    }
    lines.extend(structure.directories.iter().map(|dir| format!("- {}", dir)));
    lines.join("\n")
}

/// Group fragments under headings in fixed section order
pub fn format_context_block(fragments: &[ContextFragment]) -> String {
    if fragments.is_empty() {
        return String::new();
    }

    let mut sections = vec!["## PROJECT CONTEXT".to_string()];
    for category in ContextCategory::ALL {
        let body: Vec<&str> = fragments
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.content.as_str())
            .collect();
        if body.is_empty() {
            continue;
        }
        sections.push(format!("### {}\n{}", category.heading(), body.join("\n\n")));
    }

    sections.join("\n\n")
}
