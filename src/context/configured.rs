//! Configuration-aware context optimization
//!
//! Re-weights categories and filters out context that contradicts the
//! detected framework and styling system, then adds fixed guidance for the
//! active configuration before packing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::fragment::{ContextCategory, ContextFragment, Priority};
use super::manager::{ConfigurationStats, ContextManager, ContextSettings, OptimizedContext};
use super::relevance::{CategoryWeights, RelevanceScorer};
use crate::error::PaletteResult;
use crate::project::{Framework, ProjectConfiguration, ProjectContext, StylingSystem};

/// Tailwind-style utility classes and mentions
static TAILWIND_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)tailwind",
        r"\b(?:bg|text|border|rounded|shadow)-[a-z0-9]",
        r"\b(?:p|m|px|py|mx|my|pt|pb|mt|mb|gap|space-[xy])-\d",
        r"\b(?:flex|grid)-(?:row|col|cols)",
    ])
});

static CHAKRA_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)chakra", r"@chakra-ui", r"\buseColorModeValue\b"]));

static MUI_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"@mui/", r"\bmakeStyles\b", r"\bsx=\{"]));

static CSS_IN_JS_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)styled-components", r"\bstyled\.[a-z]+`", r"\bcss`"]));

static REACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[r"\buse(?:State|Effect|Memo|Callback|Ref)\b", r"\bclassName=", r"\bReact\."])
});

static VUE_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\bv-(?:if|for|model|bind)\b", r"<template>", r"\bdefineProps\b"]));

static SVELTE_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\$:", r"\{#(?:if|each)\b", r"\bon:click\b"]));

static ANGULAR_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\*ngIf\b", r"\*ngFor\b", r"@Component\("]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static exclusion pattern"))
        .collect()
}

/// Category weight overrides for a configuration (styling wins on conflict)
pub fn priority_overrides(framework: Framework, styling: StylingSystem) -> CategoryWeights {
    let mut weights = CategoryWeights::new();

    match framework {
        Framework::NextJs => {
            weights.set(ContextCategory::FrameworkPatterns, 0.95);
            weights.set(ContextCategory::ProjectStructure, 0.75);
        }
        Framework::React => {
            weights.set(ContextCategory::FrameworkPatterns, 0.85);
        }
        Framework::Vue | Framework::Svelte | Framework::Angular => {
            weights.set(ContextCategory::FrameworkPatterns, 0.95);
            weights.set(ContextCategory::ComponentExamples, 0.7);
        }
        Framework::Unknown => {}
    }

    match styling {
        StylingSystem::ChakraUi => {
            weights.set(ContextCategory::ComponentExamples, 0.95);
            weights.set(ContextCategory::DesignTokens, 0.4);
        }
        StylingSystem::Tailwind => {
            weights.set(ContextCategory::DesignTokens, 0.95);
            weights.set(ContextCategory::ComponentExamples, 0.4);
        }
        StylingSystem::MaterialUi => {
            weights.set(ContextCategory::ComponentExamples, 0.9);
            weights.set(ContextCategory::DesignTokens, 0.6);
        }
        StylingSystem::StyledComponents | StylingSystem::Emotion => {
            weights.set(ContextCategory::DesignTokens, 0.85);
            weights.set(ContextCategory::ComponentExamples, 0.8);
        }
        StylingSystem::CssModules | StylingSystem::PlainCss => {
            weights.set(ContextCategory::ProjectStructure, 0.7);
        }
        StylingSystem::Unknown => {}
    }

    weights
}

/// Patterns whose presence marks a fragment as foreign to the configuration
pub fn exclusion_patterns(framework: Framework, styling: StylingSystem) -> Vec<&'static Regex> {
    let mut groups: Vec<&'static [Regex]> = Vec::new();

    match styling {
        StylingSystem::ChakraUi => {
            groups.extend([
                TAILWIND_PATTERNS.as_slice(),
                MUI_PATTERNS.as_slice(),
                CSS_IN_JS_PATTERNS.as_slice(),
            ]);
        }
        StylingSystem::Tailwind => {
            groups.extend([
                CHAKRA_PATTERNS.as_slice(),
                MUI_PATTERNS.as_slice(),
                CSS_IN_JS_PATTERNS.as_slice(),
            ]);
        }
        StylingSystem::MaterialUi => {
            groups.extend([TAILWIND_PATTERNS.as_slice(), CHAKRA_PATTERNS.as_slice()]);
        }
        StylingSystem::StyledComponents | StylingSystem::Emotion => {
            groups.extend([TAILWIND_PATTERNS.as_slice(), CHAKRA_PATTERNS.as_slice()]);
        }
        StylingSystem::CssModules | StylingSystem::PlainCss => {
            groups.extend([TAILWIND_PATTERNS.as_slice(), CSS_IN_JS_PATTERNS.as_slice()]);
        }
        StylingSystem::Unknown => {}
    }

    match framework {
        Framework::NextJs | Framework::React => {
            groups.extend([
                VUE_PATTERNS.as_slice(),
                SVELTE_PATTERNS.as_slice(),
                ANGULAR_PATTERNS.as_slice(),
            ]);
        }
        Framework::Vue => {
            groups.extend([
                REACT_PATTERNS.as_slice(),
                SVELTE_PATTERNS.as_slice(),
                ANGULAR_PATTERNS.as_slice(),
            ]);
        }
        Framework::Svelte => {
            groups.extend([
                REACT_PATTERNS.as_slice(),
                VUE_PATTERNS.as_slice(),
                ANGULAR_PATTERNS.as_slice(),
            ]);
        }
        Framework::Angular => {
            groups.extend([
                REACT_PATTERNS.as_slice(),
                VUE_PATTERNS.as_slice(),
                SVELTE_PATTERNS.as_slice(),
            ]);
        }
        Framework::Unknown => {}
    }

    groups.into_iter().flatten().collect()
}

fn framework_guidelines(framework: Framework) -> &'static [&'static str] {
    match framework {
        Framework::NextJs => &[
            "Default to Server Components; add 'use client' only for interactive components.",
            "Use next/link for navigation and next/image for images.",
            "Place route-level UI under app/ and shared UI under components/.",
        ],
        Framework::React => &[
            "Write function components with hooks; avoid class components.",
            "Keep components pure and lift shared state to the nearest common parent.",
            "Export one component per file with a named export.",
        ],
        Framework::Vue => &[
            "Use single-file components with <script setup>.",
            "Declare props with defineProps and events with defineEmits.",
        ],
        Framework::Svelte => &[
            "Use Svelte components with export let for props.",
            "Prefer reactive declarations over manual subscriptions.",
        ],
        Framework::Angular => &[
            "Generate standalone components with explicit inputs and outputs.",
            "Keep templates declarative; move logic into the component class.",
        ],
        Framework::Unknown => &[],
    }
}

fn styling_guidelines(styling: StylingSystem) -> &'static [&'static str] {
    match styling {
        StylingSystem::Tailwind => &[
            "Style with Tailwind utility classes; do not write custom CSS files.",
            "Use the project's theme tokens instead of arbitrary values.",
            "Handle dark mode with dark: variants.",
        ],
        StylingSystem::ChakraUi => &[
            "Style with Chakra UI style props on Box, Flex and Stack; do not use utility classes.",
            "Reference theme tokens such as colorScheme and spacing scale values.",
            "Use useColorModeValue for light/dark differences.",
        ],
        StylingSystem::MaterialUi => &[
            "Build from @mui/material components and style with the sx prop or styled().",
            "Read colors and spacing from the theme.",
        ],
        StylingSystem::StyledComponents => &[
            "Create styled-components next to the component that uses them.",
            "Pull colors and spacing from the ThemeProvider theme.",
        ],
        StylingSystem::Emotion => &[
            "Style with Emotion's css prop or styled API.",
            "Pull colors and spacing from the Emotion theme.",
        ],
        StylingSystem::CssModules => &[
            "Put styles in a co-located Component.module.css file and import it as styles.",
        ],
        StylingSystem::PlainCss => &[
            "Use plain CSS with BEM-style class names in a co-located stylesheet.",
        ],
        StylingSystem::Unknown => &[],
    }
}

fn validation_rules(configuration: &ProjectConfiguration) -> Vec<String> {
    let mut rules = vec![
        "Every interactive element must be reachable and operable by keyboard.".to_string(),
        "Images need alt text; icon-only buttons need an aria-label.".to_string(),
        "Do not import packages that are not already dependencies of the project.".to_string(),
    ];
    if configuration.typescript {
        rules.push("Type all props with an exported interface; no implicit any.".to_string());
    }
    if configuration.styling_system != StylingSystem::Unknown {
        rules.push(format!(
            "Use {} only; do not mix in other styling systems.",
            configuration.styling_system.name()
        ));
    }
    rules
}

/// Context manager that adapts to the detected project configuration
#[derive(Debug, Clone)]
pub struct ConfigurationAwareContextManager {
    inner: ContextManager,
    configuration: ProjectConfiguration,
}

/// Outcome of exclusion filtering
#[derive(Debug, Default)]
struct FilterOutcome {
    kept: Vec<ContextFragment>,
    filtered: usize,
    force_kept: usize,
}

impl ConfigurationAwareContextManager {
    pub fn new(settings: ContextSettings, configuration: ProjectConfiguration) -> Self {
        Self {
            inner: ContextManager::new(settings),
            configuration,
        }
    }

    /// Optimize `project` for `request` under the detected configuration
    pub fn optimize_context_with_configuration(
        &self,
        request: &str,
        project: &ProjectContext,
        system_base: &str,
        user_base: &str,
    ) -> PaletteResult<OptimizedContext> {
        let config = &self.configuration;
        let weights = priority_overrides(config.framework, config.styling_system);

        let candidates = self.inner.build_fragments(project);
        let outcome = self.filter_excluded(candidates);

        let synthesized = self.synthesize_fragments();
        let synthesized_count = synthesized.len();

        let fragments: Vec<ContextFragment> = outcome
            .kept
            .into_iter()
            .chain(synthesized)
            .map(|fragment| retier(fragment, &weights))
            .collect();

        let weight_overrides = weights
            .overrides()
            .map(|(category, weight)| (category.key().to_string(), weight))
            .collect();

        let mut optimized = self.inner.pack_and_format(
            request,
            fragments,
            RelevanceScorer::with_weights(weights),
            system_base,
            user_base,
        )?;

        optimized.stats.configuration = Some(ConfigurationStats {
            framework: config.framework.name().to_string(),
            styling_system: config.styling_system.name().to_string(),
            component_library: config.component_library.name().to_string(),
            confidence: config.confidence_score,
            strategy: config.generation_strategy.name().to_string(),
            fragments_filtered: outcome.filtered,
            fragments_force_kept: outcome.force_kept,
            fragments_synthesized: synthesized_count,
            weight_overrides,
        });

        Ok(optimized)
    }

    fn filter_excluded(&self, fragments: Vec<ContextFragment>) -> FilterOutcome {
        let styling = self.configuration.styling_system;
        let patterns = exclusion_patterns(self.configuration.framework, styling);
        let mut outcome = FilterOutcome::default();

        for fragment in fragments {
            let excluded = patterns.iter().any(|p| p.is_match(&fragment.content));
            if !excluded {
                outcome.kept.push(fragment);
                continue;
            }

            let names_active = styling.is_named_in(&fragment.content)
                || fragment.source().is_some_and(|s| styling.is_named_in(s));
            if names_active {
                outcome.force_kept += 1;
                outcome.kept.push(fragment);
            } else {
                debug!(source = ?fragment.source(), "excluding fragment foreign to configuration");
                outcome.filtered += 1;
            }
        }

        outcome
    }

    fn synthesize_fragments(&self) -> Vec<ContextFragment> {
        let config = &self.configuration;
        let mut fragments = Vec::new();

        let framework_lines = framework_guidelines(config.framework);
        if !framework_lines.is_empty() {
            fragments.push(guideline_fragment(
                format!("{} guidelines:", config.framework.name()),
                framework_lines.iter().map(|s| s.to_string()),
                "guidelines.framework",
            ));
        }

        let styling_lines = styling_guidelines(config.styling_system);
        if !styling_lines.is_empty() {
            fragments.push(guideline_fragment(
                format!("{} guidelines:", config.styling_system.name()),
                styling_lines.iter().map(|s| s.to_string()),
                "guidelines.styling",
            ));
        }

        let rules = validation_rules(config)
            .into_iter()
            .map(|rule| format!("- {}", rule))
            .collect::<Vec<_>>()
            .join("\n");
        fragments.push(
            ContextFragment::new(rules, ContextCategory::ValidationRules, Priority::High)
                .with_source("validation_rules")
                .with_metadata("configuration_aware", Value::Bool(true)),
        );

        if !config.compatibility_issues.is_empty() {
            let warnings = config
                .compatibility_issues
                .iter()
                .map(|issue| format!("- {}", issue))
                .collect::<Vec<_>>()
                .join("\n");
            fragments.push(
                ContextFragment::new(
                    warnings,
                    ContextCategory::CompatibilityWarnings,
                    Priority::Critical,
                )
                    .with_source("compatibility_issues")
                    .with_metadata("configuration_aware", Value::Bool(true)),
            );
        }

        fragments
    }
}

fn guideline_fragment(
    title: String,
    lines: impl Iterator<Item = String>,
    source: &str,
) -> ContextFragment {
    let body = std::iter::once(title)
        .chain(lines.map(|line| format!("- {}", line)))
        .collect::<Vec<_>>()
        .join("\n");
    ContextFragment::new(body, ContextCategory::ConfigurationGuidelines, Priority::High)
        .with_source(source)
        .with_metadata("configuration_aware", Value::Bool(true))
}

/// Move non-critical fragments of overridden categories to the matching tier
fn retier(mut fragment: ContextFragment, weights: &CategoryWeights) -> ContextFragment {
    if fragment.priority == Priority::Critical || !weights.is_overridden(fragment.category) {
        return fragment;
    }
    let weight = weights.weight(fragment.category);
    fragment.priority = if weight >= 0.8 {
        Priority::High
    } else if weight >= 0.5 {
        Priority::Medium
    } else {
        Priority::Low
    };
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fragment::ContextBudget;
    use crate::context::loader::HierarchicalLoader;
    use crate::project::{ComponentInfo, ComponentLibrary, GenerationStrategy};
    use proptest::prelude::*;

    fn chakra_config() -> ProjectConfiguration {
        ProjectConfiguration {
            framework: Framework::React,
            styling_system: StylingSystem::ChakraUi,
            component_library: ComponentLibrary::ChakraUi,
            typescript: true,
            confidence_score: 0.9,
            compatibility_issues: Vec::new(),
            generation_strategy: GenerationStrategy::ComponentProps,
        }
    }

    fn manager(configuration: ProjectConfiguration) -> ConfigurationAwareContextManager {
        ConfigurationAwareContextManager::new(ContextSettings::default(), configuration)
    }

    #[test]
    fn test_chakra_weights_invert_tailwind() {
        let chakra = priority_overrides(Framework::Unknown, StylingSystem::ChakraUi);
        assert_eq!(chakra.weight(ContextCategory::ComponentExamples), 0.95);
        assert_eq!(chakra.weight(ContextCategory::DesignTokens), 0.4);

        let tailwind = priority_overrides(Framework::Unknown, StylingSystem::Tailwind);
        assert_eq!(tailwind.weight(ContextCategory::DesignTokens), 0.95);
        assert_eq!(tailwind.weight(ContextCategory::ComponentExamples), 0.4);
    }

    #[test]
    fn test_styling_overrides_win_over_framework() {
        let weights = priority_overrides(Framework::Vue, StylingSystem::ChakraUi);
        assert_eq!(weights.weight(ContextCategory::ComponentExamples), 0.95);
        assert_eq!(weights.weight(ContextCategory::FrameworkPatterns), 0.95);
    }

    #[test]
    fn test_unknown_configuration_has_no_exclusions() {
        assert!(exclusion_patterns(Framework::Unknown, StylingSystem::Unknown).is_empty());
    }

    #[test]
    fn test_active_styling_mention_is_force_kept() {
        let manager = manager(chakra_config());
        let fragment = ContextFragment::new(
            "Use bg-blue-500 with Chakra's Box",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let outcome = manager.filter_excluded(vec![fragment]);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.force_kept, 1);
        assert_eq!(outcome.filtered, 0);
    }

    #[test]
    fn test_active_styling_source_key_is_force_kept() {
        let manager = manager(chakra_config());
        let fragment = ContextFragment::new(
            "Wrap content in a tailwind-like grid",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        )
        .with_source("components.ChakraGrid");
        let outcome = manager.filter_excluded(vec![fragment]);
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn test_plain_css_name_is_force_kept() {
        let config = ProjectConfiguration {
            framework: Framework::React,
            styling_system: StylingSystem::PlainCss,
            ..Default::default()
        };
        let fragment = ContextFragment::new(
            "Global CSS helpers: bg-white card",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let outcome = manager(config).filter_excluded(vec![fragment]);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.filtered, 0);
    }

    const STYLINGS: [StylingSystem; 8] = [
        StylingSystem::Tailwind,
        StylingSystem::ChakraUi,
        StylingSystem::MaterialUi,
        StylingSystem::StyledComponents,
        StylingSystem::Emotion,
        StylingSystem::CssModules,
        StylingSystem::PlainCss,
        StylingSystem::Unknown,
    ];

    const FRAMEWORKS: [Framework; 6] = [
        Framework::NextJs,
        Framework::React,
        Framework::Vue,
        Framework::Svelte,
        Framework::Angular,
        Framework::Unknown,
    ];

    proptest! {
        #[test]
        fn prop_fragments_naming_active_styling_survive_exclusion(
            styling in prop::sample::select(STYLINGS.to_vec()),
            framework in prop::sample::select(FRAMEWORKS.to_vec()),
            prefix in "[a-z ]{0,20}",
            in_source in any::<bool>(),
        ) {
            let config = ProjectConfiguration {
                framework,
                styling_system: styling,
                ..Default::default()
            };
            // Trips the Tailwind, Chakra, MUI and CSS-in-JS exclusion groups
            let foreign = "bg-white rounded-lg @chakra-ui/react @mui/material styled-components";
            let fragment = if in_source {
                ContextFragment::new(
                    format!("{prefix} {foreign}"),
                    ContextCategory::ComponentExamples,
                    Priority::Medium,
                )
                    .with_source(&format!("components.{}", styling.name()))
            } else {
                ContextFragment::new(
                    format!("{prefix}{} {foreign}", styling.name()),
                    ContextCategory::ComponentExamples,
                    Priority::Medium,
                )
            };

            let outcome = manager(config).filter_excluded(vec![fragment]);
            prop_assert_eq!(outcome.kept.len(), 1);
            prop_assert_eq!(outcome.filtered, 0);
        }
    }

    #[test]
    fn test_foreign_styling_is_filtered() {
        let manager = manager(chakra_config());
        let foreign = ContextFragment::new(
            "Card with className=\"rounded-lg shadow-md p-4\"",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let neutral = ContextFragment::new(
            "Card: shows a title",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let outcome = manager.filter_excluded(vec![foreign, neutral]);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.filtered, 1);
        assert_eq!(outcome.kept[0].content, "Card: shows a title");
    }

    #[test]
    fn test_compatibility_issues_become_critical_fragment() {
        let mut config = chakra_config();
        config.compatibility_issues =
            vec!["Both Tailwind CSS and Chakra UI are installed".to_string()];
        let fragments = manager(config).synthesize_fragments();

        let warning = fragments
            .iter()
            .find(|f| f.category == ContextCategory::CompatibilityWarnings)
            .unwrap();
        assert_eq!(warning.priority, Priority::Critical);
        assert!(fragments.iter().any(|f| f.source() == Some("guidelines.styling")));
        assert!(fragments.iter().any(|f| f.category == ContextCategory::ValidationRules));
    }

    #[test]
    fn test_validation_rules_never_pack_as_empty_section() {
        let config = ProjectConfiguration {
            framework: Framework::React,
            styling_system: StylingSystem::Tailwind,
            typescript: true,
            ..Default::default()
        };
        let rules = manager(config)
            .synthesize_fragments()
            .into_iter()
            .find(|f| f.category == ContextCategory::ValidationRules)
            .unwrap();
        let example = ContextFragment::new(
            "Card: card component\nUsage: <Card />",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );

        let limit = rules.token_estimate / 2;
        let budget = ContextBudget::new(limit + 500, 0, 0, 500).unwrap();
        let outcome = HierarchicalLoader::new(RelevanceScorer::new()).pack(
            vec![rules, example],
            &budget,
            "a card",
        );

        assert!(outcome.selected.iter().all(|f| !f.content.trim().is_empty()));
        assert!(outcome
            .selected
            .iter()
            .any(|f| f.category == ContextCategory::ComponentExamples));
    }

    #[test]
    fn test_retier_follows_weights() {
        let weights = priority_overrides(Framework::Unknown, StylingSystem::ChakraUi);
        let tokens =
            ContextFragment::new("colors: a", ContextCategory::DesignTokens, Priority::High);
        assert_eq!(retier(tokens, &weights).priority, Priority::Low);

        let example =
            ContextFragment::new("Card", ContextCategory::ComponentExamples, Priority::Medium);
        assert_eq!(retier(example, &weights).priority, Priority::High);
    }

    #[test]
    fn test_optimize_merges_configuration_stats() {
        let project = ProjectContext {
            framework: Some("React".to_string()),
            styling: Some("Chakra UI".to_string()),
            typescript: true,
            components: vec![
                ComponentInfo {
                    name: "PrimaryButton".to_string(),
                    purpose: "button built on Chakra Button".to_string(),
                    props: vec!["label".to_string()],
                },
                ComponentInfo {
                    name: "LegacyCard".to_string(),
                    purpose: "card using bg-white and rounded-lg classes".to_string(),
                    props: Vec::new(),
                },
            ],
            ..ProjectContext::default()
        };

        let result = manager(chakra_config())
            .optimize_context_with_configuration("create a button", &project, "SYSTEM", "USER")
            .unwrap();

        let stats = result.stats.configuration.unwrap();
        assert_eq!(stats.styling_system, "Chakra UI");
        assert_eq!(stats.fragments_filtered, 1);
        assert!(stats.fragments_synthesized >= 3);
        assert!(result.system_prompt.contains("PrimaryButton"));
        assert!(!result.system_prompt.contains("LegacyCard"));
        assert!(result.system_prompt.contains("### CONFIGURATION GUIDELINES"));
    }
}
