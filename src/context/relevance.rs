//! Relevance scoring of fragments against a user request

use std::collections::{BTreeMap, BTreeSet};

use super::fragment::{ContextCategory, ContextFragment};

const BASE_WEIGHT: f32 = 0.5;
const KEYWORD_WEIGHT: f32 = 0.3;
const ARCHETYPE_WEIGHT: f32 = 0.2;

/// Terms kept as keywords regardless of length
const UI_VOCABULARY: &[&str] = &[
    "accordion", "alert", "avatar", "badge", "banner", "btn", "button", "card", "carousel",
    "checkbox", "color", "css", "cta", "dark", "dialog", "drawer", "dropdown", "field", "flex",
    "footer", "form", "grid", "header", "hero", "hook", "icon", "image", "img", "input",
    "label", "layout", "link", "list", "menu", "modal", "nav", "navbar", "pagination",
    "popover", "props", "radio", "responsive", "row", "select", "sidebar", "slider",
    "spinner", "state", "style", "svg", "tab", "table", "tabs", "theme", "toast", "toggle",
    "tooltip", "ui",
];

/// Code noise that says nothing about the request
const STOP_WORDS: &[&str] = &[
    "async", "await", "class", "const", "default", "else", "export", "false", "from",
    "function", "have", "import", "interface", "null", "return", "should", "that", "then",
    "this", "true", "type", "undefined", "will", "with", "your",
];

/// Fixed base relevance per category
pub fn default_base_score(category: ContextCategory) -> f32 {
    match category {
        ContextCategory::UserRequest => 1.0,
        ContextCategory::ComponentExamples => 0.9,
        ContextCategory::FrameworkPatterns => 0.85,
        ContextCategory::DesignTokens => 0.8,
        ContextCategory::CompatibilityWarnings => 0.8,
        ContextCategory::ConfigurationGuidelines => 0.75,
        ContextCategory::AvailableImports => 0.7,
        ContextCategory::ValidationRules => 0.65,
        ContextCategory::ProjectStructure => 0.6,
        ContextCategory::QualityRequirements => 0.5,
        ContextCategory::AccessibilityGuidelines => 0.4,
        ContextCategory::PerformanceHints => 0.3,
    }
}

/// Base scores with per-category overrides layered on top
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryWeights {
    overrides: BTreeMap<ContextCategory, f32>,
}

impl CategoryWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: ContextCategory, weight: f32) {
        self.overrides.insert(category, weight.clamp(0.0, 1.0));
    }

    pub fn weight(&self, category: ContextCategory) -> f32 {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_base_score(category))
    }

    pub fn is_overridden(&self, category: ContextCategory) -> bool {
        self.overrides.contains_key(&category)
    }

    pub fn overrides(&self) -> impl Iterator<Item = (ContextCategory, f32)> + '_ {
        self.overrides.iter().map(|(c, w)| (*c, *w))
    }
}

/// Coarse UI shapes a request or a snippet can be about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Archetype {
    Button,
    Form,
    Card,
    Modal,
    Table,
    Navigation,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::Button,
        Archetype::Form,
        Archetype::Card,
        Archetype::Modal,
        Archetype::Table,
        Archetype::Navigation,
    ];

    fn markers(&self) -> &'static [&'static str] {
        match self {
            Archetype::Button => &["button", "btn", "click", "cta"],
            Archetype::Form => &[
                "form", "input", "submit", "field", "login", "signup", "validation",
            ],
            Archetype::Card => &["card", "tile", "panel"],
            Archetype::Modal => &["modal", "dialog", "popup", "overlay", "drawer"],
            Archetype::Table => &["table", "datagrid", "column", "row"],
            Archetype::Navigation => &["nav", "menu", "sidebar", "breadcrumb", "header", "tabs"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Button => "button",
            Archetype::Form => "form",
            Archetype::Card => "card",
            Archetype::Modal => "modal",
            Archetype::Table => "table",
            Archetype::Navigation => "navigation",
        }
    }
}

/// Lower-case, punctuation-free keyword set of `text`
pub fn keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| {
            UI_VOCABULARY.contains(word) || (word.chars().count() > 3 && !STOP_WORDS.contains(word))
        })
        .map(str::to_string)
        .collect()
}

/// Archetypes whose marker words appear in `text`
pub fn archetypes(text: &str) -> BTreeSet<Archetype> {
    let lower = text.to_lowercase();
    Archetype::ALL
        .iter()
        .filter(|archetype| archetype.markers().iter().any(|m| lower.contains(m)))
        .copied()
        .collect()
}

fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}

/// Scores fragments for a request. Holds no per-request state.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: CategoryWeights,
}

impl RelevanceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: CategoryWeights) -> Self {
        Self { weights }
    }

    /// Relevance of `fragment` to `request`, in `[0, 1]`
    pub fn score(&self, fragment: &ContextFragment, request: &str) -> f32 {
        let base = self.weights.weight(fragment.category);
        let keyword_overlap = jaccard(&keywords(request), &keywords(&fragment.content));
        let type_bonus = jaccard(&archetypes(request), &archetypes(&fragment.content));

        (BASE_WEIGHT * base + KEYWORD_WEIGHT * keyword_overlap + ARCHETYPE_WEIGHT * type_bonus)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fragment::Priority;

    #[test]
    fn test_keywords_filter_short_and_stop_words() {
        let words = keywords("Create a Button, with the `const` nav!");
        assert!(words.contains("create"));
        assert!(words.contains("button"));
        assert!(words.contains("nav"));
        assert!(!words.contains("with"));
        assert!(!words.contains("const"));
        assert!(!words.contains("a"));
    }

    #[test]
    fn test_archetypes_detects_substrings() {
        let found = archetypes("A login form inside a modal dialog");
        assert!(found.contains(&Archetype::Form));
        assert!(found.contains(&Archetype::Modal));
        assert!(!found.contains(&Archetype::Table));
    }

    #[test]
    fn test_empty_sides_score_zero_overlap() {
        let scorer = RelevanceScorer::new();
        let fragment = ContextFragment::new("", ContextCategory::PerformanceHints, Priority::Low);
        let score = scorer.score(&fragment, "");
        assert!((score - 0.5 * 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_button_example_beats_unrelated_hint() {
        let scorer = RelevanceScorer::new();
        let button = ContextFragment::new(
            "export function PrimaryButton() { return <button>Save</button> }",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let hint = ContextFragment::new(
            "Memoize expensive selectors and avoid unnecessary renders",
            ContextCategory::PerformanceHints,
            Priority::Medium,
        );

        let request = "create a button";
        assert!(scorer.score(&button, request) > scorer.score(&hint, request));
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = RelevanceScorer::new();
        let fragment = ContextFragment::new(
            "Card grid with hover states",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        );
        let first = scorer.score(&fragment, "responsive card grid");
        let second = scorer.score(&fragment, "responsive card grid");
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let scorer = RelevanceScorer::new();
        let fragment =
            ContextFragment::new("button", ContextCategory::UserRequest, Priority::Critical);
        assert!(scorer.score(&fragment, "button") <= 1.0);
    }

    #[test]
    fn test_weight_overrides_replace_base() {
        let mut weights = CategoryWeights::new();
        weights.set(ContextCategory::DesignTokens, 0.4);
        assert_eq!(weights.weight(ContextCategory::DesignTokens), 0.4);
        assert_eq!(weights.weight(ContextCategory::ComponentExamples), 0.9);
        assert!(weights.is_overridden(ContextCategory::DesignTokens));
    }
}
