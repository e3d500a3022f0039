//! Hierarchical loading of fragments into a token budget

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use super::compression::Compressor;
use super::fragment::{ContextBudget, ContextFragment, Priority};
use super::relevance::RelevanceScorer;

/// What the loader does after a fragment is compressed into the remaining space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PackingStrategy {
    /// Stop packing after the first compression fit
    #[default]
    StopAfterCompression,
    /// Keep scanning for fragments that still fit
    BestFit,
}

/// Summary of one packing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackStats {
    pub total_fragments: usize,
    pub selected_fragments: usize,
    pub dropped_fragments: usize,
    pub tokens_used: usize,
    pub context_tokens: usize,
    pub utilization: f32,
    pub compressions: usize,
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub selected: Vec<ContextFragment>,
    pub stats: PackStats,
}

/// Greedy priority/relevance packer
#[derive(Debug, Clone, Default)]
pub struct HierarchicalLoader {
    scorer: RelevanceScorer,
    compressor: Compressor,
    strategy: PackingStrategy,
}

impl HierarchicalLoader {
    pub fn new(scorer: RelevanceScorer) -> Self {
        Self {
            scorer,
            compressor: Compressor::new(),
            strategy: PackingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PackingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select fragments for `request` that fit in `budget`
    pub fn pack(
        &self,
        fragments: Vec<ContextFragment>,
        budget: &ContextBudget,
        request: &str,
    ) -> PackOutcome {
        let total_fragments = fragments.len();
        let limit = budget.context_tokens();

        let mut ranked: Vec<(usize, ContextFragment)> = fragments
            .into_iter()
            .map(|mut fragment| {
                fragment.relevance_score = self.scorer.score(&fragment, request);
                fragment
            })
            .enumerate()
            .collect();
        ranked.sort_by(|(ia, a), (ib, b)| rank(a, b).then(ia.cmp(ib)));

        let mut selected = Vec::new();
        let mut used = 0usize;
        let mut compressions = 0usize;

        for (_, fragment) in ranked {
            if fragment.priority == Priority::Critical {
                used += fragment.token_estimate;
                selected.push(fragment);
                continue;
            }

            if used + fragment.token_estimate <= limit {
                used += fragment.token_estimate;
                selected.push(fragment);
                continue;
            }

            let remaining = limit.saturating_sub(used);
            if remaining == 0 {
                debug!(category = %fragment.category, "budget exhausted, dropping fragment");
                continue;
            }

            let required_ratio = remaining as f32 / fragment.token_estimate as f32;
            if !self.compressor.can_compress_to(&fragment.content, required_ratio) {
                debug!(
                    category = %fragment.category,
                    required_ratio,
                    "fragment cannot be compressed enough, dropping"
                );
                continue;
            }

            let content = self.compressor.compress(&fragment.content, required_ratio);
            if content.trim().is_empty() {
                debug!(category = %fragment.category, "compression left nothing, dropping");
                continue;
            }
            let compressed = fragment.compressed(content, required_ratio);
            if compressed.token_estimate > remaining {
                debug!(
                    category = %compressed.category,
                    "compressed fragment still too large, dropping"
                );
                continue;
            }

            used += compressed.token_estimate;
            compressions += 1;
            selected.push(compressed);

            if self.strategy == PackingStrategy::StopAfterCompression {
                break;
            }
        }

        let utilization = if limit == 0 {
            0.0
        } else {
            used as f32 / limit as f32
        };

        let stats = PackStats {
            total_fragments,
            selected_fragments: selected.len(),
            dropped_fragments: total_fragments - selected.len(),
            tokens_used: used,
            context_tokens: limit,
            utilization,
            compressions,
        };
        debug!(?stats, "packed context");

        PackOutcome { selected, stats }
    }
}

/// Tier first, then relevance descending
fn rank(a: &ContextFragment, b: &ContextFragment) -> Ordering {
    a.priority.cmp(&b.priority).then(
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fragment::ContextCategory;
    use proptest::prelude::*;

    fn budget(context_tokens: usize) -> ContextBudget {
        // 500 reserved, no prompt overhead
        ContextBudget::new(context_tokens + 500, 0, 0, 500).unwrap()
    }

    fn loader() -> HierarchicalLoader {
        HierarchicalLoader::new(RelevanceScorer::new())
    }

    #[test]
    fn test_relevant_example_selected_first() {
        let button = ContextFragment::new(
            "A primary button with hover and focus states",
            ContextCategory::ComponentExamples,
            Priority::Medium,
        )
        .with_token_estimate(20);
        let hint = ContextFragment::new(
            "Lazy load routes to reduce bundle size",
            ContextCategory::PerformanceHints,
            Priority::Medium,
        )
        .with_token_estimate(20);

        let outcome = loader().pack(vec![hint, button], &budget(25), "create a button");
        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(outcome.selected[0].category, ContextCategory::ComponentExamples);
        assert!(outcome.selected[0].relevance_score > 0.0);
    }

    #[test]
    fn test_oversized_generic_fragment_dropped() {
        let huge = ContextFragment::new(
            "word ".repeat(800),
            ContextCategory::QualityRequirements,
            Priority::Medium,
        )
        .with_token_estimate(1000);

        let outcome = loader().pack(vec![huge], &budget(10), "anything");
        assert!(outcome.selected.is_empty());
        assert_eq!(outcome.stats.compressions, 0);
        assert_eq!(outcome.stats.dropped_fragments, 1);
    }

    #[test]
    fn test_critical_fragments_kept_over_budget() {
        let critical = ContextFragment::new(
            "x".repeat(400),
            ContextCategory::CompatibilityWarnings,
            Priority::Critical,
        );
        let outcome = loader().pack(vec![critical], &budget(10), "form");
        assert_eq!(outcome.selected.len(), 1);
        assert!(outcome.stats.tokens_used > outcome.stats.context_tokens);
    }

    fn prose(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("guideline sentence number {i} about layout spacing"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_compression_fit_stops_packing() {
        let big = ContextFragment::new(prose(40), ContextCategory::DesignTokens, Priority::High);
        let small =
            ContextFragment::new("tiny note", ContextCategory::PerformanceHints, Priority::Low);
        let limit = (big.token_estimate as f32 * 0.9) as usize;

        let outcome = loader().pack(vec![big, small], &budget(limit), "layout");
        assert_eq!(outcome.stats.compressions, 1);
        assert_eq!(outcome.selected.len(), 1);
        assert!(outcome.selected[0].is_compressed());
    }

    #[test]
    fn test_best_fit_keeps_scanning_after_compression() {
        let big = ContextFragment::new(prose(40), ContextCategory::DesignTokens, Priority::High);
        let small =
            ContextFragment::new("tiny note", ContextCategory::PerformanceHints, Priority::Low);
        let limit = (big.token_estimate as f32 * 0.9) as usize;

        let outcome = loader()
            .with_strategy(PackingStrategy::BestFit)
            .pack(vec![big, small], &budget(limit), "layout");
        assert_eq!(outcome.stats.compressions, 1);
        assert_eq!(outcome.selected.len(), 2);
    }

    #[test]
    fn test_blank_compression_result_is_dropped() {
        let blank = ContextFragment::new(
            " ".repeat(400),
            ContextCategory::PerformanceHints,
            Priority::Medium,
        );
        let small =
            ContextFragment::new("tiny note", ContextCategory::PerformanceHints, Priority::Low);

        let outcome = loader().pack(vec![blank, small], &budget(80), "anything");
        assert_eq!(outcome.stats.compressions, 0);
        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(outcome.selected[0].content, "tiny note");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let first =
            ContextFragment::new("alpha", ContextCategory::ProjectStructure, Priority::Medium);
        let second =
            ContextFragment::new("omega", ContextCategory::ProjectStructure, Priority::Medium);

        let outcome = loader().pack(vec![first, second], &budget(100), "unrelated");
        assert_eq!(outcome.selected[0].content, "alpha");
        assert_eq!(outcome.selected[1].content, "omega");
    }

    proptest! {
        #[test]
        fn prop_non_critical_selection_fits_budget(
            sizes in prop::collection::vec(1usize..200, 0..20),
            limit in 0usize..400,
        ) {
            let fragments: Vec<ContextFragment> = sizes
                .iter()
                .enumerate()
                .map(|(i, size)| {
                    ContextFragment::new(
                        "y".repeat(size * 4),
                        ContextCategory::ComponentExamples,
                        Priority::Medium,
                    )
                        .with_source(&format!("fragment-{i}"))
                })
                .collect();

            let outcome = loader().pack(fragments, &budget(limit), "button");
            let used: usize = outcome.selected.iter().map(|f| f.token_estimate).sum();
            prop_assert!(used <= limit);
            prop_assert_eq!(used, outcome.stats.tokens_used);
        }
    }
}
