//! Context command - run the optimizer and show what would be sent

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use super::prepare_prompts;
use crate::config::Config;
use crate::context::manager::format_context_block;
use crate::ui::colors;
use crate::ui::style::{print_header, print_row};

pub fn run(
    config: &Config,
    root: &Path,
    prompt: &str,
    max_tokens: Option<usize>,
    json: bool,
) -> Result<()> {
    let prepared = prepare_prompts(config, root, prompt, max_tokens, true);
    let block = prepared
        .optimized
        .as_ref()
        .map(|o| format_context_block(&o.selected))
        .unwrap_or_default();

    if json {
        let output = json!({
            "configuration": prepared.configuration,
            "stats": prepared.optimized.as_ref().map(|o| &o.stats),
            "context": block,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_header("Context Optimizer");
    let Some(optimized) = &prepared.optimized else {
        print_row("Context", "unavailable, base prompts only");
        println!();
        return Ok(());
    };

    let stats = &optimized.stats;
    print_row("Budget", format!("{} tokens for context", stats.token_budget.context));
    print_row(
        "Selected",
        format!(
            "{}/{} fragments, {} tokens ({:.0}% used)",
            stats.packing.selected_fragments,
            stats.packing.total_fragments,
            stats.packing.tokens_used,
            stats.packing.utilization * 100.0
        ),
    );
    print_row("Compressed", stats.packing.compressions);
    for (kind, count) in &stats.chunks_by_type {
        print_row(kind, count);
    }
    if let Some(configuration) = &stats.configuration {
        print_row(
            "Filtered",
            format!(
                "{} dropped, {} kept by styling, {} synthesized",
                configuration.fragments_filtered,
                configuration.fragments_force_kept,
                configuration.fragments_synthesized
            ),
        );
    }

    println!();
    println!("{}", block);
    if block.is_empty() {
        println!("{}  (empty context block){}", colors::DIM, colors::RESET);
    }
    println!();

    Ok(())
}
