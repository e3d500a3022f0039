//! Generate command - create UI components from natural language
//!
//! Detects the project, packs its context into the prompt, asks Claude for
//! the component and writes the returned files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{prepare_prompts, PreparedPrompts};
use crate::ai::{parse_files, ClaudeClient, GeneratedFile};
use crate::config::Config;
use crate::error::PaletteError;
use crate::ui::style::{self, print_dim_warning, print_row, spinner};
use crate::ui::{colors, symbols, PaletteForm};

/// Flags of `palette generate`
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output: Option<PathBuf>,
    pub max_tokens: Option<usize>,
    pub no_context: bool,
    pub dry_run: bool,
    pub force: bool,
}

pub async fn run(
    config: Config,
    root: &Path,
    prompt: &str,
    options: GenerateOptions,
) -> Result<()> {
    let prepared = prepare_prompts(&config, root, prompt, options.max_tokens, !options.no_context);

    let model = config.verbose.then_some(config.ai.model.as_str());
    print_header(prompt, &prepared, model);

    if options.dry_run {
        print_dry_run(&prepared);
        return Ok(());
    }

    let client = ClaudeClient::from_config(&config.ai)?;
    let pb = spinner(format!("Generating with {}", client.model()));
    let completion = client
        .send_with_system(&prepared.user_prompt, &prepared.system_prompt)
        .await;
    pb.finish_and_clear();
    let completion = completion.context("Claude request failed")?;

    if completion.is_truncated() {
        print_dim_warning("Reply hit the max_tokens limit; the output may be incomplete");
    }

    let configuration = &prepared.configuration;
    let extension = configuration.framework.component_extension(configuration.typescript);
    let files = parse_files(&completion.text, prompt, extension);
    if files.is_empty() {
        return Err(PaletteError::Generation("the model returned no code".to_string()).into());
    }

    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| root.join(&config.general.output_dir));
    let written = write_files(&output_dir, &files, options.force)?;

    print_summary(&written, completion.usage.input_tokens, completion.usage.output_tokens);
    Ok(())
}

/// Where `file` lands inside `output_dir`; paths are already sanitized to be relative
fn target_path(output_dir: &Path, file: &GeneratedFile) -> PathBuf {
    output_dir.join(&file.path)
}

/// Write each file, asking before overwriting unless `force`
fn write_files(
    output_dir: &Path,
    files: &[GeneratedFile],
    force: bool,
) -> Result<Vec<(PathBuf, usize)>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let form = PaletteForm::new();
    let mut written = Vec::new();

    for file in files {
        let target = target_path(output_dir, file);

        if target.exists() && !force {
            let question = format!("Overwrite {}?", target.display());
            if form.confirm(&question, false)? != Some(true) {
                println!(
                    "{}  {} Skipped {}{}",
                    colors::MUTED, symbols::FILE, target.display(), colors::RESET
                );
                continue;
            }
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&target, &file.content)
            .with_context(|| format!("Failed to write to {}", target.display()))?;
        written.push((target, file.content.lines().count()));
    }

    Ok(written)
}

fn print_header(prompt: &str, prepared: &PreparedPrompts, model: Option<&str>) {
    let configuration = &prepared.configuration;
    style::print_header("Component Generator");
    print_row("Framework", configuration.framework);
    print_row("Styling", configuration.styling_system);
    print_row("Library", configuration.component_library);
    print_row("Confidence", format!("{:.0}%", configuration.confidence_score * 100.0));
    if let Some(model) = model {
        print_row("Model", model);
    }
    if let Some(optimized) = &prepared.optimized {
        let packing = &optimized.stats.packing;
        print_row(
            "Context",
            format!(
                "{}/{} fragments, {} tokens",
                packing.selected_fragments, packing.total_fragments, packing.tokens_used
            ),
        );
    }
    println!("{}  ╰ {}{}{}", colors::MUTED, colors::DIM, prompt, colors::RESET);
    println!();
}

fn print_dry_run(prepared: &PreparedPrompts) {
    println!(
        "{}{}  DRY RUN{} {}(no request sent){}",
        colors::WARNING, colors::BOLD, colors::RESET, colors::DIM, colors::RESET
    );
    println!();
    println!("{}── System prompt ──{}", colors::MUTED, colors::RESET);
    println!("{}", prepared.system_prompt);
    println!();
    println!("{}── User prompt ──{}", colors::MUTED, colors::RESET);
    println!("{}", prepared.user_prompt);

    if let Some(optimized) = &prepared.optimized {
        let budget = &optimized.stats.token_budget;
        println!();
        println!("{}── Token budget ──{}", colors::MUTED, colors::RESET);
        print_row("Total", budget.total);
        print_row("Reserved", budget.reserved);
        print_row("Prompts", budget.system_prompt + budget.user_prompt);
        print_row(
            "Context",
            format!("{} of {}", optimized.stats.packing.tokens_used, budget.context),
        );
    }
    println!();
}

fn print_summary(written: &[(PathBuf, usize)], input_tokens: u32, output_tokens: u32) {
    println!();
    if written.is_empty() {
        println!("{}  No files written{}", colors::MUTED, colors::RESET);
        return;
    }

    println!(
        "{}{}  {} Files Created {}",
        colors::SUCCESS, colors::BOLD, symbols::SUCCESS, colors::RESET
    );
    println!("{}  ╭{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
    for (path, lines) in written {
        println!(
            "{}  │ {} {}{}{} {}({} lines){}",
            colors::MUTED,
            symbols::FILE,
            colors::FG,
            path.display(),
            colors::RESET,
            colors::DIM,
            lines,
            colors::RESET
        );
    }
    println!(
        "{}  │   Tokens: {}{} in / {} out{}",
        colors::MUTED, colors::FG, input_tokens, output_tokens, colors::RESET
    );
    println!("{}  ╰{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_target_path_keeps_relative_directories() {
        let target = target_path(Path::new("out"), &file("components/ui/Card.tsx", ""));
        assert_eq!(target, PathBuf::from("out/components/ui/Card.tsx"));
    }

    #[test]
    fn test_same_file_name_in_different_directories_both_written() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            file("marketing/Card.tsx", "export const Card = () => 'marketing';\n"),
            file("dashboard/Card.tsx", "export const Card = () => 'dashboard';\n"),
        ];

        let written = write_files(dir.path(), &files, false).unwrap();
        assert_eq!(written.len(), 2);
        assert!(fs::read_to_string(dir.path().join("marketing/Card.tsx"))
            .unwrap()
            .contains("marketing"));
        assert!(fs::read_to_string(dir.path().join("dashboard/Card.tsx"))
            .unwrap()
            .contains("dashboard"));
    }

    #[test]
    fn test_write_files_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let files = vec![
            file("Card.tsx", "export const Card = () => null;\n"),
            file("card.module.css", ".card {}\n"),
        ];

        let written = write_files(&out, &files, false).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(out.join("card.module.css")).unwrap(), ".card {}\n");
    }

    #[test]
    fn test_force_overwrites_without_asking() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Card.tsx"), "old").unwrap();

        write_files(dir.path(), &[file("Card.tsx", "new\n")], true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("Card.tsx")).unwrap(), "new\n");
    }
}
