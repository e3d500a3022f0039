//! Detect command - show what Palette sees in a project

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::project::detect_configuration;
use crate::ui::colors;
use crate::ui::style::{print_header, print_row};

pub fn run(config: &Config, root: &Path, json: bool) -> Result<()> {
    let detected = detect_configuration(root)
        .with_context(|| format!("Failed to detect project at {}", root.display()))?;
    let configuration = config.project.apply(detected);

    if json {
        println!("{}", serde_json::to_string_pretty(&configuration)?);
        return Ok(());
    }

    print_header("Project Configuration");
    print_row("Path", root.display());
    print_row("Framework", configuration.framework);
    print_row("Styling", configuration.styling_system);
    print_row("Library", configuration.component_library);
    print_row("TypeScript", if configuration.typescript { "yes" } else { "no" });
    print_row("Strategy", configuration.generation_strategy);
    print_row("Confidence", format!("{:.0}%", configuration.confidence_score * 100.0));
    if !config.project.is_empty() {
        print_row("Overrides", "applied from [project]");
    }

    for issue in &configuration.compatibility_issues {
        println!("{}  │ ! {}{}", colors::WARNING, issue, colors::RESET);
    }
    println!();

    Ok(())
}
