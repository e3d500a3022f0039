//! Init command - interactive setup wizard
//!
//! Shows what was detected, lets the user correct it and stores the
//! corrections as `[project]` overrides.

use anyhow::Result;
use std::path::Path;

use super::resolve_configuration;
use crate::config::{self, Config, ProjectOverrides};
use crate::project::{ComponentLibrary, Framework, ProjectConfiguration, StylingSystem};
use crate::ui::style::{print_header, print_row, print_success};
use crate::ui::{colors, FormOption, PaletteForm};

const FRAMEWORKS: &[(Framework, &str)] = &[
    (Framework::NextJs, "React with file-based routing"),
    (Framework::React, "Plain React components"),
    (Framework::Vue, "Single-file .vue components"),
    (Framework::Svelte, "Single-file .svelte components"),
    (Framework::Angular, "Decorated component classes"),
];

const STYLINGS: &[(StylingSystem, &str)] = &[
    (StylingSystem::Tailwind, "Utility classes in markup"),
    (StylingSystem::ChakraUi, "Style props on Chakra components"),
    (StylingSystem::MaterialUi, "sx prop and theme overrides"),
    (StylingSystem::StyledComponents, "Tagged template literals"),
    (StylingSystem::Emotion, "css prop and styled helpers"),
    (StylingSystem::CssModules, "Scoped .module.css files"),
    (StylingSystem::PlainCss, "Global stylesheets"),
];

const LIBRARIES: &[(ComponentLibrary, &str)] = &[
    (ComponentLibrary::None, "Build components from scratch"),
    (ComponentLibrary::ShadcnUi, "Copied-in Radix + Tailwind components"),
    (ComponentLibrary::ChakraUi, "@chakra-ui/react"),
    (ComponentLibrary::MaterialUi, "@mui/material"),
    (ComponentLibrary::AntDesign, "antd"),
    (ComponentLibrary::HeadlessUi, "@headlessui/react"),
    (ComponentLibrary::RadixUi, "@radix-ui primitives"),
];

pub fn run(mut config: Config, config_path: Option<&str>, root: &Path) -> Result<()> {
    print_header("Palette Setup");
    print_row("Project", root.display());

    // Ask against detection alone so existing overrides can be cleared
    let detected = resolve_configuration(&Config::default(), root);
    let form = PaletteForm::new();

    let framework = choose(
        &form,
        "Which framework does this project use?",
        FRAMEWORKS,
        detected.framework,
    )?;
    let styling = choose(&form, "How are components styled?", STYLINGS, detected.styling_system)?;
    let library = choose(
        &form,
        "Which component library is installed?",
        LIBRARIES,
        detected.component_library,
    )?;

    let overrides = overrides_for(&detected, framework, styling, library);
    let path = config::resolve_path(config_path)?;

    println!();
    if overrides.is_empty() {
        println!(
            "{}  Detection matches your answers; no overrides needed.{}",
            colors::MUTED, colors::RESET
        );
    }

    if form.confirm(&format!("Save settings to {}?", path.display()), true)? != Some(true) {
        println!("{}  Nothing saved.{}", colors::MUTED, colors::RESET);
        return Ok(());
    }

    config.project = overrides;
    config::save_config(&config, &path)?;
    print_success(&format!("Saved {}", path.display()));
    println!();

    Ok(())
}

/// Ask one question; the detected value is preselected and kept on cancel
fn choose<T: Copy + PartialEq + std::fmt::Display>(
    form: &PaletteForm,
    question: &str,
    choices: &[(T, &str)],
    detected: T,
) -> Result<T> {
    let options: Vec<FormOption> = choices
        .iter()
        .map(|(value, description)| {
            let option = FormOption::new(value.to_string(), *description);
            if *value == detected {
                option.recommended()
            } else {
                option
            }
        })
        .collect();

    Ok(form
        .select(question, &options)?
        .map(|idx| choices[idx].0)
        .unwrap_or(detected))
}

/// Overrides for the answers that differ from detection
fn overrides_for(
    detected: &ProjectConfiguration,
    framework: Framework,
    styling: StylingSystem,
    library: ComponentLibrary,
) -> ProjectOverrides {
    ProjectOverrides {
        framework: (framework != detected.framework).then(|| framework.name().to_string()),
        styling: (styling != detected.styling_system).then(|| styling.name().to_string()),
        component_library: (library != detected.component_library)
            .then(|| library.name().to_string()),
    }
}
