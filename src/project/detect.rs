//! Project configuration detection
//!
//! Sniffs `package.json` and well-known config files to work out which
//! framework, styling system and component library a project uses.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::{ComponentLibrary, Framework, GenerationStrategy, ProjectConfiguration, StylingSystem};
use crate::error::{PaletteError, PaletteResult};

const TAILWIND_CONFIGS: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
];

/// Dependency names from `dependencies` and `devDependencies`
#[derive(Debug, Default)]
struct Dependencies {
    names: BTreeSet<String>,
}

impl Dependencies {
    fn from_package_json(package: &Value) -> Self {
        let names = ["dependencies", "devDependencies", "peerDependencies"]
            .iter()
            .filter_map(|section| package.get(section).and_then(Value::as_object))
            .flat_map(|deps| deps.keys().cloned())
            .collect();
        Self { names }
    }

    fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.names.iter().any(|n| n.starts_with(prefix))
    }
}

/// Detect the configuration of the project rooted at `root`
pub fn detect_configuration(root: &Path) -> PaletteResult<ProjectConfiguration> {
    if !root.is_dir() {
        return Err(PaletteError::Detection {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let package_path = root.join("package.json");
    let package = if package_path.exists() {
        let content = fs::read_to_string(&package_path)?;
        Some(serde_json::from_str::<Value>(&content)?)
    } else {
        None
    };
    let deps = package
        .as_ref()
        .map(Dependencies::from_package_json)
        .unwrap_or_default();

    let frameworks = detect_frameworks(&deps);
    let framework = frameworks.first().copied().unwrap_or(Framework::Unknown);

    let has_tailwind_config = TAILWIND_CONFIGS.iter().any(|f| root.join(f).exists());
    let stylings = detect_styling_systems(&deps, has_tailwind_config, root);
    let styling_system = stylings.first().copied().unwrap_or(StylingSystem::Unknown);

    let component_library = detect_component_library(&deps, root);
    let typescript = root.join("tsconfig.json").exists() || deps.has("typescript");

    let compatibility_issues =
        compatibility_issues(&frameworks, &stylings, component_library);

    let mut confidence = 0.0f32;
    if package.is_some() {
        confidence += 0.2;
    }
    if framework != Framework::Unknown {
        confidence += 0.4;
    }
    if styling_system != StylingSystem::Unknown {
        confidence += 0.3;
    }
    if component_library != ComponentLibrary::None {
        confidence += 0.1;
    }
    if !compatibility_issues.is_empty() {
        confidence -= 0.1 * compatibility_issues.len() as f32;
    }

    let configuration = ProjectConfiguration {
        framework,
        styling_system,
        component_library,
        typescript,
        confidence_score: confidence.clamp(0.0, 1.0),
        compatibility_issues,
        generation_strategy: GenerationStrategy::for_styling(styling_system, component_library),
    };
    debug!(?configuration, "detected project configuration");

    Ok(configuration)
}

/// Frameworks present, most specific first
fn detect_frameworks(deps: &Dependencies) -> Vec<Framework> {
    let mut found = Vec::new();
    if deps.has("next") {
        found.push(Framework::NextJs);
    }
    if deps.has("nuxt") || deps.has("vue") {
        found.push(Framework::Vue);
    }
    if deps.has("@sveltejs/kit") || deps.has("svelte") {
        found.push(Framework::Svelte);
    }
    if deps.has("@angular/core") {
        found.push(Framework::Angular);
    }
    if deps.has("react") && !found.contains(&Framework::NextJs) {
        found.push(Framework::React);
    }
    found
}

/// Styling systems present, component-level systems first
fn detect_styling_systems(
    deps: &Dependencies,
    has_tailwind_config: bool,
    root: &Path,
) -> Vec<StylingSystem> {
    let mut found = Vec::new();
    if deps.has("@chakra-ui/react") {
        found.push(StylingSystem::ChakraUi);
    }
    if deps.has("@mui/material") {
        found.push(StylingSystem::MaterialUi);
    }
    if deps.has("tailwindcss") || has_tailwind_config {
        found.push(StylingSystem::Tailwind);
    }
    if deps.has("styled-components") {
        found.push(StylingSystem::StyledComponents);
    }
    if deps.has("@emotion/react") || deps.has("@emotion/styled") {
        // Chakra and MUI pull in Emotion themselves
        if !found.contains(&StylingSystem::ChakraUi)
            && !found.contains(&StylingSystem::MaterialUi)
        {
            found.push(StylingSystem::Emotion);
        }
    }
    if found.is_empty() {
        if has_stylesheet(root, |name| {
            name.ends_with(".module.css") || name.ends_with(".module.scss")
        }) {
            found.push(StylingSystem::CssModules);
        } else if has_stylesheet(root, |name| name.ends_with(".css") || name.ends_with(".scss")) {
            found.push(StylingSystem::PlainCss);
        }
    }
    found
}

fn has_stylesheet(root: &Path, matches: impl Fn(&str) -> bool) -> bool {
    WalkDir::new(root)
        .max_depth(4)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != "node_modules" && !(name.starts_with('.') && e.depth() > 0)
        })
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file() && matches(&e.file_name().to_string_lossy()))
}

fn detect_component_library(deps: &Dependencies, root: &Path) -> ComponentLibrary {
    if root.join("components.json").exists() {
        ComponentLibrary::ShadcnUi
    } else if deps.has("@chakra-ui/react") {
        ComponentLibrary::ChakraUi
    } else if deps.has("@mui/material") {
        ComponentLibrary::MaterialUi
    } else if deps.has("antd") {
        ComponentLibrary::AntDesign
    } else if deps.has("@headlessui/react") {
        ComponentLibrary::HeadlessUi
    } else if deps.has_prefix("@radix-ui/") {
        ComponentLibrary::RadixUi
    } else {
        ComponentLibrary::None
    }
}

fn compatibility_issues(
    frameworks: &[Framework],
    stylings: &[StylingSystem],
    library: ComponentLibrary,
) -> Vec<String> {
    let mut issues = Vec::new();

    if frameworks.len() > 1 {
        let names: Vec<&str> = frameworks.iter().map(Framework::name).collect();
        issues.push(format!(
            "Multiple frameworks detected ({}); generating for {}",
            names.join(", "),
            frameworks[0].name()
        ));
    }

    if stylings.len() > 1 {
        let names: Vec<&str> = stylings.iter().map(StylingSystem::name).collect();
        issues.push(format!(
            "Multiple styling systems detected ({}); styles may conflict",
            names.join(", ")
        ));
    }

    let primary = stylings.first().copied().unwrap_or_default();
    let mismatch = matches!(
        (library, primary),
        (ComponentLibrary::ShadcnUi, StylingSystem::ChakraUi | StylingSystem::MaterialUi)
            | (ComponentLibrary::AntDesign, StylingSystem::Tailwind)
    );
    if mismatch {
        issues.push(format!(
            "{} is usually paired with a different styling system than {}",
            library.name(),
            primary.name()
        ));
    }

    issues
}
