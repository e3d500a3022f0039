//! Project analysis
//!
//! Collects the material the context optimizer packs into prompts: design
//! tokens, reusable components, the project layout and the import paths
//! generated code may rely on.

use ignore::gitignore::Gitignore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::components::{ComponentParser, Dialect};
use super::{
    ComponentInfo, ComponentLibrary, DesignTokens, Framework, ProjectConfiguration, ProjectContext,
    ProjectStructure, StylingSystem,
};
use crate::context::relevance::archetypes;
use crate::error::PaletteResult;

const COMPONENT_DIRS: &[&str] = &[
    "components",
    "src/components",
    "app/components",
    "src/app/components",
    "lib/components",
    "src/lib/components",
];

const SOURCE_DIRS: &[&str] = &[
    "app", "src", "src/app", "pages", "src/pages", "components", "src/components", "lib", "src/lib",
    "hooks", "src/hooks", "styles", "src/styles", "public",
];

const GLOBAL_STYLESHEETS: &[&str] = &[
    "app/globals.css",
    "src/app/globals.css",
    "styles/globals.css",
    "src/styles/globals.css",
    "src/index.css",
    "src/app.css",
    "src/assets/main.css",
];

const TAILWIND_CONFIGS: &[&str] = &[
    "tailwind.config.ts",
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
];

/// Tailwind theme keys and the token group they feed
const THEME_GROUPS: &[(&str, &str)] = &[
    ("colors", "colors"),
    ("spacing", "spacing"),
    ("fontFamily", "typography"),
    ("fontSize", "typography"),
    ("borderRadius", "radii"),
];

static THEME_KEY: Lazy<Regex> =
    Lazy::new(|| {
        Regex::new(r#"^\s*['"]?([A-Za-z0-9_-]+)['"]?\s*:"#).expect("valid theme key regex")
    });

static CSS_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--([A-Za-z0-9-]+)\s*:").expect("valid css variable regex"));

/// Limits on how much of a project is read
#[derive(Debug, Clone, Copy)]
pub struct AnalysisLimits {
    /// Components kept in the context (all are counted)
    pub max_components: usize,
    /// Source files parsed before the walk stops
    pub max_files: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_components: 20,
            max_files: 500,
        }
    }
}

/// Analyze the project at `root` into a [`ProjectContext`]
pub fn analyze_project(
    root: &Path,
    configuration: &ProjectConfiguration,
    limits: &AnalysisLimits,
) -> PaletteResult<ProjectContext> {
    let design_tokens = extract_design_tokens(root)?;
    let (components, component_count) = discover_components(root, limits)?;
    let project_structure = describe_structure(root, configuration, component_count);

    let available_imports = configuration
        .component_library
        .import_paths()
        .iter()
        .map(|path| path.to_string())
        .collect();

    let context = ProjectContext {
        design_tokens: (!design_tokens.is_empty()).then_some(design_tokens),
        framework: (configuration.framework != Framework::Unknown)
            .then(|| configuration.framework.name().to_string()),
        styling: (configuration.styling_system != StylingSystem::Unknown)
            .then(|| configuration.styling_system.name().to_string()),
        typescript: configuration.typescript,
        components,
        project_structure: Some(project_structure),
        available_imports,
    };

    debug!(
        components = context.components.len(),
        token_groups = context.design_tokens.as_ref().map_or(0, |t| t.len()),
        "project analyzed"
    );

    Ok(context)
}

/// Token names from the Tailwind theme and global CSS custom properties
fn extract_design_tokens(root: &Path) -> PaletteResult<DesignTokens> {
    let mut tokens = DesignTokens::new();

    if let Some(config_path) = TAILWIND_CONFIGS.iter().map(|f| root.join(f)).find(|p| p.exists()) {
        let source = fs::read_to_string(&config_path)?;
        for (theme_key, group) in THEME_GROUPS {
            if let Some(block) = object_after(&source, theme_key) {
                for name in top_level_keys(block) {
                    push_unique(&mut tokens, group, name);
                }
            }
        }
    }

    for stylesheet in GLOBAL_STYLESHEETS.iter().map(|f| root.join(f)).filter(|p| p.exists()) {
        let source = fs::read_to_string(&stylesheet)?;
        for capture in CSS_VARIABLE.captures_iter(&source) {
            let name = &capture[1];
            push_unique(&mut tokens, css_variable_group(name), name.to_string());
        }
    }

    Ok(tokens)
}

fn push_unique(tokens: &mut DesignTokens, group: &str, name: String) {
    let entries = tokens.entry(group.to_string()).or_default();
    if !entries.contains(&name) {
        entries.push(name);
    }
}

fn css_variable_group(name: &str) -> &'static str {
    if name.contains("radius") {
        "radii"
    } else if name.contains("font") || name.contains("text") || name.contains("leading") {
        "typography"
    } else if name.contains("space") || name.contains("spacing") || name.contains("gap") {
        "spacing"
    } else {
        "colors"
    }
}

/// Body of the first `key: { ... }` object literal in `source`
fn object_after<'a>(source: &'a str, key: &str) -> Option<&'a str> {
    let pattern = Regex::new(&format!(r"\b{}\s*:\s*\{{", regex::escape(key))).ok()?;
    let found = pattern.find(source)?;
    let body_start = found.end();

    let mut depth = 1usize;
    for (offset, ch) in source[body_start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[body_start..body_start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Keys declared directly in an object body, nested objects skipped
fn top_level_keys(body: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0usize;

    for (offset, ch) in body.char_indices() {
        match ch {
            '{' | '[' | '(' => {
                if depth == 0 {
                    take_key(&body[segment_start..offset], &mut keys);
                    segment_start = offset;
                }
                depth += 1;
            }
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                take_key(&body[segment_start..offset], &mut keys);
                segment_start = offset + 1;
            }
            _ => {}
        }
    }
    if depth == 0 && segment_start < body.len() {
        take_key(&body[segment_start..], &mut keys);
    }

    keys
}

fn take_key(segment: &str, keys: &mut Vec<String>) {
    if let Some(capture) = THEME_KEY.captures(segment) {
        let key = capture[1].to_string();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
}

/// Components under the usual component directories, plus the total found
fn discover_components(
    root: &Path,
    limits: &AnalysisLimits,
) -> PaletteResult<(Vec<ComponentInfo>, usize)> {
    let files = collect_component_files(root, limits.max_files);
    if files.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let mut parser = ComponentParser::new()?;
    let mut components = Vec::new();
    let mut total = 0usize;

    for file in files {
        let parsed = if Dialect::from_path(&file).is_some() {
            match parser.parse_file(&file) {
                Ok(Some(parsed)) => Some((parsed.name, parsed.props)),
                Ok(None) => None,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "skipping unreadable component");
                    None
                }
            }
        } else {
            single_file_component_name(&file).map(|name| (name, Vec::new()))
        };

        let Some((name, props)) = parsed else {
            continue;
        };
        total += 1;
        if components.len() < limits.max_components {
            let purpose = infer_purpose(&name, &props);
            components.push(ComponentInfo { name, purpose, props });
        }
    }

    Ok((components, total))
}

fn collect_component_files(root: &Path, max_files: usize) -> Vec<PathBuf> {
    let gitignore_path = root.join(".gitignore");
    let gitignore = if gitignore_path.exists() {
        Gitignore::new(&gitignore_path).0
    } else {
        Gitignore::empty()
    };

    let mut seen = BTreeSet::new();
    let mut files = Vec::new();

    for dir in COMPONENT_DIRS.iter().map(|d| root.join(d)).filter(|d| d.is_dir()) {
        let walker = WalkDir::new(&dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                if e.depth() > 0 && name.starts_with('.') {
                    return false;
                }
                if name == "node_modules" || name == "__tests__" {
                    return false;
                }
                !gitignore.matched(e.path(), e.file_type().is_dir()).is_ignore()
            });

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_component_file(path) {
                continue;
            }
            if seen.insert(path.to_path_buf()) {
                files.push(path.to_path_buf());
            }
            if files.len() >= max_files {
                return files;
            }
        }
    }

    files
}

fn is_component_file(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if name.contains(".test.")
        || name.contains(".spec.")
        || name.contains(".stories.")
        || name.ends_with(".d.ts")
    {
        return false;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext, "vue" | "svelte") || Dialect::from_extension(ext).is_some()
}

/// `.vue` and `.svelte` components are named after their file
fn single_file_component_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
        .then(|| stem.to_string())
}

fn infer_purpose(name: &str, props: &[String]) -> String {
    let text = format!("{} {}", name, props.join(" "));
    let kinds: Vec<&str> = archetypes(&text).iter().map(|a| a.name()).collect();
    if kinds.is_empty() {
        String::new()
    } else {
        format!("{} component", kinds.join("/"))
    }
}

fn describe_structure(
    root: &Path,
    configuration: &ProjectConfiguration,
    component_count: usize,
) -> ProjectStructure {
    let directories = SOURCE_DIRS
        .iter()
        .filter(|d| root.join(d).is_dir())
        .map(|d| format!("{}/", d))
        .collect();

    let mut key_features = Vec::new();
    if configuration.framework == Framework::NextJs {
        if root.join("app").is_dir() || root.join("src/app").is_dir() {
            key_features.push("App Router".to_string());
        } else if root.join("pages").is_dir() || root.join("src/pages").is_dir() {
            key_features.push("Pages Router".to_string());
        }
    }
    if configuration.typescript {
        key_features.push("TypeScript".to_string());
    }
    if has_path_aliases(root) {
        key_features.push("Path aliases (@/)".to_string());
    }
    if configuration.component_library != ComponentLibrary::None {
        key_features.push(configuration.component_library.name().to_string());
    }

    ProjectStructure {
        directories,
        component_count,
        key_features,
    }
}

fn has_path_aliases(root: &Path) -> bool {
    ["tsconfig.json", "jsconfig.json"]
        .iter()
        .filter_map(|f| fs::read_to_string(root.join(f)).ok())
        .any(|content| content.contains("\"@/*\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::GenerationStrategy;
    use tempfile::TempDir;

    fn write(dir: &TempDir, path: &str, content: &str) {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn next_tailwind() -> ProjectConfiguration {
        ProjectConfiguration {
            framework: Framework::NextJs,
            styling_system: StylingSystem::Tailwind,
            component_library: ComponentLibrary::ShadcnUi,
            typescript: true,
            confidence_score: 1.0,
            compatibility_issues: Vec::new(),
            generation_strategy: GenerationStrategy::UtilityClasses,
        }
    }

    #[test]
    fn test_top_level_keys_skip_nested_objects() {
        let body = r#"
            primary: { DEFAULT: '#000', foreground: '#fff' },
            'accent-soft': '#eee',
            muted: ['#111', '#222'],
        "#;
        assert_eq!(top_level_keys(body), vec!["primary", "accent-soft", "muted"]);
    }

    #[test]
    fn test_tailwind_and_css_tokens() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "tailwind.config.js",
            r#"module.exports = {
  theme: {
    extend: {
      colors: { brand: '#0af', surface: { DEFAULT: '#fff', dark: '#111' } },
      spacing: { '18': '4.5rem' },
      fontFamily: { display: ['Inter', 'sans-serif'] },
    },
  },
};"#,
        );
        write(&dir, "app/globals.css", ":root { --background: 0 0% 100%; --radius: 0.5rem; }");

        let tokens = extract_design_tokens(dir.path()).unwrap();
        assert_eq!(tokens["colors"], vec!["brand", "surface", "background"]);
        assert_eq!(tokens["spacing"], vec!["18"]);
        assert_eq!(tokens["typography"], vec!["display"]);
        assert_eq!(tokens["radii"], vec!["radius"]);
    }

    #[test]
    fn test_analyze_next_project() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "tsconfig.json", r#"{"compilerOptions": {"paths": {"@/*": ["./*"]}}}"#);
        write(&dir, "app/page.tsx", "export default function Page() { return null; }");
        write(
            &dir,
            "components/ui/button.tsx",
            "export function Button({ label, onClick }: { label: string; onClick: () => void }) { return null; }",
        );
        write(&dir, "components/ui/button.test.tsx", "export function ButtonTest() {}");
        write(&dir, "components/LoginForm.jsx", "export const LoginForm = ({ onSubmit }) => null;");

        let context =
            analyze_project(dir.path(), &next_tailwind(), &AnalysisLimits::default()).unwrap();

        assert_eq!(context.framework.as_deref(), Some("Next.js"));
        assert!(context.typescript);
        let names: Vec<&str> = context.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["LoginForm", "Button"]);
        assert_eq!(context.components[0].purpose, "form component");
        assert_eq!(context.components[1].props, vec!["label", "onClick"]);

        let structure = context.project_structure.unwrap();
        assert_eq!(structure.component_count, 2);
        assert!(structure.key_features.contains(&"App Router".to_string()));
        assert!(structure.key_features.contains(&"Path aliases (@/)".to_string()));
        assert!(context.available_imports.contains(&"@/lib/utils".to_string()));
        assert!(context.design_tokens.is_none());
    }

    #[test]
    fn test_component_limit_keeps_count() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Alpha", "Beta", "Gamma"] {
            write(&dir, &format!("src/components/{}.vue", name), "<template><div /></template>");
        }
        let limits = AnalysisLimits {
            max_components: 2,
            ..AnalysisLimits::default()
        };

        let context =
            analyze_project(dir.path(), &ProjectConfiguration::default(), &limits).unwrap();
        assert_eq!(context.components.len(), 2);
        assert_eq!(context.project_structure.unwrap().component_count, 3);
        assert!(context.framework.is_none());
    }

    #[test]
    fn test_gitignored_components_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, ".gitignore", "generated/\n");
        write(&dir, "components/generated/Card.jsx", "export const Card = () => null;");
        write(&dir, "components/Panel.jsx", "export const Panel = () => null;");

        let context = analyze_project(
            dir.path(),
            &ProjectConfiguration::default(),
            &AnalysisLimits::default(),
        )
        .unwrap();
        let names: Vec<&str> = context.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Panel"]);
    }
}
