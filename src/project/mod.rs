//! Project configuration and context types
//!
//! `detect` sniffs the framework, styling system and component library of a
//! front-end project; `analysis` turns the project tree into a
//! [`ProjectContext`] that the context manager packs into the prompt.

pub mod analysis;
pub mod components;
pub mod detect;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use analysis::{analyze_project, AnalysisLimits};
pub use detect::detect_configuration;

/// Front-end framework of the target project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    NextJs,
    React,
    Vue,
    Svelte,
    Angular,
    #[default]
    Unknown,
}

impl Framework {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().replace(['.', ' ', '_'], "-").as_str() {
            "next" | "nextjs" | "next-js" => Framework::NextJs,
            "react" => Framework::React,
            "vue" | "nuxt" | "vuejs" => Framework::Vue,
            "svelte" | "sveltekit" => Framework::Svelte,
            "angular" => Framework::Angular,
            _ => Framework::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Framework::NextJs => "Next.js",
            Framework::React => "React",
            Framework::Vue => "Vue",
            Framework::Svelte => "Svelte",
            Framework::Angular => "Angular",
            Framework::Unknown => "Unknown",
        }
    }

    /// File extension generated components should use
    pub fn component_extension(&self, typescript: bool) -> &'static str {
        match (self, typescript) {
            (Framework::Vue, _) => "vue",
            (Framework::Svelte, _) => "svelte",
            (Framework::Angular, _) => "ts",
            (_, true) => "tsx",
            (_, false) => "jsx",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Styling approach of the target project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StylingSystem {
    Tailwind,
    ChakraUi,
    MaterialUi,
    StyledComponents,
    Emotion,
    CssModules,
    PlainCss,
    #[default]
    Unknown,
}

impl StylingSystem {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().replace(['.', ' ', '_'], "-").as_str() {
            "tailwind" | "tailwindcss" | "tailwind-css" => StylingSystem::Tailwind,
            "chakra" | "chakra-ui" | "chakraui" => StylingSystem::ChakraUi,
            "mui" | "material-ui" | "materialui" | "material" => StylingSystem::MaterialUi,
            "styled-components" | "styled" => StylingSystem::StyledComponents,
            "emotion" => StylingSystem::Emotion,
            "css-modules" | "cssmodules" => StylingSystem::CssModules,
            "css" | "plain-css" | "plaincss" => StylingSystem::PlainCss,
            _ => StylingSystem::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StylingSystem::Tailwind => "Tailwind CSS",
            StylingSystem::ChakraUi => "Chakra UI",
            StylingSystem::MaterialUi => "Material UI",
            StylingSystem::StyledComponents => "styled-components",
            StylingSystem::Emotion => "Emotion",
            StylingSystem::CssModules => "CSS Modules",
            StylingSystem::PlainCss => "CSS",
            StylingSystem::Unknown => "Unknown",
        }
    }

    /// Lower-case spellings that identify this system in free text
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            StylingSystem::Tailwind => &["tailwind"],
            StylingSystem::ChakraUi => &["chakra"],
            StylingSystem::MaterialUi => &["material-ui", "material ui", "@mui", "mui"],
            StylingSystem::StyledComponents => &["styled-components", "styled components"],
            StylingSystem::Emotion => &["emotion"],
            StylingSystem::CssModules => &["css modules", "module.css"],
            StylingSystem::PlainCss => &[],
            StylingSystem::Unknown => &[],
        }
    }

    /// Whether `text` names this styling system, by display name or alias
    pub fn is_named_in(&self, text: &str) -> bool {
        if *self == StylingSystem::Unknown {
            return false;
        }
        let lower = text.to_lowercase();
        lower.contains(&self.name().to_lowercase())
            || self.aliases().iter().any(|alias| lower.contains(alias))
    }
}

impl fmt::Display for StylingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// UI component library in use, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentLibrary {
    ShadcnUi,
    ChakraUi,
    MaterialUi,
    AntDesign,
    HeadlessUi,
    RadixUi,
    #[default]
    None,
}

impl ComponentLibrary {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().replace(['.', ' ', '_', '/'], "-").as_str() {
            "shadcn" | "shadcn-ui" => ComponentLibrary::ShadcnUi,
            "chakra" | "chakra-ui" => ComponentLibrary::ChakraUi,
            "mui" | "material-ui" | "material" => ComponentLibrary::MaterialUi,
            "antd" | "ant-design" => ComponentLibrary::AntDesign,
            "headless" | "headlessui" | "headless-ui" => ComponentLibrary::HeadlessUi,
            "radix" | "radix-ui" => ComponentLibrary::RadixUi,
            _ => ComponentLibrary::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentLibrary::ShadcnUi => "shadcn/ui",
            ComponentLibrary::ChakraUi => "Chakra UI",
            ComponentLibrary::MaterialUi => "Material UI",
            ComponentLibrary::AntDesign => "Ant Design",
            ComponentLibrary::HeadlessUi => "Headless UI",
            ComponentLibrary::RadixUi => "Radix UI",
            ComponentLibrary::None => "None",
        }
    }

    /// Import paths generated code may use
    pub fn import_paths(&self) -> &'static [&'static str] {
        match self {
            ComponentLibrary::ShadcnUi => &[
                "@/components/ui/button",
                "@/components/ui/card",
                "@/components/ui/input",
                "@/components/ui/dialog",
                "@/lib/utils",
            ],
            ComponentLibrary::ChakraUi => &["@chakra-ui/react"],
            ComponentLibrary::MaterialUi => &["@mui/material", "@mui/icons-material"],
            ComponentLibrary::AntDesign => &["antd", "@ant-design/icons"],
            ComponentLibrary::HeadlessUi => &["@headlessui/react"],
            ComponentLibrary::RadixUi => &["@radix-ui/react-dialog", "@radix-ui/react-slot"],
            ComponentLibrary::None => &[],
        }
    }
}

impl fmt::Display for ComponentLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How generated code should express styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationStrategy {
    UtilityClasses,
    ComponentProps,
    CssInJs,
    ScopedStylesheets,
    #[default]
    Generic,
}

impl GenerationStrategy {
    pub fn for_styling(styling: StylingSystem, library: ComponentLibrary) -> Self {
        match (styling, library) {
            (StylingSystem::ChakraUi | StylingSystem::MaterialUi, _) => {
                GenerationStrategy::ComponentProps
            }
            (
                _,
                ComponentLibrary::ChakraUi
                | ComponentLibrary::MaterialUi
                | ComponentLibrary::AntDesign,
            ) => GenerationStrategy::ComponentProps,
            (StylingSystem::Tailwind, _) => GenerationStrategy::UtilityClasses,
            (StylingSystem::StyledComponents | StylingSystem::Emotion, _) => {
                GenerationStrategy::CssInJs
            }
            (StylingSystem::CssModules | StylingSystem::PlainCss, _) => {
                GenerationStrategy::ScopedStylesheets
            }
            (StylingSystem::Unknown, _) => GenerationStrategy::Generic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenerationStrategy::UtilityClasses => "utility-classes",
            GenerationStrategy::ComponentProps => "component-props",
            GenerationStrategy::CssInJs => "css-in-js",
            GenerationStrategy::ScopedStylesheets => "scoped-stylesheets",
            GenerationStrategy::Generic => "generic",
        }
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detected configuration of a front-end project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    pub framework: Framework,
    pub styling_system: StylingSystem,
    pub component_library: ComponentLibrary,
    pub typescript: bool,
    pub confidence_score: f32,
    #[serde(default)]
    pub compatibility_issues: Vec<String>,
    pub generation_strategy: GenerationStrategy,
}

/// A reusable component found in the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub props: Vec<String>,
}

/// Summary of the project's layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStructure {
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub component_count: usize,
    #[serde(default)]
    pub key_features: Vec<String>,
}

/// Design tokens grouped by kind (`colors`, `spacing`, `typography`, ...)
pub type DesignTokens = BTreeMap<String, Vec<String>>;

/// Everything the context manager may draw fragments from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default)]
    pub design_tokens: Option<DesignTokens>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub styling: Option<String>,
    #[serde(default)]
    pub typescript: bool,
    #[serde(default)]
    pub components: Vec<ComponentInfo>,
    #[serde(default)]
    pub project_structure: Option<ProjectStructure>,
    #[serde(default)]
    pub available_imports: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_from_name() {
        assert_eq!(Framework::from_name("Next.js"), Framework::NextJs);
        assert_eq!(Framework::from_name("nuxt"), Framework::Vue);
        assert_eq!(Framework::from_name("elm"), Framework::Unknown);
    }

    #[test]
    fn test_styling_aliases_match_free_text() {
        assert!(StylingSystem::ChakraUi.is_named_in("Use bg-blue-500 with Chakra's Box"));
        assert!(!StylingSystem::Tailwind.is_named_in("Chakra Box"));
        assert!(StylingSystem::PlainCss.is_named_in("Global CSS helpers"));
        assert!(!StylingSystem::Unknown.is_named_in("unknown styling"));
    }

    #[test]
    fn test_generation_strategy_prefers_component_libraries() {
        assert_eq!(
            GenerationStrategy::for_styling(StylingSystem::Tailwind, ComponentLibrary::AntDesign),
            GenerationStrategy::ComponentProps
        );
        assert_eq!(
            GenerationStrategy::for_styling(StylingSystem::Tailwind, ComponentLibrary::ShadcnUi),
            GenerationStrategy::UtilityClasses
        );
    }

    #[test]
    fn test_project_context_deserializes_partial_json() {
        let json = r#"{"framework": "React", "components": [{"name": "Button"}]}"#;
        let ctx: ProjectContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.framework.as_deref(), Some("React"));
        assert_eq!(ctx.components[0].name, "Button");
        assert!(ctx.design_tokens.is_none());
    }
}
