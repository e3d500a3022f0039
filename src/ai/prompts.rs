//! Prompt templates for component generation

use crate::project::{
    ComponentLibrary, Framework, GenerationStrategy, ProjectConfiguration, StylingSystem,
};

const BASE_INSTRUCTIONS: &str = r#"You are Palette, an expert front-end engineer who writes production-ready UI components.

Guidelines:
- Write complete, working components (not pseudocode)
- Reuse the project's existing components and design tokens when they fit
- Keep components accessible: semantic elements, labels, keyboard support
- Prefer composition over configuration; keep props minimal and typed
- Do not invent dependencies the project does not already use

Output Format:
- Return each file in its own fenced code block
- Put the file path in the fence info, for example ```tsx title="components/Button.tsx"
- No explanations outside the code blocks"#;

/// System prompt for the detected configuration, before any project context
pub fn system_prompt(configuration: &ProjectConfiguration) -> String {
    let mut sections = vec![BASE_INSTRUCTIONS.to_string()];

    let mut target = Vec::new();
    if configuration.framework != Framework::Unknown {
        target.push(format!("Framework: {}", configuration.framework));
    }
    if configuration.typescript {
        target.push("Language: TypeScript (export prop types)".to_string());
    }
    if configuration.styling_system != StylingSystem::Unknown {
        target.push(format!("Styling: {}", configuration.styling_system));
    }
    if configuration.component_library != ComponentLibrary::None {
        target.push(format!("Component library: {}", configuration.component_library));
    }
    if !target.is_empty() {
        sections.push(format!("Target stack:\n{}", bullet(&target)));
    }

    sections.push(format!(
        "Styling approach: {}",
        strategy_instruction(configuration.generation_strategy)
    ));
    sections.join("\n\n")
}

fn strategy_instruction(strategy: GenerationStrategy) -> &'static str {
    match strategy {
        GenerationStrategy::UtilityClasses => {
            "style with utility classes in className; no inline style objects or separate stylesheets"
        }
        GenerationStrategy::ComponentProps => {
            "style through the component library's props and theme; avoid raw CSS and utility classes"
        }
        GenerationStrategy::CssInJs => {
            "co-locate styles with styled/css helpers next to the component"
        }
        GenerationStrategy::ScopedStylesheets => {
            "put styles in a scoped stylesheet next to the component and reference its class names"
        }
        GenerationStrategy::Generic => "use plain, framework-idiomatic styling",
    }
}

/// User prompt wrapping the request
pub fn user_prompt(request: &str, configuration: &ProjectConfiguration) -> String {
    let extension = configuration.framework.component_extension(configuration.typescript);
    format!(
        "Create the following UI component:\n\n{}\n\nWrite the component as a .{} file.",
        request.trim(),
        extension
    )
}

fn bullet(lines: &[String]) -> String {
    lines.iter().map(|l| format!("- {}", l)).collect::<Vec<_>>().join("\n")
}
