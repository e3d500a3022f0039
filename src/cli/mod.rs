//! CLI command implementations

pub mod context;
pub mod detect;
pub mod generate;
pub mod info;
pub mod init;

use std::path::Path;
use tracing::info;

use crate::ai::prompts;
use crate::config::Config;
use crate::context::{ConfigurationAwareContextManager, ContextManager, OptimizedContext};
use crate::error::{PaletteResult, ResultExt};
use crate::project::{
    analyze_project, detect_configuration, AnalysisLimits, ProjectConfiguration, ProjectContext,
};
use crate::ui::style::print_dim_warning;

/// Prompts for one request, with the optimizer's output when it ran
pub struct PreparedPrompts {
    pub configuration: ProjectConfiguration,
    pub system_prompt: String,
    pub user_prompt: String,
    pub optimized: Option<OptimizedContext>,
}

/// Substitute `fallback` for a failed step, telling the user in a dim line
fn or_notice<T>(result: PaletteResult<T>, fallback: impl FnOnce() -> T, what: &str) -> T {
    if let Err(e) = &result {
        print_dim_warning(&format!("{} unavailable ({}); continuing with defaults", what, e));
    }
    result.or_fallback_with(fallback, what)
}

/// Detected configuration with `[project]` overrides applied
pub fn resolve_configuration(config: &Config, root: &Path) -> ProjectConfiguration {
    let detected = or_notice(
        detect_configuration(root),
        ProjectConfiguration::default,
        "Project detection",
    );
    config.project.apply(detected)
}

/// Build the prompts for `request`, packing project context unless
/// `use_context` is off. Every failure degrades to the base prompts.
pub fn prepare_prompts(
    config: &Config,
    root: &Path,
    request: &str,
    max_tokens: Option<usize>,
    use_context: bool,
) -> PreparedPrompts {
    let configuration = resolve_configuration(config, root);
    let system_base = prompts::system_prompt(&configuration);
    let user_base = prompts::user_prompt(request, &configuration);

    if !use_context {
        return PreparedPrompts {
            configuration,
            system_prompt: system_base,
            user_prompt: user_base,
            optimized: None,
        };
    }

    let mut settings = config.context.settings();
    if let Some(max_tokens) = max_tokens {
        settings.total_tokens = max_tokens;
    }

    let project = or_notice(
        analyze_project(root, &configuration, &AnalysisLimits::default()),
        ProjectContext::default,
        "Project analysis",
    );

    let result = if config.context.configuration_aware {
        ConfigurationAwareContextManager::new(settings, configuration.clone())
            .optimize_context_with_configuration(request, &project, &system_base, &user_base)
    } else {
        ContextManager::new(settings).optimize_context(request, &project, &system_base, &user_base)
    };
    let optimized = or_notice(result.map(Some), || None, "Context optimization");

    match optimized {
        Some(optimized) => {
            info!(
                fragments = optimized.selected.len(),
                tokens = optimized.stats.packing.tokens_used,
                "project context attached"
            );
            PreparedPrompts {
                configuration,
                system_prompt: optimized.system_prompt.clone(),
                user_prompt: optimized.user_prompt.clone(),
                optimized: Some(optimized),
            }
        }
        None => PreparedPrompts {
            configuration,
            system_prompt: system_base,
            user_prompt: user_base,
            optimized: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Framework, StylingSystem};
    use std::fs;

    fn next_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"next": "14", "react": "18"}, "devDependencies": {"tailwindcss": "3"}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::write(
            dir.path().join("components/Button.jsx"),
            "export const Button = ({ label, onClick }) => null;",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_prepare_prompts_attaches_context() {
        let dir = next_project();
        let prepared = prepare_prompts(&Config::default(), dir.path(), "a signup form", None, true);

        assert_eq!(prepared.configuration.framework, Framework::NextJs);
        assert!(prepared.system_prompt.contains("## PROJECT CONTEXT"));
        assert!(prepared.system_prompt.contains("Button"));
        let stats = &prepared.optimized.unwrap().stats;
        assert!(stats.configuration.is_some());
    }

    #[test]
    fn test_no_context_uses_base_prompts() {
        let dir = next_project();
        let prepared =
            prepare_prompts(&Config::default(), dir.path(), "a signup form", None, false);
        assert!(prepared.optimized.is_none());
        assert!(!prepared.system_prompt.contains("## PROJECT CONTEXT"));
    }

    #[test]
    fn test_invalid_budget_falls_back_to_base_prompts() {
        let dir = next_project();
        let prepared =
            prepare_prompts(&Config::default(), dir.path(), "a signup form", Some(100), true);
        assert!(prepared.optimized.is_none());
        assert!(prepared.system_prompt.starts_with("You are Palette"));
    }

    #[test]
    fn test_overrides_apply_before_prompting() {
        let dir = next_project();
        let mut config = Config::default();
        config.project.styling = Some("chakra".to_string());

        let prepared = prepare_prompts(&config, dir.path(), "a card", None, false);
        assert_eq!(prepared.configuration.styling_system, StylingSystem::ChakraUi);
        assert!(prepared.system_prompt.contains("Styling: Chakra UI"));
    }
}
