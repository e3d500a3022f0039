//! Info command - show version, config location and API key status

use anyhow::Result;

use crate::config::{self, Config};
use crate::ui::style::{print_header, print_row};

pub fn run(config: &Config, config_path: Option<&str>) -> Result<()> {
    print_header(&format!("Palette v{}", env!("CARGO_PKG_VERSION")));
    print_row("OS", format!("{} {}", std::env::consts::OS, std::env::consts::ARCH));

    let path = config::resolve_path(config_path)
        .map(|p| {
            let state = if p.exists() { "" } else { " (not created)" };
            format!("{}{}", p.display(), state)
        })
        .unwrap_or_else(|_| "unknown".to_string());
    print_row("Config", path);

    print_row("Model", &config.ai.model);
    let key_status = if std::env::var(&config.ai.api_key_env).is_ok() {
        "configured"
    } else {
        "not configured"
    };
    print_row(&config.ai.api_key_env, key_status);
    print_row(
        "Context",
        format!(
            "{} tokens, {} reserved, {}",
            config.context.max_tokens,
            config.context.reserved_tokens,
            if config.context.configuration_aware { "configuration-aware" } else { "basic" }
        ),
    );
    println!();

    Ok(())
}
