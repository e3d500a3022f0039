//! Palette theme for interactive prompts

use console::{Color, Style};
use dialoguer::theme::Theme;
use std::fmt;

/// Branded theme for dialoguer
pub struct PaletteTheme {
    prompt_style: Style,
    active_style: Style,
    inactive_style: Style,
    hint_style: Style,
    success_style: Style,
    error_style: Style,
    active_prefix: &'static str,
    prompt_prefix: &'static str,
    success_prefix: &'static str,
}

impl Default for PaletteTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteTheme {
    pub fn new() -> Self {
        // Color256 approximations of the design system colors
        Self {
            prompt_style: Style::new().fg(Color::Color256(117)).bold(),
            active_style: Style::new().fg(Color::Color256(220)).bold(),
            inactive_style: Style::new().fg(Color::Color256(252)),
            hint_style: Style::new().fg(Color::Color256(242)),
            success_style: Style::new().fg(Color::Color256(114)),
            error_style: Style::new().fg(Color::Color256(210)),
            active_prefix: "❯ ",
            prompt_prefix: "◆ ",
            success_prefix: "✓ ",
        }
    }
}

impl Theme for PaletteTheme {
    fn format_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.prompt_style.apply_to(self.prompt_prefix),
            self.prompt_style.apply_to(prompt),
            self.hint_style.apply_to("(↑↓ navigate, enter select)")
        )
    }

    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        write!(f, "{}", self.error_style.apply_to(err))
    }

    fn format_confirm_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        let hint = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        write!(f, " {}", self.hint_style.apply_to(hint))
    }

    fn format_confirm_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        selection: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        match selection {
            Some(true) => write!(f, " {}", self.success_style.apply_to("Yes")),
            Some(false) => write!(f, " {}", self.error_style.apply_to("No")),
            None => Ok(()),
        }
    }

    fn format_select_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        self.format_prompt(f, prompt)
    }

    fn format_select_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        sel: &str,
    ) -> fmt::Result {
        write!(
            f,
            "{}{}: {}",
            self.success_style.apply_to(self.success_prefix),
            self.prompt_style.apply_to(prompt),
            self.success_style.apply_to(sel)
        )
    }

    fn format_select_prompt_item(
        &self,
        f: &mut dyn fmt::Write,
        text: &str,
        active: bool,
    ) -> fmt::Result {
        if active {
            write!(
                f,
                "{}{}",
                self.active_style.apply_to(self.active_prefix),
                self.active_style.apply_to(text)
            )
        } else {
            write!(f, "  {}", self.inactive_style.apply_to(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_prompt_shows_default_hint() {
        console::set_colors_enabled(false);
        let theme = PaletteTheme::new();
        let mut out = String::new();
        theme.format_confirm_prompt(&mut out, "Overwrite Button.tsx?", Some(false)).unwrap();
        assert!(out.contains("Overwrite Button.tsx?"));
        assert!(out.ends_with("[y/N]"));
    }

    #[test]
    fn test_inactive_item_is_indented() {
        console::set_colors_enabled(false);
        let theme = PaletteTheme::new();
        let mut out = String::new();
        theme.format_select_prompt_item(&mut out, "Vue", false).unwrap();
        assert_eq!(out, "  Vue");
    }
}
