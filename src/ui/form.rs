//! Interactive forms with option descriptions

use anyhow::Result;
use console::Term;
use dialoguer::{Confirm, Select};

use super::style::colors;
use super::theme::PaletteTheme;

/// A single option in a form selection
#[derive(Debug, Clone)]
pub struct FormOption {
    /// Short label shown in the selection list
    pub label: String,
    /// Longer description shown below the label
    pub description: String,
    /// Whether this is the recommended option
    pub recommended: bool,
}

impl FormOption {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            recommended: false,
        }
    }

    /// Mark this option as recommended
    pub fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }

    fn display(&self) -> String {
        if self.recommended {
            format!("{} (Detected)", self.label)
        } else {
            self.label.clone()
        }
    }
}

/// Interactive form builder
#[derive(Default)]
pub struct PaletteForm {
    theme: PaletteTheme,
}

impl PaletteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-select question; `None` when cancelled
    pub fn select(&self, question: &str, options: &[FormOption]) -> Result<Option<usize>> {
        self.print_question_header(question);
        self.print_options_preview(options);

        let items: Vec<String> = options.iter().map(FormOption::display).collect();
        let default = options.iter().position(|o| o.recommended).unwrap_or(0);

        let selection = Select::with_theme(&self.theme)
            .items(&items)
            .default(default)
            .interact_on_opt(&Term::stderr())?;

        if let Some(idx) = selection {
            println!(
                "\n{}  ✓ Selected: {}{}{}",
                colors::SUCCESS, colors::BOLD, options[idx].label, colors::RESET
            );
        }
        Ok(selection)
    }

    /// Yes/no confirmation; `None` when cancelled
    pub fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>> {
        let result = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact_on_opt(&Term::stderr())?;
        Ok(result)
    }

    fn print_question_header(&self, question: &str) {
        println!();
        println!("{}{}◆ {}{}", colors::PRIMARY, colors::BOLD, question, colors::RESET);
        println!("{}  ╭{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
    }

    fn print_options_preview(&self, options: &[FormOption]) {
        for (i, opt) in options.iter().enumerate() {
            let last = i == options.len() - 1;
            println!(
                "{}  {} {}{}{}{}",
                colors::MUTED,
                if last { "╰" } else { "├" },
                colors::FG,
                colors::BOLD,
                opt.label,
                colors::RESET
            );
            if !opt.description.is_empty() {
                println!(
                    "{}  {}   {}{}{}",
                    colors::MUTED,
                    if last { " " } else { "│" },
                    colors::DIM,
                    opt.description,
                    colors::RESET
                );
            }
        }
        println!();
    }
}
