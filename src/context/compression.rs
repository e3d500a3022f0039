//! Content-aware compression of context fragments
//!
//! Each fragment shape has its own way of shedding lines while keeping what
//! the model needs most: signatures for code, the head of long token lists,
//! the labelled fields of a project summary.

use super::fragment::estimate_tokens;

const ABBREVIATED_CODE: &str = "// ... (abbreviated)";
const ABBREVIATED_TEXT: &str = "... (abbreviated) ...";
const MAX_ESSENTIAL_LINES: usize = 10;
const MAX_TOKEN_ITEMS: usize = 5;
const LONG_TOKEN_LIST: usize = 50;
const MAX_STRUCTURE_BULLETS: usize = 20;
const HEAD_ONLY_LINE_LIMIT: usize = 10;

const CODE_KEYWORDS: &[&str] = &["import ", "export ", "const ", "function "];

const STRUCTURE_FIELDS: &[&str] = &[
    "Framework:",
    "Styling:",
    "TypeScript:",
    "Components:",
    "Key features:",
];

/// Shape of a fragment's content, sniffed from its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    ComponentExample,
    DesignTokens,
    ProjectStructure,
    Generic,
}

impl ContentShape {
    pub fn sniff(content: &str) -> Self {
        let has = |needles: &[&str]| needles.iter().any(|n| content.contains(n));

        if content.lines().any(starts_with_code_keyword) {
            ContentShape::ComponentExample
        } else if has(&["colors:", "spacing:", "typography:"]) {
            ContentShape::DesignTokens
        } else if has(&["Framework:", "Styling:"]) {
            ContentShape::ProjectStructure
        } else {
            ContentShape::Generic
        }
    }

    /// Smallest fraction of the original size this shape can shrink to
    pub fn max_compression_ratio(&self) -> f32 {
        match self {
            ContentShape::ComponentExample => 0.3,
            ContentShape::DesignTokens => 0.4,
            ContentShape::ProjectStructure => 0.5,
            ContentShape::Generic => 0.7,
        }
    }
}

/// Shrinks fragment content towards a target ratio of its original size
#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor;

impl Compressor {
    pub fn new() -> Self {
        Self
    }

    pub fn max_compression_ratio(&self, content: &str) -> f32 {
        ContentShape::sniff(content).max_compression_ratio()
    }

    /// Whether `content` can be squeezed to `target_ratio` of its size
    pub fn can_compress_to(&self, content: &str, target_ratio: f32) -> bool {
        target_ratio >= self.max_compression_ratio(content)
    }

    /// Compress `content` to roughly `target_ratio` of its size.
    ///
    /// The result is never longer than the input.
    pub fn compress(&self, content: &str, target_ratio: f32) -> String {
        if content.is_empty() || target_ratio >= 1.0 {
            return content.to_string();
        }
        let ratio = target_ratio.max(0.0);

        let compressed = match ContentShape::sniff(content) {
            ContentShape::ComponentExample => compress_component(content, ratio),
            ContentShape::DesignTokens => compress_design_tokens(content),
            ContentShape::ProjectStructure => compress_project_structure(content),
            ContentShape::Generic => compress_generic(content, ratio),
        };

        if compressed.chars().count() <= content.chars().count() {
            compressed
        } else {
            char_prefix(content, ratio)
        }
    }
}

fn char_prefix(content: &str, ratio: f32) -> String {
    let keep = (content.chars().count() as f32 * ratio).floor() as usize;
    content.chars().take(keep).collect()
}

/// Line opens with a declaration keyword
fn starts_with_code_keyword(line: &str) -> bool {
    let trimmed = line.trim_start();
    CODE_KEYWORDS.iter().any(|keyword| trimmed.starts_with(keyword))
}

fn is_essential_code_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("import ")
        || trimmed.starts_with("export ")
        || trimmed.starts_with("interface ")
        || trimmed.starts_with("type ")
        || trimmed.starts_with("function ")
        || trimmed.starts_with("return")
        || (trimmed.starts_with("const ") && (trimmed.contains("=>") || trimmed.contains("= (")))
}

fn compress_component(content: &str, ratio: f32) -> String {
    let target_tokens = (estimate_tokens(content) as f32 * ratio).floor() as usize;
    let essential: Vec<&str> = content
        .lines()
        .filter(|line| is_essential_code_line(line))
        .collect();
    if essential.is_empty() {
        return compress_generic(content, ratio);
    }

    let joined = essential.join("\n");
    if estimate_tokens(&joined) <= target_tokens.max(1) {
        return joined;
    }

    let mut kept: Vec<&str> = essential.into_iter().take(MAX_ESSENTIAL_LINES).collect();
    kept.push(ABBREVIATED_CODE);
    kept.join("\n")
}

/// Truncate a `key: a, b, c` list to its first few items
pub fn truncate_token_list(items: &[&str]) -> String {
    if items.len() <= MAX_TOKEN_ITEMS {
        return items.join(", ");
    }
    format!(
        "{}, ... ({} total)",
        items[..MAX_TOKEN_ITEMS].join(", "),
        items.len()
    )
}

fn compress_design_tokens(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let Some((key, value)) = line.split_once(':') else {
                return line.to_string();
            };
            let value = value.trim();
            if value.chars().count() <= LONG_TOKEN_LIST
                || !value.contains(',')
                || value.ends_with("total)")
            {
                return line.to_string();
            }
            let items: Vec<&str> = value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect();
            format!("{}: {}", key, truncate_token_list(&items))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn compress_project_structure(content: &str) -> String {
    let mut bullets = 0;
    content
        .lines()
        .filter(|line| {
            if STRUCTURE_FIELDS.iter().any(|field| line.contains(field)) {
                return true;
            }
            if line.trim_start().starts_with("- ") && bullets < MAX_STRUCTURE_BULLETS {
                bullets += 1;
                return true;
            }
            false
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn compress_generic(content: &str, ratio: f32) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let target_lines = (lines.len() as f32 * ratio).floor() as usize;

    if target_lines < HEAD_ONLY_LINE_LIMIT {
        if target_lines == 0 {
            return char_prefix(content, ratio);
        }
        return lines[..target_lines].join("\n");
    }

    let half = target_lines / 2;
    let mut kept: Vec<&str> = lines[..half].to_vec();
    kept.push(ABBREVIATED_TEXT);
    kept.extend_from_slice(&lines[lines.len() - half..]);
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BUTTON: &str = r#"import React from 'react';
import { cn } from '@/lib/utils';

interface ButtonProps {
  label: string;
  onClick?: () => void;
}

export function Button({ label, onClick }: ButtonProps) {
  const classes = cn('px-4 py-2 rounded', 'bg-blue-500');
  if (!label) {
    console.warn('missing label');
  }
  return <button className={classes} onClick={onClick}>{label}</button>;
}

export default Button;"#;

    #[test]
    fn test_sniff_shapes() {
        assert_eq!(ContentShape::sniff(BUTTON), ContentShape::ComponentExample);
        assert_eq!(ContentShape::sniff("colors: red, blue"), ContentShape::DesignTokens);
        assert_eq!(ContentShape::sniff("Framework: Next.js"), ContentShape::ProjectStructure);
        assert_eq!(ContentShape::sniff("plain prose"), ContentShape::Generic);
    }

    #[test]
    fn test_prose_mentioning_code_words_is_generic() {
        let rules = "- Do not import packages that are not dependencies.\n\
                     - Type all props with an exported interface.";
        assert_eq!(ContentShape::sniff(rules), ContentShape::Generic);
    }

    #[test]
    fn test_component_without_signatures_falls_back_to_generic() {
        let content = (0..12)
            .map(|i| format!("  value{i}: theme.spacing({i}),"))
            .collect::<Vec<_>>()
            .join("\n");
        let out = compress_component(&content, 0.5);
        assert_eq!(out.lines().count(), 6);
        assert!(out.starts_with("  value0"));
    }

    #[test]
    fn test_component_compression_keeps_signatures() {
        let out = Compressor::new().compress(BUTTON, 0.9);
        assert!(out.contains("import React"));
        assert!(out.contains("interface ButtonProps"));
        assert!(out.contains("export function Button"));
        assert!(out.contains("return <button"));
        assert!(!out.contains("console.warn"));
    }

    #[test]
    fn test_component_compression_abbreviates_when_tight() {
        let mut content = String::new();
        for i in 0..30 {
            content.push_str(&format!("import {{ Thing{i} }} from './thing{i}';\n"));
        }
        let out = Compressor::new().compress(&content, 0.3);
        assert_eq!(out.lines().count(), MAX_ESSENTIAL_LINES + 1);
        assert!(out.ends_with(ABBREVIATED_CODE));
    }

    #[test]
    fn test_design_token_lists_are_truncated() {
        let content =
            "colors: red, green, blue, yellow, purple, orange, pink, cyan, black, white, grey";
        let out = Compressor::new().compress(content, 0.5);
        assert_eq!(out, "colors: red, green, blue, yellow, purple, ... (11 total)");
    }

    #[test]
    fn test_short_token_lists_untouched() {
        let content = "spacing: 4px, 8px";
        assert_eq!(Compressor::new().compress(content, 0.5), content);
    }

    #[test]
    fn test_project_structure_keeps_fields_and_bullets() {
        let mut content =
            String::from("Framework: Next.js\nStyling: Tailwind CSS\nNotes: irrelevant\n");
        for i in 0..30 {
            content.push_str(&format!("- src/dir{i}\n"));
        }
        let out = Compressor::new().compress(&content, 0.5);
        assert!(out.contains("Framework: Next.js"));
        assert!(!out.contains("Notes"));
        assert_eq!(out.lines().filter(|l| l.starts_with("- ")).count(), MAX_STRUCTURE_BULLETS);
    }

    #[test]
    fn test_generic_head_only_for_small_targets() {
        let content = (0..10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let out = Compressor::new().compress(&content, 0.5);
        assert_eq!(out, "line 0\nline 1\nline 2\nline 3\nline 4");
    }

    #[test]
    fn test_generic_head_and_tail() {
        let content = (0..40)
            .map(|i| format!("sentence number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let out = Compressor::new().compress(&content, 0.5);
        assert!(out.starts_with("sentence number 0"));
        assert!(out.ends_with("sentence number 39"));
        assert!(out.contains(ABBREVIATED_TEXT));
    }

    #[test]
    fn test_max_ratio_for_generic_text() {
        assert_eq!(Compressor::new().max_compression_ratio("just some words"), 0.7);
        assert!(!Compressor::new().can_compress_to("just some words", 0.01));
    }

    proptest! {
        #[test]
        fn prop_compression_never_grows(content in "(?s).{0,600}", ratio in 0.0f32..0.99) {
            let out = Compressor::new().compress(&content, ratio);
            prop_assert!(out.chars().count() <= content.chars().count());
        }

        #[test]
        fn prop_line_based_compression_never_grows(
            lines in prop::collection::vec("[a-z ]{0,12}", 0..60),
            ratio in 0.0f32..0.99,
        ) {
            let content = lines.join("\n");
            let out = Compressor::new().compress(&content, ratio);
            prop_assert!(out.chars().count() <= content.chars().count());
        }
    }
}
