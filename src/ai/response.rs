//! Turning a model reply into files

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

static FENCE_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:title|filename|file|path)\s*=\s*["']?([^"'\s]+)"#)
        .expect("valid fence filename regex")
});

static FILE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?://|/\*|<!--|#)\s*(?:file|filename|path)\s*:\s*([^\s*>]+)")
        .expect("valid file comment regex")
});

const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "create", "make", "build", "generate", "write", "add", "new", "component",
    "with",
    "for", "and", "that", "which", "please", "me",
];

/// One file extracted from a reply
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

struct CodeBlock<'a> {
    info: &'a str,
    lines: Vec<&'a str>,
}

/// Split `response` into files. Blocks without a usable name are named
/// after `request` with `default_extension`.
pub fn parse_files(response: &str, request: &str, default_extension: &str) -> Vec<GeneratedFile> {
    let blocks = code_blocks(response);

    if blocks.is_empty() {
        let content = response.trim();
        if content.is_empty() {
            return Vec::new();
        }
        return vec![GeneratedFile {
            path: PathBuf::from(suggest_filename(request, default_extension, 0)),
            content: format!("{}\n", content),
        }];
    }

    blocks
        .into_iter()
        .enumerate()
        .filter_map(|(index, block)| {
            let mut lines = block.lines;
            let mut named = FENCE_FILENAME
                .captures(block.info)
                .map(|c| c[1].to_string());

            if named.is_none() {
                if let Some(capture) = lines
                    .first()
                    .and_then(|first| FILE_COMMENT.captures(first))
                {
                    named = Some(capture[1].to_string());
                    lines.remove(0);
                }
            }

            let content = lines.join("\n").trim().to_string();
            if content.is_empty() {
                return None;
            }

            let path = named
                .as_deref()
                .and_then(sanitize_path)
                .unwrap_or_else(|| {
                    let extension = fence_extension(block.info).unwrap_or(default_extension);
                    PathBuf::from(suggest_filename(request, extension, index))
                });

            Some(GeneratedFile {
                path,
                content: format!("{}\n", content),
            })
        })
        .collect()
}

fn code_blocks(response: &str) -> Vec<CodeBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock<'_>> = None;

    for line in response.lines() {
        let trimmed = line.trim_start();
        match current.take() {
            None => {
                if let Some(info) = trimmed.strip_prefix("```") {
                    current = Some(CodeBlock {
                        info: info.trim(),
                        lines: Vec::new(),
                    });
                }
            }
            Some(mut block) => {
                if trimmed.trim_end() == "```" {
                    blocks.push(block);
                } else {
                    block.lines.push(line);
                    current = Some(block);
                }
            }
        }
    }

    // An unterminated block still counts
    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}

/// Extension implied by the fence language
fn fence_extension(info: &str) -> Option<&'static str> {
    let language = info.split_whitespace().next()?;
    match language.to_lowercase().as_str() {
        "tsx" => Some("tsx"),
        "ts" | "typescript" => Some("ts"),
        "jsx" => Some("jsx"),
        "js" | "javascript" => Some("js"),
        "vue" => Some("vue"),
        "svelte" => Some("svelte"),
        "css" => Some("css"),
        "scss" => Some("scss"),
        _ => None,
    }
}

/// Relative path without parent or root components
fn sanitize_path(raw: &str) -> Option<PathBuf> {
    let path = Path::new(raw);
    let clean: PathBuf = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    clean.file_name().is_some().then_some(clean)
}

/// PascalCase file name from the first meaningful words of `request`
pub fn suggest_filename(request: &str, extension: &str, index: usize) -> String {
    let words: Vec<String> = request
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .filter(|w| !FILLER_WORDS.contains(&w.to_lowercase().as_str()))
        .take(3)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect();

    let base = if words.is_empty() {
        "Generated".to_string()
    } else {
        words.concat()
    };

    if index == 0 {
        format!("{}.{}", base, extension)
    } else {
        format!("{}{}.{}", base, index + 1, extension)
    }
}
