//! Component parsing using tree-sitter
//!
//! Extracts the exported component and its prop names from JavaScript and
//! TypeScript sources so existing components can be offered for reuse.

use std::fs;
use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::error::{PaletteError, PaletteResult};

/// Source dialects the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
}

impl Dialect {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" => Some(Dialect::JavaScript),
            "ts" | "tsx" | "mts" => Some(Dialect::TypeScript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A component found in a source file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedComponent {
    pub name: String,
    pub props: Vec<String>,
}

/// Component parser holding one tree-sitter parser per dialect
pub struct ComponentParser {
    javascript_parser: Parser,
    typescript_parser: Parser,
}

impl ComponentParser {
    pub fn new() -> PaletteResult<Self> {
        let mut javascript_parser = Parser::new();
        javascript_parser
            .set_language(tree_sitter_javascript::language())
            .map_err(|e| {
                PaletteError::Analysis(format!("Failed to set JavaScript language: {}", e))
            })?;

        let mut typescript_parser = Parser::new();
        typescript_parser
            .set_language(tree_sitter_typescript::language_tsx())
            .map_err(|e| {
                PaletteError::Analysis(format!("Failed to set TypeScript language: {}", e))
            })?;

        Ok(Self {
            javascript_parser,
            typescript_parser,
        })
    }

    /// Parse a file; `None` when it holds no exported component
    pub fn parse_file(&mut self, path: &Path) -> PaletteResult<Option<ParsedComponent>> {
        let Some(dialect) = Dialect::from_path(path) else {
            return Ok(None);
        };
        let source = fs::read_to_string(path)?;
        Ok(self.parse_source(&source, dialect))
    }

    pub fn parse_source(&mut self, source: &str, dialect: Dialect) -> Option<ParsedComponent> {
        let parser = match dialect {
            Dialect::JavaScript => &mut self.javascript_parser,
            Dialect::TypeScript => &mut self.typescript_parser,
        };
        let tree = parser.parse(source, None)?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut components = Vec::new();
        collect_exported_components(root, bytes, &mut components);
        let (name, param_props) = components.into_iter().next()?;

        let declared = declared_props(root, bytes, &name);
        let props = if declared.is_empty() { param_props } else { declared };

        Some(ParsedComponent { name, props })
    }
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Exported PascalCase functions and arrow-function constants, with the
/// prop names destructured in their first parameter
fn collect_exported_components(
    node: Node<'_>,
    source: &[u8],
    out: &mut Vec<(String, Vec<String>)>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "export_statement" {
            continue;
        }
        let Some(declaration) = child
            .child_by_field_name("declaration")
            .or_else(|| child.child_by_field_name("value"))
        else {
            continue;
        };

        match declaration.kind() {
            "function_declaration" | "function" | "function_expression" => {
                if let Some(name) = declaration.child_by_field_name("name") {
                    let name = text(name, source);
                    if is_component_name(name) {
                        out.push((name.to_string(), parameter_props(declaration, source)));
                    }
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut inner = declaration.walk();
                for declarator in declaration.named_children(&mut inner) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(name) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    let name = text(name, source);
                    if !is_component_name(name) {
                        continue;
                    }
                    let props = declarator
                        .child_by_field_name("value")
                        .map(|value| {
                            first_function(value)
                                .map(|f| parameter_props(f, source))
                                .unwrap_or_default()
                        })
                        .unwrap_or_default();
                    out.push((name.to_string(), props));
                }
            }
            _ => {}
        }
    }
}

/// The arrow function or function expression inside `node`, looking through
/// wrappers such as `forwardRef(...)` and `memo(...)`
fn first_function(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "arrow_function" | "function" | "function_expression" => Some(node),
        _ => {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            children.into_iter().find_map(first_function)
        }
    }
}

fn parameter_props(function: Node<'_>, source: &[u8]) -> Vec<String> {
    let Some(params) = function
        .child_by_field_name("parameters")
        .or_else(|| function.child_by_field_name("parameter"))
    else {
        return Vec::new();
    };

    let mut patterns = Vec::new();
    find_kind(params, "object_pattern", &mut patterns);
    let Some(pattern) = patterns.into_iter().next() else {
        return Vec::new();
    };

    let mut props = Vec::new();
    let mut cursor = pattern.walk();
    for entry in pattern.named_children(&mut cursor) {
        let name = match entry.kind() {
            "shorthand_property_identifier_pattern" => Some(entry),
            "pair_pattern" => entry.child_by_field_name("key"),
            "object_assignment_pattern" => entry.child_by_field_name("left"),
            _ => None,
        };
        if let Some(name) = name {
            props.push(text(name, source).to_string());
        }
    }
    props
}

/// Property names of `{Name}Props` (interface or type alias)
fn declared_props(root: Node<'_>, source: &[u8], component: &str) -> Vec<String> {
    let wanted = format!("{}Props", component);
    let mut declarations = Vec::new();
    find_kind(root, "interface_declaration", &mut declarations);
    find_kind(root, "type_alias_declaration", &mut declarations);

    let Some(declaration) = declarations.into_iter().find(|d| {
        d.child_by_field_name("name")
            .is_some_and(|n| text(n, source) == wanted || text(n, source) == "Props")
    }) else {
        return Vec::new();
    };

    let mut signatures = Vec::new();
    find_kind(declaration, "property_signature", &mut signatures);
    signatures
        .into_iter()
        .filter_map(|sig| sig.child_by_field_name("name"))
        .map(|name| text(name, source).to_string())
        .collect()
}

fn find_kind<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    if node.kind() == kind {
        out.push(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    for child in children {
        find_kind(child, kind, out);
    }
}
