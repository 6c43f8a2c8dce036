//! Markdown API docs for the Python modules of a working copy
//!
//! Docstrings and signatures are read straight from the source text with a
//! line scanner, so nothing from the repository is imported or executed.
//! Only public names (no leading underscore) are documented.

use regex::Regex;
use repogen_core::{ErrorContext, RepogenError, RepogenResult};
use repogen_repo::RepoWalker;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const NO_MODULES: &str = "# No Python modules found for documentation.";

static DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap());
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)\s*[(:]").unwrap());

/// Longest signature we are willing to follow across lines
const MAX_SIGNATURE_LINES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Class,
    Function,
}

/// A documented class or function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocItem {
    pub kind: ItemKind,
    pub name: String,
    /// Declaration without the trailing colon, e.g. `def run(self, n: int) -> None`
    pub signature: String,
    pub docstring: Option<String>,
    /// Methods, for classes
    pub members: Vec<DocItem>,
}

/// Everything extracted from one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDoc {
    pub docstring: Option<String>,
    pub items: Vec<DocItem>,
}

impl ModuleDoc {
    /// Scan Python source text
    pub fn parse(source: &str) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let mut doc = ModuleDoc::default();

        let mut i = skip_preamble(&lines, 0);
        if let Some((docstring, next)) = read_docstring(&lines, i) {
            doc.docstring = Some(docstring);
            i = next;
        }

        // Index of the class whose body we are in, and that body's indent
        let mut current_class: Option<(usize, Option<usize>)> = None;

        while i < lines.len() {
            let line = lines[i];
            let stripped = line.trim_start();
            if stripped.is_empty() || stripped.starts_with('#') {
                i += 1;
                continue;
            }
            let indent = line.len() - stripped.len();

            if indent == 0 {
                if stripped.starts_with('@') {
                    i += 1;
                    continue;
                }
                current_class = None;

                if let Some((item, next)) = parse_item(&lines, i) {
                    if item.name.starts_with('_') {
                        i = next;
                        continue;
                    }
                    if item.kind == ItemKind::Class {
                        current_class = Some((doc.items.len(), None));
                    }
                    doc.items.push(item);
                    i = next;
                    continue;
                }
            } else if let Some((class_index, body_indent)) = current_class.as_mut() {
                let body_indent = *body_indent.get_or_insert(indent);
                if indent == body_indent && !stripped.starts_with('@') {
                    if let Some((item, next)) = parse_item(&lines, i) {
                        if item.kind == ItemKind::Function && !item.name.starts_with('_') {
                            doc.items[*class_index].members.push(item);
                        }
                        i = next;
                        continue;
                    }
                }
            }

            i += 1;
        }

        doc
    }

    /// Markdown body placed under the module heading
    pub fn to_markdown(&self) -> String {
        let mut sections = Vec::new();

        if let Some(docstring) = &self.docstring {
            sections.push(docstring.clone());
        }

        for item in &self.items {
            let mut section = format!("### `{}`", item.signature);
            if let Some(docstring) = &item.docstring {
                section.push_str("\n\n");
                section.push_str(docstring);
            }
            for member in &item.members {
                section.push_str(&format!("\n\n#### `{}`", member.signature));
                if let Some(docstring) = &member.docstring {
                    section.push_str("\n\n");
                    section.push_str(docstring);
                }
            }
            sections.push(section);
        }

        if sections.is_empty() {
            return "_No public API found._".to_string();
        }
        sections.join("\n\n")
    }
}

/// Renders `DOCUMENTATION.md` for every `.py` file of a working copy
#[derive(Debug, Clone)]
pub struct DocsGenerator {
    excluded_dirs: Vec<String>,
}

impl Default for DocsGenerator {
    fn default() -> Self {
        Self {
            excluded_dirs: vec![".git".to_string()],
        }
    }
}

impl DocsGenerator {
    pub fn new(excluded_dirs: Vec<String>) -> Self {
        Self { excluded_dirs }
    }

    pub fn generate(&self, root: &Path) -> RepogenResult<String> {
        if !root.is_dir() {
            return Err(RepogenError::Artifact {
                message: format!("Not a directory: {}", root.display()),
                source: None,
                context: ErrorContext::new("docs_generator").with_operation("generate"),
            });
        }

        let modules: Vec<_> = RepoWalker::new(root)
            .with_excluded_dirs(self.excluded_dirs.clone())
            .files()
            .into_iter()
            .filter(|f| f.extension.as_deref() == Some(".py") && !f.file_name.starts_with('.'))
            .collect();

        if modules.is_empty() {
            return Ok(NO_MODULES.to_string());
        }

        debug!(root = %root.display(), modules = modules.len(), "Extracting Python docs");

        let sections: Vec<String> = modules
            .iter()
            .map(|file| {
                let name = module_name(&file.relative_path);
                let body = match std::fs::read(root.join(&file.relative_path))
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
                {
                    Ok(source) => ModuleDoc::parse(&source).to_markdown(),
                    Err(e) => {
                        warn!(module = %name, error = %e, "Skipping unreadable module");
                        format!("Error generating docs: {}", e)
                    }
                };
                format!("## Module `{}`\n\n{}", name, body)
            })
            .collect();

        Ok(sections.join("\n\n"))
    }
}

/// `pkg/sub/mod.py` -> `pkg.sub.mod`
pub fn module_name(relative_path: &Path) -> String {
    let path = relative_path.with_extension("");
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Index of the first line that is neither blank nor a comment
fn skip_preamble(lines: &[&str], mut i: usize) -> usize {
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// A `class`/`def` starting at `start`, and the index after its header and docstring
fn parse_item(lines: &[&str], start: usize) -> Option<(DocItem, usize)> {
    let stripped = lines[start].trim_start();
    let (kind, name) = if let Some(caps) = DEF_RE.captures(stripped) {
        (ItemKind::Function, caps[1].to_string())
    } else if let Some(caps) = CLASS_RE.captures(stripped) {
        (ItemKind::Class, caps[1].to_string())
    } else {
        return None;
    };

    let (signature, header_end, inline_body) = read_signature(lines, start)?;
    let mut next = header_end + 1;
    let mut docstring = None;

    if !inline_body {
        let body_start = skip_preamble(lines, next);
        if let Some((text, after)) = read_docstring(lines, body_start) {
            docstring = Some(text);
            next = after;
        }
    }

    Some((
        DocItem {
            kind,
            name,
            signature,
            docstring,
            members: Vec::new(),
        },
        next,
    ))
}

/// Header text up to its closing colon, the line the colon is on, and
/// whether a statement follows the colon on that same line
fn read_signature(lines: &[&str], start: usize) -> Option<(String, usize, bool)> {
    let mut depth = 0i32;
    let mut header = String::new();

    for (offset, line) in lines[start..].iter().take(MAX_SIGNATURE_LINES).enumerate() {
        let text = line.trim();
        for (pos, ch) in text.char_indices() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ':' if depth == 0 => {
                    header.push_str(&text[..pos]);
                    let rest = text[pos + 1..].trim();
                    let inline_body = !rest.is_empty() && !rest.starts_with('#');
                    return Some((normalize_signature(&header), start + offset, inline_body));
                }
                _ => {}
            }
        }
        header.push_str(text);
        header.push(' ');
    }

    None
}

fn normalize_signature(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(" ,", ",")
}

/// A string literal statement at `start`, cleaned like `inspect.cleandoc`
fn read_docstring(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let first = lines.get(start)?.trim_start();
    let prefix_len = first
        .chars()
        .take_while(|c| matches!(c, 'r' | 'R' | 'u' | 'U'))
        .count();
    if prefix_len > 1 {
        return None;
    }
    let literal = &first[prefix_len..];

    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| literal.starts_with(q))?;
    let after_open = &literal[quote.len()..];

    if quote.len() == 1 {
        let end = after_open.find(quote)?;
        return Some((after_open[..end].trim().to_string(), start + 1));
    }

    if let Some(end) = after_open.find(quote) {
        return Some((after_open[..end].trim().to_string(), start + 1));
    }

    let mut raw = vec![after_open];
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if let Some(end) = line.find(quote) {
            raw.push(&line[..end]);
            return Some((clean_docstring(&raw), start + offset + 2));
        }
        raw.push(*line);
    }

    None
}

fn clean_docstring(raw: &[&str]) -> String {
    let first = raw.first().map(|l| l.trim()).unwrap_or_default();
    let rest = raw.get(1..).unwrap_or_default();

    // Margin is counted in chars; indentation may hold multi-byte whitespace
    let margin = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut lines = vec![first.to_string()];
    lines.extend(rest.iter().map(|l| {
        if l.trim().is_empty() {
            String::new()
        } else {
            let body = l.char_indices().nth(margin).map_or("", |(i, _)| &l[i..]);
            body.trim_end().to_string()
        }
    }));

    lines.join("\n").trim().to_string()
}
