//! Field-metadata migration for the Python model sources.
//!
//! Rewrites `Field(..., title="...", description="...")` calls so that the two display
//! strings move into `json_schema_extra={"title": ..., "description": ...}`. Calls lacking
//! either keyword, and all text outside `Field(...)` calls, are copied unchanged.

use crate::error::{SchemaError, SchemaResult};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

static FIELD_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bField\(").expect("Invalid Field call regex"));

/// `title=` argument with its leading comma, single- or double-quoted, possibly multi-line.
static TITLE_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#",?\s*\btitle\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("Invalid title regex")
});

static DESCRIPTION_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#",?\s*\bdescription\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("Invalid description regex")
});

/// Result of migrating one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub output: String,
    /// Number of `Field(...)` calls that were rewritten.
    pub rewritten: usize,
}

/// Rewrite every `Field(...)` call in `source` that carries both `title=` and `description=`.
pub fn migrate_field_metadata(source: &str) -> Migration {
    let mut output = String::with_capacity(source.len());
    let mut rewritten = 0;
    let mut cursor = 0;

    while let Some(found) = FIELD_CALL.find_at(source, cursor) {
        let open = found.end() - 1;
        let Some(close) = closing_paren(source, open) else {
            tracing::warn!(offset = found.start(), "unbalanced Field call, leaving the rest as is");
            break;
        };

        output.push_str(&source[cursor..found.start()]);
        match rewrite_arguments(&source[open + 1..close]) {
            Some(arguments) => {
                output.push_str("Field(");
                output.push_str(&arguments);
                output.push(')');
                rewritten += 1;
            }
            None => output.push_str(&source[found.start()..=close]),
        }
        cursor = close + 1;
    }
    output.push_str(&source[cursor..]);

    Migration { output, rewritten }
}

/// Migrate the file at `path` in place.
///
/// # Errors
///
/// Returns `SchemaError::FileRead` or `SchemaError::FileWrite` on I/O failure.
pub fn migrate_file(path: &Path) -> SchemaResult<Migration> {
    let source = std::fs::read_to_string(path).map_err(|source| SchemaError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let migration = migrate_field_metadata(&source);
    std::fs::write(path, &migration.output).map_err(|source| SchemaError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        rewritten = migration.rewritten,
        "migrated field metadata"
    );
    Ok(migration)
}

fn rewrite_arguments(inside: &str) -> Option<String> {
    let title = clean_value(quoted(&TITLE_ARG.captures(inside)?));
    let description = clean_value(quoted(&DESCRIPTION_ARG.captures(inside)?));

    let without_title = TITLE_ARG.replace_all(inside, "");
    let remaining = DESCRIPTION_ARG.replace_all(&without_title, "");
    let mut remaining = remaining.trim();
    if let Some(stripped) = remaining.strip_suffix(',') {
        remaining = stripped.trim_end();
    }
    if let Some(stripped) = remaining.strip_prefix(',') {
        remaining = stripped.trim_start();
    }

    let extra = format!(
        "json_schema_extra={{\"title\": \"{title}\", \"description\": \"{description}\"}}"
    );
    if remaining.is_empty() {
        Some(extra)
    } else {
        Some(format!("{remaining}, {extra}"))
    }
}

fn quoted<'t>(captures: &Captures<'t>) -> &'t str {
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map_or("", |m| m.as_str())
}

/// Collapse newlines, trim, and re-quote the value for a double-quoted literal.
fn clean_value(raw: &str) -> String {
    let flattened = raw.replace('\n', " ").replace(r"\'", "'");
    let mut cleaned = String::with_capacity(flattened.len());
    let mut previous = None;
    for c in flattened.trim().chars() {
        if c == '"' && previous != Some('\\') {
            cleaned.push('\\');
        }
        cleaned.push(c);
        previous = Some(c);
    }
    cleaned
}

/// Byte offset of the `)` matching the `(` at `open`, skipping string literals and comments.
fn closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_comment = false;

    for (offset, c) in text[open..].char_indices() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => in_comment = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
