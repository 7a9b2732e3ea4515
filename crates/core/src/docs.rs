//! Documentation rendering for the data model.
//!
//! Walks the static metadata tables and produces either Markdown (one page per [`Domain`] plus
//! an index) or a single JSON schema document. Field text is taken verbatim from the tables;
//! only characters that would change the Markdown structure are escaped.

use crate::config::{DocsConfig, MemberOrder, OutputFormat};
use crate::constants::{INDEX_FILENAME, SCHEMA_JSON_FILENAME};
use crate::error::{SchemaError, SchemaResult};
use crate::metadata::{Domain, EntityMeta, FieldMeta};
use crate::record::entities;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Matches the area and volume units written as `cm2` / `cm3`.
static SQUARE_CUBE_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcm([23])\b").expect("Invalid unit regex"));

/// Renders the data model documentation according to a [`DocsConfig`].
#[derive(Debug, Clone)]
pub struct DocsService {
    config: DocsConfig,
}

impl DocsService {
    pub fn new(config: DocsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Render and write the documentation into the configured output directory.
    ///
    /// Returns the paths written, index first for Markdown output.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::OutputDirCreation` if the directory cannot be created and
    /// `SchemaError::FileWrite` if a page cannot be written.
    pub fn build(&self) -> SchemaResult<Vec<PathBuf>> {
        self.build_into(self.config.output_dir())
    }

    /// As [`DocsService::build`], writing into `out_dir` instead of the configured directory.
    pub fn build_into(&self, out_dir: &Path) -> SchemaResult<Vec<PathBuf>> {
        fs::create_dir_all(out_dir).map_err(SchemaError::OutputDirCreation)?;

        let pages = match self.config.format() {
            OutputFormat::Markdown => {
                let front_matter = format!("---\nlang: {}\n---\n\n", self.config.language());
                let mut pages = vec![(
                    INDEX_FILENAME.to_string(),
                    format!("{front_matter}{}", self.render_index()),
                )];
                for domain in Domain::ALL {
                    let page = format!("{front_matter}{}", self.render_domain(domain)?);
                    pages.push((format!("{}.md", domain.slug()), page));
                }
                pages
            }
            OutputFormat::Json => vec![(SCHEMA_JSON_FILENAME.to_string(), self.render_json()?)],
        };

        let mut written = Vec::with_capacity(pages.len());
        for (file_name, content) in pages {
            let path = out_dir.join(file_name);
            fs::write(&path, content).map_err(|source| SchemaError::FileWrite {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote documentation page");
            written.push(path);
        }

        tracing::info!(
            out_dir = %out_dir.display(),
            pages = written.len(),
            "documentation built"
        );
        Ok(written)
    }

    /// The landing page: project title, release and one link per domain page.
    pub fn render_index(&self) -> String {
        let mut output = format!("# {}\n\n", self.config.project());
        output.push_str(&format!("Versjon {}\n\n", self.config.release()));
        output.push_str("## Innhold\n\n");
        for domain in Domain::ALL {
            let count = entities().filter(|meta| meta.domain == domain).count();
            output.push_str(&format!(
                "- [{}]({}.md) ({count} entiteter)\n",
                domain.title(),
                domain.slug()
            ));
        }
        output.push_str(&format!(
            "\n---\n\n© {}. {}.\n",
            self.config.copyright(),
            self.config.author()
        ));
        output
    }

    /// One page holding every entity of `domain`, in documentation order.
    pub fn render_domain(&self, domain: Domain) -> SchemaResult<String> {
        let mut output = format!("# {}\n", domain.title());
        for meta in entities().filter(|meta| meta.domain == domain) {
            output.push('\n');
            output.push_str(&self.render_entity(meta)?);
        }
        Ok(output)
    }

    /// Render a single entity section.
    ///
    /// The section has a heading, the entity description, an optional field summary, an
    /// optional JSON block of the metadata table and one subsection per field.
    pub fn render_entity(&self, meta: &EntityMeta) -> SchemaResult<String> {
        let mut output = String::new();
        if meta.title.is_empty() {
            output.push_str(&format!("## `{}`\n\n", meta.name));
        } else {
            output.push_str(&format!("## {} (`{}`)\n\n", meta.title, meta.name));
        }
        if !meta.description.is_empty() {
            output.push_str(&escape_prose(meta.description));
            output.push_str("\n\n");
        }

        let fields = self.ordered_fields(meta);

        if self.config.show_field_list() {
            output.push_str("**Felter:**\n\n");
            for field in &fields {
                output.push_str(&format!(
                    "- `{}` ({})\n",
                    field.name,
                    field.kind.label()
                ));
            }
            output.push('\n');
        }

        if self.config.show_json() {
            let json = serde_json::to_string_pretty(meta).map_err(SchemaError::JsonSerialization)?;
            output.push_str("```json\n");
            output.push_str(&json);
            output.push_str("\n```\n\n");
        }

        for field in fields {
            output.push_str(&self.render_field(field));
        }
        Ok(output)
    }

    fn ordered_fields<'a>(&self, meta: &'a EntityMeta) -> Vec<&'a FieldMeta> {
        let mut fields: Vec<&FieldMeta> = meta.fields.iter().collect();
        if self.config.member_order() == MemberOrder::Alphabetical {
            fields.sort_by_key(|field| field.name);
        }
        fields
    }

    fn render_field(&self, field: &FieldMeta) -> String {
        let mut output = format!("### `{}`: {}\n\n", field.name, field.display_title());
        if !field.description.is_empty() {
            output.push_str(&escape_prose(field.description));
            output.push_str("\n\n");
        }

        let mut lines = vec![format!("**Type:** {}", field.kind.label())];
        if self.config.show_required() {
            let required = if field.required { "ja" } else { "nei" };
            lines.push(format!("**Påkrevd:** {required}"));
        }
        if self.config.show_default() {
            if let Some(default) = field.default {
                lines.push(format!("**Standardverdi:** `{default}`"));
            }
        }
        if let Some(unit) = field.unit {
            lines.push(format!("**Enhet:** {}", format_unit(unit)));
        }
        if !field.values.is_empty() {
            lines.push(format!("**Mulige verdier:** {}", format_values(field.values)));
        }
        if let Some(terminology) = field.terminology {
            lines.push(format!("**Kodeverk:** {terminology}"));
        }
        if let Some(tag) = field.dicom {
            lines.push(format!("**DICOM:** {tag}"));
        }
        if field.encrypted {
            lines.push("**Kryptert datafelt**".to_string());
        }

        for line in lines {
            output.push_str("- ");
            output.push_str(&line);
            output.push('\n');
        }
        output.push('\n');
        output
    }

    /// The metadata tables as a JSON document with project and release information.
    pub fn render_json(&self) -> SchemaResult<String> {
        let mut entity_tables: Vec<&EntityMeta> = entities().collect();
        if self.config.member_order() == MemberOrder::Alphabetical {
            entity_tables.sort_by_key(|meta| meta.name);
        }
        let document = serde_json::json!({
            "project": self.config.project(),
            "release": self.config.release(),
            "language": self.config.language(),
            "copyright": self.config.copyright(),
            "entities": entity_tables,
        });
        serde_json::to_string_pretty(&document).map_err(SchemaError::JsonSerialization)
    }
}

/// Render `cm2` and `cm3` with superscript exponents. Other units pass through unchanged.
pub fn format_unit(unit: &str) -> String {
    SQUARE_CUBE_UNIT
        .replace_all(unit, "cm<sup>$1</sup>")
        .into_owned()
}

fn format_values(values: &[(&str, &str)]) -> String {
    values
        .iter()
        .map(|(code, label)| {
            if code == label || label.is_empty() {
                format!("`{code}`")
            } else {
                format!("`{code}` ({label})")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape line-start `#` and triple backticks so field text cannot open headings or code blocks.
fn escape_prose(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                line.replacen('#', r"\#", 1)
            } else {
                line.replace("```", r"\`\`\`")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
