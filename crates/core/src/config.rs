//! Documentation build configuration.
//!
//! The config is resolved once at process startup and then passed into the renderer. Nothing in
//! this module reads environment variables; the binaries read `NORPREG_DOCS_CONFIG` and pass
//! the value in as an override.

use crate::constants::{
    DEFAULT_AUTHOR, DEFAULT_COPYRIGHT, DEFAULT_DOCS_CONFIG_PATH, DEFAULT_LANGUAGE,
    DEFAULT_OUTPUT_DIR, DEFAULT_PROJECT, DEFAULT_RELEASE,
};
use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format of the documentation build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One Markdown page per domain plus an index.
    #[default]
    Markdown,
    /// The metadata tables as a single JSON document.
    Json,
}

/// Order in which fields are listed on an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberOrder {
    /// Declaration order.
    #[default]
    Bysource,
    Alphabetical,
}

/// Documentation configuration, validated at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    project: String,
    copyright: String,
    author: String,
    release: String,
    language: String,
    output_dir: PathBuf,
    format: OutputFormat,
    show_json: bool,
    show_field_list: bool,
    show_required: bool,
    show_default: bool,
    member_order: MemberOrder,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.into(),
            copyright: DEFAULT_COPYRIGHT.into(),
            author: DEFAULT_AUTHOR.into(),
            release: DEFAULT_RELEASE.into(),
            language: DEFAULT_LANGUAGE.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            show_json: true,
            show_field_list: true,
            show_required: false,
            show_default: false,
            member_order: MemberOrder::default(),
        }
    }
}

impl DocsConfig {
    /// Create a config for `project` at `release`, with every other setting at its default.
    pub fn new(project: impl Into<String>, release: impl Into<String>) -> SchemaResult<Self> {
        Self {
            project: project.into(),
            release: release.into(),
            ..Self::default()
        }
        .validated()
    }

    /// Parse a YAML config. Absent keys take their defaults.
    pub fn from_yaml(text: &str) -> SchemaResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        let config: Self = serde_path_to_error::deserialize(deserializer).map_err(|err| {
            SchemaError::InvalidConfig(format!("{}: {}", err.path(), err.inner()))
        })?;
        config.validated()
    }

    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), project = %config.project, "loaded docs config");
        Ok(config)
    }

    /// Resolve the config file (see [`resolve_docs_config_path`]) and load it, falling back to
    /// defaults when no file exists.
    pub fn resolve(override_path: Option<PathBuf>) -> SchemaResult<Self> {
        match resolve_docs_config_path(override_path)? {
            Some(path) => Self::load(&path),
            None => {
                tracing::info!("no docs config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validated(self) -> SchemaResult<Self> {
        if self.project.trim().is_empty() {
            return Err(SchemaError::InvalidConfig("project cannot be empty".into()));
        }
        if self.release.trim().is_empty() {
            return Err(SchemaError::InvalidConfig("release cannot be empty".into()));
        }
        if self.language.trim().is_empty() {
            return Err(SchemaError::InvalidConfig("language cannot be empty".into()));
        }
        Ok(self)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Language tag written into every page (`lang` front matter, `language` in JSON).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_member_order(mut self, member_order: MemberOrder) -> Self {
        self.member_order = member_order;
        self
    }

    /// Toggle the per-field "required" and "default" annotations.
    pub fn with_field_annotations(mut self, show_required: bool, show_default: bool) -> Self {
        self.show_required = show_required;
        self.show_default = show_default;
        self
    }

    pub fn with_json_examples(mut self, show_json: bool) -> Self {
        self.show_json = show_json;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn show_json(&self) -> bool {
        self.show_json
    }

    pub fn show_field_list(&self) -> bool {
        self.show_field_list
    }

    pub fn show_required(&self) -> bool {
        self.show_required
    }

    pub fn show_default(&self) -> bool {
        self.show_default
    }

    pub fn member_order(&self) -> MemberOrder {
        self.member_order
    }
}

/// Resolve the documentation config file without reading environment variables.
///
/// If `override_path` is provided it must be an existing file. Otherwise this looks for
/// `docs/docs.yaml` relative to the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`. Returns `None` when no config file exists.
pub fn resolve_docs_config_path(override_path: Option<PathBuf>) -> SchemaResult<Option<PathBuf>> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(SchemaError::InvalidConfig(format!(
            "NORPREG_DOCS_CONFIG override {} is not a file",
            path.display()
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_DOCS_CONFIG_PATH);
    if cwd_relative.is_file() {
        return Ok(Some(cwd_relative));
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    Ok(manifest_dir
        .ancestors()
        .map(|ancestor| ancestor.join(DEFAULT_DOCS_CONFIG_PATH))
        .find(|candidate| candidate.is_file()))
}
