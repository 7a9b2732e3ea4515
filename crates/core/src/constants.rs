//! Constants used throughout the NORPREG core crate.

/// Environment variable naming the documentation config file. Read by the binaries only.
pub const DOCS_CONFIG_ENV: &str = "NORPREG_DOCS_CONFIG";

/// Documentation config location, relative to the repository root.
pub const DEFAULT_DOCS_CONFIG_PATH: &str = "docs/docs.yaml";

/// Where rendered documentation goes unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "docs/_build";

pub const DEFAULT_PROJECT: &str = "Datamodell for NORPREG";
pub const DEFAULT_AUTHOR: &str = "Helge Pettersen";
pub const DEFAULT_COPYRIGHT: &str = "2025, Helge Pettersen";
pub const DEFAULT_RELEASE: &str = "0.9";
pub const DEFAULT_LANGUAGE: &str = "en";

/// File name of the documentation landing page.
pub const INDEX_FILENAME: &str = "index.md";

/// File name of the machine-readable schema.
pub const SCHEMA_JSON_FILENAME: &str = "schema.json";
