use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use norpreg_core::constants::DOCS_CONFIG_ENV;
use norpreg_core::{DocsConfig, DocsService};

/// Main entry point for the NORPREG documentation build
///
/// Renders the data model documentation into the configured output directory.
///
/// # Environment Variables
/// - `NORPREG_DOCS_CONFIG`: path to the documentation config (default: `docs/docs.yaml`,
///   built-in defaults if that does not exist either)
/// - `RUST_LOG`: log filter, added to the default `norpreg=info`
///
/// # Returns
/// * `Ok(())` - If every page was written
/// * `Err(anyhow::Error)` - If the config is invalid or a page could not be written
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("norpreg=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let override_path = std::env::var_os(DOCS_CONFIG_ENV).map(PathBuf::from);
    let config = DocsConfig::resolve(override_path)?;

    tracing::info!(
        "++ Building {} {} into {}",
        config.project(),
        config.release(),
        config.output_dir().display()
    );

    let written = DocsService::new(config).build()?;
    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}
