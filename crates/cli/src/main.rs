use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dicom::{CompressedDvh, DicomDate, DicomTime};
use norpreg_core::{entities, entity, migrate_file, validate_named, Domain, RecordFormat};
use norpreg_keys::{ExportPseudoKey, KeyGenerator, PatientKey};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "norpreg")]
#[command(about = "NORPREG data model tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all entities of the data model
    List {
        /// Only list entities of this domain
        #[arg(long, value_enum)]
        domain: Option<DomainArg>,
    },
    /// Show the fields of one entity
    Fields {
        /// Entity name, for example `Patient` or `DVH`
        entity: String,
    },
    /// Validate a JSON or YAML record and print it normalised
    Validate {
        /// Entity name, for example `Patient` or `DVH`
        entity: String,
        /// Record file
        file: PathBuf,
        /// Input format (guessed from the file extension if omitted)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Pack DVH samples into the compressed `dvh_string` form
    DvhEncode {
        /// Samples, one per curve point
        #[arg(required = true, allow_negative_numbers = true)]
        samples: Vec<f64>,
    },
    /// Unpack a compressed `dvh_string`
    DvhDecode {
        /// Base64 text as stored in the DVH record
        encoded: String,
    },
    /// Normalise a DICOM date (`YYYYMMDD`)
    DicomDate { value: String },
    /// Normalise a DICOM time (`HHMMSS[.ffffff]`)
    DicomTime { value: String },
    /// Draw fresh pseudonymised keys
    NewKey {
        #[arg(long, value_enum, default_value_t = KeyKind::Patient)]
        kind: KeyKind,
        /// Number of distinct keys to draw
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Check that a key is in canonical form
    CheckKey {
        #[arg(long, value_enum, default_value_t = KeyKind::Patient)]
        kind: KeyKind,
        key: String,
    },
    /// Move `title`/`description` of every `Field(...)` into `json_schema_extra`, in place
    MigrateFieldMetadata {
        /// Python model source
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    Registry,
    Clinical,
    Rt,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Registry => Domain::Registry,
            DomainArg::Clinical => Domain::Clinical,
            DomainArg::Rt => Domain::Radiotherapy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for RecordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => RecordFormat::Json,
            FormatArg::Yaml => RecordFormat::Yaml,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum KeyKind {
    /// Registry key, 7 hexadecimal characters
    Patient,
    /// Per-release pseudonym, 5 hexadecimal characters
    Export,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("norpreg=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List { domain }) => {
            let domain = domain.map(Domain::from);
            for meta in entities().filter(|meta| domain.is_none_or(|d| meta.domain == d)) {
                println!("{:<28} {:<10} {}", meta.name, meta.domain.slug(), meta.title);
            }
        }
        Some(Commands::Fields { entity: name }) => {
            let meta = entity(&name).with_context(|| format!("unknown entity '{name}'"))?;
            for field in meta.fields {
                let required = if field.required { "påkrevd" } else { "valgfri" };
                println!(
                    "{:<32} {:<20} {:<8} {}",
                    field.name,
                    field.kind.label(),
                    required,
                    field.display_title()
                );
            }
        }
        Some(Commands::Validate {
            entity: name,
            file,
            format,
        }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let format = format.map_or_else(|| RecordFormat::from_path(&file), RecordFormat::from);
            let record = validate_named(&name, &text, format)
                .with_context(|| format!("{} is not a valid {name} record", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(Commands::DvhEncode { samples }) => {
            let packed = CompressedDvh::from_samples(&samples)?;
            println!("{}", packed.as_str());
        }
        Some(Commands::DvhDecode { encoded }) => {
            let samples = CompressedDvh::parse(&encoded)?.samples()?;
            let rendered: Vec<String> = samples.iter().map(|s| format!("{s:.2}")).collect();
            println!("{}", rendered.join(" "));
        }
        Some(Commands::DicomDate { value }) => {
            println!("{}", DicomDate::parse(&value)?);
        }
        Some(Commands::DicomTime { value }) => {
            println!("{}", DicomTime::parse(&value)?);
        }
        Some(Commands::NewKey { kind, count }) => {
            for key in draw_keys(kind, count)? {
                println!("{key}");
            }
        }
        Some(Commands::CheckKey { kind, key }) => {
            match kind {
                KeyKind::Patient => PatientKey::parse_canonical(&key).map(|_| ())?,
                KeyKind::Export => ExportPseudoKey::parse_canonical(&key).map(|_| ())?,
            }
            println!("{key} is a valid {kind:?} key");
        }
        Some(Commands::MigrateFieldMetadata { file }) => {
            let migration = migrate_file(&file)?;
            tracing::info!(rewritten = migration.rewritten, "field metadata migrated");
            println!("Oppdatert {}", file.display());
        }
        None => {
            println!("Use 'norpreg --help' for commands");
        }
    }

    Ok(())
}

impl KeyKind {
    /// Number of distinct canonical keys of this kind.
    fn space(self) -> usize {
        let space = match self {
            KeyKind::Patient => PatientKey::SPACE,
            KeyKind::Export => ExportPseudoKey::SPACE,
        };
        space as usize
    }
}

/// Draw `count` keys that are distinct from each other.
fn draw_keys(kind: KeyKind, count: usize) -> anyhow::Result<Vec<String>> {
    anyhow::ensure!(
        count <= kind.space(),
        "cannot draw {count} distinct {kind:?} keys, only {} exist",
        kind.space()
    );
    let mut generator = KeyGenerator::new();
    let mut keys = Vec::with_capacity(count);
    match kind {
        KeyKind::Patient => {
            let mut issued = HashSet::new();
            for _ in 0..count {
                let key = generator.patient_key_avoiding(&issued)?;
                keys.push(key.to_string());
                issued.insert(key);
            }
        }
        KeyKind::Export => {
            let mut issued = HashSet::new();
            for _ in 0..count {
                let key = generator.export_pseudo_key_avoiding(&issued)?;
                keys.push(key.to_string());
                issued.insert(key);
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_validate_with_explicit_format() {
        let args = ["norpreg", "validate", "DVH", "dvh.txt", "--format", "yaml"];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Validate {
                format: Some(FormatArg::Yaml),
                ..
            })
        ));
    }

    #[test]
    fn dvh_encode_requires_samples() {
        assert!(Cli::try_parse_from(["norpreg", "dvh-encode"]).is_err());
        let cli = Cli::try_parse_from(["norpreg", "dvh-encode", "0", "50", "100"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::DvhEncode { samples }) if samples == [0.0, 50.0, 100.0]
        ));
    }

    #[test]
    fn drawn_keys_are_distinct_and_canonical() {
        let keys = draw_keys(KeyKind::Export, 50).expect("draw");
        let distinct: HashSet<_> = keys.iter().collect();
        assert_eq!(distinct.len(), 50);
        assert!(keys.iter().all(|key| ExportPseudoKey::is_canonical(key)));

        let keys = draw_keys(KeyKind::Patient, 3).expect("draw");
        assert!(keys.iter().all(|key| PatientKey::is_canonical(key)));
    }

    #[test]
    fn key_count_is_capped_by_key_space() {
        let err = draw_keys(KeyKind::Export, ExportPseudoKey::SPACE as usize + 1)
            .expect_err("more keys than exist");
        assert!(err.to_string().contains("only 1048576 exist"));

        assert!(draw_keys(KeyKind::Patient, usize::MAX).is_err());
        assert!(draw_keys(KeyKind::Export, 0).expect("no keys").is_empty());
    }
}
