use std::path::{Path, PathBuf};

use crate::error::{PackageError, Result};
use crate::version::SchemaDialect;

/// Overrides the directory holding the bundled `<dialect>/` folders.
pub const DEFINITIONS_ENV: &str = "SCORM_PACK_DEFINITIONS";

const SCORM12_FILES: &[&str] = &[
    "adlcp_rootv1p2.xsd",
    "ims_xml.xsd",
    "imscp_rootv1p1p2.xsd",
    "imsmd_rootv1p2p1.xsd",
    // metadata.xml is written as IEEE LOM for every dialect.
    "lom.xsd",
];

const SCORM2004_FILES: &[&str] = &[
    "adlcp_v1p3.xsd",
    "adlnav_v1p3.xsd",
    "adlseq_v1p3.xsd",
    "imscp_v1p1.xsd",
    "imsss_v1p0.xsd",
    "lom.xsd",
    "xml.xsd",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionFileEntry {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// The fixed, ordered file list shipped for `dialect`.
pub fn definition_file_names(dialect: SchemaDialect) -> &'static [&'static str] {
    match dialect {
        SchemaDialect::Scorm12Edition => SCORM12_FILES,
        SchemaDialect::Scorm20043rdEdition | SchemaDialect::Scorm20044thEdition => {
            SCORM2004_FILES
        }
    }
}

/// Where the bundled definition files live: `$SCORM_PACK_DEFINITIONS`, or the
/// `definitions/` directory next to this crate's manifest.
pub fn default_definitions_root() -> PathBuf {
    match std::env::var_os(DEFINITIONS_ENV) {
        Some(x) if !x.is_empty() => PathBuf::from(x),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("definitions"),
    }
}

/// Pairs every bundled file of `dialect` with its copy target under `target_dir`.
pub fn resolve(
    dialect: SchemaDialect,
    definitions_root: &Path,
    target_dir: &Path,
) -> Vec<DefinitionFileEntry> {
    let dialect_dir = definitions_root.join(dialect.code());
    definition_file_names(dialect)
        .iter()
        .map(|name| DefinitionFileEntry {
            name: name.to_string(),
            source: dialect_dir.join(name),
            destination: target_dir.join(name),
        })
        .collect()
}

/// Copies one entry, overwriting whatever is at the destination.
pub fn copy_entry(dialect: SchemaDialect, entry: &DefinitionFileEntry) -> Result<()> {
    if !entry.source.is_file() {
        return Err(PackageError::DefinitionFileMissing {
            dialect,
            path: entry.source.clone(),
        });
    }
    if let Some(parent) = entry.destination.parent() {
        std::fs::DirBuilder::new()
            .recursive(true)
            .create(parent)
            .map_err(|e| {
                PackageError::io(format!("Failed to create {}", parent.display()), e)
            })?;
    }
    std::fs::copy(&entry.source, &entry.destination).map_err(|e| {
        PackageError::io(
            format!(
                "Failed to copy {} to {}",
                entry.source.display(),
                entry.destination.display()
            ),
            e,
        )
    })?;
    Ok(())
}
