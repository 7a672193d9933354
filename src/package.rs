use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveReport};
use crate::config::{self, NormalizedConfig, PackageRequest};
use crate::definitions;
use crate::directory::directory_size;
use crate::error::{PackageError, Result};
use crate::manifest::{self, MANIFEST_FILE, METADATA_FILE};
use crate::metadata;
use crate::report::{LogReporter, Reporter};
use crate::version::{self, SchemaSelection};

/// Token handed to the completion callback.
pub const DONE: &str = "Done";

static LOG_REPORTER: LogReporter = LogReporter;

/// Last step a packaging run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    VersionResolved,
    SizeComputed,
    ManifestWritten,
    MetadataWritten,
    DefinitionFilesCopied,
    ArchiveBuilt,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::VersionResolved => "version resolution",
            Stage::SizeComputed => "size computation",
            Stage::ManifestWritten => "manifest",
            Stage::MetadataWritten => "metadata",
            Stage::DefinitionFilesCopied => "definition files",
            Stage::ArchiveBuilt => "archive",
            Stage::Done => "done",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub selection: SchemaSelection,
    pub config: NormalizedConfig,
    pub manifest_path: PathBuf,
    pub metadata_path: PathBuf,
    pub definition_files: Vec<PathBuf>,
    pub archive: Option<ArchiveReport>,
}

/// Runs one packaging operation at a time; concurrent runs against the same
/// `source` or output folder are not coordinated.
pub struct Packager<'a> {
    definitions_root: PathBuf,
    reporter: &'a dyn Reporter,
    show_progress: bool,
}

impl Default for Packager<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager<'static> {
    pub fn new() -> Self {
        Packager {
            definitions_root: definitions::default_definitions_root(),
            reporter: &LOG_REPORTER,
            show_progress: false,
        }
    }
}

impl<'a> Packager<'a> {
    pub fn with_reporter<'b>(self, reporter: &'b dyn Reporter) -> Packager<'b> {
        Packager {
            definitions_root: self.definitions_root,
            reporter,
            show_progress: self.show_progress,
        }
    }

    pub fn with_definitions_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.definitions_root = root.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Packages `request`. Failures are reported once, with the step they
    /// interrupted, then returned.
    pub fn build(&self, request: &PackageRequest) -> Result<PackageOutput> {
        let mut stage = Stage::Init;
        let ret = self.run(request, &mut stage);
        if let Err(e) = &ret {
            match e {
                PackageError::UnsupportedVersion { .. } => self.reporter.error(&e.to_string()),
                _ => self
                    .reporter
                    .error(&format!("Packaging failed after {}: {}", stage, e)),
            }
        }
        ret
    }

    /// Like [`Packager::build`], invoking `callback` with [`DONE`] on success.
    pub fn build_with_callback<F: FnOnce(&str)>(
        &self,
        request: &PackageRequest,
        callback: F,
    ) -> Result<PackageOutput> {
        let out = self.build(request)?;
        callback(DONE);
        Ok(out)
    }

    fn step(&self, stage: &mut Stage, next: Stage) {
        *stage = next;
        log::debug!("Reached stage {:?}", next);
    }

    fn run(&self, request: &PackageRequest, stage: &mut Stage) -> Result<PackageOutput> {
        self.reporter.info("Init");
        let mut config = config::normalize(request)?;

        // Nothing may touch the filesystem before the version resolves.
        let selection = version::resolve(&config.version)?;
        self.step(stage, Stage::VersionResolved);

        if config.package.size.is_none() {
            config.package.size = Some(directory_size(&config.source)?);
        }
        self.step(stage, Stage::SizeComputed);

        let manifest_xml = manifest::generate(selection, &config);
        let metadata_xml = metadata::generate(selection.dialect, &config);
        let definition_files =
            definitions::resolve(selection.dialect, &self.definitions_root, &config.source);

        let manifest_path = config.source.join(MANIFEST_FILE);
        self.output_file(&manifest_path, &manifest_xml)?;
        self.step(stage, Stage::ManifestWritten);

        let metadata_path = config.source.join(METADATA_FILE);
        self.output_file(&metadata_path, &metadata_xml)?;
        self.step(stage, Stage::MetadataWritten);

        for entry in &definition_files {
            definitions::copy_entry(selection.dialect, entry)?;
            self.reporter
                .info(&format!("create {}", entry.destination.display()));
        }
        self.step(stage, Stage::DefinitionFilesCopied);

        let archive = if config.package.zip {
            let zip_path = archive::prepare_output(&config.package)?;
            self.reporter.info(&format!(
                "Archiving {} to {}",
                config.source.display(),
                zip_path.display()
            ));
            let report = archive::zip_directory(&config.source, &zip_path, self.show_progress)?;
            self.reporter
                .info(&format!("{} {} total bytes", report.file_name, report.bytes));
            self.step(stage, Stage::ArchiveBuilt);
            Some(report)
        } else {
            None
        };

        self.step(stage, Stage::Done);
        Ok(PackageOutput {
            selection,
            config,
            manifest_path,
            metadata_path,
            definition_files: definition_files.into_iter().map(|x| x.destination).collect(),
            archive,
        })
    }

    /// Writes `content` to `path`, creating missing parent directories.
    fn output_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::DirBuilder::new()
                .recursive(true)
                .create(parent)
                .map_err(|e| PackageError::io(format!("Failed to create {}", parent.display()), e))?;
        }
        std::fs::write(path, content)
            .map_err(|e| PackageError::io(format!("Failed to write {}", path.display()), e))?;
        self.reporter.info(&format!("create {}", path.display()));
        Ok(())
    }
}

/// Packages `request` with the default packager, calling `callback` with
/// [`DONE`] once everything is in place.
pub fn build_package<F: FnOnce(&str)>(
    request: &PackageRequest,
    callback: F,
) -> Result<PackageOutput> {
    Packager::new().build_with_callback(request, callback)
}
