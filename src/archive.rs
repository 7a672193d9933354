use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::PackageInfo;
use crate::error::{PackageError, Result};
use crate::xml::clean_and_trim;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub file_name: String,
    /// Size of the finished archive in bytes.
    pub bytes: u64,
}

/// `<name>_v<version>_<date>[_<timestamp>].zip`, each part reduced to file-name safe characters.
pub fn archive_file_name(package: &PackageInfo, timestamp: Option<i64>) -> String {
    let mut name = format!(
        "{}_v{}_{}",
        clean_and_trim(&package.name),
        clean_and_trim(&package.version),
        clean_and_trim(&package.date)
    );
    if let Some(t) = timestamp {
        name.push_str(&format!("_{}", t));
    }
    name + ".zip"
}

/// Builds the archive path for `package`, creating the output folder.
pub fn prepare_output(package: &PackageInfo) -> Result<PathBuf> {
    std::fs::DirBuilder::new()
        .recursive(true)
        .create(&package.output_folder)
        .map_err(|e| {
            PackageError::io(
                format!("Failed to create {}", package.output_folder.display()),
                e,
            )
        })?;
    let timestamp = if package.append_time_to_output {
        Some(chrono::Utc::now().timestamp_millis())
    } else {
        None
    };
    Ok(package
        .output_folder
        .join(archive_file_name(package, timestamp)))
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<String>>()
        .join("/")
}

/// Entries of 4 GiB or more need ZIP64 headers.
fn needs_zip64(len: u64) -> bool {
    len >= u32::MAX as u64
}

fn entry_options(len: u64) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(needs_zip64(len))
}

fn progress_bar(len: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{wide_bar:.green/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("Archiving");
    pb
}

/// Zips the whole of `dir` into `out`, entries relative to `dir`.
///
/// When `out` itself lies inside `dir` it is left out of the archive.
pub fn zip_directory(dir: &Path, out: &Path, show_progress: bool) -> Result<ArchiveReport> {
    let f = File::create(out)
        .map_err(|e| PackageError::io(format!("Failed to create {}", out.display()), e))?;
    let out_canon = out.canonicalize().ok();
    let dir_canon = dir
        .canonicalize()
        .map_err(|e| PackageError::io(format!("Cannot archive {}", dir.display()), e))?;

    let entries = WalkDir::new(&dir_canon)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, walkdir::Error>>()?;
    let pb = progress_bar(entries.len() as u64, show_progress);

    let mut zip = ZipWriter::new(f);
    let dir_options = entry_options(0);

    for ent in &entries {
        pb.inc(1);
        let relative = ent
            .path()
            .strip_prefix(&dir_canon)
            .map_err(|e| PackageError::Archive(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        if out_canon.as_deref() == Some(ent.path()) {
            continue;
        }
        let name = entry_name(relative);

        if ent.file_type().is_dir() {
            zip.add_directory(name, dir_options)?;
        } else if ent.file_type().is_file() {
            let len = ent.metadata()?.len();
            zip.start_file(name, entry_options(len))?;
            let mut src = File::open(ent.path()).map_err(|e| {
                PackageError::io(format!("Failed to open {}", ent.path().display()), e)
            })?;
            io::copy(&mut src, &mut zip).map_err(|e| {
                PackageError::io(format!("Failed to archive {}", ent.path().display()), e)
            })?;
        } else {
            log::warn!("Skipping symlink {} while archiving", ent.path().display());
        }
    }

    let f = zip.finish()?;
    pb.finish_and_clear();
    let bytes = f
        .metadata()
        .map_err(|e| PackageError::io(format!("Failed to stat {}", out.display()), e))?
        .len();

    Ok(ArchiveReport {
        path: out.to_path_buf(),
        file_name: out
            .file_name()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_default(),
        bytes,
    })
}
