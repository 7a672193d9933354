//! Packages a directory of e-learning content as a SCORM 1.2 or SCORM 2004
//! (3rd/4th edition) package: `imsmanifest.xml`, `metadata.xml`, the bundled
//! schema files for the edition and, optionally, a zip archive.
//!
//! ```no_run
//! use scorm_pack::{build_package, PackageRequest};
//!
//! let mut request = PackageRequest::new("./course");
//! request.title = Some("Fire Safety".into());
//! request.version = Some("2004 4th Edition".into());
//! request.package.zip = Some(true);
//!
//! build_package(&request, |msg| println!("{}", msg)).unwrap();
//! ```

pub mod archive;
pub mod config;
pub mod definitions;
pub mod directory;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod package;
pub mod report;
pub mod version;
pub mod xml;

pub use config::{normalize, NormalizedConfig, PackageRequest};
pub use error::{ErrorKind, PackageError, Result};
pub use package::{build_package, PackageOutput, Packager, Stage, DONE};
pub use report::{LogReporter, Reporter, SilentReporter};
pub use version::{SchemaDialect, SchemaFamily, SchemaSelection, VERSION_TABLE};
