use std::fmt::{self, Display};

use crate::error::{PackageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFamily {
    Scorm12,
    Scorm2004,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaDialect {
    Scorm12Edition,
    Scorm20043rdEdition,
    Scorm20044thEdition,
}

impl SchemaFamily {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaFamily::Scorm12 => "scorm12",
            SchemaFamily::Scorm2004 => "scorm2004",
        }
    }
}

impl SchemaDialect {
    /// Directory name of the bundled definition files for this dialect.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaDialect::Scorm12Edition => "scorm12edition",
            SchemaDialect::Scorm20043rdEdition => "scorm20043rdedition",
            SchemaDialect::Scorm20044thEdition => "scorm20044thedition",
        }
    }

    /// Text of the manifest's `<schemaversion>` element.
    pub fn schema_version(&self) -> &'static str {
        match self {
            SchemaDialect::Scorm12Edition => "1.2",
            SchemaDialect::Scorm20043rdEdition => "2004 3rd Edition",
            SchemaDialect::Scorm20044thEdition => "2004 4th Edition",
        }
    }

    pub fn family(&self) -> SchemaFamily {
        match self {
            SchemaDialect::Scorm12Edition => SchemaFamily::Scorm12,
            SchemaDialect::Scorm20043rdEdition | SchemaDialect::Scorm20044thEdition => {
                SchemaFamily::Scorm2004
            }
        }
    }
}

impl Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSelection {
    pub family: SchemaFamily,
    pub dialect: SchemaDialect,
}

impl SchemaSelection {
    pub const fn new(family: SchemaFamily, dialect: SchemaDialect) -> Self {
        SchemaSelection { family, dialect }
    }
}

const SCORM_12: SchemaSelection =
    SchemaSelection::new(SchemaFamily::Scorm12, SchemaDialect::Scorm12Edition);
const SCORM_2004_3RD: SchemaSelection =
    SchemaSelection::new(SchemaFamily::Scorm2004, SchemaDialect::Scorm20043rdEdition);
const SCORM_2004_4TH: SchemaSelection =
    SchemaSelection::new(SchemaFamily::Scorm2004, SchemaDialect::Scorm20044thEdition);

/// Every accepted version spelling and the schema it selects. Matching is exact.
pub const VERSION_TABLE: &[(&str, SchemaSelection)] = &[
    ("1.2", SCORM_12),
    ("2004.3", SCORM_2004_3RD),
    ("2004v3", SCORM_2004_3RD),
    ("2004 3rd Edition", SCORM_2004_3RD),
    ("2004.4", SCORM_2004_4TH),
    ("2004v4", SCORM_2004_4TH),
    ("2004 4th Edition", SCORM_2004_4TH),
];

/// Looks `version` up in [`VERSION_TABLE`].
pub fn lookup(version: &str) -> Option<SchemaSelection> {
    VERSION_TABLE
        .iter()
        .find(|(spelling, _)| *spelling == version)
        .map(|(_, selection)| *selection)
}

/// Canonical names of the supported editions, for error messages and `versions`.
pub fn supported_versions() -> Vec<&'static str> {
    vec![
        SchemaDialect::Scorm12Edition.schema_version(),
        SchemaDialect::Scorm20043rdEdition.schema_version(),
        SchemaDialect::Scorm20044thEdition.schema_version(),
    ]
}

pub fn resolve(version: &str) -> Result<SchemaSelection> {
    lookup(version).ok_or_else(|| PackageError::UnsupportedVersion {
        version: version.to_string(),
        supported: supported_versions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn resolve_all_spellings() {
        assert_eq!(resolve("1.2").unwrap(), SCORM_12);
        for v in ["2004.3", "2004v3", "2004 3rd Edition"] {
            assert_eq!(resolve(v).unwrap().dialect, SchemaDialect::Scorm20043rdEdition);
        }
        for v in ["2004.4", "2004v4", "2004 4th Edition"] {
            let s = resolve(v).unwrap();
            assert_eq!(s.family, SchemaFamily::Scorm2004);
            assert_eq!(s.dialect, SchemaDialect::Scorm20044thEdition);
        }
    }

    #[test]
    fn resolve_is_exact_match() {
        for v in ["", "1.2 ", "2004", "2004 4th edition", "scorm12", "1.3"] {
            let e = resolve(v).expect_err(v);
            assert_eq!(e.kind(), ErrorKind::UnsupportedVersion);
        }
    }

    #[test]
    fn table_is_consistent() {
        for (_, selection) in VERSION_TABLE {
            assert_eq!(selection.dialect.family(), selection.family);
        }
    }

    #[test]
    fn schema_version_strings() {
        assert_eq!(supported_versions(), vec!["1.2", "2004 3rd Edition", "2004 4th Edition"]);
        assert_eq!(SchemaDialect::Scorm20043rdEdition.to_string(), "scorm20043rdedition");
        assert_eq!(SchemaFamily::Scorm2004.code(), "scorm2004");
    }
}
