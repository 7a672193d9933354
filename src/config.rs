use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PackageError, Result};
use crate::manifest::organization_identifier;
use crate::xml::clean_and_trim;

pub const DEFAULT_VERSION: &str = "1.2";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MASTERY_SCORE: u8 = 80;
pub const DEFAULT_STARTING_PAGE: &str = "index.html";
pub const DEFAULT_ORGANIZATION: &str = "Organization";
pub const DEFAULT_TITLE: &str = "Untitled Course";
pub const DEFAULT_OUTPUT_FOLDER: &str = "./scorm";
pub const DEFAULT_PACKAGE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Sco,
    Asset,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Sco => "sco",
            ResourceKind::Asset => "asset",
        }
    }
}

/// Sequencing control mode of the organization (SCORM 2004 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlMode {
    pub choice: Option<bool>,
    pub flow: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItemRequest {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub kind: Option<ResourceKind>,
    pub files: Option<Vec<String>>,
    pub mastery_score: Option<u8>,
    pub objective_id: Option<String>,
    pub time_limit_action: Option<String>,
    pub data_from_lms: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypicalDuration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TypicalDuration {
    pub fn to_iso8601(&self) -> String {
        format!(
            "P{}Y{}M{}DT{}H{}M{}S",
            self.years, self.months, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VCardRequest {
    pub author: Option<String>,
    pub org: Option<String>,
    pub tel: Option<String>,
    pub address: Option<String>,
    pub mail: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageOptions {
    pub zip: Option<bool>,
    pub output_folder: Option<PathBuf>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
    pub append_time_to_output: Option<bool>,
    pub size: Option<u64>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub typical_duration: Option<TypicalDuration>,
    pub rights: Option<String>,
    pub vcard: Option<VCardRequest>,
}

/// What a caller asks for. Everything except `source` may be left out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageRequest {
    pub source: Option<PathBuf>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub identifier: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub mastery_score: Option<u8>,
    pub starting_page: Option<String>,
    pub control_mode: Option<ControlMode>,
    pub items: Option<Vec<ContentItemRequest>>,
    pub package: PackageOptions,
}

impl PackageRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        PackageRequest {
            source: Some(source.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub identifier: String,
    pub resource_identifier: String,
    pub title: String,
    pub href: String,
    pub kind: ResourceKind,
    pub files: Vec<String>,
    pub mastery_score: Option<u8>,
    pub objective_id: Option<String>,
    pub time_limit_action: Option<String>,
    pub data_from_lms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCard {
    pub author: String,
    pub org: String,
    pub tel: String,
    pub address: String,
    pub mail: String,
    pub url: String,
}

impl VCard {
    /// vCard 2.1 text, leaving out empty properties.
    pub fn to_vcard_string(&self) -> String {
        let mut lines = vec!["BEGIN:VCARD".to_string(), "VERSION:2.1".to_string()];
        if !self.author.is_empty() {
            lines.push(format!("N:{}", self.author));
            lines.push(format!("FN:{}", self.author));
        }
        if !self.org.is_empty() {
            lines.push(format!("ORG:{}", self.org));
        }
        if !self.tel.is_empty() {
            lines.push(format!("TEL;TYPE=WORK,VOICE:{}", self.tel));
        }
        if !self.address.is_empty() {
            lines.push(format!("ADR;TYPE=WORK:;;{}", self.address));
        }
        if !self.mail.is_empty() {
            lines.push(format!("EMAIL;TYPE=PREF,INTERNET:{}", self.mail));
        }
        if !self.url.is_empty() {
            lines.push(format!("URL:{}", self.url));
        }
        lines.push("END:VCARD".to_string());
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub zip: bool,
    pub output_folder: PathBuf,
    pub name: String,
    pub version: String,
    pub date: String,
    pub append_time_to_output: bool,
    /// Total content size in bytes. `None` until the packager measures `source`.
    pub size: Option<u64>,
    pub author: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub typical_duration: TypicalDuration,
    pub rights: String,
    pub vcard: VCard,
}

/// A [`PackageRequest`] with every field the generators read filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedConfig {
    pub source: PathBuf,
    pub title: String,
    pub organization: String,
    pub identifier: String,
    pub version: String,
    pub language: String,
    pub mastery_score: u8,
    pub starting_page: String,
    pub control_mode: Option<ControlMode>,
    pub items: Vec<ContentItem>,
    pub package: PackageInfo,
}

/// Trimmed value for tokens, paths and hrefs; blank counts as unset.
fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
}

/// Display text is kept verbatim; blank counts as unset.
fn present(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|x| !x.trim().is_empty()).cloned()
}

fn check_score(score: u8, what: &str) -> Result<()> {
    if score > 100 {
        return Err(PackageError::InvalidConfig(format!(
            "{} mastery score {} is out of range 0-100",
            what, score
        )));
    }
    Ok(())
}

/// Normalizes `request` using today's local date for `package.date`.
pub fn normalize(request: &PackageRequest) -> Result<NormalizedConfig> {
    normalize_at(request, Local::now().date_naive())
}

/// Produces a fully defaulted copy of `request`. The request itself is not touched.
pub fn normalize_at(request: &PackageRequest, today: NaiveDate) -> Result<NormalizedConfig> {
    let source = match &request.source {
        Some(x) if !x.as_os_str().is_empty() => x.clone(),
        _ => {
            return Err(PackageError::InvalidConfig(
                "`source` must name the content directory".to_string(),
            ))
        }
    };
    let opts = &request.package;

    let title = present(&request.title)
        .or_else(|| present(&opts.name))
        .or_else(|| {
            source
                .file_name()
                .map(|x| x.to_string_lossy().to_string())
                .filter(|x| !x.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let organization =
        present(&request.organization).unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());
    let identifier = non_empty(&request.identifier).unwrap_or_else(|| {
        format!(
            "com.scorm.{}.{}",
            clean_and_trim(&organization),
            clean_and_trim(&title)
        )
    });
    let language = non_empty(&request.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let mastery_score = request.mastery_score.unwrap_or(DEFAULT_MASTERY_SCORE);
    check_score(mastery_score, "Course")?;
    let starting_page =
        non_empty(&request.starting_page).unwrap_or_else(|| DEFAULT_STARTING_PAGE.to_string());

    let items = match &request.items {
        None => vec![ContentItem {
            identifier: "item_1".to_string(),
            resource_identifier: resource_identifier(1),
            title: title.clone(),
            href: starting_page.clone(),
            kind: ResourceKind::Sco,
            files: vec![starting_page.clone()],
            mastery_score: Some(mastery_score),
            objective_id: None,
            time_limit_action: None,
            data_from_lms: None,
        }],
        Some(items) => {
            let org_id = organization_identifier(&organization);
            let reserved = [identifier.as_str(), org_id.as_str()];
            normalize_items(items, &title, &starting_page, mastery_score, &reserved)?
        }
    };

    let author = present(&opts.author).unwrap_or_else(|| organization.clone());
    let vcard_req = opts.vcard.clone().unwrap_or_default();
    let vcard = VCard {
        author: present(&vcard_req.author).unwrap_or_else(|| author.clone()),
        org: present(&vcard_req.org).unwrap_or_else(|| organization.clone()),
        tel: present(&vcard_req.tel).unwrap_or_default(),
        address: present(&vcard_req.address).unwrap_or_default(),
        mail: present(&vcard_req.mail).unwrap_or_default(),
        url: present(&vcard_req.url).unwrap_or_default(),
    };

    let package = PackageInfo {
        zip: opts.zip.unwrap_or(false),
        output_folder: opts
            .output_folder
            .clone()
            .filter(|x| !x.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FOLDER)),
        name: present(&opts.name).unwrap_or_else(|| title.clone()),
        version: present(&opts.version).unwrap_or_else(|| DEFAULT_PACKAGE_VERSION.to_string()),
        date: present(&opts.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        append_time_to_output: opts.append_time_to_output.unwrap_or(false),
        size: opts.size,
        author,
        description: present(&opts.description).unwrap_or_else(|| title.clone()),
        keywords: opts.keywords.clone().unwrap_or_default(),
        typical_duration: opts.typical_duration.unwrap_or_default(),
        rights: present(&opts.rights).unwrap_or_else(|| {
            format!("©{} {}. All rights reserved.", today.year(), organization)
        }),
        vcard,
    };

    Ok(NormalizedConfig {
        source,
        title,
        organization,
        identifier,
        // Matched byte for byte against the version table, so never trimmed.
        version: request
            .version
            .clone()
            .filter(|x| !x.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        language,
        mastery_score,
        starting_page,
        control_mode: request.control_mode,
        items,
        package,
    })
}

fn normalize_items(
    items: &[ContentItemRequest],
    course_title: &str,
    starting_page: &str,
    course_score: u8,
    reserved: &[&str],
) -> Result<Vec<ContentItem>> {
    // Item, resource, organization and manifest identifiers share one ID space.
    let mut seen = reserved
        .iter()
        .map(|x| x.to_string())
        .chain((1..=items.len()).map(resource_identifier))
        .collect::<HashSet<String>>();
    let mut ret = Vec::<ContentItem>::new();

    for (i, item) in items.iter().enumerate() {
        let n = i + 1;
        let identifier = match &item.identifier {
            Some(x) if !x.trim().is_empty() => {
                let token = clean_and_trim(x);
                if token.is_empty() {
                    return Err(PackageError::InvalidConfig(format!(
                        "Content item identifier '{}' has no usable characters",
                        x
                    )));
                }
                token
            }
            _ => format!("item_{}", n),
        };
        if !seen.insert(identifier.clone()) {
            return Err(PackageError::InvalidConfig(format!(
                "Content item identifier {} is already in use",
                identifier
            )));
        }
        let kind = item.kind.unwrap_or_default();
        let href = non_empty(&item.href).unwrap_or_else(|| starting_page.to_string());
        let mastery_score = match kind {
            ResourceKind::Sco => Some(item.mastery_score.unwrap_or(course_score)),
            ResourceKind::Asset => item.mastery_score,
        };
        if let Some(score) = mastery_score {
            check_score(score, &identifier)?;
        }
        let files = match &item.files {
            Some(files) if !files.is_empty() => files.clone(),
            _ => vec![href.clone()],
        };

        ret.push(ContentItem {
            identifier,
            resource_identifier: resource_identifier(n),
            title: present(&item.title).unwrap_or_else(|| course_title.to_string()),
            href,
            kind,
            files,
            mastery_score,
            objective_id: non_empty(&item.objective_id),
            time_limit_action: non_empty(&item.time_limit_action),
            data_from_lms: non_empty(&item.data_from_lms),
        });
    }
    Ok(ret)
}

fn resource_identifier(n: usize) -> String {
    format!("resource_{}", n)
}

/// Parses a RON package request. Optional fields may be written without `Some(..)`.
pub fn parse_request(file: &str) -> Result<PackageRequest> {
    let doc = String::from("#![enable(implicit_some)]\n") + file;
    ron::from_str(&doc).map_err(|e| PackageError::InvalidConfig(e.to_string()))
}

pub fn load_request(path: &Path) -> Result<PackageRequest> {
    let file = std::fs::read_to_string(path).map_err(|e| {
        PackageError::InvalidConfig(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_request(&file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn minimal_request_defaults() {
        let req = PackageRequest {
            source: Some("./test-source".into()),
            title: Some("Test Course".into()),
            ..Default::default()
        };
        let cfg = normalize_at(&req, day()).unwrap();

        assert_eq!(cfg.version, "1.2");
        assert_eq!(cfg.organization, "Organization");
        assert_eq!(cfg.identifier, "com.scorm.Organization.Test_Course");
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.mastery_score, 80);
        assert_eq!(cfg.package.date, "2024-03-09");
        assert_eq!(cfg.package.name, "Test Course");
        assert_eq!(cfg.package.version, "1.0.0");
        assert_eq!(cfg.package.output_folder, PathBuf::from("./scorm"));
        assert!(!cfg.package.zip);
        assert!(!cfg.package.append_time_to_output);
        assert_eq!(cfg.package.size, None);
        assert_eq!(cfg.package.rights, "©2024 Organization. All rights reserved.");
        assert_eq!(cfg.package.vcard.org, "Organization");
        assert_eq!(cfg.items.len(), 1);
        assert_eq!(cfg.items[0].href, "index.html");
        assert_eq!(cfg.items[0].kind, ResourceKind::Sco);
        assert_eq!(cfg.items[0].mastery_score, Some(80));
    }

    #[test]
    fn request_is_not_modified() {
        let req = PackageRequest::new("./c");
        let before = req.clone();
        normalize_at(&req, day()).unwrap();
        assert_eq!(req, before);
    }

    #[test]
    fn title_fallbacks() {
        let cfg = normalize_at(&PackageRequest::new("/tmp/my-course"), day()).unwrap();
        assert_eq!(cfg.title, "my-course");

        let mut req = PackageRequest::new("/");
        assert_eq!(normalize_at(&req, day()).unwrap().title, "Untitled Course");

        req.package.name = Some("Named".into());
        assert_eq!(normalize_at(&req, day()).unwrap().title, "Named");
    }

    #[test]
    fn missing_source_is_invalid() {
        let e = normalize_at(&PackageRequest::default(), day()).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidConfig);
        let e = normalize_at(&PackageRequest::new(""), day()).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn explicit_empty_items_stay_empty() {
        let mut req = PackageRequest::new("./c");
        req.items = Some(vec![]);
        assert!(normalize_at(&req, day()).unwrap().items.is_empty());
    }

    #[test]
    fn items_are_numbered_and_checked() {
        let mut req = PackageRequest::new("./c");
        req.items = Some(vec![
            ContentItemRequest {
                title: Some("Intro".into()),
                href: Some("intro/index.html".into()),
                ..Default::default()
            },
            ContentItemRequest {
                kind: Some(ResourceKind::Asset),
                href: Some("glossary.pdf".into()),
                ..Default::default()
            },
        ]);
        let cfg = normalize_at(&req, day()).unwrap();
        assert_eq!(cfg.items[0].identifier, "item_1");
        assert_eq!(cfg.items[1].resource_identifier, "resource_2");
        assert_eq!(cfg.items[1].mastery_score, None);
        assert_eq!(cfg.items[1].files, vec!["glossary.pdf".to_string()]);

        req.items = Some(vec![
            ContentItemRequest {
                identifier: Some("a".into()),
                ..Default::default()
            },
            ContentItemRequest {
                identifier: Some("a".into()),
                ..Default::default()
            },
        ]);
        assert_eq!(
            normalize_at(&req, day()).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn display_text_is_kept_verbatim() {
        let mut req = PackageRequest::new("./c");
        req.title = Some("  Intro  ".into());
        req.organization = Some(" ACME ".into());
        req.package.description = Some(" Line one ".into());
        let cfg = normalize_at(&req, day()).unwrap();
        assert_eq!(cfg.title, "  Intro  ");
        assert_eq!(cfg.organization, " ACME ");
        assert_eq!(cfg.package.description, " Line one ");
        assert_eq!(cfg.identifier, "com.scorm.ACME.Intro");

        req.title = Some("   ".into());
        assert_eq!(normalize_at(&req, day()).unwrap().title, "c");
    }

    #[test]
    fn version_is_not_trimmed() {
        let mut req = PackageRequest::new("./c");
        req.version = Some("1.2 ".into());
        assert_eq!(normalize_at(&req, day()).unwrap().version, "1.2 ");
        req.version = Some(String::new());
        assert_eq!(normalize_at(&req, day()).unwrap().version, "1.2");
    }

    #[test]
    fn item_identifiers_share_id_space() {
        let item = |id: &str| ContentItemRequest {
            identifier: Some(id.into()),
            ..Default::default()
        };
        let mut req = PackageRequest::new("./c");
        req.organization = Some("My Org".into());

        req.items = Some(vec![item("my intro"), ContentItemRequest::default()]);
        let cfg = normalize_at(&req, day()).unwrap();
        assert_eq!(cfg.items[0].identifier, "my_intro");
        assert_eq!(cfg.items[1].identifier, "item_2");

        for taken in ["resource_2", "My_Org", "My Org", "com.scorm.My_Org.c", "<>"] {
            req.items = Some(vec![item(taken), ContentItemRequest::default()]);
            let e = normalize_at(&req, day()).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidConfig, "{}", taken);
        }

        req.items = Some(vec![ContentItemRequest::default(), item("item_1")]);
        assert!(normalize_at(&req, day()).is_err());
    }

    #[test]
    fn mastery_score_out_of_range() {
        let mut req = PackageRequest::new("./c");
        req.mastery_score = Some(101);
        assert!(normalize_at(&req, day()).is_err());
    }

    #[test]
    fn parse_ron_request() {
        let doc = r#"
(
    source: "./c",
    title: "T",
    organization: "My Org",
    version: "2004 4th Edition",
    package: (
        zip: true,
        output_folder: "./out",
        append_time_to_output: true,
        keywords: ["safety", "onboarding"],
        typical_duration: (minutes: 30),
    ),
    items: [
        (identifier: "intro", href: "intro.html", kind: sco),
    ],
)
        "#;
        let req = parse_request(doc).unwrap();
        assert_eq!(req.source, Some(PathBuf::from("./c")));
        assert_eq!(req.version.as_deref(), Some("2004 4th Edition"));
        assert_eq!(req.package.zip, Some(true));
        assert_eq!(req.package.typical_duration.unwrap().minutes, 30);
        assert_eq!(req.items.unwrap()[0].kind, Some(ResourceKind::Sco));
    }

    #[test]
    fn parse_demo_request() {
        let req = parse_request(include_str!("../demos/course.ron")).unwrap();
        let cfg = normalize_at(&req, day()).unwrap();
        assert_eq!(cfg.items.len(), 3);
        assert_eq!(cfg.items[1].objective_id.as_deref(), Some("fire-safety-quiz"));
        assert_eq!(cfg.items[2].kind, ResourceKind::Asset);
        assert_eq!(cfg.package.vcard.author, "Jane Doe");
        assert_eq!(cfg.package.typical_duration.to_iso8601(), "P0Y0M0DT0H45M0S");
    }

    #[test]
    fn parse_bad_ron_is_invalid_config() {
        let e = parse_request("(source: ").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn vcard_and_duration_text() {
        let cfg = normalize_at(&PackageRequest::new("./c"), day()).unwrap();
        let v = cfg.package.vcard.to_vcard_string();
        assert!(v.starts_with("BEGIN:VCARD\nVERSION:2.1\n"));
        assert!(v.contains("ORG:Organization"));
        assert!(!v.contains("TEL"));
        assert_eq!(
            TypicalDuration {
                hours: 1,
                minutes: 5,
                ..Default::default()
            }
            .to_iso8601(),
            "P0Y0M0DT1H5M0S"
        );
    }
}
