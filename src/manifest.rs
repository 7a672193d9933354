//! `imsmanifest.xml` generation.
//!
//! One generator walks the normalized config; everything that differs between
//! SCORM 1.2 and 2004 comes from the [`DialectStrategy`] picked for the family.

use crate::config::{ContentItem, ControlMode, NormalizedConfig, ResourceKind};
use crate::version::{SchemaFamily, SchemaSelection};
use crate::xml::{clean_and_trim, escape_xml, push_line, text_element};

pub const MANIFEST_FILE: &str = "imsmanifest.xml";
pub const METADATA_FILE: &str = "metadata.xml";

/// Vocabulary of one SCORM family.
pub trait DialectStrategy {
    /// Namespace declarations and `xsi:schemaLocation` of the root element.
    fn root_attributes(&self) -> Vec<(&'static str, &'static str)>;

    /// Attributes of a `<resource>` besides `identifier`, `type` and `href`.
    fn resource_attributes(&self, item: &ContentItem) -> Vec<(&'static str, String)>;

    /// Child lines of a `<resource>` placed before its `<file>` entries.
    fn resource_elements(&self, item: &ContentItem) -> Vec<String>;

    /// Child lines of an `<item>` after its `<title>`.
    fn item_elements(&self, item: &ContentItem) -> Vec<String>;

    /// Child lines of the `<organization>` after its items.
    fn organization_elements(&self, control_mode: Option<&ControlMode>) -> Vec<String>;
}

pub struct Scorm12Strategy;

pub struct Scorm2004Strategy;

pub fn strategy_for(family: SchemaFamily) -> &'static dyn DialectStrategy {
    match family {
        SchemaFamily::Scorm12 => &Scorm12Strategy,
        SchemaFamily::Scorm2004 => &Scorm2004Strategy,
    }
}

impl DialectStrategy for Scorm12Strategy {
    fn root_attributes(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("xmlns", "http://www.imsproject.org/xsd/imscp_rootv1p1p2"),
            ("xmlns:adlcp", "http://www.adlnet.org/xsd/adlcp_rootv1p2"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            (
                "xsi:schemaLocation",
                "http://www.imsproject.org/xsd/imscp_rootv1p1p2 imscp_rootv1p1p2.xsd \
                 http://www.imsglobal.org/xsd/imsmd_rootv1p2p1 imsmd_rootv1p2p1.xsd \
                 http://www.adlnet.org/xsd/adlcp_rootv1p2 adlcp_rootv1p2.xsd",
            ),
        ]
    }

    fn resource_attributes(&self, _item: &ContentItem) -> Vec<(&'static str, String)> {
        vec![]
    }

    fn resource_elements(&self, item: &ContentItem) -> Vec<String> {
        vec![text_element("adlcp:scormtype", item.kind.as_str())]
    }

    fn item_elements(&self, item: &ContentItem) -> Vec<String> {
        let mut ret = Vec::new();
        if let Some(action) = &item.time_limit_action {
            ret.push(text_element("adlcp:timelimitaction", action));
        }
        if let Some(data) = &item.data_from_lms {
            ret.push(text_element("adlcp:datafromlms", data));
        }
        if let Some(score) = item.mastery_score {
            ret.push(text_element("adlcp:masteryscore", &score.to_string()));
        }
        ret
    }

    fn organization_elements(&self, _control_mode: Option<&ControlMode>) -> Vec<String> {
        vec![]
    }
}

impl DialectStrategy for Scorm2004Strategy {
    fn root_attributes(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("xmlns", "http://www.imsglobal.org/xsd/imscp_v1p1"),
            ("xmlns:adlcp", "http://www.adlnet.org/xsd/adlcp_v1p3"),
            ("xmlns:adlseq", "http://www.adlnet.org/xsd/adlseq_v1p3"),
            ("xmlns:adlnav", "http://www.adlnet.org/xsd/adlnav_v1p3"),
            ("xmlns:imsss", "http://www.imsglobal.org/xsd/imsss"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            (
                "xsi:schemaLocation",
                "http://www.imsglobal.org/xsd/imscp_v1p1 imscp_v1p1.xsd \
                 http://www.adlnet.org/xsd/adlcp_v1p3 adlcp_v1p3.xsd \
                 http://www.adlnet.org/xsd/adlseq_v1p3 adlseq_v1p3.xsd \
                 http://www.adlnet.org/xsd/adlnav_v1p3 adlnav_v1p3.xsd \
                 http://www.imsglobal.org/xsd/imsss imsss_v1p0.xsd",
            ),
        ]
    }

    fn resource_attributes(&self, item: &ContentItem) -> Vec<(&'static str, String)> {
        vec![("adlcp:scormType", item.kind.as_str().to_string())]
    }

    fn resource_elements(&self, _item: &ContentItem) -> Vec<String> {
        vec![]
    }

    fn item_elements(&self, item: &ContentItem) -> Vec<String> {
        let mut ret = Vec::new();
        if let Some(action) = &item.time_limit_action {
            ret.push(text_element("adlcp:timeLimitAction", action));
        }
        if let Some(data) = &item.data_from_lms {
            ret.push(text_element("adlcp:dataFromLMS", data));
        }
        if item.kind != ResourceKind::Sco
            || (item.mastery_score.is_none() && item.objective_id.is_none())
        {
            return ret;
        }

        let objective_id = item
            .objective_id
            .clone()
            .unwrap_or_else(|| format!("{}_objective", item.identifier));
        ret.push("<imsss:sequencing>".to_string());
        ret.push("  <imsss:objectives>".to_string());
        match item.mastery_score {
            Some(score) => {
                ret.push(format!(
                    r#"    <imsss:primaryObjective objectiveID="{}" satisfiedByMeasure="true">"#,
                    escape_xml(&objective_id)
                ));
                ret.push(format!(
                    "      {}",
                    text_element("imsss:minNormalizedMeasure", &normalized_measure(score))
                ));
                ret.push("    </imsss:primaryObjective>".to_string());
            }
            None => ret.push(format!(
                r#"    <imsss:primaryObjective objectiveID="{}"/>"#,
                escape_xml(&objective_id)
            )),
        }
        ret.push("  </imsss:objectives>".to_string());
        ret.push("</imsss:sequencing>".to_string());
        ret
    }

    fn organization_elements(&self, control_mode: Option<&ControlMode>) -> Vec<String> {
        let mode = match control_mode {
            Some(x) if x.choice.is_some() || x.flow.is_some() => x,
            _ => return vec![],
        };
        let mut attrs = String::new();
        if let Some(choice) = mode.choice {
            attrs.push_str(&format!(r#" choice="{}""#, choice));
        }
        if let Some(flow) = mode.flow {
            attrs.push_str(&format!(r#" flow="{}""#, flow));
        }
        vec![
            "<imsss:sequencing>".to_string(),
            format!("  <imsss:controlMode{}/>", attrs),
            "</imsss:sequencing>".to_string(),
        ]
    }
}

/// Mastery score 0-100 as a 0.0-1.0 measure.
fn normalized_measure(score: u8) -> String {
    let s = format!("{:.2}", f64::from(score) / 100.0);
    let s = s.trim_end_matches('0');
    if s.ends_with('.') {
        format!("{}0", s)
    } else {
        s.to_string()
    }
}

/// Identifier of the single organization, derived from the organization name.
pub fn organization_identifier(organization: &str) -> String {
    let token = clean_and_trim(organization);
    if token.is_empty() {
        "default_organization".to_string()
    } else {
        token
    }
}

fn attributes(attrs: &[(&str, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#" {}="{}""#, k, escape_xml(v)))
        .collect::<Vec<String>>()
        .concat()
}

/// Renders the manifest for `selection` from an already normalized config.
pub fn generate(selection: SchemaSelection, config: &NormalizedConfig) -> String {
    let strategy = strategy_for(selection.family);
    let org_id = organization_identifier(&config.organization);
    let mut out = String::new();

    push_line(&mut out, 0, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let mut root: Vec<(&str, String)> = vec![
        ("identifier", config.identifier.clone()),
        ("version", config.package.version.clone()),
    ];
    root.extend(
        strategy
            .root_attributes()
            .into_iter()
            .map(|(k, v)| (k, v.to_string())),
    );
    push_line(&mut out, 0, &format!("<manifest{}>", attributes(&root)));

    push_line(&mut out, 1, "<metadata>");
    push_line(&mut out, 2, &text_element("schema", "ADL SCORM"));
    push_line(
        &mut out,
        2,
        &text_element("schemaversion", selection.dialect.schema_version()),
    );
    push_line(&mut out, 2, &text_element("adlcp:location", METADATA_FILE));
    push_line(&mut out, 1, "</metadata>");

    push_line(
        &mut out,
        1,
        &format!(r#"<organizations default="{}">"#, escape_xml(&org_id)),
    );
    push_line(
        &mut out,
        2,
        &format!(r#"<organization identifier="{}">"#, escape_xml(&org_id)),
    );
    push_line(&mut out, 3, &text_element("title", &config.title));
    for item in &config.items {
        push_line(
            &mut out,
            3,
            &format!(
                "<item{}>",
                attributes(&[
                    ("identifier", item.identifier.clone()),
                    ("identifierref", item.resource_identifier.clone()),
                ])
            ),
        );
        push_line(&mut out, 4, &text_element("title", &item.title));
        for line in strategy.item_elements(item) {
            push_line(&mut out, 4, &line);
        }
        push_line(&mut out, 3, "</item>");
    }
    for line in strategy.organization_elements(config.control_mode.as_ref()) {
        push_line(&mut out, 3, &line);
    }
    push_line(&mut out, 2, "</organization>");
    push_line(&mut out, 1, "</organizations>");

    if config.items.is_empty() {
        push_line(&mut out, 1, "<resources/>");
    } else {
        push_line(&mut out, 1, "<resources>");
        for item in &config.items {
            let mut attrs = vec![
                ("identifier", item.resource_identifier.clone()),
                ("type", "webcontent".to_string()),
            ];
            attrs.extend(strategy.resource_attributes(item));
            attrs.push(("href", item.href.clone()));
            push_line(&mut out, 2, &format!("<resource{}>", attributes(&attrs)));
            for line in strategy.resource_elements(item) {
                push_line(&mut out, 3, &line);
            }
            for file in &item.files {
                push_line(
                    &mut out,
                    3,
                    &format!(r#"<file href="{}"/>"#, escape_xml(file)),
                );
            }
            push_line(&mut out, 2, "</resource>");
        }
        push_line(&mut out, 1, "</resources>");
    }

    push_line(&mut out, 0, "</manifest>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize_at, ContentItemRequest, PackageRequest};
    use crate::version::resolve;
    use chrono::NaiveDate;

    fn config(req: &PackageRequest) -> NormalizedConfig {
        normalize_at(req, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).unwrap()
    }

    fn request(version: &str) -> PackageRequest {
        PackageRequest {
            source: Some("./c".into()),
            title: Some("T".into()),
            organization: Some("My Org".into()),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    #[test]
    fn scorm12_manifest() {
        let req = request("1.2");
        let xml = generate(resolve("1.2").unwrap(), &config(&req));
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<manifest"));
        assert!(xml.contains(r#"<organization identifier="My_Org">"#));
        assert!(xml.contains(r#"<organizations default="My_Org">"#));
        assert!(xml.contains("<title>T</title>"));
        assert!(xml.contains("adlcp:scormtype>sco</adlcp:scormtype>"));
        assert!(xml.contains("<schemaversion>1.2</schemaversion>"));
        assert!(xml.contains("<adlcp:masteryscore>80</adlcp:masteryscore>"));
        assert!(xml.contains(r#"<file href="index.html"/>"#));
        assert!(!xml.contains("imsss"));
        assert!(xml.trim_end().ends_with("</manifest>"));
    }

    #[test]
    fn scorm2004_manifest() {
        for (v, expected) in [
            ("2004 4th Edition", "2004 4th Edition"),
            ("2004v4", "2004 4th Edition"),
            ("2004.3", "2004 3rd Edition"),
        ] {
            let xml = generate(resolve(v).unwrap(), &config(&request(v)));
            assert!(xml.contains(&format!("<schemaversion>{}</schemaversion>", expected)));
            assert!(xml.contains(r#"adlcp:scormType="sco""#));
            assert!(!xml.contains("adlcp:scormtype"));
            assert!(xml.contains(r#"xmlns:imsss="http://www.imsglobal.org/xsd/imsss""#));
            assert!(xml.contains(
                "<imsss:minNormalizedMeasure>0.8</imsss:minNormalizedMeasure>"
            ));
        }
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut req = request("1.2");
        req.title = Some(r#"Q&A <"Intro">"#.into());
        req.organization = Some("R&D Team".into());
        let xml = generate(resolve("1.2").unwrap(), &config(&req));
        assert!(xml.contains("<title>Q&amp;A &lt;&quot;Intro&quot;&gt;</title>"));
        assert!(xml.contains(r#"<organization identifier="RD_Team">"#));
        assert!(!xml.contains("Q&A"));
    }

    #[test]
    fn padded_titles_are_written_verbatim() {
        let mut req = request("1.2");
        req.title = Some("  Intro  ".into());
        req.items = Some(vec![ContentItemRequest {
            identifier: Some("my intro".into()),
            title: Some(" Part 1 ".into()),
            ..Default::default()
        }]);
        let xml = generate(resolve("1.2").unwrap(), &config(&req));
        assert!(xml.contains("<title>  Intro  </title>"));
        assert!(xml.contains("<title> Part 1 </title>"));
        assert!(xml.contains(r#"<item identifier="my_intro" identifierref="resource_1">"#));
    }

    #[test]
    fn zero_items_skeleton() {
        let mut req = request("2004.4");
        req.items = Some(vec![]);
        let xml = generate(resolve("2004.4").unwrap(), &config(&req));
        assert!(xml.contains("<resources/>"));
        assert!(xml.contains(r#"<organization identifier="My_Org">"#));
        assert!(!xml.contains("<item "));
    }

    #[test]
    fn unset_sequencing_is_omitted() {
        let mut req = request("2004.4");
        req.items = Some(vec![ContentItemRequest {
            kind: Some(ResourceKind::Asset),
            href: Some("doc.pdf".into()),
            ..Default::default()
        }]);
        let xml = generate(resolve("2004.4").unwrap(), &config(&req));
        assert!(xml.contains(r#"adlcp:scormType="asset""#));
        assert!(!xml.contains("imsss:sequencing"));
        assert!(!xml.contains("imsss:controlMode"));
        assert!(!xml.contains("adlcp:timeLimitAction"));
    }

    #[test]
    fn control_mode_and_objectives() {
        let mut req = request("2004.3");
        req.control_mode = Some(ControlMode {
            choice: Some(true),
            flow: None,
        });
        req.items = Some(vec![ContentItemRequest {
            objective_id: Some("obj-1".into()),
            mastery_score: Some(100),
            time_limit_action: Some("exit,message".into()),
            ..Default::default()
        }]);
        let xml = generate(resolve("2004.3").unwrap(), &config(&req));
        assert!(xml.contains(r#"<imsss:controlMode choice="true"/>"#));
        assert!(xml.contains(r#"objectiveID="obj-1""#));
        assert!(xml.contains("<imsss:minNormalizedMeasure>1.0</imsss:minNormalizedMeasure>"));
        assert!(xml.contains("<adlcp:timeLimitAction>exit,message</adlcp:timeLimitAction>"));
    }

    #[test]
    fn test_normalized_measure() {
        assert_eq!(normalized_measure(80), "0.8");
        assert_eq!(normalized_measure(75), "0.75");
        assert_eq!(normalized_measure(5), "0.05");
        assert_eq!(normalized_measure(0), "0.0");
        assert_eq!(normalized_measure(100), "1.0");
    }

    #[test]
    fn organization_identifier_is_deterministic() {
        assert_eq!(organization_identifier("Test Org"), "Test_Org");
        assert_eq!(organization_identifier("Test Org"), organization_identifier("Test Org"));
        assert_eq!(organization_identifier("<>"), "default_organization");
    }
}
