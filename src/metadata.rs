//! LOM metadata descriptor (`metadata.xml`).

use crate::config::NormalizedConfig;
use crate::version::SchemaDialect;
use crate::xml::{escape_xml, push_line, text_element};

fn lang_string(language: &str, text: &str) -> String {
    format!(
        r#"<string language="{}">{}</string>"#,
        escape_xml(language),
        escape_xml(text)
    )
}

fn vocabulary(out: &mut String, indent: usize, name: &str, value: &str) {
    push_line(out, indent, &format!("<{}>", name));
    push_line(out, indent + 1, &text_element("source", "LOMv1.0"));
    push_line(out, indent + 1, &text_element("value", value));
    push_line(out, indent, &format!("</{}>", name));
}

/// Renders the metadata document. `package.size` is written only when known.
pub fn generate(dialect: SchemaDialect, config: &NormalizedConfig) -> String {
    let lang = config.language.as_str();
    let pkg = &config.package;
    let mut out = String::new();

    push_line(&mut out, 0, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    push_line(
        &mut out,
        0,
        r#"<lom xmlns="http://ltsc.ieee.org/xsd/LOM" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://ltsc.ieee.org/xsd/LOM lom.xsd">"#,
    );

    push_line(&mut out, 1, "<general>");
    push_line(&mut out, 2, "<identifier>");
    push_line(&mut out, 3, &text_element("catalog", "URI"));
    push_line(&mut out, 3, &text_element("entry", &config.identifier));
    push_line(&mut out, 2, "</identifier>");
    push_line(&mut out, 2, "<title>");
    push_line(&mut out, 3, &lang_string(lang, &config.title));
    push_line(&mut out, 2, "</title>");
    push_line(&mut out, 2, &text_element("language", lang));
    push_line(&mut out, 2, "<description>");
    push_line(&mut out, 3, &lang_string(lang, &pkg.description));
    push_line(&mut out, 2, "</description>");
    for keyword in &pkg.keywords {
        push_line(&mut out, 2, "<keyword>");
        push_line(&mut out, 3, &lang_string(lang, keyword));
        push_line(&mut out, 2, "</keyword>");
    }
    push_line(&mut out, 1, "</general>");

    push_line(&mut out, 1, "<lifeCycle>");
    push_line(&mut out, 2, "<version>");
    push_line(&mut out, 3, &lang_string(lang, &pkg.version));
    push_line(&mut out, 2, "</version>");
    vocabulary(&mut out, 2, "status", "final");
    push_line(&mut out, 2, "<contribute>");
    vocabulary(&mut out, 3, "role", "author");
    push_line(
        &mut out,
        3,
        &text_element("entity", &pkg.vcard.to_vcard_string()),
    );
    push_line(&mut out, 3, "<date>");
    push_line(&mut out, 4, &text_element("dateTime", &pkg.date));
    push_line(&mut out, 3, "</date>");
    push_line(&mut out, 2, "</contribute>");
    push_line(&mut out, 1, "</lifeCycle>");

    push_line(&mut out, 1, "<metaMetadata>");
    push_line(&mut out, 2, &text_element("metadataSchema", "LOMv1.0"));
    push_line(
        &mut out,
        2,
        &text_element(
            "metadataSchema",
            &format!("ADL SCORM {}", dialect.schema_version()),
        ),
    );
    push_line(&mut out, 2, &text_element("language", lang));
    push_line(&mut out, 1, "</metaMetadata>");

    push_line(&mut out, 1, "<technical>");
    push_line(&mut out, 2, &text_element("format", "text/html"));
    if let Some(size) = pkg.size {
        push_line(&mut out, 2, &text_element("size", &size.to_string()));
    }
    push_line(&mut out, 2, &text_element("location", &config.starting_page));
    push_line(&mut out, 1, "</technical>");

    push_line(&mut out, 1, "<educational>");
    push_line(&mut out, 2, "<typicalLearningTime>");
    push_line(
        &mut out,
        3,
        &text_element("duration", &pkg.typical_duration.to_iso8601()),
    );
    push_line(&mut out, 2, "</typicalLearningTime>");
    push_line(&mut out, 1, "</educational>");

    push_line(&mut out, 1, "<rights>");
    vocabulary(&mut out, 2, "cost", "no");
    vocabulary(&mut out, 2, "copyrightAndOtherRestrictions", "yes");
    push_line(&mut out, 2, "<description>");
    push_line(&mut out, 3, &lang_string(lang, &pkg.rights));
    push_line(&mut out, 2, "</description>");
    push_line(&mut out, 1, "</rights>");

    push_line(&mut out, 0, "</lom>");
    out
}
