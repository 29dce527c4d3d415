//! Shared HTML helpers for the document templates.

use std::collections::HashMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::BrandingConfig;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("valid regex"));

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `YYYY-MM-DD` as `Month DD, YYYY`; anything else is returned as is.
pub fn format_display_date(date: &str) -> String {
    chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Drop a `data:image/...;base64,` prefix, leaving the payload.
pub fn strip_data_uri(image: &str) -> &str {
    let image = image.trim();
    if image.starts_with("data:") {
        image.split_once(',').map_or("", |(_, payload)| payload)
    } else {
        image
    }
}

/// Format a week count without a trailing `.0`.
pub fn format_weeks(weeks: f64) -> String {
    if weeks.fract() == 0.0 {
        format!("{weeks:.0}")
    } else {
        format!("{weeks:.1}")
    }
}

/// Fill `{{ name }}` placeholders. Values are inserted verbatim; unknown
/// placeholders are left untouched.
pub fn interpolate(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            values.get(name).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Escaped text with blank input replaced by `fallback`.
pub(crate) fn text_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        escape_html(fallback)
    } else {
        escape_html(value)
    }
}

/// Company name and logos (base64 payloads) stamped onto documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branding {
    pub company_name: String,
    pub main_logo: String,
    pub second_logo: String,
}

impl Branding {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self { company_name: company_name.into(), ..Default::default() }
    }

    /// Load the configured default logos. Unreadable files are logged and
    /// left empty.
    pub fn from_config(config: &BrandingConfig) -> Self {
        Self {
            company_name: config.company_name.clone(),
            main_logo: config.main_logo.as_deref().map(read_logo).unwrap_or_default(),
            second_logo: config.second_logo.as_deref().map(read_logo).unwrap_or_default(),
        }
    }

    /// Prefer logos supplied with the document over the defaults.
    ///
    /// Payloads that are not plain base64 are ignored.
    pub fn with_logos(mut self, main: Option<&str>, second: Option<&str>) -> Self {
        if let Some(main) = main.and_then(supplied_logo) {
            self.main_logo = main.to_string();
        }
        if let Some(second) = second.and_then(supplied_logo) {
            self.second_logo = second.to_string();
        }
        self
    }

    /// Logo for single-header documents: main, else secondary.
    pub fn header_logo(&self) -> &str {
        if self.main_logo.is_empty() {
            &self.second_logo
        } else {
            &self.main_logo
        }
    }
}

fn is_base64(payload: &str) -> bool {
    payload.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

fn supplied_logo(logo: &str) -> Option<&str> {
    let payload = strip_data_uri(logo);
    if payload.is_empty() {
        return None;
    }
    if !is_base64(payload) {
        tracing::warn!(len = payload.len(), "Ignoring logo that is not base64");
        return None;
    }
    Some(payload)
}

fn read_logo(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => BASE64.encode(bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read logo");
            String::new()
        }
    }
}

/// `<img>` tag for a base64 PNG, or nothing when there is no image.
pub(crate) fn logo_img(base64: &str, class: &str, alt: &str) -> String {
    if base64.is_empty() {
        String::new()
    } else {
        let base64 = escape_html(base64);
        format!(r#"<img src="data:image/png;base64,{base64}" class="{class}" alt="{alt}">"#)
    }
}

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
{{ css }}
</style>
</head>
<body>
{{ body }}
</body>
</html>
"#;

/// Page setup, header, sections and tables shared by the SoW and LoE.
pub(crate) const REPORT_CSS: &str = r#"@page {
    size: A4;
    margin: 2cm;
    margin-bottom: 3cm;
    @bottom-center {
        content: "Page " counter(page) " of " counter(pages);
        font-size: 10px;
        color: #666;
    }
}
body {
    font-family: 'Arial', 'Helvetica', sans-serif;
    font-size: 11px;
    line-height: 1.4;
    color: #000;
    margin: 0;
    padding: 0;
}
.header { text-align: center; margin-bottom: 30px; margin-top: 10px; }
.header-image { width: 186px; height: 48px; margin: 0 auto 20px auto; display: block; }
.document-title {
    font-size: 24px;
    font-weight: bold;
    margin-bottom: 10px;
    text-transform: uppercase;
    letter-spacing: 1px;
}
.project-title { font-size: 18px; font-weight: bold; color: #333; margin-bottom: 5px; }
.client-info { font-size: 14px; color: #666; margin-bottom: 15px; }
.meta-info {
    display: flex;
    justify-content: space-between;
    font-size: 10px;
    color: #666;
    border-top: 1px solid #ddd;
    border-bottom: 1px solid #ddd;
    padding: 8px 0;
    margin-bottom: 30px;
}
.section { margin-bottom: 25px; }
.section-title {
    font-size: 14px;
    font-weight: bold;
    margin-bottom: 10px;
    padding: 8px 0 5px 0;
    border-top: 2px solid #000;
    border-bottom: 1px solid #000;
    text-transform: uppercase;
    letter-spacing: 0.5px;
}
.section-content { margin-left: 10px; }
.list-item { margin-bottom: 8px; padding-left: 15px; position: relative; }
.list-item::before { content: "•"; position: absolute; left: 0; font-weight: bold; }
.data-table { width: 100%; border-collapse: collapse; margin-top: 10px; }
.data-table th {
    background-color: #f5f5f5;
    border: 1px solid #000;
    padding: 8px;
    text-align: left;
    font-weight: bold;
    font-size: 10px;
}
.data-table td { border: 1px solid #666; padding: 8px; vertical-align: top; font-size: 10px; }
.number-cell { text-align: center; font-weight: bold; }
.footer-divider { border-top: 2px solid #000; margin-top: 30px; padding-top: 10px; }
.confidentiality { font-size: 9px; color: #666; text-align: center; font-style: italic; margin-top: 20px; }
"#;

/// Wrap a report body in the document skeleton.
pub(crate) fn report_document(title: &str, css: &str, body: &str) -> String {
    let values = HashMap::from([
        ("title", escape_html(title)),
        ("css", css.to_string()),
        ("body", body.to_string()),
    ]);
    interpolate(REPORT_TEMPLATE, &values)
}

/// Logo, document title, project and client, date and author.
pub(crate) struct ReportHeader<'a> {
    pub document_title: &'a str,
    pub project: &'a str,
    pub client: &'a str,
    pub date: &'a str,
    pub prepared_by: &'a str,
}

impl ReportHeader<'_> {
    pub(crate) fn render(&self, branding: &Branding) -> String {
        format!(
            r#"<div class="header">
{logo}
<div class="document-title">{title}</div>
<div class="project-title">{project}</div>
<div class="client-info">Prepared for: {client}</div>
<div class="meta-info">
<div>Date: {date}</div>
<div>Prepared by: {prepared_by}</div>
</div>
</div>
"#,
            logo = logo_img(branding.header_logo(), "header-image", "Organization Logo"),
            title = escape_html(self.document_title),
            project = escape_html(self.project),
            client = escape_html(self.client),
            date = escape_html(&format_display_date(self.date)),
            prepared_by = escape_html(self.prepared_by),
        )
    }
}

/// Titled section around already-rendered content.
pub(crate) fn section(title: &str, content: &str) -> String {
    format!(
        "<div class=\"section\">\n<div class=\"section-title\">{}</div>\n<div class=\"section-content\">\n{content}</div>\n</div>\n",
        escape_html(title)
    )
}

/// Bulleted items, skipping blank entries. Empty when nothing is left.
pub(crate) fn bullet_items(items: &[String]) -> String {
    items
        .iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| format!("<div class=\"list-item\">{}</div>\n", escape_html(item)))
        .collect()
}

/// A table with a header row around pre-rendered `<tr>` rows.
pub(crate) fn table(headers: &[&str], rows: &str) -> String {
    let head: String = headers.iter().map(|h| format!("<th>{}</th>", escape_html(h))).collect();
    format!(
        "<table class=\"data-table\">\n<thead><tr>{head}</tr></thead>\n<tbody>\n{rows}</tbody>\n</table>\n"
    )
}

/// Confidentiality notice closing a report.
pub(crate) fn confidentiality(document: &str, company: &str, client: &str) -> String {
    format!(
        "<div class=\"footer-divider\">\n<div class=\"confidentiality\">\nThis {document} is confidential and proprietary to {company}. \
It is intended solely for the use of {client} and may not be disclosed to third parties without express written consent.\n</div>\n</div>\n",
        document = escape_html(document),
        company = escape_html(&company.to_uppercase()),
        client = escape_html(client),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<b>"R&D"</b>"#), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_format_display_date() {
        assert_eq!(format_display_date("2024-05-01"), "May 01, 2024");
        assert_eq!(format_display_date("next week"), "next week");
        assert_eq!(format_display_date(""), "");
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:broken"), "");
    }

    #[test]
    fn test_format_weeks() {
        assert_eq!(format_weeks(6.0), "6");
        assert_eq!(format_weeks(1.5), "1.5");
    }

    #[test]
    fn test_interpolate_leaves_unknown_placeholders() {
        let mut values = HashMap::new();
        values.insert("client", "Acme".to_string());
        assert_eq!(interpolate("For {{ client }} by {{author}}", &values), "For Acme by {{author}}");
    }

    #[test]
    fn test_branding_overrides() {
        let branding = Branding { second_logo: "DEFAULT2".into(), ..Branding::new("Dry Ground AI") };
        assert_eq!(branding.header_logo(), "DEFAULT2");

        let branding = branding.with_logos(Some("data:image/png;base64,ORG"), Some(""));
        assert_eq!(branding.main_logo, "ORG");
        assert_eq!(branding.second_logo, "DEFAULT2");
        assert_eq!(branding.header_logo(), "ORG");
    }

    #[test]
    fn test_supplied_logo_must_be_base64() {
        let branding = Branding { main_logo: "DEFAULT".into(), ..Branding::new("Dry Ground AI") }
            .with_logos(Some(r#"AAAA" onerror="alert(1)"#), Some("data:image/png;base64,<script>"));
        assert_eq!(branding.main_logo, "DEFAULT");
        assert!(branding.second_logo.is_empty());

        let tag = logo_img(r#"x"y"#, "logo", "Logo");
        assert!(tag.contains("base64,x&quot;y\""));
    }

    #[test]
    fn test_section_and_bullets_skip_blanks() {
        let items = bullet_items(&["One".into(), "  ".into(), "<Two>".into()]);
        assert_eq!(items.matches("list-item").count(), 2);
        assert!(items.contains("&lt;Two&gt;"));
        assert!(section("Objectives", &items).contains("<div class=\"section-title\">Objectives</div>"));
    }

    #[test]
    fn test_confidentiality_names_company_and_client() {
        let footer = confidentiality("Statement of Work", "Dry Ground AI", "Acme & Co");
        assert!(footer.contains("proprietary to DRY GROUND AI."));
        assert!(footer.contains("use of Acme &amp; Co and"));
    }

    #[test]
    fn test_report_document_fills_skeleton() {
        let html = report_document("Level of Effort", "body {}", "<p>hi</p>");
        assert!(html.contains("<title>Level of Effort</title>"));
        assert!(html.contains("<p>hi</p>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_branding_missing_logo_file() {
        let config = BrandingConfig {
            main_logo: Some("/nonexistent/logo.png".into()),
            ..Default::default()
        };
        let branding = Branding::from_config(&config);
        assert!(branding.main_logo.is_empty());
        assert_eq!(branding.company_name, "Dry Ground AI");
    }
}
