//! Solutioning document: a cover page and one page per solution.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::html::{escape_html, format_display_date, logo_img, strip_data_uri, text_or, Branding};
use crate::session::lenient::string_lenient;
use crate::session::{difficulty_lenient, layout_lenient, SolutionBasic, SolutionSession};

/// One solution page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolutioningPage {
    #[serde(deserialize_with = "string_lenient")]
    pub title: String,

    /// HTML fragment
    #[serde(deserialize_with = "string_lenient")]
    pub steps: String,

    /// HTML fragment
    #[serde(deserialize_with = "string_lenient")]
    pub approach: String,

    #[serde(deserialize_with = "difficulty_lenient")]
    pub difficulty: u8,

    #[serde(deserialize_with = "layout_lenient")]
    pub layout: u8,

    #[serde(deserialize_with = "string_lenient")]
    pub image_data: String,

    #[serde(deserialize_with = "string_lenient")]
    pub image_link: String,
}

impl Default for SolutioningPage {
    fn default() -> Self {
        Self {
            title: String::new(),
            steps: String::new(),
            approach: String::new(),
            difficulty: 0,
            layout: 1,
            image_data: String::new(),
            image_link: String::new(),
        }
    }
}

/// Input of the solutioning renderer, also accepted as is by the PDF
/// service endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolutioningDocument {
    pub basic: SolutionBasic,
    pub solutions: Vec<SolutioningPage>,

    /// Session glyph shown in page footers
    #[serde(deserialize_with = "string_lenient")]
    pub session_protocol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_logo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_logo: Option<String>,
}

impl From<&SolutionSession> for SolutioningDocument {
    fn from(session: &SolutionSession) -> Self {
        let solutions = session
            .solutions()
            .iter()
            .map(|s| SolutioningPage {
                title: s.structure.title.clone(),
                steps: s.structure.steps.clone(),
                approach: s.structure.approach.clone(),
                difficulty: s.structure.difficulty,
                layout: s.structure.layout,
                image_data: s.additional.image_data.clone(),
                image_link: s.additional.image_link.clone(),
            })
            .collect();

        Self {
            basic: session.basic.clone(),
            solutions,
            session_protocol: session.badge.glyph.clone(),
            main_logo: None,
            second_logo: None,
        }
    }
}

const SOLUTIONING_CSS: &str = r#"@page { size: A4; margin: 0; }
@page :first { margin: 0; @bottom-center { content: element(footer); vertical-align: bottom; } }
@page solution-page { margin: 0; @bottom-center { content: element(solution-footer); vertical-align: bottom; } }
html, body { font-family: Arial, Helvetica, sans-serif; margin: 0; padding: 0; color: #000; }
.cover-container {
    position: relative;
    width: 794px;
    height: 1122px;
    box-sizing: border-box;
    display: flex;
    flex-direction: column;
    align-items: center;
    page-break-after: always;
    padding-bottom: 80px;
}
.sol-overview-container { margin-top: 200px; margin-bottom: 80px; width: 350px; text-align: center; position: relative; }
.sol-overview { font-size: 20px; font-weight: 800; letter-spacing: 0.02em; position: relative; display: inline-block; padding: 2px 0; }
.sol-overview-top-line { width: 300px; border-top: 2px solid #000; position: absolute; top: 0; left: 25px; }
.sol-overview-bottom-line { width: 300px; border-top: 2px solid #000; position: absolute; bottom: 0; right: 25px; }
.content-section { width: 100%; position: relative; margin-top: 10px; }
.headline-wrapper { position: relative; width: 100%; max-width: 800px; margin: 0 auto; }
.meta-prepared-for {
    position: absolute;
    right: 97px;
    bottom: 100%;
    margin-bottom: 10px;
    font-size: 14px;
    font-weight: bold;
    line-height: 1.2;
    text-align: right;
    width: 300px;
}
.meta-prepared-for-value { font-weight: normal; margin-top: 3px; }
.date { position: absolute; left: 97px; bottom: 100%; margin-bottom: 10px; font-size: 12px; white-space: nowrap; }
.headline-block { width: 100%; text-align: center; margin: 30px auto 0; position: relative; padding: 35px 0; }
.top-line, .bottom-line { width: 600px; border-top: 4px solid #000; position: absolute; left: 50%; margin-left: -300px; }
.top-line { top: 0; }
.bottom-line { bottom: 0; }
.headline { font-size: 42px; font-weight: bold; line-height: 1.1; letter-spacing: 0.01em; max-width: 90%; display: inline-block; }
.meta-prepared-by {
    position: absolute;
    right: 97px;
    top: 100%;
    margin-top: 10px;
    font-size: 12px;
    text-align: right;
    line-height: 1.4;
    width: 300px;
}
.meta-prepared-by-name { margin: 3px 0 0 0; }
.meta-prepared-by-title { margin: 0 0 3px 0; }
.logo-section { margin-top: 100px; text-align: center; width: 100%; }
.logo { width: 300px; max-width: 100%; height: auto; display: block; margin: 0 auto; }
.footer-container { position: running(footer); width: 100%; text-align: center; padding-bottom: 30px; box-sizing: border-box; }
.footer-line { width: 98%; margin: 0 auto 20px; border-top: 1px solid #d1d1d1; }
.footer-disclaimer {
    width: 98%;
    max-width: 780px;
    margin: 0 auto;
    text-align: justify;
    font-size: 8px;
    color: #7d7d7d;
    line-height: 1.3;
    font-style: italic;
    padding: 0 5px;
}
.layout-page {
    padding: 20px;
    height: 1042px;
    width: 754px;
    box-sizing: border-box;
    page-break-before: always;
    margin: 0 auto;
    position: relative;
    page: solution-page;
}
.page-header { width: 100%; text-align: center; padding: 10px 0 20px 0; }
.page-header-image { width: 186px; height: 48px; opacity: 0.4; margin: 0 auto; }
.layout-1-container, .layout-4-container { display: flex; flex-direction: column; min-height: 902px; margin: 0 auto; }
.solution-title { font-family: Verdana, sans-serif; font-size: 40px; text-align: center; margin: 20px 0 10px 0; }
.solution-divider { width: 80%; margin: 15px auto; text-align: center; }
.solution-divider-line { width: 100%; border-top: 1px solid #888888; }
.solution-divider-text { font-size: 8px; font-style: italic; color: #555555; margin-top: 2px; line-height: 1.2; }
.layout-1-image { width: 90%; height: auto; object-fit: contain; display: block; margin: 0 auto; }
.layout-1-boxes-container-image, .layout-2-boxes-container-image {
    padding: 20px;
    display: flex;
    justify-content: center;
    align-items: center;
    margin-top: 20px;
    height: 300px;
    box-sizing: border-box;
}
.layout-1-boxes-container-image { border: 1px solid #000; border-radius: 42px; }
.layout-2-boxes-container-image { border: 1px solid #fff; border-radius: 30px; }
.layout-1-boxes-container, .layout-3-boxes-container { display: flex; justify-content: space-between; margin-top: 20px; align-items: flex-start; }
.layout-1-box, .layout-2-box, .layout-5-box {
    width: 48%;
    padding: 20px;
    box-sizing: border-box;
    white-space: pre-line;
    font-size: 12px;
    line-height: 1.5;
    text-align: justify;
    overflow-wrap: break-word;
}
.layout-1-box { border: 1px solid #000; border-radius: 30px; }
.layout-2-box { border: 1px solid #fff; border-radius: 30px; }
.layout-5-box { border: 1px solid #000; border-radius: 0; }
.layout-1-spacer { width: 1%; }
.layout-4-full-width-box {
    width: 714px;
    border: 1px solid #000;
    border-radius: 30px;
    padding: 20px;
    box-sizing: border-box;
    margin: 10px auto;
    text-align: justify;
    font-size: 12px;
    line-height: 1.5;
    white-space: pre-line;
    overflow-wrap: break-word;
}
.no-image { text-align: center; color: #777; }
.solution-footer { position: running(solution-footer); width: 100%; text-align: center; padding-bottom: 20px; box-sizing: border-box; }
.solution-footer-line { width: 98%; margin: 0 auto 20px; border-top: 1px solid #888888; }
.solution-footer-text {
    width: 98%;
    max-width: 780px;
    margin: 0 auto;
    font-size: 8px;
    color: #1a1a1a;
    line-height: 1.3;
    font-style: italic;
    padding: 0 5px;
}
"#;

/// Split a title at its first colon onto two lines.
fn headline(title: &str) -> String {
    match title.split_once(':') {
        Some((head, rest)) => format!("{}:<br>{}", escape_html(head), escape_html(rest.trim())),
        None => escape_html(title),
    }
}

/// Year of a `YYYY-MM-DD` date, else the current year.
fn copyright_year(date: &str) -> i32 {
    chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.year())
        .unwrap_or_else(|_| chrono::Local::now().year())
}

fn image_block(page: &SolutioningPage, container: &str) -> String {
    let data = strip_data_uri(&page.image_data);
    let image = if !data.is_empty() {
        format!(r#"<img src="data:image/png;base64,{data}" class="layout-1-image" alt="Solution Image">"#)
    } else if page.image_link.starts_with("http") {
        format!(
            r#"<img src="{}" class="layout-1-image" alt="Solution Image">"#,
            escape_html(&page.image_link)
        )
    } else {
        r#"<div class="no-image">No image available</div>"#.to_string()
    };
    format!("<div class=\"{container}\">\n{image}\n</div>\n")
}

fn box_pair(page: &SolutioningPage, container: &str, class: &str) -> String {
    format!(
        "<div class=\"{container}\">\n<div class=\"{class}\">{}</div>\n<div class=\"layout-1-spacer\"></div>\n<div class=\"{class}\">{}</div>\n</div>\n",
        page.steps, page.approach
    )
}

/// Page body for one of the five layouts. Unknown layouts render as 1.
fn layout_body(page: &SolutioningPage) -> String {
    let title = format!("<div class=\"solution-title\">{}</div>\n", escape_html(&page.title));
    let inner = match page.layout {
        2 => image_block(page, "layout-2-boxes-container-image")
            + &box_pair(page, "layout-1-boxes-container", "layout-2-box"),
        3 => box_pair(page, "layout-3-boxes-container", "layout-1-box")
            + &image_block(page, "layout-1-boxes-container-image"),
        4 => {
            return format!(
                "<div class=\"layout-4-container\">\n{title}{}<div class=\"layout-4-full-width-box\">{}</div>\n<div class=\"layout-4-full-width-box\">{}</div>\n</div>\n",
                image_block(page, "layout-2-boxes-container-image"),
                page.steps,
                page.approach
            )
        }
        5 => image_block(page, "layout-2-boxes-container-image")
            + "<br>\n"
            + &box_pair(page, "layout-1-boxes-container", "layout-5-box"),
        _ => image_block(page, "layout-1-boxes-container-image")
            + "<br>\n"
            + &box_pair(page, "layout-1-boxes-container", "layout-1-box"),
    };
    format!("<div class=\"layout-1-container\">\n{title}{inner}</div>\n")
}

/// Render the solutioning report as a printable HTML document.
///
/// Steps and approach are HTML fragments and are inserted as is; every other
/// field is escaped.
pub fn render_solutioning_html(document: &SolutioningDocument, branding: &Branding) -> String {
    let branding = branding
        .clone()
        .with_logos(document.main_logo.as_deref(), document.second_logo.as_deref());
    let basic = &document.basic;
    let total = document.solutions.len();
    let date = format_display_date(&basic.date);
    let company = escape_html(&branding.company_name);
    let title = if basic.title.trim().is_empty() { "Solution Overview Report" } else { basic.title.as_str() };
    let engineer = text_or(&basic.engineer, "Unknown Engineer");

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>PDF Report</title>\n<style>\n");
    html.push_str(SOLUTIONING_CSS);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!(
        r#"<div class="cover-container">
<div class="sol-overview-container">
<div class="sol-overview">
<div class="sol-overview-top-line"></div>
{overview}
<div class="sol-overview-bottom-line"></div>
</div>
</div>
<div class="content-section">
<div class="headline-wrapper">
<div class="headline-block">
<div class="date">{date}</div>
<div class="meta-prepared-for">Prepared For:<br><div class="meta-prepared-for-value">{recipient}</div></div>
<div class="top-line"></div>
<div class="headline">{headline}</div>
<div class="bottom-line"></div>
<div class="meta-prepared-by">Prepared By:<br><p class="meta-prepared-by-name">{engineer}</p><p class="meta-prepared-by-title">Solutions Engineer</p></div>
</div>
</div>
</div>
<br><br><br>
<div class="logo-section">{logo}</div>
<br><br>
<div class="footer-container">
<div class="footer-line"></div>
<div class="footer-disclaimer">This document and the information contained herein are the confidential and proprietary property of {company}. It is intended solely for the use of the recipient(s) and may not be copied, distributed, reproduced, or disclosed, whether in whole or in part, without the express written consent of {company}. Unauthorized use, disclosure, or duplication is strictly prohibited. All rights reserved ©{year}.</div>
</div>
</div>
"#,
        overview = if total > 1 { "Multi-Solution Overview" } else { "Solution Overview" },
        date = escape_html(&date),
        recipient = text_or(&basic.recipient, "Unknown Client"),
        headline = headline(title),
        logo = logo_img(&branding.main_logo, "logo", "Company Logo"),
        year = copyright_year(&basic.date),
    ));

    for (i, page) in document.solutions.iter().enumerate() {
        html.push_str(&format!(
            r#"<div class="layout-page">
<div class="page-header">{header_logo}</div>
<div class="solution-divider">
<div class="solution-divider-line"></div>
<div class="solution-divider-text">Solution {number} of {total} developed by the engineer {engineer} with the estimated difficulty of {difficulty}%.</div>
</div>
{body}<div class="solution-footer">
<div class="solution-footer-line"></div>
<div class="solution-footer-text">{company} — {title} — Protocol {glyph} Glyph — LS{layout}DL{difficulty} at {date}</div>
</div>
</div>
"#,
            header_logo = logo_img(&branding.second_logo, "page-header-image", "Header Logo"),
            number = i + 1,
            difficulty = page.difficulty,
            body = layout_body(page),
            title = escape_html(title),
            glyph = escape_html(&document.session_protocol),
            layout = page.layout,
            date = escape_html(&date),
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SolutionUpdate;

    fn document(layouts: &[u8]) -> SolutioningDocument {
        SolutioningDocument {
            basic: SolutionBasic {
                date: "2024-05-01".into(),
                title: "Acme: Lead Scoring".into(),
                recipient: "Acme".into(),
                engineer: "Sam Rivera".into(),
            },
            solutions: layouts
                .iter()
                .map(|&layout| SolutioningPage {
                    title: format!("Layout {layout}"),
                    steps: "<ol><li>Ingest</li></ol>".into(),
                    approach: "Batch".into(),
                    difficulty: 40,
                    layout,
                    ..Default::default()
                })
                .collect(),
            session_protocol: "AB12CD34".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cover_page() {
        let html = render_solutioning_html(&document(&[1]), &Branding::new("Dry Ground AI"));
        assert!(html.contains("\nSolution Overview\n"));
        assert!(html.contains("<div class=\"headline\">Acme:<br>Lead Scoring</div>"));
        assert!(html.contains("<div class=\"date\">May 01, 2024</div>"));
        assert!(html.contains("All rights reserved ©2024."));
    }

    #[test]
    fn test_multi_solution_pages() {
        let html = render_solutioning_html(&document(&[1, 4]), &Branding::new("Dry Ground AI"));
        assert!(html.contains("Multi-Solution Overview"));
        assert!(html.contains("Solution 2 of 2 developed by the engineer Sam Rivera with the estimated difficulty of 40%."));
        assert!(html.contains("Dry Ground AI — Acme: Lead Scoring — Protocol AB12CD34 Glyph — LS4DL40 at May 01, 2024"));
        assert!(html.contains("layout-4-full-width-box\"><ol><li>Ingest</li></ol>"));
        assert_eq!(html.matches("No image available").count(), 2);
    }

    #[test]
    fn test_layout_variants() {
        let html = render_solutioning_html(&document(&[2, 3, 5]), &Branding::default());
        assert!(html.contains("class=\"layout-2-box\""));
        assert!(html.contains("class=\"layout-5-box\""));
        let three = layout_body(&document(&[3]).solutions[0]);
        assert!(three.find("layout-3-boxes-container") < three.find("layout-1-boxes-container-image"));
    }

    #[test]
    fn test_image_sources() {
        let mut page = SolutioningPage { image_data: "data:image/png;base64,QUJD".into(), ..Default::default() };
        assert!(image_block(&page, "c").contains("src=\"data:image/png;base64,QUJD\""));
        page.image_data.clear();
        page.image_link = "https://i.ibb.co/x.png".into();
        assert!(image_block(&page, "c").contains("src=\"https://i.ibb.co/x.png\""));
    }

    #[test]
    fn test_document_logos_override_branding() {
        let mut doc = document(&[1]);
        doc.main_logo = Some("data:image/png;base64,ORGLOGO".into());
        let branding = Branding { second_logo: "DGLOGO".into(), ..Branding::new("Dry Ground AI") };
        let html = render_solutioning_html(&doc, &branding);
        assert!(html.contains("base64,ORGLOGO\" class=\"logo\""));
        assert!(html.contains("base64,DGLOGO\" class=\"page-header-image\""));
    }

    #[test]
    fn test_from_session() {
        let mut session = SolutionSession::new();
        session
            .update_current(SolutionUpdate {
                title: Some("Scoring".into()),
                layout: Some(3),
                difficulty: Some(serde_json::json!("70")),
                ..Default::default()
            })
            .unwrap();
        session.save_image_data("data:image/png;base64,AAAA");

        let doc = SolutioningDocument::from(&session);
        assert_eq!(doc.session_protocol, session.badge.glyph);
        assert_eq!(doc.solutions[0].layout, 3);
        assert_eq!(doc.solutions[0].difficulty, 70);
        assert_eq!(doc.solutions[0].image_data, "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_service_payload_is_lenient() {
        let doc: SolutioningDocument = serde_json::from_value(serde_json::json!({
            "basic": {"title": "T"},
            "solutions": [{"title": "A", "layout": "2", "difficulty": "55"}],
            "sessionProtocol": "SH123"
        }))
        .unwrap();
        assert_eq!(doc.solutions[0].layout, 2);
        assert_eq!(doc.solutions[0].difficulty, 55);
    }
}
