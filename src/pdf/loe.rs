//! Level of Effort document.

use super::html::{
    bullet_items, confidentiality, escape_html, format_weeks, report_document, section, table,
    Branding, ReportHeader, REPORT_CSS,
};
use crate::session::{EffortOption, LoeSession};

const LOE_CSS: &str = r#"
.buffer-row { background-color: #f9f9f9; font-weight: 600; }
.total-row { background-color: #e9e9e9; font-weight: bold; }
.options-subsection { margin-bottom: 25px; }
.options-subtitle { font-size: 12px; font-weight: bold; color: #333; margin-bottom: 10px; text-decoration: underline; }
.reduction-row { background-color: #e8f5e8; font-weight: 600; color: #2d6e2d; }
.addition-row { background-color: #e8f2ff; font-weight: 600; color: #1e4d72; }
.adjusted-row { background-color: #e9e9e9; font-weight: bold; }
"#;

fn number_row(class: &str, label: &str, first: &str, second: &str) -> String {
    format!(
        "<tr class=\"{class}\"><td><strong>{}</strong></td><td class=\"number-cell\">{first}</td><td class=\"number-cell\">{second}</td></tr>\n",
        escape_html(label)
    )
}

fn option_rows(options: &[EffortOption]) -> String {
    options
        .iter()
        .filter(|o| !o.feature.trim().is_empty())
        .map(|o| {
            format!(
                "<tr><td>{}</td><td class=\"number-cell\">{}</td><td class=\"number-cell\">{}</td></tr>\n",
                escape_html(&o.feature),
                o.hours,
                format_weeks(o.weeks)
            )
        })
        .collect()
}

fn options_table(
    subtitle: &str,
    feature_header: &str,
    rows: String,
    summary: String,
    adjusted: String,
) -> String {
    format!(
        "<div class=\"options-subsection\">\n<div class=\"options-subtitle\">{subtitle}</div>\n{}</div>\n",
        table(&[feature_header, "Person-Hours", "Person-Weeks"], &(rows + &summary + &adjusted))
    )
}

/// Render a Level of Effort estimate as a printable HTML document.
pub fn render_loe_html(loe: &LoeSession, branding: &Branding) -> String {
    let basic = &loe.basic;
    let totals = loe.totals();

    let mut body = ReportHeader {
        document_title: "Level of Effort",
        project: &basic.project,
        client: &basic.client,
        date: &basic.date,
        prepared_by: &basic.prepared_by,
    }
    .render(branding);

    if !loe.overview.trim().is_empty() {
        body.push_str(&section("Project Overview", &format!("{}\n", escape_html(&loe.overview))));
    }

    if !loe.workstreams.is_empty() {
        let rows: String = loe
            .workstreams
            .iter()
            .filter(|w| !w.workstream.trim().is_empty() || !w.activities.trim().is_empty())
            .map(|w| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td class=\"number-cell\">{}</td></tr>\n",
                    escape_html(&w.workstream),
                    escape_html(&w.activities),
                    escape_html(&w.duration)
                )
            })
            .collect();
        body.push_str(&section(
            "Project Workstreams",
            &table(&["Workstream", "Key Activities", "Duration (Weeks)"], &rows),
        ));
    }

    if !loe.resources.is_empty() {
        let mut rows: String = loe
            .resources
            .iter()
            .filter(|r| !r.role.trim().is_empty())
            .map(|r| {
                format!(
                    "<tr><td>{}</td><td class=\"number-cell\">{}</td><td class=\"number-cell\">{}</td></tr>\n",
                    escape_html(&r.role),
                    format_weeks(r.person_weeks),
                    r.person_hours
                )
            })
            .collect();
        rows.push_str(&number_row(
            "buffer-row",
            "Buffer Margin (all roles)",
            &format_weeks(loe.buffer.weeks),
            &loe.buffer.hours.to_string(),
        ));
        rows.push_str(&number_row(
            "total-row",
            "Total",
            &format_weeks(totals.total_weeks),
            &totals.total_hours.to_string(),
        ));
        body.push_str(&section(
            "Resource Allocation",
            &table(&["Role", "Person-Weeks", "Person-Hours"], &rows),
        ));
    }

    if !loe.assumptions.is_empty() {
        body.push_str(&section("Key Assumptions", &bullet_items(&loe.assumptions)));
    }

    if !loe.good_options.is_empty() || !loe.best_options.is_empty() {
        let mut options = String::new();
        if !loe.good_options.is_empty() {
            options.push_str(&options_table(
                "Good (Lower Effort Option)",
                "Features Removed",
                option_rows(&loe.good_options),
                number_row(
                    "reduction-row",
                    "Decrease in Project Duration",
                    &totals.good_hours.to_string(),
                    &format_weeks(totals.good_weeks),
                ),
                number_row(
                    "adjusted-row",
                    "Adjusted LOE",
                    &totals.good_adjusted_hours.to_string(),
                    &format_weeks(totals.good_adjusted_weeks),
                ),
            ));
        }
        if !loe.best_options.is_empty() {
            options.push_str(&options_table(
                "Best (Enhanced Option)",
                "Features Added",
                option_rows(&loe.best_options),
                number_row(
                    "addition-row",
                    "Increase in Project Duration",
                    &totals.best_hours.to_string(),
                    &format_weeks(totals.best_weeks),
                ),
                number_row(
                    "adjusted-row",
                    "Adjusted LOE",
                    &totals.best_adjusted_hours.to_string(),
                    &format_weeks(totals.best_adjusted_weeks),
                ),
            ));
        }
        body.push_str(&section("Options", &options));
    }

    body.push_str(&confidentiality(
        "Level of Effort estimate",
        &branding.company_name,
        &basic.client,
    ));

    report_document("Level of Effort", &format!("{REPORT_CSS}{LOE_CSS}"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Buffer, LoeBasic, Resource, Workstream};

    fn loe() -> LoeSession {
        LoeSession {
            basic: LoeBasic {
                project: "Data Platform".into(),
                client: "Acme".into(),
                prepared_by: "Sam Rivera".into(),
                date: "2024-05-01".into(),
            },
            workstreams: vec![
                Workstream { workstream: "Backend".into(), activities: "API".into(), duration: "4".into() },
                Workstream::default(),
            ],
            resources: vec![
                Resource { role: "Engineer".into(), person_weeks: 6.0, person_hours: 120 },
                Resource { role: "Designer".into(), person_weeks: 2.0, person_hours: 40 },
            ],
            buffer: Buffer { weeks: 1.0, hours: 20 },
            good_options: vec![EffortOption { feature: "Drop reporting".into(), hours: 30, weeks: 1.5 }],
            best_options: vec![
                EffortOption { feature: "Mobile".into(), hours: 40, weeks: 2.0 },
                EffortOption::default(),
            ],
            ..LoeSession::new()
        }
    }

    #[test]
    fn test_resource_totals_row() {
        let html = render_loe_html(&loe(), &Branding::new("Dry Ground AI"));
        assert!(html.contains("Buffer Margin (all roles)"));
        assert!(html.contains(
            "<td><strong>Total</strong></td><td class=\"number-cell\">9</td><td class=\"number-cell\">180</td>"
        ));
        assert!(!html.contains("Project Overview"));
    }

    #[test]
    fn test_options_tables() {
        let html = render_loe_html(&loe(), &Branding::new("Dry Ground AI"));
        assert!(html.contains("Good (Lower Effort Option)"));
        assert!(html.contains(
            "<td><strong>Decrease in Project Duration</strong></td><td class=\"number-cell\">30</td><td class=\"number-cell\">1.5</td>"
        ));
        assert!(html.contains(
            "<td><strong>Adjusted LOE</strong></td><td class=\"number-cell\">150</td><td class=\"number-cell\">7.5</td>"
        ));
        assert!(html.contains(
            "<td><strong>Adjusted LOE</strong></td><td class=\"number-cell\">220</td><td class=\"number-cell\">11</td>"
        ));
        assert_eq!(html.matches("<td>Mobile</td>").count(), 1);
        assert_eq!(html.matches("<tr><td>").count(), 5);
    }

    #[test]
    fn test_footer_and_header() {
        let html = render_loe_html(&loe(), &Branding::new("Dry Ground AI"));
        assert!(html.contains("This Level of Effort estimate is confidential and proprietary to DRY GROUND AI."));
        assert!(html.contains("It is intended solely for the use of Acme"));
        assert!(html.contains("Date: May 01, 2024"));
    }
}
