//! Statement of Work document.

use super::html::{
    bullet_items, confidentiality, escape_html, report_document, section, table, Branding,
    ReportHeader, REPORT_CSS,
};
use crate::session::SowSession;

/// Render a Statement of Work as a printable HTML document.
pub fn render_sow_html(sow: &SowSession, branding: &Branding) -> String {
    let mut body = ReportHeader {
        document_title: "Statement of Work",
        project: &sow.project,
        client: &sow.client,
        date: &sow.date,
        prepared_by: &sow.prepared_by,
    }
    .render(branding);

    body.push_str(&section(
        "Project Purpose & Background",
        &format!("{}\n", escape_html(&sow.project_purpose_background)),
    ));

    if !sow.objectives.is_empty() {
        body.push_str(&section("Project Objectives", &bullet_items(&sow.objectives)));
    }

    if !sow.in_scope_deliverables.is_empty() {
        let rows: String = sow
            .in_scope_deliverables
            .iter()
            .filter(|d| !d.is_blank())
            .map(|d| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape_html(&d.deliverable),
                    escape_html(&d.key_features),
                    escape_html(&d.primary_artifacts)
                )
            })
            .collect();
        body.push_str(&section(
            "In-Scope Deliverables",
            &table(&["Deliverable", "Key Features", "Primary Artifacts"], &rows),
        ));
    }

    if !sow.out_of_scope.trim().is_empty() {
        body.push_str(&section("Out-of-Scope", &format!("{}\n", escape_html(&sow.out_of_scope))));
    }

    if !sow.functional_requirements.is_empty() {
        body.push_str(&section(
            "Functional Requirements",
            &bullet_items(&sow.functional_requirements),
        ));
    }

    if !sow.non_functional_requirements.is_empty() {
        body.push_str(&section(
            "Non-Functional Requirements",
            &bullet_items(&sow.non_functional_requirements),
        ));
    }

    if !sow.phases().is_empty() {
        let rows: String = sow
            .phases()
            .iter()
            .filter(|p| !p.phase.trim().is_empty() || !p.key_activities.trim().is_empty())
            .map(|p| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td class=\"number-cell\">{}</td></tr>\n",
                    escape_html(&p.phase),
                    escape_html(&p.key_activities),
                    p.weeks_display()
                )
            })
            .collect();
        body.push_str(&section(
            "Project Phases & Timeline",
            &table(&["Phase", "Key Activities", "Timeline (Weeks)"], &rows),
        ));
    }

    let (mid, end) = sow.refinement_window();
    body.push_str(&section(
        "Real-Time Refinement Period",
        &format!(
            "<p>This project includes a two-phase refinement approach designed to align closely with client expectations.</p>\n\
<p><strong>Weeks 0–{mid}: Observation &amp; Feedback</strong> – The client will receive regular visual updates and progress reviews, \
enabling early feedback while the solution is being structured.</p>\n\
<p><strong>Weeks {mid}–{end}: Interactive Testing</strong> – Starting in Week {mid}, the client will gain access to a functional version \
of the solution for hands-on testing. This phase is intended to \"test and break\" the system, with rapid iterations based on real usage and feedback.</p>\n\
<p>This process ensures the final product is not only delivered on time, but shaped in partnership with the client throughout development.</p>\n"
        ),
    ));

    body.push_str(&confidentiality("Statement of Work", &branding.company_name, &sow.client));

    report_document("Statement of Work", REPORT_CSS, &body)
}
