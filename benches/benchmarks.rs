//! Performance benchmarks for Nexa Studio.
//!
//! This module contains benchmarks for:
//! - Parsing model replies (JSON objects, lists, sketches)
//! - Rendering documents to HTML
//! - Session wire format serialization
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nexa_studio::pdf::{render_loe_html, render_solutioning_html, render_sow_html, Branding, SolutioningDocument};
use nexa_studio::pipeline::{clean_sketch, parse_json_object, parse_string_list};
use nexa_studio::session::{
    Deliverable, EffortOption, LoeSession, Phase, Resource, SolutionBasic, SolutionSession,
    SolutionUpdate, SowSession,
};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// A model reply wrapping a SoW object in prose and a code fence.
    pub fn sow_reply(num_objectives: usize) -> String {
        let objectives: Vec<String> =
            (0..num_objectives).map(|i| format!(r#""Objective number {i} for the engagement""#)).collect();
        format!(
            "Here is the Statement of Work you asked for:\n```json\n{{\n  \"project_purpose_background\": \"Background text\",\n  \"objectives\": [{}],\n  \"out_of_scope\": \"Mobile\"\n}}\n```\nLet me know if you need changes.",
            objectives.join(", ")
        )
    }

    pub fn solution_session(num_solutions: usize) -> SolutionSession {
        let mut session = SolutionSession::new();
        session.save_basic(SolutionBasic {
            date: "2024-05-01".into(),
            title: "Data Platform".into(),
            recipient: "Acme".into(),
            engineer: "Sam Rivera".into(),
        });
        for i in 0..num_solutions {
            if i > 0 {
                session.next_solution();
            }
            session.save_additional("https://i.ibb.co/diagram.png", format!("Solution {i} explanation"));
            session
                .update_current(SolutionUpdate {
                    title: Some(format!("Solution {i}")),
                    steps: Some("<ol><li>Ingest</li><li>Transform</li><li>Serve</li></ol>".into()),
                    approach: Some("<p>Stream processing with a feature store.</p>".into()),
                    difficulty: Some(serde_json::json!(40 + i % 50)),
                    layout: Some((i % 5 + 1) as u8),
                    ..Default::default()
                })
                .expect("valid layout");
        }
        session
    }

    pub fn sow(num_rows: usize) -> SowSession {
        let mut sow = SowSession {
            project: "Data Platform".into(),
            client: "Acme".into(),
            prepared_by: "Sam Rivera".into(),
            date: "2024-05-01".into(),
            project_purpose_background: "Acme needs realtime scoring.".into(),
            objectives: (0..num_rows).map(|i| format!("Objective {i}")).collect(),
            in_scope_deliverables: (0..num_rows)
                .map(|i| Deliverable {
                    deliverable: format!("Deliverable {i}"),
                    key_features: "Features & more".into(),
                    primary_artifacts: "Code".into(),
                })
                .collect(),
            ..SowSession::new()
        };
        sow.project_phases_timeline.phases = (0..num_rows as u32)
            .map(|i| Phase { phase: format!("Phase {i}"), key_activities: "Build".into(), weeks_start: i, weeks_end: i + 2 })
            .collect();
        sow
    }

    pub fn loe(num_rows: usize) -> LoeSession {
        LoeSession {
            resources: (0..num_rows)
                .map(|i| Resource { role: format!("Role {i}"), person_weeks: 4.0, person_hours: 80 })
                .collect(),
            good_options: (0..num_rows)
                .map(|i| EffortOption { feature: format!("Cut {i}"), hours: 20, weeks: 1.0 })
                .collect(),
            best_options: (0..num_rows)
                .map(|i| EffortOption { feature: format!("Add {i}"), hours: 40, weeks: 2.0 })
                .collect(),
            ..LoeSession::new()
        }
    }
}

// ============================================================================
// Reply Parsing Benchmarks
// ============================================================================

fn bench_reply_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing/reply");

    for num_objectives in [5, 50, 200].iter() {
        let reply = fixtures::sow_reply(*num_objectives);
        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_json_object", num_objectives),
            &reply,
            |b, reply| b.iter(|| black_box(parse_json_object(black_box(reply)))),
        );
    }

    let list = "Assumptions follow:\n[\"Data access\", \"SSO available\", \"Weekly reviews\"]";
    group.bench_function("parse_string_list", |b| b.iter(|| black_box(parse_string_list(black_box(list)))));

    let sketch = "```xml\n<mxGraphModel>\n  <root>\n    <mxCell id=\\\"0\\\"/>\n  </root>\n</mxGraphModel>\n```".repeat(20);
    group.bench_function("clean_sketch", |b| b.iter(|| black_box(clean_sketch(black_box(&sketch)))));

    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/html");
    let branding = Branding::new("Dry Ground AI");

    for num_solutions in [1, 5, 20].iter() {
        let document = SolutioningDocument::from(&fixtures::solution_session(*num_solutions));
        group.throughput(Throughput::Elements(*num_solutions as u64));
        group.bench_with_input(
            BenchmarkId::new("solutioning", num_solutions),
            &document,
            |b, document| b.iter(|| black_box(render_solutioning_html(document, &branding))),
        );
    }

    for num_rows in [5, 50].iter() {
        let sow = fixtures::sow(*num_rows);
        group.bench_with_input(BenchmarkId::new("sow", num_rows), &sow, |b, sow| {
            b.iter(|| black_box(render_sow_html(sow, &branding)));
        });

        let loe = fixtures::loe(*num_rows);
        group.bench_with_input(BenchmarkId::new("loe", num_rows), &loe, |b, loe| {
            b.iter(|| black_box(render_loe_html(loe, &branding)));
        });
    }

    group.finish();
}

// ============================================================================
// Wire Format Benchmarks
// ============================================================================

fn bench_wire_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("session/wire");

    for num_solutions in [1, 10, 50].iter() {
        let session = fixtures::solution_session(*num_solutions);
        let json = serde_json::to_string(&session).expect("serializable");

        group.bench_with_input(BenchmarkId::new("serialize", num_solutions), &session, |b, session| {
            b.iter(|| black_box(serde_json::to_string(black_box(session))));
        });
        group.bench_with_input(BenchmarkId::new("deserialize", num_solutions), &json, |b, json| {
            b.iter(|| black_box(serde_json::from_str::<SolutionSession>(black_box(json))));
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Groups and Main
// ============================================================================

criterion_group!(parsing_benches, bench_reply_parsing,);

criterion_group!(render_benches, bench_rendering,);

criterion_group!(session_benches, bench_wire_format,);

criterion_main!(parsing_benches, render_benches, session_benches,);
