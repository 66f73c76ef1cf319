//! Behavioural properties of the timeline layout engine

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use roadmap_core::{Document, Lane, MaterialSystem, Milestone, Product, Program, Task, TaskKey};
use roadmap_layout::{
    compute_quarter_window, group_and_stack_by_lane, layout_span, set_active_material_facet,
    LaneCandidate, LayoutConfig, StackingMode, TimelineLayoutEngine,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// P1 uses MS1 (task ending 2025-Q2) and MS3 (task ending 2025-Q3)
fn satcom_document() -> Document {
    let mut doc = Document::default();
    doc.programs.push(Program::new("PRG1", "Satellite Systems").need_date("2025-06-30"));
    doc.programs.push(Program::new("PRG2", "Ground Segment"));
    doc.programs.push(Program::new("PRG3", "Launch Vehicles").need_date("2025-05-01"));
    doc.products.push(
        Product::new("P1", "SatCom Terminal")
            .program("PRG1")
            .program("PRG2")
            .program("PRG3")
            .material("MS1")
            .material("MS3")
            .task(
                Task::new("Initial Design")
                    .span("2025-01-01", "2025-03-31")
                    .with_status("Complete")
                    .with_lane(Lane::Design),
            )
            .task(
                Task::new("Prototype Build")
                    .span("2025-04-01", "2025-09-30")
                    .with_status("In Progress")
                    .with_lane(Lane::Manufacturing),
            )
            .milestone(Milestone::new("PDR", "2025-02-15").description("Preliminary design review")),
    );
    doc.material_systems.push(
        MaterialSystem::new("MS1", "Ti-6Al-4V")
            .task(Task::new("Material Certification").span("2025-01-10", "2025-05-30")),
    );
    doc.material_systems.push(
        MaterialSystem::new("MS3", "Carbon Fiber Composite")
            .task(Task::new("Layup Trials").span("2025-02-01", "2025-08-15")),
    );
    doc
}

#[test]
fn window_is_exact_and_sequential() {
    let window = compute_quarter_window(date(2025, 2, 15), 5);
    insta::assert_snapshot!(window.labels().join(" "), @"2025-Q1 2025-Q2 2025-Q3 2025-Q4 2026-Q1");

    for count in 1..=24 {
        let window = compute_quarter_window(date(2024, 11, 30), count);
        assert_eq!(window.len(), count);
        for pair in window.quarters.windows(2) {
            assert_eq!(pair[1], pair[0].next());
            assert_eq!(pair[1].ordinal(), pair[0].ordinal() + 1);
        }
    }
}

#[test]
fn end_outside_window_is_always_excluded() {
    let window = compute_quarter_window(date(2025, 1, 1), 4);
    for start in ["2020-01-01", "2025-01-01", "2025-12-31", "garbage"] {
        let task = Task::new("t").span(start, "2026-02-01");
        assert_eq!(layout_span(&task, &window, 100), None, "start {start}");
    }
}

#[test]
fn early_start_is_clipped_to_left_edge() {
    let window = compute_quarter_window(date(2025, 1, 1), 8);
    let task = Task::new("Long Qualification").span("2022-03-01", "2025-08-01");
    let span = layout_span(&task, &window, 100).unwrap();
    // end index is 2 (2025-Q3)
    assert_eq!((span.start_position, span.width), (0, 300));
}

#[test]
fn identical_spans_share_a_bucket_with_distinct_offsets() {
    let window = compute_quarter_window(date(2025, 1, 1), 4);
    let tasks = [
        Task::new("C").span("2025-05-20", "2025-09-01"),
        Task::new("A").span("2025-04-01", "2025-08-01"),
        Task::new("B").span("2025-04-15", "2025-07-01"),
    ];
    let candidates: Vec<LaneCandidate<'_>> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| LaneCandidate {
            key: TaskKey::product("P1", i),
            task,
            material: None,
        })
        .collect();
    let lane = group_and_stack_by_lane(Lane::Quality, &candidates, &window, &LayoutConfig::default(), None);

    let rows: Vec<(&str, u32, u32, u32)> = lane
        .items
        .iter()
        .map(|i| (i.task.as_str(), i.start_position, i.width, i.vertical_offset))
        .collect();
    assert_eq!(
        rows,
        vec![("A", 100, 200, 0), ("B", 100, 200, 30), ("C", 100, 200, 60)]
    );
}

#[test]
fn facet_switch_changes_only_visibility() {
    let doc = satcom_document();
    let engine = TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(5));
    let before = engine.layout_product(&doc, "P1", date(2025, 1, 1), Some("MS1")).unwrap();

    let mut after = before.clone();
    set_active_material_facet(&mut after, "MS3");

    assert_eq!(after.active_material.as_deref(), Some("MS3"));
    for (lane_before, lane_after) in before.lanes.iter().zip(&after.lanes) {
        assert_eq!(lane_before.items.len(), lane_after.items.len());
        for (a, b) in lane_before.items.iter().zip(&lane_after.items) {
            assert!(a.same_geometry(b), "{} moved", a.key);
            if lane_before.lane != Lane::MaterialsAndProcesses {
                assert_eq!(a.visible, b.visible);
            }
        }
    }

    // Switching back restores the original layout exactly
    set_active_material_facet(&mut after, "MS1");
    assert_eq!(after, before);
}

#[test]
fn markers_in_one_quarter_stack_by_date() {
    let doc = satcom_document();
    let engine = TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(5));
    let layout = engine.layout_product(&doc, "P1", date(2025, 1, 1), None).unwrap();

    let programs: Vec<(&str, u32, u32)> = layout
        .programs
        .iter()
        .map(|m| (m.label.as_str(), m.position, m.vertical_offset))
        .collect();
    // PRG2 has no need date and is left out
    assert_eq!(
        programs,
        vec![("Launch Vehicles", 150, 0), ("Satellite Systems", 150, 40)]
    );
    assert_eq!(layout.milestones.len(), 1);
    assert_eq!(layout.milestones[0].position, 50);
    assert_eq!(layout.milestones[0].tooltip, "PDR: Preliminary design review");
}

#[test]
fn material_lane_end_to_end() {
    let doc = satcom_document();
    let engine = TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(5));
    let layout = engine.layout_product(&doc, "P1", date(2025, 1, 1), Some("MS1")).unwrap();

    let mp = layout.lane(Lane::MaterialsAndProcesses).unwrap();
    let items: Vec<(&str, bool, u32, u32)> = mp
        .items
        .iter()
        .map(|i| (i.material_id.as_deref().unwrap(), i.visible, i.start_position, i.width))
        .collect();
    assert_eq!(items, vec![("MS1", true, 0, 200), ("MS3", false, 0, 300)]);

    // Product tasks never leak into the M&P lane and vice versa
    assert_eq!(layout.lane(Lane::Design).unwrap().items.len(), 1);
    assert_eq!(layout.lane(Lane::Manufacturing).unwrap().items.len(), 1);
    assert!(layout.lane(Lane::Quality).unwrap().items.is_empty());
    assert!(layout
        .lane(Lane::Design)
        .unwrap()
        .items
        .iter()
        .all(|i| i.material_id.is_none()));
}

#[test]
fn default_facet_is_first_material() {
    let doc = satcom_document();
    let engine = TimelineLayoutEngine::default();
    let layout = engine.layout_product(&doc, "P1", date(2025, 1, 1), None).unwrap();
    assert_eq!(layout.active_material.as_deref(), Some("MS1"));

    let unknown = engine.layout_product(&doc, "P1", date(2025, 1, 1), Some("MS404")).unwrap();
    assert_eq!(unknown.active_material.as_deref(), Some("MS1"));
}

#[test]
fn layout_is_deterministic() {
    let doc = satcom_document();
    let engine = TimelineLayoutEngine::default();
    let first = engine.layout_product(&doc, "P1", date(2025, 3, 3), Some("MS3"));
    let second = engine.layout_product(&doc, "P1", date(2025, 3, 3), Some("MS3"));
    assert_eq!(first, second);
    assert_eq!(
        compute_quarter_window(date(2025, 3, 3), 9),
        compute_quarter_window(date(2025, 3, 3), 9)
    );
}

#[test]
fn duplicate_task_names_keep_distinct_keys() {
    let mut doc = satcom_document();
    doc.products[0].roadmap.push(
        Task::new("Initial Design")
            .span("2025-01-01", "2025-03-31")
            .with_lane(Lane::Design),
    );
    let layout = TimelineLayoutEngine::default()
        .layout_product(&doc, "P1", date(2025, 1, 1), None)
        .unwrap();
    let design = layout.lane(Lane::Design).unwrap();
    assert_eq!(design.items.len(), 2);
    assert_ne!(design.items[0].key, design.items[1].key);
    assert_eq!(
        layout.item(&TaskKey::product("P1", 2)).map(|i| i.vertical_offset),
        Some(30)
    );
}

#[test]
fn interval_stacking_never_overlaps() {
    let mut doc = satcom_document();
    let starts = ["2025-01-01", "2025-02-01", "2025-04-01", "2025-07-01", "2025-10-01"];
    let ends = ["2025-06-30", "2025-12-31", "2025-09-30", "2026-03-31", "2025-12-31"];
    for (i, (start, end)) in starts.iter().zip(ends).enumerate() {
        doc.products[0]
            .roadmap
            .push(Task::new(format!("Q{i}")).span(*start, end).with_lane(Lane::Quality));
    }
    let engine = TimelineLayoutEngine::new(LayoutConfig::default().stacking(StackingMode::Interval));
    let layout = engine.layout_product(&doc, "P1", date(2025, 1, 1), None).unwrap();
    let items = &layout.lane(Lane::Quality).unwrap().items;
    assert_eq!(items.len(), 5);

    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            let overlaps = a.start_position < b.start_position + b.width
                && b.start_position < a.start_position + a.width;
            if overlaps {
                assert_ne!(a.vertical_offset, b.vertical_offset, "{} and {}", a.task, b.task);
            }
        }
    }
}

#[test]
fn layout_serializes_in_camel_case() {
    let doc = satcom_document();
    let layout = TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(2))
        .layout_product(&doc, "P1", date(2025, 1, 1), None)
        .unwrap();
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["productId"], "P1");
    assert_eq!(json["window"]["quarterLabels"], serde_json::json!(["2025-Q1", "2025-Q2"]));
    assert_eq!(json["lanes"][0]["items"][0]["key"], "product:P1:0");
    assert_eq!(json["lanes"][0]["items"][0]["startPosition"], 0);
    assert_eq!(json["lanes"][2]["lane"], "M&P");
    assert_eq!(json["programs"][0]["kind"], "program");
}
