//! Point-in-time marker rows: product milestones and program need dates

use std::collections::BTreeMap;

use chrono::NaiveDate;
use roadmap_core::{format_date_str, EntityStore, MarkerKind, MarkerLayout, Product, TimelineWindow};
use tracing::debug;

use crate::span::pixels;
use crate::LayoutConfig;

/// A marker before placement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerInput {
    pub kind: MarkerKind,
    /// `None` when the source date is missing or malformed
    pub date: Option<NaiveDate>,
    pub label: String,
    pub tooltip: String,
}

/// Place markers in their quarter column and stack those sharing a quarter.
///
/// Undated markers and markers outside the window are dropped. Within a
/// quarter, markers are stably sorted by date and offset by
/// `index * marker_spacing`. Output is ordered by quarter.
pub fn stack_markers_by_quarter(
    markers: Vec<MarkerInput>,
    window: &TimelineWindow,
    config: &LayoutConfig,
) -> Vec<MarkerLayout> {
    let mut by_quarter: BTreeMap<usize, Vec<(NaiveDate, MarkerInput)>> = BTreeMap::new();
    for marker in markers {
        let Some(date) = marker.date else {
            continue;
        };
        if let Some(index) = window.index_of_date(date) {
            by_quarter.entry(index).or_default().push((date, marker));
        }
    }

    let unit = config.unit_width;
    let mut out = Vec::new();
    for (index, mut group) in by_quarter {
        group.sort_by_key(|(date, _)| *date);
        for (row, (date, marker)) in group.into_iter().enumerate() {
            out.push(MarkerLayout {
                kind: marker.kind,
                position: pixels(index, unit).saturating_add(unit / 2),
                vertical_offset: pixels(row, config.marker_spacing),
                label: marker.label,
                tooltip: marker.tooltip,
                date,
            });
        }
    }
    out
}

/// Need-date markers for the product's programs, sorted by need date.
///
/// Unknown program references are skipped; programs without a need date are
/// kept here and dropped at placement.
pub fn program_markers<S>(store: &S, product: &Product) -> Vec<MarkerInput>
where
    S: EntityStore + ?Sized,
{
    let mut programs: Vec<_> = product
        .programs
        .iter()
        .filter_map(|id| {
            let program = store.find_program(id);
            if program.is_none() {
                debug!(product = %product.id, program = %id, "skipping unknown program");
            }
            program
        })
        .collect();
    // Undated programs last
    programs.sort_by_key(|p| (p.need_date_parsed().is_none(), p.need_date_parsed()));

    programs
        .into_iter()
        .map(|program| MarkerInput {
            kind: MarkerKind::Program,
            date: program.need_date_parsed(),
            label: program.name.clone(),
            tooltip: format!(
                "{} Need Date: {}",
                program.name,
                format_date_str(program.need_date.as_deref())
            ),
        })
        .collect()
}

/// Markers for the product's own milestones
pub fn milestone_markers(product: &Product) -> Vec<MarkerInput> {
    product
        .milestones
        .iter()
        .map(|milestone| MarkerInput {
            kind: MarkerKind::Milestone,
            date: milestone.date_parsed(),
            label: milestone.name.clone(),
            tooltip: match milestone.description.as_deref() {
                Some(text) if !text.is_empty() => format!("{}: {}", milestone.name, text),
                _ => milestone.name.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_quarter_window;
    use pretty_assertions::assert_eq;
    use roadmap_core::{Document, Milestone, Program};

    fn window() -> TimelineWindow {
        compute_quarter_window(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 4)
    }

    fn milestone(name: &str, date: &str) -> MarkerInput {
        MarkerInput {
            kind: MarkerKind::Milestone,
            date: roadmap_core::parse_date(date),
            label: name.into(),
            tooltip: String::new(),
        }
    }

    fn placed(markers: &[MarkerLayout]) -> Vec<(&str, u32, u32)> {
        markers
            .iter()
            .map(|m| (m.label.as_str(), m.position, m.vertical_offset))
            .collect()
    }

    #[test]
    fn markers_center_in_quarter_and_stack_by_date() {
        let markers = vec![
            milestone("Qualification", "2025-06-20"),
            milestone("PDR", "2025-02-10"),
            milestone("CDR", "2025-05-15"),
            milestone("Kickoff", "2025-01-05"),
        ];
        let out = stack_markers_by_quarter(markers, &window(), &LayoutConfig::default());
        assert_eq!(
            placed(&out),
            vec![
                ("Kickoff", 50, 0),
                ("PDR", 50, 40),
                ("CDR", 150, 0),
                ("Qualification", 150, 40),
            ]
        );
    }

    #[test]
    fn outside_or_undated_markers_are_dropped() {
        let markers = vec![
            milestone("Too early", "2024-12-31"),
            milestone("Too late", "2026-01-01"),
            milestone("Someday", "TBD"),
            milestone("Launch", "2025-12-31"),
        ];
        let out = stack_markers_by_quarter(markers, &window(), &LayoutConfig::default());
        assert_eq!(placed(&out), vec![("Launch", 350, 0)]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let markers = vec![milestone("First", "2025-04-01"), milestone("Second", "2025-04-01")];
        let out = stack_markers_by_quarter(markers, &window(), &LayoutConfig::default());
        assert_eq!(placed(&out), vec![("First", 150, 0), ("Second", 150, 40)]);
    }

    #[test]
    fn program_markers_resolve_and_sort() {
        let mut doc = Document::default();
        doc.programs.push(Program::new("PRG1", "Satellite Systems").need_date("2026-06-30"));
        doc.programs.push(Program::new("PRG2", "Aircraft Systems"));
        doc.programs.push(Program::new("PRG3", "Launch Vehicles").need_date("2025-09-30"));
        let product = Product::new("P1", "SatCom Terminal")
            .program("PRG1")
            .program("PRG2")
            .program("PRG404")
            .program("PRG3");

        let markers = program_markers(&doc, &product);
        let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Launch Vehicles", "Satellite Systems", "Aircraft Systems"]);
        assert_eq!(markers[0].tooltip, "Launch Vehicles Need Date: Sep 30, 2025");
        assert_eq!(markers[2].tooltip, "Aircraft Systems Need Date: N/A");

        let out = stack_markers_by_quarter(markers, &window(), &LayoutConfig::default());
        assert_eq!(placed(&out), vec![("Launch Vehicles", 250, 0)]);
    }

    #[test]
    fn milestone_tooltips_carry_description() {
        let product = Product::new("P1", "SatCom Terminal")
            .milestone(Milestone::new("CDR", "2025-05-15").description("Critical design review"));
        let markers = milestone_markers(&product);
        assert_eq!(markers[0].tooltip, "CDR: Critical design review");
        assert_eq!(markers[0].kind, MarkerKind::Milestone);
    }
}
