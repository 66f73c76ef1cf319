//! Plain-text timeline output for terminals

use roadmap_core::{format_date, LaneItem, RenderError, TimelineLayout, TimelineRenderer};

/// Lists every row of a timeline with quarter ranges and dates
#[derive(Clone, Debug, Default)]
pub struct TextTimelineRenderer {
    /// Also list tasks of inactive material facets
    pub show_hidden: bool,
}

impl TextTimelineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_hidden(mut self) -> Self {
        self.show_hidden = true;
        self
    }

    /// Quarter labels covered by an item, e.g. `2025-Q1..2025-Q3`
    fn quarter_range(layout: &TimelineLayout, item: &LaneItem) -> String {
        let unit = layout.unit_width.max(1);
        let first = (item.start_position / unit) as usize;
        let last = ((item.start_position + item.width) / unit).saturating_sub(1) as usize;
        let label = |i: usize| {
            layout
                .window
                .quarters
                .get(i)
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        if first == last {
            label(first)
        } else {
            format!("{}..{}", label(first), label(last))
        }
    }
}

impl TimelineRenderer for TextTimelineRenderer {
    type Output = String;

    fn render(&self, layout: &TimelineLayout) -> Result<String, RenderError> {
        let (Some(first), Some(last)) = (layout.window.quarters.first(), layout.window.quarters.last())
        else {
            return Err(RenderError::InvalidData("Timeline window has no quarters".into()));
        };

        let mut out = format!(
            "{} ({})  {} .. {}\n",
            layout.product_name, layout.product_id, first, last
        );

        for (title, markers) in [("Programs", &layout.programs), ("Milestones", &layout.milestones)] {
            out.push_str(&format!("\n{}\n", title));
            if markers.is_empty() {
                out.push_str("  (none)\n");
            }
            for marker in markers {
                let quarter = layout
                    .window
                    .index_of_date(marker.date)
                    .and_then(|i| layout.window.quarters.get(i))
                    .map(ToString::to_string)
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {:<8} {}  ({})\n",
                    quarter,
                    marker.label,
                    format_date(marker.date)
                ));
            }
        }

        for lane in &layout.lanes {
            let heading = match (&layout.active_material, lane.lane) {
                (Some(active), roadmap_core::Lane::MaterialsAndProcesses) => {
                    let name = layout
                        .materials
                        .iter()
                        .find(|m| &m.id == active)
                        .map_or(active.as_str(), |m| m.name.as_str());
                    format!("{} [{}]", lane.lane, name)
                }
                _ => lane.lane.to_string(),
            };
            out.push_str(&format!("\n{}\n", heading));

            let items: Vec<&LaneItem> = lane
                .items
                .iter()
                .filter(|item| item.visible || self.show_hidden)
                .collect();
            if items.is_empty() {
                out.push_str("  (none)\n");
            }
            for item in items {
                let marker = if item.visible { ' ' } else { '-' };
                let funding = item
                    .funding_type
                    .map(|f| format!(", {}", f))
                    .unwrap_or_default();
                out.push_str(&format!(
                    " {}{:<18} {}  [{}{}]  {} - {}\n",
                    marker,
                    Self::quarter_range(layout, item),
                    item.label(),
                    item.status,
                    funding,
                    format_date(item.start),
                    format_date(item.end)
                ));
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use roadmap_core::{Document, FundingType, Lane, MaterialSystem, Milestone, Product, Task};
    use roadmap_layout::{LayoutConfig, TimelineLayoutEngine};

    fn layout() -> TimelineLayout {
        let mut doc = Document::default();
        doc.products.push(
            Product::new("P1", "SatCom Terminal")
                .material("MS1")
                .material("MS2")
                .task(
                    Task::new("Initial Design")
                        .span("2025-01-01", "2025-03-31")
                        .with_status("Complete")
                        .with_lane(Lane::Design),
                )
                .task(
                    Task::new("Tooling")
                        .span("2025-04-01", "2025-09-30")
                        .with_status("In Progress")
                        .with_funding(FundingType::DivisionIrad)
                        .with_lane(Lane::Manufacturing),
                )
                .milestone(Milestone::new("CDR", "2025-05-15")),
        );
        doc.material_systems.push(
            MaterialSystem::new("MS1", "Ti-6Al-4V")
                .task(Task::new("Material Certification").span("2025-01-01", "2025-02-28")),
        );
        doc.material_systems.push(
            MaterialSystem::new("MS2", "Inconel 718")
                .task(Task::new("Powder Trials").span("2025-01-01", "2025-02-28")),
        );
        TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(4))
            .layout_product(&doc, "P1", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), None)
            .unwrap()
    }

    #[test]
    fn lists_rows_in_order() {
        let text = TextTimelineRenderer::new().render(&layout()).unwrap();
        let expected = "\
SatCom Terminal (P1)  2025-Q1 .. 2025-Q4

Programs
  (none)

Milestones
  2025-Q2  CDR  (May 15, 2025)

Design
  2025-Q1            Initial Design  [Complete]  Jan 1, 2025 - Mar 31, 2025

Manufacturing
  2025-Q2..2025-Q3   Tooling  [In Progress, Division IRAD]  Apr 1, 2025 - Sep 30, 2025

M&P [Ti-6Al-4V]
  2025-Q1            Material Certification (Ti-6Al-4V)  [Planned]  Jan 1, 2025 - Feb 28, 2025

Quality
  (none)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn hidden_facets_listed_on_request() {
        let text = TextTimelineRenderer::new().show_hidden().render(&layout()).unwrap();
        assert!(text.contains(" -2025-Q1            Powder Trials (Inconel 718)"));
    }
}
