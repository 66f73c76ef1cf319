//! # roadmap-render
//!
//! Rendering backends for roadmap documents and product timelines.
//!
//! This crate provides:
//! - HTML timeline fragments and standalone timeline pages
//! - The static, self-contained roadmap page (tabs, tiles, detail views)
//! - SVG timeline rendering
//! - Plain-text timeline output for terminals
//! - The editor page served by `roadmap serve`
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use roadmap_core::{Document, Product, TimelineRenderer};
//! use roadmap_layout::TimelineLayoutEngine;
//! use roadmap_render::{HtmlTimelineRenderer, SvgTimelineRenderer, TextTimelineRenderer};
//!
//! let mut doc = Document::default();
//! doc.products.push(Product::new("P1", "SatCom Terminal"));
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let layout = TimelineLayoutEngine::default()
//!     .layout_product(&doc, "P1", start, None)
//!     .unwrap();
//!
//! let html = HtmlTimelineRenderer::new().render(&layout).unwrap();
//! let svg = SvgTimelineRenderer::default().render(&layout).unwrap();
//! let text = TextTimelineRenderer::new().render(&layout).unwrap();
//! assert!(html.contains("roadmap-container"));
//! assert!(svg.starts_with("<svg"));
//! assert!(text.starts_with("SatCom Terminal"));
//! ```

pub mod editor;
pub mod page;
mod status;
pub mod text;
pub mod timeline;

pub use editor::editor_page;
pub use page::{HtmlPageRenderer, ViewId, ViewIdParseError};
pub use text::TextTimelineRenderer;
pub use timeline::{HtmlTimelineRenderer, TIMELINE_CSS, TIMELINE_JS};

use roadmap_core::{
    LaneItem, LaneLayout, MarkerKind, MarkerLayout, RenderError, TaskStatus, TimelineLayout,
    TimelineRenderer,
};
use svg::node::element::{Circle, Element, Group, Line, Polygon, Rectangle, Text};
use svg::{Document, Node};

/// SVG timeline renderer configuration
#[derive(Clone, Debug)]
pub struct SvgTimelineRenderer {
    /// Width of the lane title column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Padding around the chart
    pub padding: u32,
    /// Minimum height of a row in pixels
    pub min_row_height: u32,
    pub complete_color: String,
    pub in_progress_color: String,
    pub planned_color: String,
    pub milestone_color: String,
    pub program_color: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgTimelineRenderer {
    fn default() -> Self {
        Self {
            label_width: 120,
            header_height: 40,
            padding: 20,
            min_row_height: 40,
            complete_color: "#4CAF50".into(),
            in_progress_color: "#42A5F5".into(),
            planned_color: "#BDBDBD".into(),
            milestone_color: "#4a89ff".into(),
            program_color: "#ff5722".into(),
            background_color: "#ffffff".into(),
            grid_color: "#e0e0e0".into(),
            text_color: "#212121".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 11,
        }
    }
}

impl SvgTimelineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the lane title column width
    pub fn label_width(mut self, width: u32) -> Self {
        self.label_width = width;
        self
    }

    fn row_height(&self, content: u32) -> u32 {
        (content + 10).max(self.min_row_height)
    }

    fn chart_left(&self) -> u32 {
        self.padding + self.label_width
    }

    /// Bar color by status and funding, matching the HTML key
    fn bar_color(&self, item: &LaneItem) -> &str {
        match (item.status, item.funding_type) {
            (TaskStatus::Complete, _) => self.complete_color.as_str(),
            (TaskStatus::InProgress, Some(funding)) => funding_color(funding),
            (TaskStatus::InProgress, None) => self.in_progress_color.as_str(),
            (TaskStatus::Planned, _) => self.planned_color.as_str(),
        }
    }

    fn render_header(&self, layout: &TimelineLayout) -> Group {
        let mut group = Group::new().set("class", "header");
        let top = self.padding;

        group = group.add(
            Rectangle::new()
                .set("x", self.padding)
                .set("y", top)
                .set("width", self.label_width + layout.chart_width())
                .set("height", self.header_height)
                .set("fill", "#f9f9f9"),
        );

        for (index, quarter) in layout.window.quarters.iter().enumerate() {
            let x = self.chart_left() + index as u32 * layout.unit_width;
            group = group.add(
                Text::new(quarter.to_string())
                    .set("x", x + layout.unit_width / 2)
                    .set("y", top + self.header_height / 2 + 4)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size)
                    .set("font-weight", "bold")
                    .set("fill", self.text_color.as_str())
                    .set("text-anchor", "middle"),
            );
        }
        group
    }

    /// Vertical quarter separators over the whole chart height
    fn render_grid(&self, layout: &TimelineLayout, top: u32, bottom: u32) -> Group {
        let mut group = Group::new().set("class", "grid");
        for index in 0..=layout.window.len() as u32 {
            let x = self.chart_left() + index * layout.unit_width;
            group = group.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", top)
                    .set("x2", x)
                    .set("y2", bottom)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1),
            );
        }
        group
    }

    fn row_frame(&self, layout: &TimelineLayout, title: &str, y: u32, height: u32) -> Group {
        Group::new()
            .set("class", "row")
            .add(
                Line::new()
                    .set("x1", self.padding)
                    .set("y1", y + height)
                    .set("x2", self.chart_left() + layout.chart_width())
                    .set("y2", y + height)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1),
            )
            .add(
                Text::new(title)
                    .set("x", self.padding + 6)
                    .set("y", y + 18)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size + 1)
                    .set("font-weight", "bold")
                    .set("fill", self.text_color.as_str()),
            )
    }

    fn render_marker_row(
        &self,
        layout: &TimelineLayout,
        title: &str,
        markers: &[MarkerLayout],
        y: u32,
    ) -> (Group, u32) {
        let height = self.row_height(TimelineLayout::marker_row_height(
            markers,
            layout.marker_spacing,
        ));
        let mut group = self.row_frame(layout, title, y, height);

        for marker in markers {
            let cx = f64::from(self.chart_left() + marker.position);
            let cy = f64::from(y + marker.vertical_offset + 10);
            let size = 6.0;
            let shape = match marker.kind {
                MarkerKind::Milestone => Group::new().add(
                    Polygon::new()
                        .set(
                            "points",
                            format!(
                                "{},{} {},{} {},{} {},{}",
                                cx,
                                cy - size,
                                cx + size,
                                cy,
                                cx,
                                cy + size,
                                cx - size,
                                cy
                            ),
                        )
                        .set("fill", self.milestone_color.as_str()),
                ),
                MarkerKind::Program => Group::new().add(
                    Circle::new()
                        .set("cx", cx)
                        .set("cy", cy)
                        .set("r", size)
                        .set("fill", self.program_color.as_str()),
                ),
            };
            group = group.add(
                shape
                    .set("class", "marker")
                    .add(tooltip(&marker.tooltip))
                    .add(
                        Text::new(marker.label.as_str())
                            .set("x", cx)
                            .set("y", cy + size + 11.0)
                            .set("font-family", self.font_family.as_str())
                            .set("font-size", self.font_size - 1)
                            .set("fill", self.text_color.as_str())
                            .set("text-anchor", "middle"),
                    ),
            );
        }
        (group, height)
    }

    fn render_lane(&self, layout: &TimelineLayout, lane: &LaneLayout, y: u32) -> (Group, u32) {
        let height = self.row_height(lane.content_height(layout.task_height));
        let mut group = self.row_frame(layout, lane.lane.as_str(), y, height);

        // Hidden facets are left out entirely
        for item in lane.visible_items() {
            let x = self.chart_left() + item.start_position;
            let bar_y = y + item.vertical_offset + 5;
            let text_color = if item.status == TaskStatus::Planned {
                self.text_color.as_str()
            } else {
                "#ffffff"
            };
            group = group.add(
                Group::new()
                    .set("class", "task")
                    .set("data-task-key", item.key.to_string())
                    .add(tooltip(&item.tooltip()))
                    .add(
                        Rectangle::new()
                            .set("x", x)
                            .set("y", bar_y)
                            .set("width", item.width)
                            .set("height", layout.task_height)
                            .set("rx", 3)
                            .set("ry", 3)
                            .set("fill", self.bar_color(item)),
                    )
                    .add(
                        Text::new(truncate(&item.label(), (item.width / 7) as usize))
                            .set("x", x + 6)
                            .set("y", bar_y + layout.task_height / 2 + 4)
                            .set("font-family", self.font_family.as_str())
                            .set("font-size", self.font_size)
                            .set("fill", text_color),
                    ),
            );
        }
        (group, height)
    }
}

/// A `<title>` child, shown as a hover tooltip
fn tooltip(text: &str) -> Element {
    let mut title = Element::new("title");
    title.append(svg::node::Text::new(text));
    title
}

/// Funding colors shared with the HTML stylesheet
fn funding_color(funding: roadmap_core::FundingType) -> &'static str {
    match funding {
        roadmap_core::FundingType::SectorIrad => "#AB47BC",
        roadmap_core::FundingType::DivisionIrad => "#FFA726",
        roadmap_core::FundingType::Crad => "#EC407A",
    }
}

impl TimelineRenderer for SvgTimelineRenderer {
    type Output = String;

    fn render(&self, layout: &TimelineLayout) -> Result<String, RenderError> {
        if layout.window.is_empty() {
            return Err(RenderError::InvalidData("Timeline window has no quarters".into()));
        }

        let width = self.padding * 2 + self.label_width + layout.chart_width();
        let body_top = self.padding + self.header_height;

        let mut rows = Vec::new();
        let mut y = body_top;
        for (title, markers) in [("Programs", &layout.programs), ("Milestones", &layout.milestones)] {
            let (group, height) = self.render_marker_row(layout, title, markers, y);
            rows.push(group);
            y += height;
        }
        for lane in &layout.lanes {
            let (group, height) = self.render_lane(layout, lane, y);
            rows.push(group);
            y += height;
        }
        let height = y + self.padding;

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        document = document.add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", self.background_color.as_str()),
        );
        document = document.add(self.render_header(layout));
        document = document.add(self.render_grid(layout, body_top, y));
        for row in rows {
            document = document.add(row);
        }

        Ok(document.to_string())
    }
}

/// HTML-escape a string
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate a string with ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}
