//! HTML timeline fragment renderer
//!
//! Renders a computed `TimelineLayout` as positioned `<div>`s:
//! - Quarter header
//! - Programs and Milestones marker rows
//! - One swimlane per lane, rows growing with the deepest stacked task
//! - Material facet buttons for the M&P lane
//! - Roadmap key
//!
//! The fragment relies on [`TIMELINE_CSS`] and [`TIMELINE_JS`]; use
//! [`HtmlTimelineRenderer::render_document`] for a self-contained page.

use roadmap_core::{
    FundingType, LaneItem, LaneLayout, MarkerKind, MarkerLayout, RenderError, TimelineLayout,
    TimelineRenderer,
};

use crate::html_escape;

/// HTML timeline renderer configuration
#[derive(Clone, Debug)]
pub struct HtmlTimelineRenderer {
    /// Width of the lane title column in pixels
    pub label_width: u32,
    /// Minimum height of a marker or lane row in pixels
    pub min_row_height: u32,
    /// Space below the deepest stacked bar in pixels
    pub row_padding: u32,
    /// Add a start-date picker that reloads the page with `?start=`
    pub live: bool,
    /// Show the roadmap key below the chart
    pub show_key: bool,
}

impl Default for HtmlTimelineRenderer {
    fn default() -> Self {
        Self {
            label_width: 120,
            min_row_height: 40,
            row_padding: 10,
            live: false,
            show_key: true,
        }
    }
}

impl HtmlTimelineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the start-date picker (for pages served by the editor server)
    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }

    pub fn hide_key(mut self) -> Self {
        self.show_key = false;
        self
    }

    pub fn label_width(mut self, width: u32) -> Self {
        self.label_width = width;
        self
    }

    /// Render a complete HTML document containing only this timeline
    pub fn render_document(&self, layout: &TimelineLayout) -> Result<String, RenderError> {
        let fragment = self.render(layout)?;
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Roadmap</title>
    <style>
{css}
    </style>
</head>
<body>
    <h1 class="timeline-title">{title}</h1>
{fragment}
    <script>
{js}
    </script>
</body>
</html>
"#,
            title = html_escape(&layout.product_name),
            css = TIMELINE_CSS,
            fragment = fragment,
            js = TIMELINE_JS,
        ))
    }

    fn row_height(&self, content: u32) -> u32 {
        (content + self.row_padding).max(self.min_row_height)
    }

    fn render_controls(&self, layout: &TimelineLayout) -> String {
        let mut html = String::new();
        if !self.live && layout.materials.is_empty() {
            return html;
        }
        html.push_str("        <div class=\"roadmap-timeline-controls\">\n");
        if self.live {
            html.push_str(&format!(
                r#"            <label for="start-date-{id}">Start Date:</label>
            <input type="date" id="start-date-{id}" class="start-date-picker" value="{date}">
"#,
                id = html_escape(&layout.product_id),
                date = layout.start_date.format("%Y-%m-%d"),
            ));
        }
        if !layout.materials.is_empty() {
            html.push_str(
                "            <div class=\"material-facets\" role=\"group\" aria-label=\"Material systems\">\n",
            );
            html.push_str("                <span class=\"facet-label\">Material System:</span>\n");
            for facet in &layout.materials {
                let active = layout.active_material.as_deref() == Some(facet.id.as_str());
                html.push_str(&format!(
                    r#"                <button type="button" class="facet-button{active}" data-material-id="{id}">{name}</button>
"#,
                    active = if active { " active" } else { "" },
                    id = html_escape(&facet.id),
                    name = html_escape(&facet.name),
                ));
            }
            html.push_str("            </div>\n");
        }
        html.push_str("        </div>\n");
        html
    }

    fn render_header(&self, layout: &TimelineLayout) -> String {
        let mut html = String::from(
            "            <div class=\"roadmap-header\">\n                <div class=\"roadmap-header-lane\">Date</div>\n",
        );
        for quarter in &layout.window.quarters {
            html.push_str(&format!(
                "                <div class=\"roadmap-header-quarter\" style=\"width: {}px;\">{}<br>Q{}</div>\n",
                layout.unit_width, quarter.year, quarter.quarter
            ));
        }
        html.push_str("            </div>\n");
        html
    }

    fn render_marker_row(
        &self,
        layout: &TimelineLayout,
        title: &str,
        class: &str,
        markers: &[MarkerLayout],
    ) -> String {
        let height = self.row_height(TimelineLayout::marker_row_height(
            markers,
            layout.marker_spacing,
        ));
        let mut html = format!(
            r#"            <div class="roadmap-row {class}">
                <div class="roadmap-lane-title">{title}</div>
                <div class="roadmap-lane-content" style="width: {width}px; height: {height}px;">
"#,
            class = class,
            title = title,
            width = layout.chart_width(),
            height = height,
        );
        for marker in markers {
            let (outer, point, label) = match marker.kind {
                MarkerKind::Program => ("program-marker", "program-marker-point", "program-marker-label"),
                MarkerKind::Milestone => ("roadmap-milestone", "milestone-marker", "milestone-label"),
            };
            html.push_str(&format!(
                r#"                    <div class="{outer}" style="left: {left}px; top: {top}px;" title="{tooltip}">
                        <div class="{point}"></div>
                        <div class="{label}">{text}</div>
                    </div>
"#,
                outer = outer,
                left = marker.position,
                top = marker.vertical_offset,
                tooltip = html_escape(&marker.tooltip),
                point = point,
                label = label,
                text = html_escape(&marker.label),
            ));
        }
        html.push_str("                </div>\n            </div>\n");
        html
    }

    fn render_lane(&self, layout: &TimelineLayout, lane: &LaneLayout) -> String {
        let height = self.row_height(lane.content_height(layout.task_height));
        let mut html = format!(
            r#"            <div class="roadmap-row">
                <div class="roadmap-lane-title">{title}</div>
                <div class="roadmap-lane-content" data-lane="{title}" style="width: {width}px; height: {height}px;">
"#,
            title = html_escape(lane.lane.as_str()),
            width = layout.chart_width(),
            height = height,
        );
        for item in &lane.items {
            html.push_str(&render_task(item, layout.task_height));
        }
        html.push_str("                </div>\n            </div>\n");
        html
    }

    fn render_key(&self) -> String {
        let mut html = String::from(
            r#"        <div class="roadmap-key">
            <h4>Roadmap Key</h4>
            <div class="key-items">
                <div class="key-item"><div class="key-color planned"></div><div class="key-label">Planned</div></div>
"#,
        );
        for funding in FundingType::ALL {
            html.push_str(&format!(
                "                <div class=\"key-item\"><div class=\"key-color in-progress {}\"></div><div class=\"key-label\">In Development ({})</div></div>\n",
                funding.css_class(),
                funding
            ));
        }
        html.push_str(
            r#"                <div class="key-item"><div class="key-color complete"></div><div class="key-label">Complete</div></div>
            </div>
            <p class="roadmap-source-note">Roadmap tasks are sourced from the product's roadmap data and the selected material system.</p>
        </div>
"#,
        );
        html
    }
}

/// A positioned task bar
fn render_task(item: &LaneItem, task_height: u32) -> String {
    let material = item
        .material_id
        .as_deref()
        .map(|id| format!(" data-material-id=\"{}\"", html_escape(id)))
        .unwrap_or_default();
    let hidden = if item.visible { "" } else { " display: none;" };
    format!(
        r#"                    <div class="roadmap-task {classes}" data-task-key="{key}"{material} style="left: {left}px; width: {width}px; top: {top}px; height: {height}px;{hidden}" title="{tooltip}">
                        <div class="task-label">{label}</div>
                    </div>
"#,
        classes = item.css_classes(),
        key = html_escape(&item.key.to_string()),
        material = material,
        left = item.start_position,
        width = item.width,
        top = item.vertical_offset,
        height = task_height,
        hidden = hidden,
        tooltip = html_escape(&item.tooltip()),
        label = html_escape(&item.label()),
    )
}

impl TimelineRenderer for HtmlTimelineRenderer {
    type Output = String;

    fn render(&self, layout: &TimelineLayout) -> Result<String, RenderError> {
        if layout.window.is_empty() {
            return Err(RenderError::InvalidData("Timeline window has no quarters".into()));
        }

        let active = layout
            .active_material
            .as_deref()
            .map(|id| format!(" data-active-material=\"{}\"", html_escape(id)))
            .unwrap_or_default();
        let mut html = format!(
            "    <div class=\"roadmap-container\" data-product-id=\"{}\"{} style=\"--label-width: {}px;\">\n",
            html_escape(&layout.product_id),
            active,
            self.label_width
        );
        html.push_str(&self.render_controls(layout));
        html.push_str("        <div class=\"roadmap-timeline\">\n");
        html.push_str(&self.render_header(layout));
        html.push_str(&self.render_marker_row(layout, "Programs", "programs-row", &layout.programs));
        html.push_str(&self.render_marker_row(layout, "Milestones", "milestone-row", &layout.milestones));
        for lane in &layout.lanes {
            html.push_str(&self.render_lane(layout, lane));
        }
        html.push_str("        </div>\n");
        if self.show_key {
            html.push_str(&self.render_key());
        }
        html.push_str("    </div>\n");
        Ok(html)
    }
}

/// Styles for the timeline fragment
pub const TIMELINE_CSS: &str = r#"        .roadmap-container {
            margin: 16px 0;
            padding: 12px;
            background-color: #fff;
            border-radius: 6px;
            font-family: system-ui, -apple-system, sans-serif;
        }
        .roadmap-timeline-controls {
            display: flex;
            flex-wrap: wrap;
            align-items: center;
            gap: 12px;
            padding: 8px 12px;
            margin-bottom: 12px;
            background-color: #f5f5f5;
            border-radius: 4px;
        }
        .start-date-picker { padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; }
        .material-facets { display: flex; flex-wrap: wrap; align-items: center; gap: 6px; }
        .facet-label { font-weight: 600; font-size: 13px; }
        .facet-button {
            padding: 4px 10px;
            border: 1px solid #42A5F5;
            background: #fff;
            color: #1E88E5;
            border-radius: 12px;
            cursor: pointer;
            font-size: 12px;
        }
        .facet-button.active { background: #42A5F5; color: #fff; }
        .roadmap-timeline { overflow-x: auto; border: 1px solid #e0e0e0; }
        .roadmap-header, .roadmap-row { display: flex; border-bottom: 1px solid #e0e0e0; }
        .roadmap-header { background-color: #f9f9f9; font-weight: 600; font-size: 12px; }
        .roadmap-header-lane, .roadmap-lane-title {
            flex: 0 0 var(--label-width, 120px);
            padding: 8px;
            background-color: #f5f5f5;
            border-right: 1px solid #e0e0e0;
            font-weight: 600;
            font-size: 13px;
        }
        .roadmap-header-quarter {
            flex: 0 0 auto;
            padding: 6px 0;
            text-align: center;
            border-right: 1px solid #eee;
            box-sizing: border-box;
        }
        .roadmap-lane-content { position: relative; flex: 0 0 auto; }
        .programs-row { background-color: #f0f0ff; }
        .milestone-row { background-color: #f0f8ff; }
        .roadmap-task {
            position: absolute;
            box-sizing: border-box;
            padding: 0 6px;
            border: 1px solid;
            border-radius: 4px;
            overflow: hidden;
            cursor: pointer;
            margin-top: 5px;
        }
        .roadmap-task.complete { background-color: #4CAF50; border-color: #81C784; }
        .roadmap-task.in-progress { background-color: #42A5F5; border-color: #90CAF9; }
        .roadmap-task.in-progress.funding-sector-irad { background-color: #AB47BC; border-color: #CE93D8; }
        .roadmap-task.in-progress.funding-division-irad { background-color: #FFA726; border-color: #FFCC80; }
        .roadmap-task.in-progress.funding-crad { background-color: #EC407A; border-color: #F48FB1; }
        .roadmap-task.planned { background-color: #BDBDBD; border-color: #E0E0E0; color: #212121; }
        .task-label {
            font-size: 11px;
            line-height: 23px;
            white-space: nowrap;
            overflow: hidden;
            text-overflow: ellipsis;
            color: white;
        }
        .roadmap-task.planned .task-label { color: #212121; }
        .roadmap-milestone, .program-marker {
            position: absolute;
            transform: translateX(-50%);
            text-align: center;
            margin-top: 4px;
        }
        .milestone-marker {
            width: 12px;
            height: 12px;
            margin: 0 auto;
            background-color: #4a89ff;
            transform: rotate(45deg);
        }
        .program-marker-point {
            width: 12px;
            height: 12px;
            margin: 0 auto;
            border-radius: 50%;
            background-color: #ff5722;
        }
        .milestone-label, .program-marker-label { font-size: 10px; white-space: nowrap; margin-top: 2px; }
        .roadmap-key { margin-top: 12px; padding: 10px; background-color: #f9f9f9; border-radius: 4px; }
        .roadmap-key h4 { margin: 0 0 8px; }
        .key-items { display: flex; flex-wrap: wrap; gap: 12px; }
        .key-item { display: flex; align-items: center; gap: 6px; }
        .key-color { width: 20px; height: 12px; border-radius: 2px; }
        .key-color.planned { background-color: #BDBDBD; }
        .key-color.in-progress { background-color: #42A5F5; }
        .key-color.in-progress.funding-sector-irad { background-color: #AB47BC; }
        .key-color.in-progress.funding-division-irad { background-color: #FFA726; }
        .key-color.in-progress.funding-crad { background-color: #EC407A; }
        .key-color.complete { background-color: #4CAF50; }
        .key-label { font-size: 12px; color: #333; }
        .roadmap-source-note { font-size: 11px; color: #666; margin: 8px 0 0; }"#;

/// Facet switching and start-date reload for timeline fragments.
///
/// A facet change fires a bubbling `roadmap:facet` event on the container.
pub const TIMELINE_JS: &str = r#"        (function () {
            function selectFacet(container, materialId) {
                container.querySelectorAll('.facet-button').forEach(function (button) {
                    button.classList.toggle('active', button.dataset.materialId === materialId);
                });
                // Only visibility changes; bars keep their positions
                container.querySelectorAll('.roadmap-task[data-material-id]').forEach(function (task) {
                    task.style.display = task.dataset.materialId === materialId ? '' : 'none';
                });
                container.dataset.activeMaterial = materialId;
                container.dispatchEvent(new CustomEvent('roadmap:facet', {
                    bubbles: true,
                    detail: { materialId: materialId }
                }));
            }

            document.addEventListener('click', function (event) {
                var button = event.target.closest('.facet-button');
                if (!button) return;
                selectFacet(button.closest('.roadmap-container'), button.dataset.materialId);
            });

            document.addEventListener('change', function (event) {
                if (!event.target.classList.contains('start-date-picker')) return;
                var params = new URLSearchParams(window.location.search);
                params.set('start', event.target.value);
                var container = event.target.closest('.roadmap-container');
                if (container && container.dataset.activeMaterial) {
                    params.set('material', container.dataset.activeMaterial);
                }
                // Reopen the same view after the reload
                var view = event.target.closest('[data-view]');
                if (view) {
                    params.set('view', view.dataset.view);
                }
                window.location.search = params.toString();
            });
        })();"#;
