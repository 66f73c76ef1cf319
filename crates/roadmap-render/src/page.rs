//! Static roadmap page renderer
//!
//! Produces one self-contained HTML file for a whole document: a tab per
//! entity collection with searchable tiles, a detail view per entity with
//! cross links, and the product timeline inside each product's detail view.
//! The document itself is embedded as JSON for download.
//!
//! Views are addressed by [`ViewId`]. In the browser, a page controller owns
//! an explicit navigation history (a stack of view ids) used by the back
//! button. Every roadmap task has a detail view of its own, opened by
//! clicking its bar on a timeline.

use std::str::FromStr;

use chrono::NaiveDate;
use roadmap_core::{
    format_date_str, Document, EntityKind, EntityStore, MaterialSystem, Opportunity, Product,
    Program, RenderError, Supplier, Task, TaskKey, TaskSource, TimelineRenderer,
};
use roadmap_layout::{LayoutConfig, TimelineLayoutEngine};
use thiserror::Error;
use tracing::debug;

use crate::status::{render_status_box, value_text, STATUS_CSS};
use crate::timeline::{HtmlTimelineRenderer, TIMELINE_CSS, TIMELINE_JS};
use crate::html_escape;

/// Address of one view of the page
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewId {
    /// The tile grid of a collection
    Tab(EntityKind),
    /// The detail view of one entity
    Detail(EntityKind, String),
    /// The detail view of one roadmap task
    Task(TaskKey),
}

impl ViewId {
    pub fn detail(kind: EntityKind, id: impl Into<String>) -> Self {
        ViewId::Detail(kind, id.into())
    }

    /// The tab a view belongs to; task views belong to their owner's tab
    pub fn tab(&self) -> ViewId {
        match self {
            ViewId::Tab(kind) | ViewId::Detail(kind, _) => ViewId::Tab(*kind),
            ViewId::Task(key) => match key.source {
                TaskSource::Product(_) => ViewId::Tab(EntityKind::Product),
                TaskSource::Material(_) => ViewId::Tab(EntityKind::MaterialSystem),
            },
        }
    }

    /// Whether the view exists on the page rendered for `doc`
    pub fn exists_in(&self, doc: &Document) -> bool {
        match self {
            ViewId::Tab(_) => true,
            ViewId::Detail(kind, id) => doc.has_entity(*kind, id),
            ViewId::Task(key) => doc.find_task(key).is_some(),
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewId::Tab(kind) => write!(f, "tab:{}", kind.collection()),
            ViewId::Detail(kind, id) => write!(f, "{}:{}", kind.collection(), id),
            ViewId::Task(key) => write!(f, "task:{}", key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid view id {0:?}")]
pub struct ViewIdParseError(pub String);

impl FromStr for ViewId {
    type Err = ViewIdParseError;

    /// Parse `tab:<collection>`, `task:<task key>` or `<collection>:<id>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ViewIdParseError(s.to_string());
        let (head, rest) = s.split_once(':').ok_or_else(err)?;
        match head {
            "tab" => EntityKind::from_collection(rest).map(ViewId::Tab).ok_or_else(err),
            "task" => rest.parse().map(ViewId::Task).map_err(|_| err()),
            collection => {
                let kind = EntityKind::from_collection(collection).ok_or_else(err)?;
                if rest.is_empty() {
                    return Err(err());
                }
                Ok(ViewId::Detail(kind, rest.to_string()))
            }
        }
    }
}

/// Static page renderer configuration
#[derive(Clone, Debug)]
pub struct HtmlPageRenderer {
    pub title: String,
    /// Layout of the product timelines
    pub layout: LayoutConfig,
    /// First day of every product timeline window
    pub start: NaiveDate,
    /// Add start-date pickers to timelines (served pages only)
    pub live: bool,
    /// M&P facet shown on product timelines that use this material system;
    /// other products fall back to their first material
    pub material: Option<String>,
    /// View shown when the page opens; the first tab when unset or unknown
    pub view: Option<ViewId>,
}

impl HtmlPageRenderer {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            title: "Manufacturing Roadmap".into(),
            layout: LayoutConfig::default(),
            start,
            live: false,
            material: None,
            view: None,
        }
    }

    pub fn material(mut self, id: impl Into<String>) -> Self {
        self.material = Some(id.into());
        self
    }

    pub fn initial_view(mut self, view: ViewId) -> Self {
        self.view = Some(view);
        self
    }

    /// The requested view if `doc` has it, otherwise the first tab
    pub fn resolve_initial_view(&self, doc: &Document) -> ViewId {
        self.view
            .clone()
            .filter(|view| view.exists_in(doc))
            .unwrap_or(ViewId::Tab(EntityKind::ALL[0]))
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }

    /// Render the whole document as one HTML page
    pub fn render(&self, doc: &Document) -> Result<String, RenderError> {
        self.layout
            .validate()
            .map_err(|e| RenderError::InvalidData(e.to_string()))?;
        let data = serde_json::to_string(doc).map_err(|e| RenderError::Format(e.to_string()))?;
        let initial = self.resolve_initial_view(doc);

        let body = if doc.is_empty() {
            String::from(
                "        <p class=\"empty-state\">This roadmap has no entries yet. Add programs and products with the editor (<code>roadmap serve</code>) or start from a sample with <code>roadmap init</code>.</p>\n",
            )
        } else {
            let mut body = String::new();
            body.push_str(&self.render_tabs(&initial));
            for kind in EntityKind::ALL {
                body.push_str(&self.render_tile_view(doc, kind, &initial));
            }
            for kind in EntityKind::ALL {
                body.push_str(&self.render_detail_views(doc, kind, &initial)?);
            }
            body.push_str(&render_task_views(doc, &initial));
            body
        };
        debug!(title = %self.title, view = %initial, bytes = body.len(), "rendered roadmap page");

        Ok(format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{page_css}
{timeline_css}
{status_css}
    </style>
</head>
<body>
    <header class="page-header">
        <button type="button" id="back-button" class="back-button" hidden>&larr; Back</button>
        <h1>{title}</h1>
        <input type="search" id="search" class="search" placeholder="Search..." aria-label="Search">
        <a href="#" id="download-data" class="download">Download JSON</a>
    </header>
    <main id="views" data-initial-view="{initial}">
{body}    </main>
    <script type="application/json" id="roadmap-data">{data}</script>
    <script>
{timeline_js}
{page_js}
    </script>
</body>
</html>
"##,
            title = html_escape(&self.title),
            page_css = PAGE_CSS,
            timeline_css = TIMELINE_CSS,
            status_css = STATUS_CSS,
            initial = html_escape(&initial.to_string()),
            body = body,
            data = data.replace("</", "<\\/"),
            timeline_js = TIMELINE_JS,
            page_js = PAGE_JS,
        ))
    }

    fn render_tabs(&self, initial: &ViewId) -> String {
        let active = initial.tab();
        let mut html = String::from("        <nav class=\"tabs\" role=\"tablist\">\n");
        for kind in EntityKind::ALL {
            let tab = ViewId::Tab(kind);
            html.push_str(&format!(
                "            <button type=\"button\" class=\"tab-button{}\" data-target=\"{}\">{}</button>\n",
                if tab == active { " active" } else { "" },
                tab,
                kind.title()
            ));
        }
        html.push_str("        </nav>\n");
        html
    }

    fn render_tile_view(&self, doc: &Document, kind: EntityKind, initial: &ViewId) -> String {
        let tiles = tiles(doc, kind);
        let mut html = section_open(&ViewId::Tab(kind), "tab-view", initial);
        html.push_str(&format!("            <h2>{}</h2>\n", kind.title()));
        if tiles.is_empty() {
            html.push_str(&format!(
                "            <p class=\"empty-state\">No {} yet.</p>\n",
                kind.title().to_lowercase()
            ));
        } else {
            html.push_str("            <div class=\"tile-grid\">\n");
            for tile in tiles {
                html.push_str(&format!(
                    r##"                <a href="#" class="tile" data-target="{target}" data-search="{search}">
                    <h3>{name}</h3>
                    <p class="tile-id">{id}</p>
                    <p class="tile-summary">{summary}</p>
                </a>
"##,
                    target = html_escape(&tile.view.to_string()),
                    search = html_escape(&format!("{} {} {}", tile.name, tile.id, tile.summary).to_lowercase()),
                    name = html_escape(&tile.name),
                    id = html_escape(&tile.id),
                    summary = html_escape(&tile.summary),
                ));
            }
            html.push_str("            </div>\n");
        }
        html.push_str("        </section>\n");
        html
    }

    fn render_detail_views(
        &self,
        doc: &Document,
        kind: EntityKind,
        initial: &ViewId,
    ) -> Result<String, RenderError> {
        let mut html = String::new();
        match kind {
            EntityKind::Program => {
                for program in &doc.programs {
                    html.push_str(&detail_view(
                        &ViewId::detail(kind, &program.id),
                        &program.name,
                        &program_fields(doc, program),
                        "",
                        initial,
                    ));
                }
            }
            EntityKind::Product => {
                let engine = TimelineLayoutEngine::new(self.layout.clone());
                let mut timeline = HtmlTimelineRenderer::new();
                if self.live {
                    timeline = timeline.live();
                }
                for product in &doc.products {
                    let layout = engine.layout(doc, product, self.start, self.material.as_deref());
                    let extra = format!(
                        "            <h3>Roadmap</h3>\n{}{}{}",
                        timeline.render(&layout)?,
                        render_status_box(doc, product, layout.active_material.as_deref()),
                        milestone_table(product)
                    );
                    html.push_str(&detail_view(
                        &ViewId::detail(kind, &product.id),
                        &product.name,
                        &product_fields(doc, product),
                        &extra,
                        initial,
                    ));
                }
            }
            EntityKind::MaterialSystem => {
                for material in &doc.material_systems {
                    html.push_str(&detail_view(
                        &ViewId::detail(kind, &material.id),
                        &material.name,
                        &material_fields(doc, material),
                        &task_table("Roadmap", &material.roadmap, false),
                        initial,
                    ));
                }
            }
            EntityKind::Supplier => {
                for supplier in &doc.suppliers {
                    html.push_str(&detail_view(
                        &ViewId::detail(kind, &supplier.id),
                        &supplier.name,
                        &supplier_fields(doc, supplier),
                        &task_table("Supplier Roadmap", supplier.roadmap_tasks(), true),
                        initial,
                    ));
                }
            }
            EntityKind::Opportunity => {
                for opportunity in &doc.opportunities {
                    html.push_str(&detail_view(
                        &ViewId::detail(kind, &opportunity.id),
                        &opportunity.name,
                        &opportunity_fields(doc, opportunity),
                        "",
                        initial,
                    ));
                }
            }
        }
        Ok(html)
    }
}

struct Tile {
    view: ViewId,
    name: String,
    id: String,
    summary: String,
}

fn tiles(doc: &Document, kind: EntityKind) -> Vec<Tile> {
    let names = |ids: &[String]| -> String {
        if ids.is_empty() {
            return "None".into();
        }
        ids.iter()
            .map(|id| doc.entity_name(id).unwrap_or(id.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let tile = |id: &str, name: &str, summary: String| Tile {
        view: ViewId::detail(kind, id),
        name: name.to_string(),
        id: id.to_string(),
        summary,
    };

    match kind {
        EntityKind::Program => doc
            .programs
            .iter()
            .map(|p| {
                tile(
                    &p.id,
                    &p.name,
                    format!("Need date: {}", format_date_str(p.need_date.as_deref())),
                )
            })
            .collect(),
        EntityKind::Product => doc
            .products
            .iter()
            .map(|p| tile(&p.id, &p.name, format!("Programs: {}", names(&p.programs))))
            .collect(),
        EntityKind::MaterialSystem => doc
            .material_systems
            .iter()
            .map(|m| {
                tile(
                    &m.id,
                    &m.name,
                    format!("Qualification: {}", m.qualification.as_deref().unwrap_or("N/A")),
                )
            })
            .collect(),
        EntityKind::Supplier => doc
            .suppliers
            .iter()
            .map(|s| tile(&s.id, &s.name, format!("Materials: {}", names(&s.materials))))
            .collect(),
        EntityKind::Opportunity => doc
            .opportunities
            .iter()
            .map(|o| {
                let related = o
                    .related_entity
                    .as_deref()
                    .map(|id| doc.entity_name(id).unwrap_or(id))
                    .unwrap_or("N/A");
                tile(&o.id, &o.name, format!("Related to: {}", related))
            })
            .collect(),
    }
}

/// One labelled value of a detail view, already rendered as HTML
type Field = (&'static str, String);

fn text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => html_escape(v),
        _ => "N/A".into(),
    }
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        return "None".into();
    }
    values.iter().map(|v| html_escape(v)).collect::<Vec<_>>().join(", ")
}

/// Cross links to entities by id; unknown ids are shown but not linked
fn links(doc: &Document, ids: &[String]) -> String {
    if ids.is_empty() {
        return "None".into();
    }
    ids.iter().map(|id| link(doc, id)).collect::<Vec<_>>().join(", ")
}

pub(crate) fn link(doc: &Document, id: &str) -> String {
    match (doc.entity_kind(id), doc.entity_name(id)) {
        (Some(kind), Some(name)) => format!(
            "<a href=\"#\" class=\"entity-link\" data-target=\"{}\">{}</a>",
            html_escape(&ViewId::detail(kind, id).to_string()),
            html_escape(name)
        ),
        _ => format!("<span class=\"missing-ref\">{}</span>", html_escape(id)),
    }
}

fn entity_links<'a>(doc: &Document, ids: impl Iterator<Item = &'a str>) -> String {
    let ids: Vec<String> = ids.map(str::to_string).collect();
    links(doc, &ids)
}

fn program_fields(doc: &Document, program: &Program) -> Vec<Field> {
    vec![
        ("ID", html_escape(&program.id)),
        ("Description", text(program.description.as_deref())),
        ("Need Date", html_escape(&format_date_str(program.need_date.as_deref()))),
        (
            "Products",
            entity_links(doc, doc.products_in_program(&program.id).iter().map(|p| p.id.as_str())),
        ),
    ]
}

fn product_fields(doc: &Document, product: &Product) -> Vec<Field> {
    vec![
        ("ID", html_escape(&product.id)),
        ("Description", text(product.description.as_deref())),
        ("Programs", links(doc, &product.programs)),
        ("Material Systems", links(doc, &product.material_systems)),
        (
            "Opportunities",
            entity_links(doc, doc.opportunities_for(&product.id).iter().map(|o| o.id.as_str())),
        ),
    ]
}

fn material_fields(doc: &Document, material: &MaterialSystem) -> Vec<Field> {
    vec![
        ("ID", html_escape(&material.id)),
        ("Qualification", text(material.qualification.as_deref())),
        ("Qualification Class", text(material.qualification_class.as_deref())),
        ("Supply Chain", text(material.supply_chain.as_deref())),
        ("Standard NDT", list(&material.standard_ndt)),
        ("Related Opportunities", links(doc, &material.related_opportunities)),
        (
            "Used By",
            entity_links(doc, doc.products_using_material(&material.id).iter().map(|p| p.id.as_str())),
        ),
        (
            "Suppliers",
            entity_links(doc, doc.suppliers_of_material(&material.id).iter().map(|s| s.id.as_str())),
        ),
    ]
}

fn supplier_fields(doc: &Document, supplier: &Supplier) -> Vec<Field> {
    vec![
        ("ID", html_escape(&supplier.id)),
        ("Materials", links(doc, &supplier.materials)),
        ("Additional Capabilities", text(supplier.additional_capabilities.as_deref())),
    ]
}

fn opportunity_fields(doc: &Document, opportunity: &Opportunity) -> Vec<Field> {
    let related = match opportunity.related_entity.as_deref() {
        Some(id) if !id.is_empty() => link(doc, id),
        _ => "N/A".into(),
    };
    vec![
        ("ID", html_escape(&opportunity.id)),
        ("Related Entity", related),
        ("Details", text(opportunity.details.as_deref())),
    ]
}

/// Opening tag of a view; hidden unless it is the initial view
fn section_open(view: &ViewId, class: &str, initial: &ViewId) -> String {
    format!(
        "        <section class=\"view {}\" data-view=\"{}\" data-tab=\"{}\"{}>\n",
        class,
        html_escape(&view.to_string()),
        view.tab(),
        if view == initial { "" } else { " hidden" }
    )
}

/// `fields` labels are HTML
fn detail_view<L: AsRef<str>>(
    view: &ViewId,
    name: &str,
    fields: &[(L, String)],
    extra: &str,
    initial: &ViewId,
) -> String {
    let mut html = section_open(view, "detail-view", initial);
    html.push_str(&format!(
        "            <h2>{}</h2>\n            <dl class=\"fields\">\n",
        html_escape(name)
    ));
    for (label, value) in fields {
        html.push_str(&format!("                <dt>{}</dt><dd>{}</dd>\n", label.as_ref(), value));
    }
    html.push_str("            </dl>\n");
    html.push_str(extra);
    html.push_str("        </section>\n");
    html
}

/// A detail view for every product and material system roadmap task
fn render_task_views(doc: &Document, initial: &ViewId) -> String {
    let mut html = String::new();
    for product in &doc.products {
        let source = format!(
            "<a href=\"#\" class=\"entity-link\" data-target=\"{}\">Product Roadmap</a>",
            html_escape(&ViewId::detail(EntityKind::Product, &product.id).to_string())
        );
        for (index, task) in product.roadmap.iter().enumerate() {
            let view = ViewId::Task(TaskKey::product(&product.id, index));
            html.push_str(&task_view(&view, task, &source, initial));
        }
    }
    for material in &doc.material_systems {
        let source = format!("Material System - {}", link(doc, &material.id));
        for (index, task) in material.roadmap.iter().enumerate() {
            let view = ViewId::Task(TaskKey::material(&material.id, index));
            html.push_str(&task_view(&view, task, &source, initial));
        }
    }
    html
}

fn task_view(view: &ViewId, task: &Task, source: &str, initial: &ViewId) -> String {
    let mut fields: Vec<(String, String)> = vec![
        ("Source".into(), source.to_string()),
        ("Start".into(), html_escape(&format_date_str(task.start.as_deref()))),
        ("End".into(), html_escape(&format_date_str(task.end.as_deref()))),
        ("Status".into(), text(task.status.as_deref())),
    ];
    for (label, value) in [
        ("Funding Type", &task.funding_type),
        ("Lane", &task.lane),
        ("Category", &task.category),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            fields.push((label.into(), html_escape(value)));
        }
    }
    for (key, value) in &task.extra {
        fields.push((html_escape(&humanize(key)), text(Some(value_text(value).as_str()))));
    }
    detail_view(
        view,
        &format!("Task Details: {}", task.label()),
        &fields,
        "",
        initial,
    )
}

/// `costEstimate` and `cost_estimate` become `Cost Estimate`
fn humanize(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    let mut word_start = true;
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            word_start = true;
            continue;
        }
        if c.is_uppercase() && !label.is_empty() {
            word_start = true;
        }
        if word_start {
            if !label.is_empty() {
                label.push(' ');
            }
            label.extend(c.to_uppercase());
            word_start = false;
        } else {
            label.push(c);
        }
    }
    label
}

fn milestone_table(product: &Product) -> String {
    if product.milestones.is_empty() {
        return String::new();
    }
    let mut html = String::from(
        "            <h3>Milestones</h3>\n            <table class=\"data-table\">\n                <tr><th>Name</th><th>Date</th><th>Description</th></tr>\n",
    );
    for milestone in &product.milestones {
        html.push_str(&format!(
            "                <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&milestone.name),
            html_escape(&format_date_str(milestone.date.as_deref())),
            text(milestone.description.as_deref())
        ));
    }
    html.push_str("            </table>\n");
    html
}

fn task_table(title: &str, tasks: &[Task], with_category: bool) -> String {
    if tasks.is_empty() {
        return String::new();
    }
    let mut html = format!(
        "            <h3>{}</h3>\n            <table class=\"data-table\">\n                <tr><th>Task</th>{}<th>Start</th><th>End</th><th>Status</th><th>Funding</th></tr>\n",
        title,
        if with_category { "<th>Category</th>" } else { "" }
    );
    for task in tasks {
        let category = if with_category {
            format!("<td>{}</td>", text(task.category.as_deref()))
        } else {
            String::new()
        };
        html.push_str(&format!(
            "                <tr class=\"{}\"><td>{}</td>{}<td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            task.status_kind().css_class(),
            html_escape(task.label()),
            category,
            html_escape(&format_date_str(task.start.as_deref())),
            html_escape(&format_date_str(task.end.as_deref())),
            task.status_kind(),
            task.funding_kind().map(|f| f.to_string()).unwrap_or_else(|| "N/A".into())
        ));
    }
    html.push_str("            </table>\n");
    html
}

const PAGE_CSS: &str = r#"        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: system-ui, -apple-system, sans-serif;
            color: #212121;
            background: #fafafa;
        }
        .page-header {
            display: flex;
            align-items: center;
            gap: 16px;
            padding: 12px 24px;
            background: #263238;
            color: #fff;
        }
        .page-header h1 { flex: 1; margin: 0; font-size: 1.4rem; }
        .search { padding: 6px 10px; border-radius: 4px; border: none; min-width: 220px; }
        .download { color: #B3E5FC; font-size: 13px; }
        .back-button {
            padding: 6px 12px;
            border: 1px solid #fff;
            background: transparent;
            color: #fff;
            border-radius: 4px;
            cursor: pointer;
        }
        #views { padding: 16px 24px; }
        .tabs { display: flex; gap: 4px; border-bottom: 2px solid #cfd8dc; margin-bottom: 16px; }
        .tab-button {
            padding: 8px 16px;
            border: none;
            background: transparent;
            cursor: pointer;
            font-size: 14px;
            border-bottom: 3px solid transparent;
        }
        .tab-button.active { border-bottom-color: #1E88E5; font-weight: 600; }
        .tile-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 12px; }
        .tile {
            display: block;
            padding: 12px;
            background: #fff;
            border: 1px solid #e0e0e0;
            border-radius: 6px;
            color: inherit;
            text-decoration: none;
        }
        .tile:hover { border-color: #1E88E5; box-shadow: 0 2px 6px rgba(0,0,0,0.1); }
        .tile h3 { margin: 0 0 4px; font-size: 1rem; }
        .tile-id { margin: 0; font-size: 12px; color: #757575; }
        .tile-summary { margin: 6px 0 0; font-size: 13px; }
        .fields { display: grid; grid-template-columns: max-content 1fr; gap: 6px 16px; }
        .fields dt { font-weight: 600; }
        .fields dd { margin: 0; }
        .entity-link { color: #1E88E5; }
        .roadmap-task[data-task-key] { cursor: pointer; }
        .missing-ref { color: #c62828; text-decoration: line-through; }
        .data-table { border-collapse: collapse; margin-top: 8px; font-size: 13px; }
        .data-table th, .data-table td { border: 1px solid #e0e0e0; padding: 4px 8px; text-align: left; }
        .empty-state { padding: 24px; color: #757575; font-style: italic; }"#;

/// Page controller: tab switching, detail navigation with history, search.
///
/// The first view comes from the `view` query parameter when the page has it,
/// otherwise from `data-initial-view`.
const PAGE_JS: &str = r#"        (function () {
            class NavigationHistory {
                constructor(initial) {
                    this.stack = [initial];
                }
                get current() {
                    return this.stack[this.stack.length - 1];
                }
                get canGoBack() {
                    return this.stack.length > 1;
                }
                push(view) {
                    if (view !== this.current) this.stack.push(view);
                }
                reset(view) {
                    this.stack = [view];
                }
                back() {
                    if (this.canGoBack) this.stack.pop();
                    return this.current;
                }
            }

            class RoadmapPage {
                constructor(root) {
                    this.root = root;
                    var firstTab = root.querySelector('.tab-view');
                    this.history = new NavigationHistory(firstTab ? firstTab.dataset.view : null);
                    this.backButton = document.getElementById('back-button');
                    this.search = document.getElementById('search');
                }

                isTab(view) {
                    return view && view.indexOf('tab:') === 0;
                }

                section(view) {
                    if (!view) return null;
                    return this.root.querySelector('section[data-view="' + CSS.escape(view) + '"]');
                }

                // A detail opened on load goes back to its tab
                open(view) {
                    var section = this.section(view);
                    if (!section) return;
                    this.history.reset(section.dataset.tab);
                    this.history.push(view);
                    this.show(this.history.current);
                }

                navigate(view) {
                    if (!this.section(view)) return;
                    if (this.isTab(view)) {
                        this.history.reset(view);
                    } else {
                        this.history.push(view);
                    }
                    this.show(this.history.current);
                }

                back() {
                    this.show(this.history.back());
                }

                show(view) {
                    var tab = view;
                    this.root.querySelectorAll('.view').forEach(function (section) {
                        section.hidden = section.dataset.view !== view;
                        if (!section.hidden) tab = section.dataset.tab;
                    });
                    document.querySelectorAll('.tab-button').forEach(function (button) {
                        button.classList.toggle('active', button.dataset.target === tab);
                    });
                    this.backButton.hidden = !this.history.canGoBack;
                    this.filter(this.isTab(view) ? this.search.value : '');
                    window.scrollTo(0, 0);
                }

                filter(query) {
                    var needle = (query || '').trim().toLowerCase();
                    this.root.querySelectorAll('.tile').forEach(function (tile) {
                        tile.hidden = needle !== '' && tile.dataset.search.indexOf(needle) === -1;
                    });
                }

                bind() {
                    var page = this;
                    document.addEventListener('click', function (event) {
                        var task = event.target.closest('.roadmap-task[data-task-key]');
                        if (task) {
                            page.navigate('task:' + task.dataset.taskKey);
                            return;
                        }
                        var target = event.target.closest('[data-target]');
                        if (!target) return;
                        event.preventDefault();
                        page.navigate(target.dataset.target);
                    });
                    // Status box blocks follow the timeline's material facet
                    this.root.addEventListener('roadmap:facet', function (event) {
                        var view = event.target.closest('.view');
                        if (!view) return;
                        view.querySelectorAll('.quad-material').forEach(function (block) {
                            block.hidden = block.dataset.materialId !== event.detail.materialId;
                        });
                    });
                    this.backButton.addEventListener('click', function () {
                        page.back();
                    });
                    this.search.addEventListener('input', function () {
                        page.filter(page.search.value);
                    });
                    document.getElementById('download-data').addEventListener('click', function (event) {
                        event.preventDefault();
                        var text = document.getElementById('roadmap-data').textContent;
                        var blob = new Blob([JSON.stringify(JSON.parse(text), null, 2)], { type: 'application/json' });
                        var link = document.createElement('a');
                        link.href = URL.createObjectURL(blob);
                        link.download = 'roadmap.json';
                        link.click();
                        URL.revokeObjectURL(link.href);
                    });
                }
            }

            document.addEventListener('DOMContentLoaded', function () {
                var root = document.getElementById('views');
                var page = new RoadmapPage(root);
                page.bind();
                var requested = new URLSearchParams(window.location.search).get('view');
                page.open(page.section(requested) ? requested : root.dataset.initialView);
            });
        })();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_core::{Lane, Milestone};
    use serde_json::json;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn document() -> Document {
        let mut doc = Document::default();
        doc.programs.push(Program::new("PRG1", "Satellite Systems").need_date("2026-06-30"));
        let mut rework = Task::new("Initial Design")
            .span("2025-04-01", "2025-06-30")
            .with_lane(Lane::Design);
        rework.extra.insert("costEstimate".into(), json!("$1.2M"));
        doc.products.push(
            Product::new("P1", "SatCom Terminal")
                .program("PRG1")
                .program("PRG404")
                .material("MS1")
                .material("MS2")
                .task(
                    Task::new("Initial Design")
                        .span("2025-01-01", "2025-03-31")
                        .with_lane(Lane::Design),
                )
                .task(rework)
                .milestone(Milestone::new("CDR", "2025-05-15").description("Critical design review")),
        );
        doc.material_systems.push(
            MaterialSystem::new("MS1", "Ti-6Al-4V")
                .task(Task::new("Material Certification").span("2025-01-01", "2025-02-28")),
        );
        doc.material_systems.push(
            MaterialSystem::new("MS2", "Inconel 718")
                .task(Task::new("Process Qualification").span("2025-04-01", "2025-09-30")),
        );
        let mut supplier = Supplier::new("SUP1", "AeroSupplies Inc.");
        supplier.materials.push("MS1".into());
        doc.suppliers.push(supplier);
        let mut opportunity = Opportunity::new("OPP1", "Lightweight Alloy </script> Study");
        opportunity.related_entity = Some("P1".into());
        doc.opportunities.push(opportunity);
        doc
    }

    /// The `<section>` rendered for `view`
    fn section<'a>(html: &'a str, view: &str) -> &'a str {
        let open = html.find(&format!("<section class=\"view detail-view\" data-view=\"{}\"", view)).unwrap();
        let close = html[open..].find("</section>").unwrap();
        &html[open..open + close]
    }

    #[test]
    fn view_ids_address_collections() {
        assert_eq!(ViewId::Tab(EntityKind::MaterialSystem).to_string(), "tab:materialSystems");
        assert_eq!(ViewId::detail(EntityKind::Product, "P1").to_string(), "products:P1");
        assert_eq!(ViewId::Task(TaskKey::material("MS1", 2)).to_string(), "task:material:MS1:2");
    }

    #[test]
    fn view_ids_parse_their_display_form() {
        for view in [
            ViewId::Tab(EntityKind::Opportunity),
            ViewId::detail(EntityKind::Supplier, "SUP:1"),
            ViewId::Task(TaskKey::product("P1", 0)),
        ] {
            assert_eq!(view.to_string().parse::<ViewId>(), Ok(view));
        }
        assert!("tab:widgets".parse::<ViewId>().is_err());
        assert!("products:".parse::<ViewId>().is_err());
        assert!("task:supplier:SUP1:0".parse::<ViewId>().is_err());
        assert!("P1".parse::<ViewId>().is_err());
        assert_eq!(
            ViewId::Task(TaskKey::material("MS1", 0)).tab(),
            ViewId::Tab(EntityKind::MaterialSystem)
        );
    }

    #[test]
    fn page_has_tabs_tiles_and_details() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        for kind in EntityKind::ALL {
            assert!(html.contains(&format!("data-target=\"tab:{}\"", kind.collection())));
        }
        assert!(html.contains(r##"<a href="#" class="tile" data-target="products:P1""##));
        assert!(html.contains(r#"data-view="products:P1" data-tab="tab:products" hidden"#));
        assert!(html.contains(r#"data-view="tab:programs" data-tab="tab:programs">"#));
        assert!(html.contains(r#"<main id="views" data-initial-view="tab:programs">"#));
        assert!(html.contains("Need date: Jun 30, 2026"));
        assert!(html.contains("Programs: Satellite Systems, PRG404"));
    }

    #[test]
    fn page_template_survives_hash_links() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        assert!(html.contains(r##"<a href="#" id="download-data" class="download">Download JSON</a>"##));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<section ").count(), html.matches("</section>").count());
    }

    #[test]
    fn product_detail_embeds_timeline() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        assert!(html.contains(r#"<div class="roadmap-container" data-product-id="P1""#));
        assert!(html.contains(r#"data-task-key="material:MS1:0""#));
        assert!(!html.contains("start-date-picker\" value"));
        let live = HtmlPageRenderer::new(start()).live().render(&document()).unwrap();
        assert!(live.contains(r#"class="start-date-picker" value="2025-01-01""#));
    }

    #[test]
    fn product_detail_shows_development_status() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        let detail = section(&html, "products:P1");
        assert!(detail.contains("<h3>Product Development Status</h3>"));
        assert!(detail.contains(r#"class="quad-material" data-material-id="MS2" hidden"#));
        assert!(!detail.contains(r#"data-material-id="MS1" hidden"#));
        assert!(html.contains("block.dataset.materialId !== event.detail.materialId"));
    }

    #[test]
    fn initial_view_and_material_are_restored() {
        let html = HtmlPageRenderer::new(start())
            .material("MS2")
            .initial_view(ViewId::detail(EntityKind::Product, "P1"))
            .live()
            .render(&document())
            .unwrap();
        assert!(html.contains(r#"<main id="views" data-initial-view="products:P1">"#));
        assert!(html.contains(r#"data-view="products:P1" data-tab="tab:products">"#));
        assert!(html.contains(r#"data-view="tab:programs" data-tab="tab:programs" hidden"#));
        assert!(html.contains(r#"class="tab-button active" data-target="tab:products""#));
        assert!(html.contains(r#"class="facet-button active" data-material-id="MS2""#));
        assert!(html.contains(r#"data-product-id="P1" data-active-material="MS2""#));
        let detail = section(&html, "products:P1");
        assert!(detail.contains(r#"class="quad-material" data-material-id="MS1" hidden"#));
        assert!(html.contains("new URLSearchParams(window.location.search).get('view')"));
    }

    #[test]
    fn unknown_initial_view_falls_back_to_first_tab() {
        let renderer = HtmlPageRenderer::new(start());
        let doc = document();
        for view in [
            ViewId::detail(EntityKind::Product, "P404"),
            ViewId::Task(TaskKey::product("P1", 7)),
        ] {
            let renderer = renderer.clone().initial_view(view);
            assert_eq!(renderer.resolve_initial_view(&doc), ViewId::Tab(EntityKind::Program));
        }
        let task = ViewId::Task(TaskKey::material("MS2", 0));
        let html = renderer.initial_view(task).render(&doc).unwrap();
        assert!(html.contains(r#"data-view="task:material:MS2:0" data-tab="tab:materialSystems">"#));
        assert!(html.contains(r#"class="tab-button active" data-target="tab:materialSystems""#));
    }

    #[test]
    fn same_name_tasks_open_their_own_details() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        assert!(html.contains(r#"data-task-key="product:P1:0""#));
        assert!(html.contains(r#"data-task-key="product:P1:1""#));

        let first = section(&html, "task:product:P1:0");
        let second = section(&html, "task:product:P1:1");
        for detail in [first, second] {
            assert!(detail.contains("<h2>Task Details: Initial Design</h2>"));
            assert!(detail.contains(r#"data-tab="tab:products" hidden"#));
            assert!(detail.contains(
                r##"<dt>Source</dt><dd><a href="#" class="entity-link" data-target="products:P1">Product Roadmap</a></dd>"##
            ));
            assert!(detail.contains("<dt>Lane</dt><dd>Design</dd>"));
        }
        assert!(first.contains("<dt>Start</dt><dd>Jan 1, 2025</dd>"));
        assert!(!first.contains("Apr 1, 2025"));
        assert!(!first.contains("Cost Estimate"));
        assert!(second.contains("<dt>Start</dt><dd>Apr 1, 2025</dd>"));
        assert!(second.contains("<dt>End</dt><dd>Jun 30, 2025</dd>"));
        assert!(second.contains("<dt>Cost Estimate</dt><dd>$1.2M</dd>"));

        // Bars navigate through the page history, so Back returns to the product
        assert!(html.contains("page.navigate('task:' + task.dataset.taskKey)"));
    }

    #[test]
    fn material_task_details_name_their_material() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        let detail = section(&html, "task:material:MS1:0");
        assert!(detail.contains("<h2>Task Details: Material Certification</h2>"));
        assert!(detail.contains(
            r##"<dt>Source</dt><dd>Material System - <a href="#" class="entity-link" data-target="materialSystems:MS1">Ti-6Al-4V</a></dd>"##
        ));
        assert!(detail.contains("<dt>Status</dt><dd>N/A</dd>"));
    }

    #[test]
    fn extra_field_labels() {
        assert_eq!(humanize("costEstimate"), "Cost Estimate");
        assert_eq!(humanize("cost_estimate"), "Cost Estimate");
        assert_eq!(humanize("notes"), "Notes");
    }

    #[test]
    fn cross_links_resolve_or_mark_missing() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        assert!(html.contains(
            r##"<a href="#" class="entity-link" data-target="programs:PRG1">Satellite Systems</a>"##
        ));
        assert!(html.contains(r#"<span class="missing-ref">PRG404</span>"#));
        // Material detail lists the products using it and its suppliers
        assert!(html.contains(r#"data-target="suppliers:SUP1">AeroSupplies Inc.</a>"#));
    }

    #[test]
    fn embedded_data_cannot_close_script() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        let data_start = html.find("id=\"roadmap-data\">").unwrap();
        let data_end = html[data_start..].find("</script>").unwrap() + data_start;
        let data = &html[data_start + "id=\"roadmap-data\">".len()..data_end];
        assert!(data.contains(r#"Lightweight Alloy <\/script> Study"#));
        assert!(html.contains("Lightweight Alloy &lt;/script&gt; Study"));
    }

    #[test]
    fn navigation_history_is_owned_by_the_controller() {
        let html = HtmlPageRenderer::new(start()).render(&document()).unwrap();
        assert!(html.contains("class NavigationHistory"));
        assert!(html.contains("this.history = new NavigationHistory("));
        assert!(!html.contains("navStack"));
    }

    #[test]
    fn empty_document_shows_empty_state() {
        let html = HtmlPageRenderer::new(start()).render(&Document::default()).unwrap();
        assert!(html.contains("class=\"empty-state\""));
        assert!(!html.contains("class=\"tile\""));
        assert!(html.contains(r#"<script type="application/json" id="roadmap-data">{"programs":[]"#));
    }

    #[test]
    fn custom_title_is_escaped() {
        let html = HtmlPageRenderer::new(start())
            .title("R&D Roadmap")
            .render(&Document::default())
            .unwrap();
        assert!(html.contains("<title>R&amp;D Roadmap</title>"));
    }
}
