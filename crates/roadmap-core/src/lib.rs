//! # roadmap-core
//!
//! Core domain model and traits for the roadmap timeline generator.
//!
//! This crate provides:
//! - Domain types: `Document`, `Program`, `Product`, `MaterialSystem`, `Supplier`, `Opportunity`
//! - Roadmap entries: `Task`, `Milestone`, with typed views of their lane, status and funding
//! - Layout output types consumed by renderers (`TimelineLayout` and friends)
//! - The `EntityStore` query surface, document validation and file persistence
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use roadmap_core::{Document, EntityStore, Lane, Product, Task};
//!
//! let mut doc = Document::default();
//! doc.products.push(
//!     Product::new("P1", "SatCom Terminal").task(
//!         Task::new("Initial Design")
//!             .span("2025-01-01", "2025-03-31")
//!             .with_status("Complete")
//!             .with_lane(Lane::Design),
//!     ),
//! );
//! assert!(doc.find_product("P1").is_some());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod date;
pub mod layout;
pub mod persist;
pub mod store;
pub mod validate;

pub use date::{format_date, format_date_str, parse_date, Quarter, QuarterParseError};
pub use layout::{
    LaneItem, LaneLayout, MarkerKind, MarkerLayout, MaterialFacet, TaskKey, TaskKeyParseError,
    TaskSource, TimelineLayout, TimelineWindow,
};
pub use persist::FileStore;
pub use store::EntityStore;
pub use validate::{has_errors, validate, Diagnostic, Severity};

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a program
pub type ProgramId = String;

/// Unique identifier for a product
pub type ProductId = String;

/// Unique identifier for a material system
pub type MaterialSystemId = String;

/// Unique identifier for a supplier
pub type SupplierId = String;

/// Unique identifier for a funding opportunity
pub type OpportunityId = String;

/// Fields the model does not know about, kept so a load/save cycle is lossless
pub type Extra = Map<String, Value>;

// ============================================================================
// Document
// ============================================================================

/// A complete roadmap document, as stored in `roadmap.json`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Customer programs (the only required collection)
    pub programs: Vec<Program>,
    /// Products built for the programs
    #[serde(default)]
    pub products: Vec<Product>,
    /// Material systems used by products
    #[serde(default)]
    pub material_systems: Vec<MaterialSystem>,
    /// Suppliers of material systems
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    /// Contract R&D funding opportunities
    #[serde(default, rename = "cradOpportunities")]
    pub opportunities: Vec<Opportunity>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Document {
    /// Parse a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert an untyped JSON value into a document
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize as pretty-printed JSON (2-space indent, trailing newline)
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// True when every collection is empty
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
            && self.products.is_empty()
            && self.material_systems.is_empty()
            && self.suppliers.is_empty()
            && self.opportunities.is_empty()
    }
}

/// Kinds of top-level entities, used for cross-links between views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Program,
    Product,
    MaterialSystem,
    Supplier,
    Opportunity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Program,
        EntityKind::Product,
        EntityKind::MaterialSystem,
        EntityKind::Supplier,
        EntityKind::Opportunity,
    ];

    /// Collection key in the JSON document
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Program => "programs",
            EntityKind::Product => "products",
            EntityKind::MaterialSystem => "materialSystems",
            EntityKind::Supplier => "suppliers",
            EntityKind::Opportunity => "cradOpportunities",
        }
    }

    /// Inverse of [`EntityKind::collection`]
    pub fn from_collection(collection: &str) -> Option<Self> {
        EntityKind::ALL.into_iter().find(|kind| kind.collection() == collection)
    }

    /// Human-readable plural, used for tab titles
    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Program => "Programs",
            EntityKind::Product => "Products",
            EntityKind::MaterialSystem => "Material Systems",
            EntityKind::Supplier => "Suppliers",
            EntityKind::Opportunity => "Opportunities",
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A customer program that needs one or more products
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date by which the program needs its products (ISO date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_date: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Program {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            need_date: None,
            extra: Extra::new(),
        }
    }

    /// Set the need date
    pub fn need_date(mut self, date: impl Into<String>) -> Self {
        self.need_date = Some(date.into());
        self
    }

    /// Parsed need date, `None` when absent or malformed
    pub fn need_date_parsed(&self) -> Option<NaiveDate> {
        self.need_date.as_deref().and_then(parse_date)
    }
}

/// A product with its own roadmap and milestones
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Programs this product serves
    #[serde(default)]
    pub programs: Vec<ProgramId>,
    /// Material systems this product is built from
    #[serde(default)]
    pub material_systems: Vec<MaterialSystemId>,
    /// Lane-tagged roadmap tasks
    #[serde(default)]
    pub roadmap: Vec<Task>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            programs: Vec::new(),
            material_systems: Vec::new(),
            roadmap: Vec::new(),
            milestones: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Reference a program
    pub fn program(mut self, id: impl Into<String>) -> Self {
        self.programs.push(id.into());
        self
    }

    /// Reference a material system
    pub fn material(mut self, id: impl Into<String>) -> Self {
        self.material_systems.push(id.into());
        self
    }

    /// Add a roadmap task
    pub fn task(mut self, task: Task) -> Self {
        self.roadmap.push(task);
        self
    }

    /// Add a milestone
    pub fn milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }
}

/// A material system (alloy, composite, ...) with a materials & processes roadmap
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSystem {
    pub id: MaterialSystemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_chain: Option<String>,
    #[serde(default, rename = "standardNDT", skip_serializing_if = "Vec::is_empty")]
    pub standard_ndt: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_opportunities: Vec<OpportunityId>,
    /// Tasks shown in the M&P lane of every product using this material
    #[serde(default)]
    pub roadmap: Vec<Task>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl MaterialSystem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            qualification: None,
            qualification_class: None,
            supply_chain: None,
            standard_ndt: Vec::new(),
            related_opportunities: Vec::new(),
            roadmap: Vec::new(),
            milestones: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Add a roadmap task
    pub fn task(mut self, task: Task) -> Self {
        self.roadmap.push(task);
        self
    }
}

/// A supplier of material systems
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// Material systems this supplier provides
    #[serde(default)]
    pub materials: Vec<MaterialSystemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_capabilities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_roadmap: Option<SupplierRoadmap>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Supplier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            materials: Vec::new(),
            additional_capabilities: None,
            supplier_roadmap: None,
            extra: Extra::new(),
        }
    }

    /// Supplier roadmap tasks, empty when the supplier has no roadmap
    pub fn roadmap_tasks(&self) -> &[Task] {
        self.supplier_roadmap
            .as_ref()
            .map(|r| r.tasks.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRoadmap {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A contract R&D funding opportunity tied to another entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: OpportunityId,
    pub name: String,
    /// Id of the product, material system, ... this opportunity relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Opportunity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            related_entity: None,
            details: None,
            extra: Extra::new(),
        }
    }
}

// ============================================================================
// Roadmap entries
// ============================================================================

/// A roadmap task, as found in product, material and supplier roadmaps
///
/// Dates and enumerations are kept as the raw strings from the document so
/// that malformed values survive a round trip; use the typed accessors to
/// interpret them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Display label (not an identity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_type: Option<String>,
    /// Swimlane, product tasks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
    /// Supplier task category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Task {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            task: Some(label.into()),
            start: None,
            end: None,
            status: None,
            funding_type: None,
            lane: None,
            category: None,
            extra: Extra::new(),
        }
    }

    /// Set start and end dates
    pub fn span(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lane = Some(lane.as_str().into());
        self
    }

    pub fn with_funding(mut self, funding: FundingType) -> Self {
        self.funding_type = Some(funding.to_string());
        self
    }

    /// Display label, empty when the document has none
    pub fn label(&self) -> &str {
        self.task.as_deref().unwrap_or_default()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.as_deref().and_then(parse_date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end.as_deref().and_then(parse_date)
    }

    /// Recognized lane, `None` for missing or unknown lanes
    pub fn lane_kind(&self) -> Option<Lane> {
        self.lane.as_deref().and_then(Lane::parse)
    }

    pub fn status_kind(&self) -> TaskStatus {
        TaskStatus::parse_loose(self.status.as_deref().unwrap_or_default())
    }

    pub fn funding_kind(&self) -> Option<FundingType> {
        self.funding_type.as_deref().and_then(FundingType::parse)
    }
}

/// A dated product or material milestone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Milestone {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: Some(date.into()),
            description: None,
            extra: Extra::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn date_parsed(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// Timeline swimlane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    Design,
    Manufacturing,
    /// Materials & processes, fed by material system roadmaps
    #[serde(rename = "M&P")]
    MaterialsAndProcesses,
    Quality,
}

impl Lane {
    /// Lanes in display order
    pub const ALL: [Lane; 4] = [
        Lane::Design,
        Lane::Manufacturing,
        Lane::MaterialsAndProcesses,
        Lane::Quality,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::Design => "Design",
            Lane::Manufacturing => "Manufacturing",
            Lane::MaterialsAndProcesses => "M&P",
            Lane::Quality => "Quality",
        }
    }

    /// Exact-match lane lookup
    pub fn parse(s: &str) -> Option<Self> {
        Lane::ALL.into_iter().find(|lane| lane.as_str() == s)
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task progress status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Complete,
    #[serde(rename = "In Progress")]
    InProgress,
    #[default]
    Planned,
}

impl TaskStatus {
    /// Case-insensitive parse; anything unrecognized counts as planned
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => TaskStatus::Complete,
            "in progress" => TaskStatus::InProgress,
            _ => TaskStatus::Planned,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TaskStatus::Complete => "complete",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Planned => "planned",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Complete => write!(f, "Complete"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::Planned => write!(f, "Planned"),
        }
    }
}

/// Funding source of in-progress work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingType {
    #[serde(rename = "Division IRAD")]
    DivisionIrad,
    #[serde(rename = "Sector IRAD")]
    SectorIrad,
    #[serde(rename = "CRAD")]
    Crad,
}

impl FundingType {
    pub const ALL: [FundingType; 3] = [
        FundingType::SectorIrad,
        FundingType::DivisionIrad,
        FundingType::Crad,
    ];

    /// Case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "division irad" => Some(FundingType::DivisionIrad),
            "sector irad" => Some(FundingType::SectorIrad),
            "crad" => Some(FundingType::Crad),
            _ => None,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            FundingType::DivisionIrad => "funding-division-irad",
            FundingType::SectorIrad => "funding-sector-irad",
            FundingType::Crad => "funding-crad",
        }
    }
}

impl std::fmt::Display for FundingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingType::DivisionIrad => write!(f, "Division IRAD"),
            FundingType::SectorIrad => write!(f, "Sector IRAD"),
            FundingType::Crad => write!(f, "CRAD"),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering of a computed timeline
pub trait TimelineRenderer {
    type Output;

    /// Render a timeline layout to the output format
    fn render(&self, layout: &TimelineLayout) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Loading, validating or saving a document failed
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid document: {} diagnostic(s)", .0.len())]
    Invalid(Vec<Diagnostic>),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "programs": [
            { "id": "PRG1", "name": "Satellite Systems", "needDate": "2025-09-30" }
        ],
        "products": [
            {
                "id": "P1",
                "name": "SatCom Terminal",
                "programs": ["PRG1"],
                "designTools": ["CADPro"],
                "materialSystems": ["MS1"],
                "roadmap": [
                    { "task": "Initial Design", "start": "2025-01-01", "end": "2025-03-31",
                      "status": "Complete", "lane": "Design" }
                ]
            }
        ],
        "materialSystems": [
            { "id": "MS1", "name": "Ti-6Al-4V", "standardNDT": ["CT"], "roadmap": [] }
        ]
    }"#;

    #[test]
    fn document_parses_known_fields() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.programs.len(), 1);
        assert_eq!(doc.programs[0].need_date.as_deref(), Some("2025-09-30"));
        assert_eq!(doc.products[0].material_systems, vec!["MS1".to_string()]);
        assert_eq!(doc.material_systems[0].standard_ndt, vec!["CT".to_string()]);
        assert!(doc.suppliers.is_empty());
        assert!(doc.opportunities.is_empty());
    }

    #[test]
    fn document_keeps_unknown_fields() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        let tools = doc.products[0].extra.get("designTools").unwrap();
        assert_eq!(tools, &serde_json::json!(["CADPro"]));

        let text = doc.to_json_pretty().unwrap();
        let reparsed = Document::from_json_str(&text).unwrap();
        assert_eq!(reparsed, doc);
        assert!(text.contains("\"designTools\""));
    }

    #[test]
    fn document_requires_programs() {
        let err = Document::from_json_str(r#"{ "products": [] }"#).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn entity_requires_id_and_name() {
        let err = Document::from_json_str(r#"{ "programs": [ { "id": "PRG1" } ] }"#);
        assert!(err.is_err());
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let doc = Document::from_json_str(r#"{ "programs": [] }"#).unwrap();
        let text = doc.to_json_pretty().unwrap();
        assert!(text.starts_with("{\n  \"programs\": []"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn lane_parse_is_exact() {
        assert_eq!(Lane::parse("M&P"), Some(Lane::MaterialsAndProcesses));
        assert_eq!(Lane::parse("Design"), Some(Lane::Design));
        assert_eq!(Lane::parse("design"), None);
        assert_eq!(Lane::parse("Testing"), None);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(TaskStatus::parse_loose("COMPLETE"), TaskStatus::Complete);
        assert_eq!(TaskStatus::parse_loose("in progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_loose("Planned"), TaskStatus::Planned);
        assert_eq!(TaskStatus::parse_loose("on hold"), TaskStatus::Planned);
        assert_eq!(TaskStatus::parse_loose(""), TaskStatus::Planned);
    }

    #[test]
    fn funding_type_parse_and_class() {
        assert_eq!(FundingType::parse("Sector IRAD"), Some(FundingType::SectorIrad));
        assert_eq!(FundingType::parse("crad"), Some(FundingType::Crad));
        assert_eq!(FundingType::parse("grant"), None);
        assert_eq!(FundingType::DivisionIrad.css_class(), "funding-division-irad");
    }

    #[test]
    fn task_builder_sets_typed_views() {
        let task = Task::new("Prototype Build")
            .span("2025-04-01", "2025-06-30")
            .with_status("In Progress")
            .with_lane(Lane::Manufacturing)
            .with_funding(FundingType::Crad);

        assert_eq!(task.lane_kind(), Some(Lane::Manufacturing));
        assert_eq!(task.status_kind(), TaskStatus::InProgress);
        assert_eq!(task.funding_kind(), Some(FundingType::Crad));
        assert_eq!(task.start_date(), NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(task.end_date(), NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn task_with_bad_date_keeps_raw_value() {
        let task = Task::new("Broken").span("soon", "2025-13-01");
        assert!(task.start_date().is_none());
        assert!(task.end_date().is_none());
        assert_eq!(task.start.as_deref(), Some("soon"));
    }

    #[test]
    fn absent_labels_stay_absent() {
        let text = r#"{
            "programs": [],
            "products": [
                {
                    "id": "P1",
                    "name": "SatCom Terminal",
                    "roadmap": [ { "start": "2025-01-01", "end": "2025-03-31", "lane": "Design" } ],
                    "milestones": [ { "name": "PDR", "date": "2025-02-15" } ]
                }
            ]
        }"#;
        let doc = Document::from_json_str(text).unwrap();
        assert_eq!(doc.products[0].roadmap[0].label(), "");
        assert_eq!(doc.products[0].milestones[0].description, None);

        let value: Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        let task = value["products"][0]["roadmap"][0].as_object().unwrap();
        let milestone = value["products"][0]["milestones"][0].as_object().unwrap();
        assert!(!task.contains_key("task"));
        assert!(!milestone.contains_key("description"));
    }

    #[test]
    fn supplier_roadmap_tasks_default_empty() {
        let supplier = Supplier::new("SUP1", "AeroSupplies Inc.");
        assert!(supplier.roadmap_tasks().is_empty());
    }

    #[test]
    fn entity_kind_collections() {
        assert_eq!(EntityKind::Opportunity.collection(), "cradOpportunities");
        assert_eq!(EntityKind::from_collection("materialSystems"), Some(EntityKind::MaterialSystem));
        assert_eq!(EntityKind::from_collection("task"), None);
        assert_eq!(EntityKind::MaterialSystem.title(), "Material Systems");
    }
}
