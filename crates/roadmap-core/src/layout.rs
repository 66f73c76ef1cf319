//! Timeline layout output types
//!
//! These are produced by the layout engine (`roadmap-layout`) and consumed by
//! every renderer. All positions are in pixels relative to the left edge and
//! top of the row they belong to.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::{format_date, FundingType, Lane, Quarter, TaskStatus};

/// The ordered, gap-free run of quarters being displayed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    #[serde(rename = "quarterLabels")]
    pub quarters: Vec<Quarter>,
}

impl TimelineWindow {
    pub fn new(quarters: Vec<Quarter>) -> Self {
        Self { quarters }
    }

    /// Labels in `YYYY-Qn` form
    pub fn labels(&self) -> Vec<String> {
        self.quarters.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    /// Index of `quarter` within the window
    pub fn index_of(&self, quarter: Quarter) -> Option<usize> {
        let first = self.quarters.first()?;
        let offset = quarter.ordinal() - first.ordinal();
        usize::try_from(offset).ok().filter(|&i| i < self.quarters.len())
    }

    /// Index of the quarter containing `date`
    pub fn index_of_date(&self, date: NaiveDate) -> Option<usize> {
        self.index_of(Quarter::containing(date))
    }
}

/// Where a laid-out task comes from
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskSource {
    /// A product roadmap, by product id
    Product(String),
    /// A material system roadmap, by material system id
    Material(String),
}

/// Stable identity of a roadmap task: its source collection and array index.
///
/// Task labels are not unique, so click-driven lookups use this key instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    pub source: TaskSource,
    pub index: usize,
}

impl TaskKey {
    pub fn product(id: impl Into<String>, index: usize) -> Self {
        Self {
            source: TaskSource::Product(id.into()),
            index,
        }
    }

    pub fn material(id: impl Into<String>, index: usize) -> Self {
        Self {
            source: TaskSource::Material(id.into()),
            index,
        }
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            TaskSource::Product(id) => write!(f, "product:{}:{}", id, self.index),
            TaskSource::Material(id) => write!(f, "material:{}:{}", id, self.index),
        }
    }
}

/// A string that is not `product:<id>:<index>` or `material:<id>:<index>`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task key {0:?}")]
pub struct TaskKeyParseError(pub String);

impl std::str::FromStr for TaskKey {
    type Err = TaskKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TaskKeyParseError(s.to_string());
        let (source, rest) = s.split_once(':').ok_or_else(err)?;
        // Ids may contain ':', the index never does
        let (id, index) = rest.rsplit_once(':').ok_or_else(err)?;
        let index = index.parse().map_err(|_| err())?;
        if id.is_empty() {
            return Err(err());
        }
        match source {
            "product" => Ok(TaskKey::product(id, index)),
            "material" => Ok(TaskKey::material(id, index)),
            _ => Err(err()),
        }
    }
}

impl Serialize for TaskKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One positioned task bar in a swimlane
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneItem {
    pub key: TaskKey,
    /// Task label
    pub task: String,
    pub start_position: u32,
    pub width: u32,
    pub vertical_offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    /// Only M&P items of inactive material facets are hidden
    pub visible: bool,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_type: Option<FundingType>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LaneItem {
    /// Bar label; material tasks name their material system
    pub fn label(&self) -> String {
        match &self.material_name {
            Some(material) => format!("{} ({})", self.task, material),
            None => self.task.clone(),
        }
    }

    /// Hover text: source, label, date range and funding
    pub fn tooltip(&self) -> String {
        let mut text = String::new();
        if let Some(material) = &self.material_name {
            text.push_str(&format!("[Material: {}] ", material));
        }
        text.push_str(&format!(
            "{}: {} - {}",
            self.task,
            format_date(self.start),
            format_date(self.end)
        ));
        if let Some(funding) = self.funding_type {
            text.push_str(&format!(" | Funding: {}", funding));
        }
        text
    }

    /// CSS classes for status and funding
    pub fn css_classes(&self) -> String {
        match self.funding_type {
            Some(funding) => format!("{} {}", self.status.css_class(), funding.css_class()),
            None => self.status.css_class().to_string(),
        }
    }

    /// Same geometry (position, width, offset) as `other`
    pub fn same_geometry(&self, other: &LaneItem) -> bool {
        self.start_position == other.start_position
            && self.width == other.width
            && self.vertical_offset == other.vertical_offset
    }
}

/// All positioned tasks of one swimlane
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaneLayout {
    pub lane: Lane,
    pub items: Vec<LaneItem>,
}

impl LaneLayout {
    pub fn empty(lane: Lane) -> Self {
        Self {
            lane,
            items: Vec::new(),
        }
    }

    /// Height needed to show every stacked item, at least one task high
    pub fn content_height(&self, task_height: u32) -> u32 {
        self.items
            .iter()
            .map(|item| item.vertical_offset + task_height)
            .max()
            .unwrap_or(task_height)
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &LaneItem> {
        self.items.iter().filter(|item| item.visible)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Milestone,
    Program,
}

/// A point-in-time marker (milestone or program need date), centered in its quarter
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayout {
    pub kind: MarkerKind,
    pub position: u32,
    pub vertical_offset: u32,
    pub label: String,
    pub tooltip: String,
    pub date: NaiveDate,
}

/// A material system the M&P lane can be filtered to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaterialFacet {
    pub id: String,
    pub name: String,
}

/// Complete timeline of one product for one start date
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    pub product_id: String,
    pub product_name: String,
    pub start_date: NaiveDate,
    pub window: TimelineWindow,
    pub programs: Vec<MarkerLayout>,
    pub milestones: Vec<MarkerLayout>,
    /// One entry per lane, in `Lane::ALL` order
    pub lanes: Vec<LaneLayout>,
    pub materials: Vec<MaterialFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_material: Option<String>,
    pub unit_width: u32,
    pub task_height: u32,
    pub marker_spacing: u32,
}

impl TimelineLayout {
    pub fn lane(&self, lane: Lane) -> Option<&LaneLayout> {
        self.lanes.iter().find(|l| l.lane == lane)
    }

    /// Total width of the quarter columns
    pub fn chart_width(&self) -> u32 {
        u32::try_from(self.window.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(self.unit_width)
    }

    /// Look up a laid-out task by key
    pub fn item(&self, key: &TaskKey) -> Option<&LaneItem> {
        self.lanes
            .iter()
            .flat_map(|lane| lane.items.iter())
            .find(|item| &item.key == key)
    }

    pub fn item_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.items.len()).sum()
    }

    /// Height needed for a marker row
    pub fn marker_row_height(markers: &[MarkerLayout], spacing: u32) -> u32 {
        markers
            .iter()
            .map(|m| m.vertical_offset + spacing)
            .max()
            .unwrap_or(spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u8) -> Quarter {
        Quarter::new(year, quarter).unwrap()
    }

    fn window() -> TimelineWindow {
        TimelineWindow::new(vec![q(2025, 3), q(2025, 4), q(2026, 1)])
    }

    fn item(material: Option<&str>) -> LaneItem {
        LaneItem {
            key: TaskKey::material("MS1", 0),
            task: "Batch Testing".into(),
            start_position: 100,
            width: 200,
            vertical_offset: 30,
            material_id: material.map(Into::into),
            material_name: material.map(|_| "Ti-6Al-4V".into()),
            visible: true,
            status: TaskStatus::InProgress,
            funding_type: Some(FundingType::SectorIrad),
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        }
    }

    #[test]
    fn window_index_of_across_year_boundary() {
        let w = window();
        assert_eq!(w.index_of(q(2025, 3)), Some(0));
        assert_eq!(w.index_of(q(2026, 1)), Some(2));
        assert_eq!(w.index_of(q(2025, 2)), None);
        assert_eq!(w.index_of(q(2026, 2)), None);
    }

    #[test]
    fn empty_window_finds_nothing() {
        let w = TimelineWindow::new(vec![]);
        assert_eq!(w.index_of(q(2025, 1)), None);
    }

    #[test]
    fn task_key_display() {
        assert_eq!(TaskKey::product("P1", 2).to_string(), "product:P1:2");
        assert_eq!(TaskKey::material("MS3", 0).to_string(), "material:MS3:0");
    }

    #[test]
    fn task_key_parses_its_display_form() {
        for key in [TaskKey::product("P1", 2), TaskKey::material("MS:3", 0)] {
            assert_eq!(key.to_string().parse::<TaskKey>(), Ok(key));
        }
        assert!("supplier:SUP1:0".parse::<TaskKey>().is_err());
        assert!("product:P1".parse::<TaskKey>().is_err());
        assert!("product::1".parse::<TaskKey>().is_err());
        assert!("product:P1:x".parse::<TaskKey>().is_err());
    }

    #[test]
    fn lane_item_label_and_tooltip() {
        let it = item(Some("MS1"));
        assert_eq!(it.label(), "Batch Testing (Ti-6Al-4V)");
        assert_eq!(
            it.tooltip(),
            "[Material: Ti-6Al-4V] Batch Testing: Mar 1, 2025 - Apr 30, 2025 | Funding: Sector IRAD"
        );
        assert_eq!(it.css_classes(), "in-progress funding-sector-irad");
    }

    #[test]
    fn lane_content_height_tracks_deepest_item() {
        let mut lane = LaneLayout::empty(Lane::Design);
        assert_eq!(lane.content_height(25), 25);
        lane.items.push(item(None));
        assert_eq!(lane.content_height(25), 55);
    }

    #[test]
    fn window_serializes_as_labels() {
        let json = serde_json::to_value(window()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "quarterLabels": ["2025-Q3", "2025-Q4", "2026-Q1"] })
        );
    }
}
