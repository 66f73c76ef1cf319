//! # roadmap-layout
//!
//! Quarter-bucketed timeline layout engine.
//!
//! Given a product and the document it lives in, the engine computes:
//! - The window of consecutive calendar quarters being displayed
//! - Horizontal spans of every task, clipped at the window's left edge
//! - Vertical stacking of tasks within each swimlane
//! - Program need-date and milestone marker rows
//! - Material facet visibility for the M&P lane
//!
//! Every operation is a pure function of its inputs. Changing the start date
//! or the active facet means computing a new layout.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use roadmap_core::{Document, Lane, Product, Task};
//! use roadmap_layout::{LayoutConfig, TimelineLayoutEngine};
//!
//! let mut doc = Document::default();
//! doc.products.push(Product::new("P1", "SatCom Terminal").task(
//!     Task::new("Initial Design")
//!         .span("2025-01-01", "2025-03-31")
//!         .with_lane(Lane::Design),
//! ));
//!
//! let engine = TimelineLayoutEngine::new(LayoutConfig::default());
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let layout = engine.layout_product(&doc, "P1", start, None).unwrap();
//! assert_eq!(layout.window.len(), 20);
//! assert_eq!(layout.lane(Lane::Design).unwrap().items[0].width, 100);
//! ```

pub mod facet;
pub mod lanes;
pub mod markers;
pub mod quarter;
pub mod span;

pub use facet::{default_material_facet, material_facets, set_active_material_facet};
pub use lanes::{group_and_stack_by_lane, lane_candidates, LaneCandidate};
pub use markers::{milestone_markers, program_markers, stack_markers_by_quarter, MarkerInput};
pub use quarter::{compute_quarter_window, quarter_index_of, resolve_start_date};
pub use span::{layout_span, span_between, Span};

use chrono::NaiveDate;
use roadmap_core::{EntityStore, Lane, Product, TimelineLayout, TimelineWindow};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// How tasks within a lane are stacked vertically
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackingMode {
    /// Only tasks with an identical span share rows; overlapping spans may collide
    #[default]
    Bucket,
    /// Greedy row assignment so that no two bars overlap
    Interval,
}

/// Widest chart, in pixels, the engine lays out
pub const MAX_CHART_WIDTH: u32 = 10_000_000;

/// Largest row pitch or marker spacing, in pixels
pub const MAX_ROW_PITCH: u32 = 10_000;

/// Layout dimensions, in quarters and pixels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of quarters in the window
    pub quarter_count: usize,
    /// Width of one quarter column
    pub unit_width: u32,
    pub task_height: u32,
    /// Gap between stacked task bars
    pub vertical_padding: u32,
    /// Vertical distance between stacked markers
    pub marker_spacing: u32,
    pub stacking: StackingMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            quarter_count: 20,
            unit_width: 100,
            task_height: 25,
            vertical_padding: 5,
            marker_spacing: 40,
            stacking: StackingMode::Bucket,
        }
    }
}

impl LayoutConfig {
    /// Three-year window used by the standalone product page
    pub fn standalone() -> Self {
        Self {
            quarter_count: 12,
            ..Self::default()
        }
    }

    pub fn quarter_count(mut self, count: usize) -> Self {
        self.quarter_count = count;
        self
    }

    pub fn unit_width(mut self, width: u32) -> Self {
        self.unit_width = width;
        self
    }

    pub fn stacking(mut self, mode: StackingMode) -> Self {
        self.stacking = mode;
        self
    }

    /// Vertical distance between stacked task bars
    pub fn row_pitch(&self) -> u32 {
        self.task_height.saturating_add(self.vertical_padding)
    }

    /// Total width of the quarter columns, `None` on overflow
    pub fn chart_width(&self) -> Option<u32> {
        u32::try_from(self.quarter_count)
            .ok()?
            .checked_mul(self.unit_width)
    }

    /// Reject dimensions the engine cannot lay out
    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        if self.quarter_count == 0 {
            return Err(LayoutConfigError::NoQuarters);
        }
        if self.unit_width == 0 {
            return Err(LayoutConfigError::ZeroWidth);
        }
        if self.task_height == 0 {
            return Err(LayoutConfigError::ZeroTaskHeight);
        }
        if !self.chart_width().is_some_and(|width| width <= MAX_CHART_WIDTH) {
            return Err(LayoutConfigError::ChartTooWide);
        }
        let pitch = self.task_height.checked_add(self.vertical_padding);
        if !pitch.is_some_and(|pitch| pitch <= MAX_ROW_PITCH) || self.marker_spacing > MAX_ROW_PITCH {
            return Err(LayoutConfigError::RowTooTall);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutConfigError {
    #[error("quarter_count must be at least 1")]
    NoQuarters,

    #[error("unit_width must be at least 1 pixel")]
    ZeroWidth,

    #[error("task_height must be at least 1 pixel")]
    ZeroTaskHeight,

    #[error("quarter_count * unit_width must not exceed 10000000 pixels")]
    ChartTooWide,

    #[error("task_height + vertical_padding and marker_spacing must not exceed 10000 pixels")]
    RowTooTall,
}

// ============================================================================
// Engine
// ============================================================================

/// Computes product timelines for a fixed configuration
#[derive(Clone, Debug, Default)]
pub struct TimelineLayoutEngine {
    config: LayoutConfig,
}

impl TimelineLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The quarter window starting at `start`
    pub fn window(&self, start: NaiveDate) -> TimelineWindow {
        compute_quarter_window(start, self.config.quarter_count)
    }

    /// Lay out `product` for a window starting at `start`.
    ///
    /// `active_material` selects the visible M&P facet; when it is absent or
    /// not one of the product's material systems, the first resolvable
    /// material system is used.
    pub fn layout<S>(
        &self,
        store: &S,
        product: &Product,
        start: NaiveDate,
        active_material: Option<&str>,
    ) -> TimelineLayout
    where
        S: EntityStore + ?Sized,
    {
        let window = self.window(start);
        let materials = material_facets(store, product);
        let active = active_material
            .filter(|id| materials.iter().any(|f| f.id == *id))
            .map(str::to_string)
            .or_else(|| default_material_facet(store, product));

        let lanes = Lane::ALL
            .into_iter()
            .map(|lane| {
                let candidates = lane_candidates(store, product, lane);
                group_and_stack_by_lane(lane, &candidates, &window, &self.config, active.as_deref())
            })
            .collect();

        let programs = stack_markers_by_quarter(program_markers(store, product), &window, &self.config);
        let milestones = stack_markers_by_quarter(milestone_markers(product), &window, &self.config);

        let layout = TimelineLayout {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            start_date: start,
            window,
            programs,
            milestones,
            lanes,
            materials,
            active_material: active,
            unit_width: self.config.unit_width,
            task_height: self.config.task_height,
            marker_spacing: self.config.marker_spacing,
        };
        debug!(
            product = %layout.product_id,
            start = %start,
            items = layout.item_count(),
            "computed timeline layout"
        );
        layout
    }

    /// Lay out the product with id `product_id`, `None` if it does not exist
    pub fn layout_product<S>(
        &self,
        store: &S,
        product_id: &str,
        start: NaiveDate,
        active_material: Option<&str>,
    ) -> Option<TimelineLayout>
    where
        S: EntityStore + ?Sized,
    {
        let product = store.find_product(product_id)?;
        Some(self.layout(store, product, start, active_material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_dimensions() {
        let config = LayoutConfig::default();
        assert_eq!(config.quarter_count, 20);
        assert_eq!(config.row_pitch(), 30);
        assert_eq!(config.marker_spacing, 40);
        assert_eq!(LayoutConfig::standalone().quarter_count, 12);
    }

    #[test]
    fn config_validation() {
        assert_eq!(LayoutConfig::default().validate(), Ok(()));
        assert_eq!(
            LayoutConfig::default().quarter_count(0).validate(),
            Err(LayoutConfigError::NoQuarters)
        );
        assert_eq!(
            LayoutConfig::default().unit_width(0).validate(),
            Err(LayoutConfigError::ZeroWidth)
        );
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let wide = LayoutConfig::default().quarter_count(50).unit_width(100_000_000);
        assert_eq!(wide.chart_width(), None);
        assert_eq!(wide.validate(), Err(LayoutConfigError::ChartTooWide));
        assert_eq!(
            LayoutConfig::default().quarter_count(usize::MAX).validate(),
            Err(LayoutConfigError::ChartTooWide)
        );
        assert_eq!(
            LayoutConfig::default().quarter_count(100).unit_width(100_000).validate(),
            Ok(())
        );

        let tall = LayoutConfig {
            task_height: u32::MAX,
            ..LayoutConfig::default()
        };
        assert_eq!(tall.validate(), Err(LayoutConfigError::RowTooTall));
        let spaced = LayoutConfig {
            marker_spacing: MAX_ROW_PITCH + 1,
            ..LayoutConfig::default()
        };
        assert_eq!(spaced.validate(), Err(LayoutConfigError::RowTooTall));
    }

    #[test]
    fn wide_unvalidated_config_does_not_panic() {
        let mut doc = roadmap_core::Document::default();
        doc.products.push(Product::new("P1", "Wide").task(
            roadmap_core::Task::new("Late")
                .span("2037-04-01", "2037-06-30")
                .with_lane(Lane::Design),
        ));
        let engine = TimelineLayoutEngine::new(LayoutConfig::default().quarter_count(50).unit_width(100_000_000));
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let layout = engine.layout_product(&doc, "P1", start, None).unwrap();
        let item = &layout.lane(Lane::Design).unwrap().items[0];
        assert_eq!(item.start_position, u32::MAX);
        assert_eq!(layout.chart_width(), u32::MAX);
    }

    #[test]
    fn config_deserializes_partially() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "quarter_count": 8, "stacking": "interval" }"#).unwrap();
        assert_eq!(config.quarter_count, 8);
        assert_eq!(config.unit_width, 100);
        assert_eq!(config.stacking, StackingMode::Interval);
    }

    #[test]
    fn unknown_product_has_no_layout() {
        let doc = roadmap_core::Document::default();
        let engine = TimelineLayoutEngine::default();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(engine.layout_product(&doc, "P404", start, None).is_none());
    }

    #[test]
    fn empty_product_yields_four_empty_lanes() {
        let doc = roadmap_core::Document::default();
        let product = Product::new("P1", "Bare");
        let layout = TimelineLayoutEngine::default().layout(
            &doc,
            &product,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            None,
        );
        let lanes: Vec<Lane> = layout.lanes.iter().map(|l| l.lane).collect();
        assert_eq!(lanes, Lane::ALL.to_vec());
        assert_eq!(layout.item_count(), 0);
        assert!(layout.programs.is_empty() && layout.milestones.is_empty());
        assert_eq!(layout.active_material, None);
    }
}
