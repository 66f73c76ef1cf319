//! Swimlane candidate selection and vertical stacking

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use roadmap_core::{
    EntityStore, Lane, LaneItem, LaneLayout, MaterialSystem, Product, Task, TaskKey,
    TimelineWindow,
};
use tracing::debug;

use crate::span::{pixels, span_between, Span};
use crate::{LayoutConfig, StackingMode};

/// A task eligible for a lane, with its identity and material tag
#[derive(Clone, Debug)]
pub struct LaneCandidate<'a> {
    pub key: TaskKey,
    pub task: &'a Task,
    /// Set for M&P tasks, which come from material system roadmaps
    pub material: Option<&'a MaterialSystem>,
}

/// Collect the tasks that feed `lane` for `product`.
///
/// The M&P lane is fed exclusively by the roadmaps of the product's material
/// systems (unknown references are skipped). Every other lane takes the
/// product tasks tagged with exactly that lane.
pub fn lane_candidates<'a, S>(store: &'a S, product: &'a Product, lane: Lane) -> Vec<LaneCandidate<'a>>
where
    S: EntityStore + ?Sized,
{
    match lane {
        Lane::MaterialsAndProcesses => {
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            for id in &product.material_systems {
                if !seen.insert(id.as_str()) {
                    continue;
                }
                let Some(material) = store.find_material_system(id) else {
                    debug!(product = %product.id, material = %id, "skipping unknown material system");
                    continue;
                };
                candidates.extend(material.roadmap.iter().enumerate().map(|(index, task)| {
                    LaneCandidate {
                        key: TaskKey::material(&material.id, index),
                        task,
                        material: Some(material),
                    }
                }));
            }
            candidates
        }
        _ => product
            .roadmap
            .iter()
            .enumerate()
            .filter(|(_, task)| task.lane_kind() == Some(lane))
            .map(|(index, task)| LaneCandidate {
                key: TaskKey::product(&product.id, index),
                task,
                material: None,
            })
            .collect(),
    }
}

/// A candidate that survived horizontal placement
struct Placed<'c, 'a> {
    candidate: &'c LaneCandidate<'a>,
    span: Span,
    start: NaiveDate,
    end: NaiveDate,
}

impl Placed<'_, '_> {
    fn into_item(self, vertical_offset: u32, active_material: Option<&str>) -> LaneItem {
        let material_id = self.candidate.material.map(|m| m.id.clone());
        let visible = match material_id.as_deref() {
            Some(id) => active_material == Some(id),
            None => true,
        };
        LaneItem {
            key: self.candidate.key.clone(),
            task: self.candidate.task.label().to_string(),
            start_position: self.span.start_position,
            width: self.span.width,
            vertical_offset,
            material_id,
            material_name: self.candidate.material.map(|m| m.name.clone()),
            visible,
            status: self.candidate.task.status_kind(),
            funding_type: self.candidate.task.funding_kind(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Position and stack the candidates of one lane.
///
/// In [`StackingMode::Bucket`] mode, tasks with an identical
/// `(start_position, width)` share a position bucket; each bucket is sorted by
/// start date (stable) and its tasks are offset by `index * row_pitch`.
/// Buckets keep first-encounter order. Tasks that merely overlap are not
/// stacked against each other.
///
/// In [`StackingMode::Interval`] mode, tasks are sorted by position and start
/// date and greedily assigned the first row whose previous bar has ended.
///
/// M&P items are visible only when their material matches `active_material`.
pub fn group_and_stack_by_lane(
    lane: Lane,
    candidates: &[LaneCandidate<'_>],
    window: &TimelineWindow,
    config: &LayoutConfig,
    active_material: Option<&str>,
) -> LaneLayout {
    let placed: Vec<Placed<'_, '_>> = candidates
        .iter()
        .filter_map(|candidate| {
            let start = candidate.task.start_date()?;
            let end = candidate.task.end_date()?;
            let span = span_between(start, end, window, config.unit_width)?;
            Some(Placed {
                candidate,
                span,
                start,
                end,
            })
        })
        .collect();

    let pitch = config.row_pitch();
    let items = match config.stacking {
        StackingMode::Bucket => stack_buckets(placed, pitch, active_material),
        StackingMode::Interval => stack_intervals(placed, pitch, active_material),
    };

    LaneLayout { lane, items }
}

fn stack_buckets(placed: Vec<Placed<'_, '_>>, pitch: u32, active_material: Option<&str>) -> Vec<LaneItem> {
    let mut buckets: IndexMap<Span, Vec<Placed<'_, '_>>> = IndexMap::new();
    for p in placed {
        buckets.entry(p.span).or_default().push(p);
    }

    let mut items = Vec::new();
    for (_, mut bucket) in buckets {
        bucket.sort_by_key(|p| p.start);
        for (index, p) in bucket.into_iter().enumerate() {
            items.push(p.into_item(pixels(index, pitch), active_material));
        }
    }
    items
}

fn stack_intervals(mut placed: Vec<Placed<'_, '_>>, pitch: u32, active_material: Option<&str>) -> Vec<LaneItem> {
    placed.sort_by_key(|p| (p.span.start_position, p.start));

    // Right edge of the last bar in each row
    let mut row_ends: Vec<u32> = Vec::new();
    placed
        .into_iter()
        .map(|p| {
            let row = match row_ends.iter().position(|&end| end <= p.span.start_position) {
                Some(row) => {
                    row_ends[row] = p.span.end_position();
                    row
                }
                None => {
                    row_ends.push(p.span.end_position());
                    row_ends.len() - 1
                }
            };
            p.into_item(pixels(row, pitch), active_material)
        })
        .collect()
}
