//! Horizontal placement of a task within the quarter window

use chrono::NaiveDate;
use roadmap_core::{Quarter, Task, TimelineWindow};

/// Horizontal extent of a task bar, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start_position: u32,
    pub width: u32,
}

impl Span {
    pub fn end_position(self) -> u32 {
        self.start_position.saturating_add(self.width)
    }
}

/// Place a task in the window.
///
/// Tasks whose end quarter is outside the window, or whose dates cannot be
/// parsed, are excluded (`None`). Tasks that start before the window are
/// clipped to its left edge.
pub fn layout_span(task: &Task, window: &TimelineWindow, unit_width: u32) -> Option<Span> {
    span_between(task.start_date()?, task.end_date()?, window, unit_width)
}

/// Place a date range in the window; see [`layout_span`]
pub fn span_between(
    start: NaiveDate,
    end: NaiveDate,
    window: &TimelineWindow,
    unit_width: u32,
) -> Option<Span> {
    let start_quarter = Quarter::containing(start);
    let end_quarter = Quarter::containing(end);
    if end_quarter < start_quarter {
        return None;
    }
    let end_index = window.index_of(end_quarter)?;
    // With the end inside the window, a missing start index means the task began earlier
    let start_index = window.index_of(start_quarter).unwrap_or(0);

    Some(Span {
        start_position: pixels(start_index, unit_width),
        width: pixels(end_index - start_index + 1, unit_width),
    })
}

/// `count` columns of `unit_width`, saturating at `u32::MAX`
pub(crate) fn pixels(count: usize, unit_width: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(unit_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_quarter_window;

    fn window() -> TimelineWindow {
        compute_quarter_window(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 5)
    }

    fn task(start: &str, end: &str) -> Task {
        Task::new("t").span(start, end)
    }

    #[test]
    fn span_inside_window() {
        let span = layout_span(&task("2025-04-10", "2025-09-01"), &window(), 100).unwrap();
        assert_eq!(span, Span { start_position: 100, width: 200 });
        assert_eq!(span.end_position(), 300);
    }

    #[test]
    fn single_quarter_span() {
        let span = layout_span(&task("2025-01-01", "2025-03-31"), &window(), 100).unwrap();
        assert_eq!(span, Span { start_position: 0, width: 100 });
    }

    #[test]
    fn span_clipped_at_left_edge() {
        let span = layout_span(&task("2023-06-01", "2025-05-01"), &window(), 100).unwrap();
        assert_eq!(span, Span { start_position: 0, width: 200 });
    }

    #[test]
    fn end_outside_window_is_excluded() {
        assert_eq!(layout_span(&task("2025-01-01", "2026-04-01"), &window(), 100), None);
        assert_eq!(layout_span(&task("2024-01-01", "2024-12-31"), &window(), 100), None);
    }

    #[test]
    fn bad_or_missing_dates_are_excluded() {
        assert_eq!(layout_span(&task("TBD", "2025-03-01"), &window(), 100), None);
        assert_eq!(layout_span(&task("2025-01-01", ""), &window(), 100), None);
        assert_eq!(layout_span(&Task::new("undated"), &window(), 100), None);
    }

    #[test]
    fn inverted_quarters_are_excluded() {
        assert_eq!(layout_span(&task("2025-08-01", "2025-02-01"), &window(), 100), None);
    }

    #[test]
    fn huge_widths_saturate() {
        let window = compute_quarter_window(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 50);
        let span = layout_span(&task("2037-04-01", "2037-06-30"), &window, 100_000_000).unwrap();
        assert_eq!(span, Span { start_position: u32::MAX, width: 100_000_000 });
        assert_eq!(span.end_position(), u32::MAX);
    }

    #[test]
    fn unit_width_scales() {
        let span = layout_span(&task("2025-04-10", "2025-09-01"), &window(), 80).unwrap();
        assert_eq!(span, Span { start_position: 80, width: 160 });
    }
}
