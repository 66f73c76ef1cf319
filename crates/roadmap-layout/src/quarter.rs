//! Quarter window generation and date-to-quarter lookup

use chrono::NaiveDate;
use roadmap_core::{parse_date, Quarter, TimelineWindow};

/// Build the window of `quarter_count` consecutive quarters starting with the
/// quarter that contains `start`.
///
/// # Panics
///
/// Panics if `quarter_count` is zero; callers validate configuration first.
pub fn compute_quarter_window(start: NaiveDate, quarter_count: usize) -> TimelineWindow {
    assert!(quarter_count > 0, "quarter_count must be positive");
    let quarters = std::iter::successors(Some(Quarter::containing(start)), |q| Some(q.next()))
        .take(quarter_count)
        .collect();
    TimelineWindow::new(quarters)
}

/// Start date from user input, falling back to `today` when absent or unparsable
pub fn resolve_start_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    raw.and_then(parse_date).unwrap_or(today)
}

/// Index of the quarter containing `date` within `window`.
///
/// `None` when the date is outside the window or cannot be parsed.
pub fn quarter_index_of(date: &str, window: &TimelineWindow) -> Option<usize> {
    parse_date(date).and_then(|d| window.index_of_date(d))
}
