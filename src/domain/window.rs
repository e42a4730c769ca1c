//! Hour-aligned time windows
//!
//! A [`TimeWindow`] is the half-open interval `[from, to)` covering exactly one
//! UTC hour. Windows are values: shifting one produces a new window.

use super::errors::HourglassError;
use super::result::Result;
use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open one-hour interval `[from, to)`
///
/// # Examples
///
/// ```
/// use hourglass::domain::window::TimeWindow;
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2023, 6, 15, 9, 0, 0).unwrap();
/// let window = TimeWindow::starting_at(start).unwrap();
///
/// assert_eq!(window.to(), Utc.with_ymd_and_hms(2023, 6, 15, 10, 0, 0).unwrap());
/// assert!(window.contains(start));
/// assert!(!window.contains(window.to()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates the window starting at `start`
    ///
    /// `start` must fall exactly on an hour boundary.
    pub fn starting_at(start: DateTime<Utc>) -> Result<Self> {
        if truncate_to_hour(start)? != start {
            return Err(HourglassError::Validation(format!(
                "Window start {} is not aligned to an hour",
                start.to_rfc3339()
            )));
        }
        Ok(Self::from_aligned(start))
    }

    /// Creates the window that contains `instant`
    pub fn containing(instant: DateTime<Utc>) -> Result<Self> {
        Ok(Self::from_aligned(truncate_to_hour(instant)?))
    }

    pub(crate) fn from_aligned(start: DateTime<Utc>) -> Self {
        Self {
            from: start,
            to: start + Duration::hours(1),
        }
    }

    /// Inclusive lower bound
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Exclusive upper bound
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// The window immediately after this one
    pub fn next_hour(&self) -> Self {
        Self::from_aligned(self.to)
    }

    /// Half-open membership test
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// True once `now` is at least `settle` past the end of the window
    pub fn is_closed_at(&self, now: DateTime<Utc>, settle: Duration) -> bool {
        self.to + settle <= now
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.from.format("%Y-%m-%dT%H:%M:%SZ"),
            self.to.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

/// Which bounds a warehouse delete applies to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBounds {
    /// `>= from AND < to`
    #[default]
    HalfOpen,
    /// `>= from AND <= to`; also removes rows stamped exactly on the next hour
    Closed,
}

impl WindowBounds {
    /// SQL comparison operator applied to the upper bound
    pub fn upper_operator(&self) -> &'static str {
        match self {
            WindowBounds::HalfOpen => "<",
            WindowBounds::Closed => "<=",
        }
    }
}

impl fmt::Display for WindowBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowBounds::HalfOpen => write!(f, "half_open"),
            WindowBounds::Closed => write!(f, "closed"),
        }
    }
}

fn truncate_to_hour(instant: DateTime<Utc>) -> Result<DateTime<Utc>> {
    instant
        .duration_trunc(Duration::hours(1))
        .map_err(|e| HourglassError::Validation(format!("Cannot truncate {instant} to hour: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_one_hour() {
        let window = TimeWindow::starting_at(at(2023, 6, 15, 9)).unwrap();
        assert_eq!(window.from(), at(2023, 6, 15, 9));
        assert_eq!(window.to(), at(2023, 6, 15, 10));
    }

    #[test]
    fn test_unaligned_start_rejected() {
        let start = Utc.with_ymd_and_hms(2023, 6, 15, 9, 30, 0).unwrap();
        let err = TimeWindow::starting_at(start).unwrap_err();
        assert!(matches!(err, HourglassError::Validation(_)));
    }

    #[test]
    fn test_containing_truncates() {
        let instant = Utc.with_ymd_and_hms(2023, 6, 15, 9, 59, 59).unwrap();
        let window = TimeWindow::containing(instant).unwrap();
        assert_eq!(window.from(), at(2023, 6, 15, 9));
    }

    #[test]
    fn test_next_hour_twice_is_two_hours() {
        let window = TimeWindow::starting_at(at(2023, 12, 31, 22)).unwrap();
        let shifted = window.next_hour().next_hour();
        assert_eq!(shifted.from(), window.from() + Duration::hours(2));
        assert_eq!(shifted.from(), at(2024, 1, 1, 0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let window = TimeWindow::starting_at(at(2023, 6, 15, 9)).unwrap();
        assert!(window.contains(at(2023, 6, 15, 9)));
        assert!(window.contains(at(2023, 6, 15, 10) - Duration::nanoseconds(1)));
        assert!(!window.contains(at(2023, 6, 15, 10)));
        assert!(!window.contains(at(2023, 6, 15, 8)));
    }

    #[test]
    fn test_is_closed_at_respects_settle() {
        let window = TimeWindow::starting_at(at(2023, 6, 15, 9)).unwrap();
        let settle = Duration::minutes(5);
        assert!(!window.is_closed_at(at(2023, 6, 15, 10), settle));
        assert!(window.is_closed_at(at(2023, 6, 15, 10) + settle, settle));
        assert!(window.is_closed_at(at(2023, 6, 15, 10), Duration::zero()));
    }

    #[test]
    fn test_display() {
        let window = TimeWindow::starting_at(at(2023, 6, 15, 9)).unwrap();
        assert_eq!(
            window.to_string(),
            "[2023-06-15T09:00:00Z, 2023-06-15T10:00:00Z)"
        );
    }

    #[test]
    fn test_window_bounds_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            bounds: WindowBounds,
        }
        let parsed: Wrapper = toml::from_str("bounds = \"closed\"").unwrap();
        assert_eq!(parsed.bounds, WindowBounds::Closed);
        assert_eq!(WindowBounds::default(), WindowBounds::HalfOpen);
        assert_eq!(WindowBounds::HalfOpen.upper_operator(), "<");
        assert_eq!(WindowBounds::Closed.upper_operator(), "<=");
    }
}
