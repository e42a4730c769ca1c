//! Result type alias for Hourglass

use super::errors::HourglassError;

/// Result type alias for Hourglass operations
///
/// # Examples
///
/// ```
/// use hourglass::domain::result::Result;
/// use hourglass::domain::errors::HourglassError;
///
/// fn parse_hour(raw: &str) -> Result<u32> {
///     raw.parse()
///         .map_err(|_| HourglassError::Parse(format!("'{raw}' is not an hour")))
/// }
///
/// assert_eq!(parse_hour("09").unwrap(), 9);
/// assert!(parse_hour("x9").is_err());
/// ```
pub type Result<T> = std::result::Result<T, HourglassError>;
