//! Timestamp labels and interval formatting.
//!
//! Backup artifacts are named `<stem>_backup_<label>.db` where the label
//! spells out the calendar fields
//! (`2024y-10m-20d_11h-58m-01s`). The machine-comparable timestamp stored
//! in checkpoints is standard Unix epoch seconds; the label exists only
//! for humans and file names.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Formats the calendar label used in artifact names.
///
/// Month, day, minute, and second are zero-padded to two digits; the hour
/// is not.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use sqlkeeper_backup::stamp::artifact_label;
///
/// let dt = Local.with_ymd_and_hms(2024, 10, 20, 11, 58, 1).unwrap();
/// assert_eq!(artifact_label(&dt), "2024y-10m-20d_11h-58m-01s");
/// ```
pub fn artifact_label(dt: &DateTime<Local>) -> String {
    format!(
        "{}y-{:02}m-{:02}d_{}h-{:02}m-{:02}s",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Builds the artifact file name for a database stem and label.
pub fn artifact_name(stem: &str, label: &str) -> String {
    format!("{stem}_backup_{label}.db")
}

/// The prefix all artifacts of a database share, used for listing.
pub fn artifact_prefix(stem: &str) -> String {
    format!("{stem}_backup_")
}

/// Formats a second count as `HH:MM:SS`. Negative values clamp to zero.
pub fn format_hms(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Parses a `HH:MM:SS` string back into seconds.
///
/// Returns `None` for anything that is not three colon-separated numbers.
pub fn parse_hms(raw: &str) -> Option<i64> {
    let mut parts = raw.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Test-visible constructor for a fixed local time.
#[doc(hidden)]
pub fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_padding() {
        let dt = local_time(2023, 1, 2, 3, 4, 5);
        assert_eq!(artifact_label(&dt), "2023y-01m-02d_3h-04m-05s");
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            artifact_name("library", "2023y-01m-02d_3h-04m-05s"),
            "library_backup_2023y-01m-02d_3h-04m-05s.db"
        );
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(10800), "03:00:00");
        assert_eq!(format_hms(-5), "00:00:00");
    }

    #[test]
    fn test_parse_hms_round_trip() {
        assert_eq!(parse_hms("03:00:00"), Some(10800));
        assert_eq!(parse_hms(&format_hms(4271)), Some(4271));
    }

    #[test]
    fn test_parse_hms_rejects_garbage() {
        assert_eq!(parse_hms("3:00"), None);
        assert_eq!(parse_hms("a:b:c"), None);
        assert_eq!(parse_hms("1:2:3:4"), None);
    }
}
