//! Run stamps used to name backup directories and operation logs.
//!
//! A stamp renders as `YYYYMMDD_HHMMSS_mmm` in UTC. Parsing also accepts
//! the older all-digit unix-seconds form so that logs written by earlier
//! versions still sort correctly.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Operation log file name prefix.
pub const LOG_PREFIX: &str = "rename_log_";
/// Operation log file name suffix.
pub const LOG_SUFFIX: &str = ".json";
/// Backup directory name prefix.
pub const BACKUP_PREFIX: &str = "backup_";

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render a stamp with millisecond resolution.
pub fn render_stamp(at: &DateTime<Utc>) -> String {
    format!(
        "{}_{:03}",
        at.format(STAMP_FORMAT),
        at.timestamp_subsec_millis().min(999)
    )
}

/// Parse a stamp produced by [`render_stamp`] or a legacy unix-seconds stamp.
pub fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    if !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = stamp.parse().ok()?;
        return Utc.timestamp_opt(secs, 0).single();
    }

    let (base, millis) = stamp.rsplit_once('_')?;
    if millis.len() != 3 || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let millis: i64 = millis.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(base, STAMP_FORMAT).ok()?;

    Some(Utc.from_utc_datetime(&naive) + Duration::milliseconds(millis))
}

/// `rename_log_<stamp>.json`
pub fn log_file_name(at: &DateTime<Utc>) -> String {
    format!("{}{}{}", LOG_PREFIX, render_stamp(at), LOG_SUFFIX)
}

/// `backup_<stamp>`
pub fn backup_dir_name(at: &DateTime<Utc>) -> String {
    format!("{}{}", BACKUP_PREFIX, render_stamp(at))
}

/// Extract the stamp time from an operation log file name.
pub fn parse_log_file_name(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(LOG_PREFIX)?.strip_suffix(LOG_SUFFIX)?;
    parse_stamp(stamp)
}

/// Whether a file name follows the operation log naming convention.
pub fn is_log_file_name(name: &str) -> bool {
    parse_log_file_name(name).is_some()
}
