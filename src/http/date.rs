//! HTTP-date helpers
//!
//! `Last-Modified` formatting and `If-Modified-Since` evaluation.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP-date (IMF-fixdate, RFC 2822 or asctime)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, ASCTIME)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whether a file modified at `modified` must be resent to a client holding
/// a copy from `if_modified_since`
///
/// Unparseable dates count as modified. Sub-second precision is ignored,
/// since HTTP-dates carry whole seconds.
pub fn is_modified_since(modified: SystemTime, if_modified_since: &str) -> bool {
    let Some(since) = parse_http_date(if_modified_since) else {
        return true;
    };
    DateTime::<Utc>::from(modified).timestamp() > since.timestamp()
}
