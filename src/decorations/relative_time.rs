//! Short relative time labels ("now", "5 mins ago", "in 2 hrs").

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = MINUTE * 60;
const DAY: i64 = HOUR * 24;
const WEEK: i64 = DAY * 7;
const MONTH: i64 = DAY * 30;
const YEAR: i64 = DAY * 365;

/// Describe `then` relative to `now`. Differences under 30 seconds read as
/// "now".
pub fn from_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds.abs() < 30 {
        return "now".to_string();
    }

    let magnitude = seconds.abs();
    let (count, singular, plural) = if magnitude < MINUTE {
        (magnitude, "sec", "secs")
    } else if magnitude < HOUR {
        (magnitude / MINUTE, "min", "mins")
    } else if magnitude < DAY {
        (magnitude / HOUR, "hr", "hrs")
    } else if magnitude < WEEK {
        (magnitude / DAY, "day", "days")
    } else if magnitude < MONTH {
        (magnitude / WEEK, "wk", "wks")
    } else if magnitude < YEAR {
        (magnitude / MONTH, "mo", "mos")
    } else {
        (magnitude / YEAR, "yr", "yrs")
    };
    let unit = if count == 1 { singular } else { plural };

    if seconds > 0 {
        format!("{count} {unit} ago")
    } else {
        format!("in {count} {unit}")
    }
}
