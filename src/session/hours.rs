//! Market-hours gate for US equities.
//!
//! A pure function of a timestamp: the market is considered open strictly
//! between 09:30:00 and 16:00:00 US Eastern. Weekends, holidays and early
//! closes are deliberately not modelled; this is a documented limitation of
//! the fixed open/close window, not a defect to silently fix.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::America::New_York;

/// Whether the market is open at the given instant.
pub fn market_open_at(now: DateTime<Utc>) -> bool {
    let time = now.with_timezone(&New_York).time();
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    open < time && time < close
}

/// Whether the market is open right now.
pub fn market_open() -> bool {
    market_open_at(Utc::now())
}
