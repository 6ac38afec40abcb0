//! Timestamps are stored in UTC with whole seconds so stored values compare
//! consistently on every backend.
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

pub fn now() -> DateTimeWithTimeZone {
    normalize(Utc::now())
}

pub fn normalize<Tz: TimeZone>(ts: DateTime<Tz>) -> DateTimeWithTimeZone {
    ts.with_timezone(&Utc).trunc_subsecs(0).fixed_offset()
}
