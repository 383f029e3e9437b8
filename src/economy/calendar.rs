//! Calendar-day boundaries for daily refills

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};

/// Decides when two instants fall on the same calendar day
pub trait DayCalendar: Send + Sync + std::fmt::Debug {
    fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool;

    /// The first instant of the calendar day after `now`
    fn next_day_start(&self, now: DateTime<Utc>) -> DateTime<Utc>;
}

/// A calendar pinned to a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetCalendar {
    offset: FixedOffset,
}

impl FixedOffsetCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Offset in minutes east of UTC; `None` outside +/- 24 hours
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }
}

impl Default for FixedOffsetCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl DayCalendar for FixedOffsetCalendar {
    fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        a.with_timezone(&self.offset).date_naive() == b.with_timezone(&self.offset).date_naive()
    }

    fn next_day_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.offset).date_naive();
        today
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
            .and_then(|midnight| self.offset.from_local_datetime(&midnight).single())
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| now + Duration::days(1))
    }
}
