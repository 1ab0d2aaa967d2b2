use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// Base recurrence frequency, ordered coarsest to finest so stages can compare
/// `frequency >= Frequency::Hourly` style checks (used by the BYHOUR/BYMINUTE/BYSECOND
/// EXPAND-vs-LIMIT matrix in SPEC_FULL.md §4.10).
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

/// 0 = Monday .. 6 = Sunday (ISO ordering). The external rule parser is responsible for
/// translating RFC 5545's two-letter day codes (SU, MO, ...) into this representation.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn num_days_from_monday(self) -> i8 {
        self as i8
    }

    pub fn from_num_days_from_monday(value: i8) -> Self {
        Self::ALL[value.rem_euclid(7) as usize]
    }

    pub fn succ(self) -> Self {
        Self::from_num_days_from_monday(self.num_days_from_monday() + 1)
    }
}

/// A (position, weekday) pair as used by BYDAY, e.g. "2TU" (the second Tuesday) is
/// `WeekdayNum { position: 2, weekday: Weekday::Tuesday }`. Position `0` means "any occurrence".
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct WeekdayNum {
    pub position: i8,
    pub weekday: Weekday,
}

impl WeekdayNum {
    pub fn new(position: i8, weekday: Weekday) -> Self {
        Self { position, weekday }
    }

    pub fn any(weekday: Weekday) -> Self {
        Self::new(0, weekday)
    }

    /// Packs `(position, weekday)` into a single `i16` key so BYDAY membership checks become
    /// an integer linear scan over a small sorted slice, per SPEC_FULL.md §3.
    pub fn packed_key(self) -> i16 {
        (self.position as i16) * 8 + self.weekday.num_days_from_monday() as i16
    }
}

/// The temporal window a BYDAY stage interprets positional indices against, computed at stage
/// construction from frequency + companion BY-parts (SPEC_FULL.md §3/§4.9).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Scope {
    Weekly,
    Monthly,
    WeeklyAndMonthly,
    Yearly,
}

/// The immutable rule descriptor the core consumes. Missing BY-parts are `None`, never `Some(vec![])`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ParsedRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub week_start: Weekday,

    pub by_month: Option<Vec<u8>>,
    pub by_week_no: Option<Vec<i8>>,
    pub by_year_day: Option<Vec<i16>>,
    pub by_month_day: Option<Vec<i8>>,
    pub by_day: Option<Vec<WeekdayNum>>,
    pub by_hour: Option<Vec<u8>>,
    pub by_minute: Option<Vec<u8>>,
    pub by_second: Option<Vec<u8>>,
    pub by_set_pos: Option<Vec<i16>>,

    // Opaque to the core - the external wrapper interprets these to truncate the stream.
    pub count: Option<u32>,
    pub until: Option<Instance>,
}

impl ParsedRule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            week_start: Weekday::Monday,
            by_month: None,
            by_week_no: None,
            by_year_day: None,
            by_month_day: None,
            by_day: None,
            by_hour: None,
            by_minute: None,
            by_second: None,
            by_set_pos: None,
            count: None,
            until: None,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn with_by_month(mut self, mut months: Vec<u8>) -> Self {
        months.sort_unstable();
        months.dedup();
        self.by_month = Some(months);
        self
    }

    pub fn with_by_week_no(mut self, mut weeks: Vec<i8>) -> Self {
        weeks.sort_unstable();
        weeks.dedup();
        self.by_week_no = Some(weeks);
        self
    }

    pub fn with_by_year_day(mut self, mut year_days: Vec<i16>) -> Self {
        year_days.sort_unstable();
        year_days.dedup();
        self.by_year_day = Some(year_days);
        self
    }

    pub fn with_by_month_day(mut self, mut month_days: Vec<i8>) -> Self {
        month_days.sort_unstable();
        month_days.dedup();
        self.by_month_day = Some(month_days);
        self
    }

    pub fn with_by_day(mut self, mut weekday_nums: Vec<WeekdayNum>) -> Self {
        weekday_nums.sort_unstable_by_key(|weekday_num| weekday_num.packed_key());
        weekday_nums.dedup();
        self.by_day = Some(weekday_nums);
        self
    }

    pub fn with_by_hour(mut self, mut hours: Vec<u8>) -> Self {
        hours.sort_unstable();
        hours.dedup();
        self.by_hour = Some(hours);
        self
    }

    pub fn with_by_minute(mut self, mut minutes: Vec<u8>) -> Self {
        minutes.sort_unstable();
        minutes.dedup();
        self.by_minute = Some(minutes);
        self
    }

    pub fn with_by_second(mut self, mut seconds: Vec<u8>) -> Self {
        seconds.sort_unstable();
        seconds.dedup();
        self.by_second = Some(seconds);
        self
    }

    pub fn with_by_set_pos(mut self, mut positions: Vec<i16>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        self.by_set_pos = Some(positions);
        self
    }

    /// Whether the BYDAY stage is in EXPAND mode (it multiplies candidates) or LIMIT mode
    /// (it filters them), per SPEC_FULL.md §4.9.
    pub fn by_day_is_expand(&self) -> bool {
        match self.frequency {
            Frequency::Weekly => true,
            Frequency::Yearly | Frequency::Monthly => {
                self.by_year_day.is_none() && self.by_month_day.is_none()
            }
            Frequency::Daily | Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                false
            }
        }
    }

    /// The scope a BYDAY stage in EXPAND mode should use. Only meaningful when
    /// `by_day_is_expand()` is `true`.
    pub fn by_day_scope(&self) -> Scope {
        let has_by_week_no = self.by_week_no.is_some();
        let has_by_month = self.by_month.is_some();

        match self.frequency {
            Frequency::Weekly => {
                if has_by_month {
                    Scope::WeeklyAndMonthly
                } else {
                    Scope::Weekly
                }
            }
            Frequency::Monthly => {
                if has_by_week_no {
                    Scope::WeeklyAndMonthly
                } else {
                    Scope::Monthly
                }
            }
            Frequency::Yearly => {
                if has_by_week_no {
                    Scope::WeeklyAndMonthly
                } else if has_by_month {
                    // BYMONTH has already narrowed each candidate to a single month, so
                    // positional BYDAY indices (e.g. "2TU") are counted within that month,
                    // not across the whole year.
                    Scope::Monthly
                } else {
                    Scope::Yearly
                }
            }
            Frequency::Daily | Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                Scope::Monthly
            }
        }
    }

    pub fn by_month_expand(&self) -> bool {
        self.frequency == Frequency::Yearly
    }

    pub fn by_year_day_expand(&self) -> bool {
        self.frequency == Frequency::Yearly
            && self.by_month.is_none()
            && self.by_month_day.is_none()
    }

    pub fn by_month_day_expand(&self) -> bool {
        matches!(self.frequency, Frequency::Yearly | Frequency::Monthly)
            && self.by_day.is_none()
            && self.by_year_day.is_none()
    }

    pub fn by_hour_expand(&self) -> bool {
        self.frequency < Frequency::Hourly
    }

    pub fn by_minute_expand(&self) -> bool {
        self.frequency < Frequency::Minutely
    }

    pub fn by_second_expand(&self) -> bool {
        self.frequency < Frequency::Secondly
    }
}
