use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::error::RecurrenceError;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::rule::Frequency;
use crate::stage::Stage;

/// Emits one seed instance per period of the base frequency, advanced by the rule's interval.
/// The first stage in the pipeline - has no upstream. SPEC_FULL.md §4.3.
pub struct SourceStage {
    metrics: Arc<dyn CalendarMetrics>,
    frequency: Frequency,
    interval: u32,
    next_seed: Option<Instance>,
    current_set: OrderedInstanceSet,
}

impl SourceStage {
    pub fn new(metrics: Arc<dyn CalendarMetrics>, frequency: Frequency, interval: u32, start: Instance) -> Self {
        Self {
            metrics,
            frequency,
            interval: interval.max(1),
            next_seed: Some(start),
            current_set: OrderedInstanceSet::new(),
        }
    }

    fn advance(&self, seed: Instance) -> Result<Instance, RecurrenceError> {
        let interval = self.interval as i64;

        match self.frequency {
            Frequency::Yearly => self.advance_yearly(seed, interval),
            Frequency::Monthly => self.advance_monthly(seed, interval),
            Frequency::Weekly => Ok(self.advance_by_days(seed, 7 * interval)),
            Frequency::Daily => Ok(self.advance_by_days(seed, interval)),
            Frequency::Hourly => Ok(self.advance_by_seconds(seed, interval * 3600)),
            Frequency::Minutely => Ok(self.advance_by_seconds(seed, interval * 60)),
            Frequency::Secondly => Ok(self.advance_by_seconds(seed, interval)),
        }
    }

    // YEARLY advances by whole years; a Feb-29 start skips non-leap target years (RFC 5545
    // mandates skip, not clamp).
    fn advance_yearly(&self, seed: Instance, interval: i64) -> Result<Instance, RecurrenceError> {
        let mut year = seed.year() as i64 + interval;

        loop {
            if !(crate::instance::MIN_YEAR as i64..=crate::instance::MAX_YEAR as i64)
                .contains(&year)
            {
                return Err(RecurrenceError::YearOutOfRange(year as i32));
            }

            let days_in_month = self
                .metrics
                .days_in_month(year as i32, seed.month())?;

            if seed.day_of_month() <= days_in_month {
                return Ok(seed.with_year(year as i32));
            }

            year += interval.max(1);
        }
    }

    // MONTHLY advances the month, rolling the year; a day-of-month that doesn't exist in the
    // target month is skipped (not clamped), per SPEC_FULL.md §4.3.
    fn advance_monthly(&self, seed: Instance, interval: i64) -> Result<Instance, RecurrenceError> {
        let mut total_months = seed.year() as i64 * 12 + seed.month() as i64 + interval;

        loop {
            let year = total_months.div_euclid(12);
            let month0 = total_months.rem_euclid(12) as u8;

            if !(crate::instance::MIN_YEAR as i64..=crate::instance::MAX_YEAR as i64)
                .contains(&year)
            {
                return Err(RecurrenceError::YearOutOfRange(year as i32));
            }

            let days_in_month = self.metrics.days_in_month(year as i32, month0)?;

            if seed.day_of_month() <= days_in_month {
                return Ok(seed.with_year(year as i32).with_month(month0));
            }

            total_months += interval.max(1);
        }
    }

    fn advance_by_days(&self, seed: Instance, days: i64) -> Instance {
        use chrono::{Duration, NaiveDate, NaiveTime};

        let date = NaiveDate::from_ymd_opt(seed.year(), seed.month() as u32 + 1, seed.day_of_month() as u32)
            .expect("seed instances are always valid calendar dates");
        let advanced = date + Duration::days(days);
        let time = NaiveTime::from_hms_opt(seed.hour() as u32, seed.minute() as u32, seed.second() as u32)
            .expect("seed instances carry valid wall-clock times");

        use chrono::Datelike;
        use chrono::Timelike;

        Instance::new(
            advanced.year(),
            advanced.month0() as u8,
            advanced.day() as u8,
            time.hour() as u8,
            time.minute() as u8,
            time.second() as u8,
        )
    }

    fn advance_by_seconds(&self, seed: Instance, seconds: i64) -> Instance {
        use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
        use chrono::{Datelike, Timelike};

        let date = NaiveDate::from_ymd_opt(seed.year(), seed.month() as u32 + 1, seed.day_of_month() as u32)
            .expect("seed instances are always valid calendar dates");
        let time = NaiveTime::from_hms_opt(seed.hour() as u32, seed.minute() as u32, seed.second() as u32)
            .expect("seed instances carry valid wall-clock times");
        let datetime = NaiveDateTime::new(date, time) + Duration::seconds(seconds);

        Instance::new(
            datetime.year(),
            datetime.month0() as u8,
            datetime.day() as u8,
            datetime.hour() as u8,
            datetime.minute() as u8,
            datetime.second() as u8,
        )
    }
}

impl Stage for SourceStage {
    fn next(&mut self) -> Result<Option<Instance>, RecurrenceError> {
        let Some(seed) = self.next_seed else {
            return Ok(None);
        };

        self.next_seed = Some(self.advance(seed)?);
        Ok(Some(seed))
    }

    fn next_set(&mut self) -> Result<Option<&OrderedInstanceSet>, RecurrenceError> {
        let Some(seed) = self.next()? else {
            return Ok(None);
        };

        self.current_set.clear();
        self.current_set.append(seed);
        Ok(Some(&self.current_set))
    }
}
