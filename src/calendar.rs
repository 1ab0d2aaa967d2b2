use chrono::{Datelike, Duration, NaiveDate};

use crate::error::RecurrenceError;
use crate::rule::Weekday;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn naive_date(year: i32, month0: u8, day: u8) -> Result<NaiveDate, RecurrenceError> {
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, day as u32).ok_or(
        RecurrenceError::InvalidField {
            year,
            month: month0,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        },
    )
}

/// Stateless Gregorian calendar arithmetic. All methods are pure and `Sync`; a single pipeline
/// uses exactly one implementation for its lifetime, per the external-interfaces contract.
pub trait CalendarMetrics: Sync {
    fn days_in_month(&self, year: i32, month0: u8) -> Result<u8, RecurrenceError>;
    fn days_in_year(&self, year: i32) -> Result<u16, RecurrenceError>;
    fn day_of_week(&self, year: i32, month0: u8, day: u8) -> Result<Weekday, RecurrenceError>;
    fn day_of_year(&self, year: i32, month0: u8, day: u8) -> Result<u16, RecurrenceError>;
    fn year_day_to_month_day(&self, year: i32, year_day: u16) -> Result<(u8, u8), RecurrenceError>;
    fn weekday_of_first_year_day(&self, year: i32) -> Result<Weekday, RecurrenceError>;

    /// ISO-style week number (minimum 4 days in the first week) generalized to an arbitrary
    /// week-start day. Returns `(owning_year, week_number)` - the owning year may differ from
    /// `year` near a calendar-year boundary (week 1 can dip into the prior December, the last
    /// week can reach into the following January).
    fn week_of_year(
        &self,
        year: i32,
        month0: u8,
        day: u8,
        week_start: Weekday,
    ) -> Result<(i32, u8), RecurrenceError>;

    /// Number of ISO-style weeks in `year` given `week_start` (52 or 53).
    fn weeks_in_year(&self, year: i32, week_start: Weekday) -> Result<u8, RecurrenceError>;

    /// The first day (a `week_start` weekday) of ISO week `week_number` of `year`.
    fn week_start_date(
        &self,
        year: i32,
        week_number: i8,
        week_start: Weekday,
    ) -> Result<(i32, u8, u8), RecurrenceError>;

    /// `(year, month0, day)` shifted by `delta` days (may be negative). Used by BYDAY to walk
    /// within a week without stages needing to depend on `chrono` themselves.
    fn add_days(&self, year: i32, month0: u8, day: u8, delta: i64) -> Result<(i32, u8, u8), RecurrenceError>;
}

/// The only calendar system this crate offers - plugging in another calendar system is out of
/// scope (see SPEC_FULL.md Non-goals).
#[derive(Debug, Default, Clone, Copy)]
pub struct GregorianCalendarMetrics;

impl GregorianCalendarMetrics {
    pub fn new() -> Self {
        Self
    }

    fn check_year(year: i32) -> Result<(), RecurrenceError> {
        if !(crate::instance::MIN_YEAR..=crate::instance::MAX_YEAR).contains(&year) {
            return Err(RecurrenceError::YearOutOfRange(year));
        }
        Ok(())
    }

    // The date of the most recent `week_start` weekday on or before `date`.
    fn week_start_on_or_before(date: NaiveDate, week_start: Weekday) -> NaiveDate {
        let offset = (date.weekday().num_days_from_monday() as i64
            - week_start.num_days_from_monday() as i64)
            .rem_euclid(7);
        date - Duration::days(offset)
    }

    fn week_owner(week_start_date: NaiveDate) -> (NaiveDate, i32) {
        let anchor = week_start_date + Duration::days(3);
        (anchor, anchor.year())
    }

    fn first_week_start_of(owning_year: i32, week_start: Weekday) -> NaiveDate {
        let jan1 = NaiveDate::from_ymd_opt(owning_year, 1, 1).expect("valid Jan 1");
        let mut first_ws = Self::week_start_on_or_before(jan1, week_start);
        let (_, anchor_year) = Self::week_owner(first_ws);

        if anchor_year < owning_year {
            first_ws += Duration::days(7);
        }

        first_ws
    }
}

impl CalendarMetrics for GregorianCalendarMetrics {
    fn days_in_month(&self, year: i32, month0: u8) -> Result<u8, RecurrenceError> {
        Self::check_year(year)?;

        let month0 = month0 as usize;
        if month0 >= 12 {
            return Err(RecurrenceError::InvalidField {
                year,
                month: month0 as u8,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
            });
        }

        if month0 == 1 && is_leap_year(year) {
            Ok(29)
        } else {
            Ok(DAYS_IN_MONTH[month0])
        }
    }

    fn days_in_year(&self, year: i32) -> Result<u16, RecurrenceError> {
        Self::check_year(year)?;
        Ok(if is_leap_year(year) { 366 } else { 365 })
    }

    fn day_of_week(&self, year: i32, month0: u8, day: u8) -> Result<Weekday, RecurrenceError> {
        let date = naive_date(year, month0, day)?;
        Ok(Weekday::from_num_days_from_monday(
            date.weekday().num_days_from_monday() as i8,
        ))
    }

    fn day_of_year(&self, year: i32, month0: u8, day: u8) -> Result<u16, RecurrenceError> {
        let date = naive_date(year, month0, day)?;
        Ok(date.ordinal() as u16)
    }

    fn year_day_to_month_day(&self, year: i32, year_day: u16) -> Result<(u8, u8), RecurrenceError> {
        Self::check_year(year)?;

        let days_in_year = self.days_in_year(year)?;
        if year_day == 0 || year_day > days_in_year {
            return Err(RecurrenceError::InvalidField {
                year,
                month: 0,
                day: year_day.min(255) as u8,
                hour: 0,
                minute: 0,
                second: 0,
            });
        }

        let date = NaiveDate::from_yo_opt(year, year_day as u32).ok_or(
            RecurrenceError::InvalidField {
                year,
                month: 0,
                day: 0,
                hour: 0,
                minute: 0,
                second: 0,
            },
        )?;

        Ok((date.month0() as u8, date.day() as u8))
    }

    fn weekday_of_first_year_day(&self, year: i32) -> Result<Weekday, RecurrenceError> {
        self.day_of_week(year, 0, 1)
    }

    fn week_of_year(
        &self,
        year: i32,
        month0: u8,
        day: u8,
        week_start: Weekday,
    ) -> Result<(i32, u8), RecurrenceError> {
        let date = naive_date(year, month0, day)?;
        let this_week_start = Self::week_start_on_or_before(date, week_start);
        let (_, owning_year) = Self::week_owner(this_week_start);
        let first_week_start = Self::first_week_start_of(owning_year, week_start);

        let week_number = (this_week_start - first_week_start).num_days() / 7 + 1;

        Ok((owning_year, week_number as u8))
    }

    fn weeks_in_year(&self, year: i32, week_start: Weekday) -> Result<u8, RecurrenceError> {
        // December 28th always falls in the last ISO-style week of `year`, regardless of
        // `week_start`, because it is at most 3 days from the 31st - the latest any anchor day
        // (week_start + 3) can land - so the week containing Dec 28 can never hand its ownership
        // to the following year.
        let (_, week_number) = self.week_of_year(year, 11, 28, week_start)?;
        Ok(week_number)
    }

    fn week_start_date(
        &self,
        year: i32,
        week_number: i8,
        week_start: Weekday,
    ) -> Result<(i32, u8, u8), RecurrenceError> {
        Self::check_year(year)?;

        let total_weeks = self.weeks_in_year(year, week_start)? as i32;
        let week_number = if week_number < 0 {
            total_weeks + week_number as i32 + 1
        } else {
            week_number as i32
        };

        if week_number < 1 || week_number > total_weeks {
            return Err(RecurrenceError::InvalidField {
                year,
                month: 0,
                day: week_number.clamp(0, 255) as u8,
                hour: 0,
                minute: 0,
                second: 0,
            });
        }

        let first_week_start = Self::first_week_start_of(year, week_start);
        let target = first_week_start + Duration::days(7 * (week_number as i64 - 1));

        Ok((target.year(), target.month0() as u8, target.day() as u8))
    }

    fn add_days(&self, year: i32, month0: u8, day: u8, delta: i64) -> Result<(i32, u8, u8), RecurrenceError> {
        let date = naive_date(year, month0, day)?;
        let shifted = date + Duration::days(delta);
        Ok((shifted.year(), shifted.month0() as u8, shifted.day() as u8))
    }
}
