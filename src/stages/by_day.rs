use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::rule::{Scope, Weekday, WeekdayNum};
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.9. The most context-sensitive stage: both its EXPAND/LIMIT mode and, in
/// EXPAND mode, the window positional indices are counted against (`Scope`) are decided once at
/// pipeline-construction time from the rule's frequency and companion BY-parts.
pub struct ByDay {
    weekday_nums: Vec<WeekdayNum>,
    scope: Scope,
    week_start: Weekday,
    by_month: Option<Vec<u8>>,
    metrics: Arc<dyn CalendarMetrics>,
}

impl ByDay {
    pub fn new(
        weekday_nums: Vec<WeekdayNum>,
        scope: Scope,
        week_start: Weekday,
        by_month: Option<Vec<u8>>,
        metrics: Arc<dyn CalendarMetrics>,
    ) -> Self {
        Self {
            weekday_nums,
            scope,
            week_start,
            by_month,
            metrics,
        }
    }

    fn expand_weekly(&self, out: &mut OrderedInstanceSet, instance: Instance) {
        let Ok((owning_year, week)) = self.metrics.week_of_year(
            instance.year(),
            instance.month(),
            instance.day_of_month(),
            self.week_start,
        ) else {
            return;
        };

        let Ok((wy, wm0, wd)) = self
            .metrics
            .week_start_date(owning_year, week as i8, self.week_start)
        else {
            return;
        };

        for wn in &self.weekday_nums {
            let offset = (wn.weekday.num_days_from_monday() as i64
                - self.week_start.num_days_from_monday() as i64)
                .rem_euclid(7);

            let Ok((ty, tm0, td)) = self.metrics.add_days(wy, wm0, wd, offset) else {
                continue;
            };

            let candidate = Instance::new(ty, tm0, td, instance.hour(), instance.minute(), instance.second());

            if self.scope == Scope::WeeklyAndMonthly {
                let keep = match &self.by_month {
                    Some(months) => months.contains(&(candidate.month() + 1)),
                    None => candidate.month() == instance.month(),
                };
                if !keep {
                    continue;
                }
            }

            out.append(candidate);
        }
    }

    fn expand_monthly(&self, out: &mut OrderedInstanceSet, instance: Instance) {
        let year = instance.year();
        let month0 = instance.month();
        let Ok(days_in_month) = self.metrics.days_in_month(year, month0) else {
            return;
        };
        let Ok(weekday_of_first) = self.metrics.day_of_week(year, month0, 1) else {
            return;
        };

        for wn in &self.weekday_nums {
            if wn.position == 0 {
                for day in 1..=days_in_month {
                    let Ok(weekday) = self.metrics.day_of_week(year, month0, day) else {
                        continue;
                    };
                    if weekday == wn.weekday {
                        out.append(Instance::new(year, month0, day, instance.hour(), instance.minute(), instance.second()));
                    }
                }
                continue;
            }

            let offset = (wn.weekday.num_days_from_monday() as i64
                - weekday_of_first.num_days_from_monday() as i64)
                .rem_euclid(7);
            let first_day = 1 + offset;

            let day = if wn.position > 0 {
                first_day + (wn.position as i64 - 1) * 7
            } else {
                let occurrences = (days_in_month as i64 - first_day) / 7;
                let last_day = first_day + 7 * occurrences;
                last_day + (wn.position as i64 + 1) * 7
            };

            if day >= 1 && day <= days_in_month as i64 {
                out.append(Instance::new(year, month0, day as u8, instance.hour(), instance.minute(), instance.second()));
            }
        }
    }

    fn expand_yearly(&self, out: &mut OrderedInstanceSet, instance: Instance) {
        let year = instance.year();
        let Ok(days_in_year) = self.metrics.days_in_year(year) else {
            return;
        };
        let Ok(weekday_of_first) = self.metrics.weekday_of_first_year_day(year) else {
            return;
        };

        for wn in &self.weekday_nums {
            if wn.position == 0 {
                for year_day in 1..=days_in_year {
                    let offset = (year_day as i64 - 1).rem_euclid(7);
                    let weekday = Weekday::from_num_days_from_monday(
                        (weekday_of_first.num_days_from_monday() as i64 + offset).rem_euclid(7) as i8,
                    );
                    if weekday == wn.weekday {
                        self.append_year_day(out, instance, year, year_day);
                    }
                }
                continue;
            }

            let offset = (wn.weekday.num_days_from_monday() as i64
                - weekday_of_first.num_days_from_monday() as i64)
                .rem_euclid(7);
            let first_year_day = 1 + offset;

            let year_day = if wn.position > 0 {
                first_year_day + (wn.position as i64 - 1) * 7
            } else {
                let occurrences = (days_in_year as i64 - first_year_day) / 7;
                let last_year_day = first_year_day + 7 * occurrences;
                last_year_day + (wn.position as i64 + 1) * 7
            };

            if year_day >= 1 && year_day <= days_in_year as i64 {
                self.append_year_day(out, instance, year, year_day as u16);
            }
        }
    }

    fn append_year_day(&self, out: &mut OrderedInstanceSet, instance: Instance, year: i32, year_day: u16) {
        let Ok((month0, day)) = self.metrics.year_day_to_month_day(year, year_day) else {
            return;
        };
        out.append(Instance::new(year, month0, day, instance.hour(), instance.minute(), instance.second()));
    }

    // Both the from-the-start and from-the-end occurrence number of `instance`'s weekday within
    // its containing month. Used by LIMIT mode so a configured negative position (e.g. "-1FR")
    // matches independently of how many Fridays the month has, without silently reinterpreting it
    // as a from-the-start index.
    fn monthly_positions(&self, instance: Instance) -> Option<(i64, i64)> {
        let year = instance.year();
        let month0 = instance.month();
        let days_in_month = self.metrics.days_in_month(year, month0).ok()?;
        let weekday = self.metrics.day_of_week(year, month0, instance.day_of_month()).ok()?;
        let weekday_of_first = self.metrics.day_of_week(year, month0, 1).ok()?;

        let offset = (weekday.num_days_from_monday() as i64 - weekday_of_first.num_days_from_monday() as i64)
            .rem_euclid(7);
        let first_day = 1 + offset;
        let occurrences = (days_in_month as i64 - first_day) / 7 + 1;
        let from_start = (instance.day_of_month() as i64 - first_day) / 7 + 1;
        let from_end = from_start - occurrences - 1;

        Some((from_start, from_end))
    }

    fn yearly_positions(&self, instance: Instance) -> Option<(i64, i64)> {
        let year = instance.year();
        let days_in_year = self.metrics.days_in_year(year).ok()?;
        let year_day = self.metrics.day_of_year(year, instance.month(), instance.day_of_month()).ok()?;
        let weekday_of_first = self.metrics.weekday_of_first_year_day(year).ok()?;
        let weekday = self.metrics.day_of_week(year, instance.month(), instance.day_of_month()).ok()?;

        let first_year_day = 1 + (weekday.num_days_from_monday() as i64
            - weekday_of_first.num_days_from_monday() as i64)
            .rem_euclid(7);
        let occurrences = (days_in_year as i64 - first_year_day) / 7 + 1;
        let from_start = (year_day as i64 - first_year_day) / 7 + 1;
        let from_end = from_start - occurrences - 1;

        Some((from_start, from_end))
    }
}

impl ByFilter for ByDay {
    fn name(&self) -> &'static str {
        "BYDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let Ok(candidate_weekday) = self
            .metrics
            .day_of_week(instance.year(), instance.month(), instance.day_of_month())
        else {
            return true;
        };

        match self.scope {
            Scope::Weekly | Scope::WeeklyAndMonthly => !self
                .weekday_nums
                .iter()
                .any(|wn| wn.weekday == candidate_weekday),

            Scope::Monthly => {
                let Some((from_start, from_end)) = self.monthly_positions(instance) else {
                    return true;
                };
                !self.weekday_nums.iter().any(|wn| {
                    wn.weekday == candidate_weekday
                        && (wn.position == 0 || wn.position as i64 == from_start || wn.position as i64 == from_end)
                })
            }

            Scope::Yearly => {
                let Some((from_start, from_end)) = self.yearly_positions(instance) else {
                    return true;
                };
                !self.weekday_nums.iter().any(|wn| {
                    wn.weekday == candidate_weekday
                        && (wn.position == 0 || wn.position as i64 == from_start || wn.position as i64 == from_end)
                })
            }
        }
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        match self.scope {
            Scope::Weekly | Scope::WeeklyAndMonthly => self.expand_weekly(out, instance),
            Scope::Monthly => self.expand_monthly(out, instance),
            Scope::Yearly => self.expand_yearly(out, instance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::GregorianCalendarMetrics;
    use pretty_assertions_sorted::assert_eq;

    fn metrics() -> Arc<dyn CalendarMetrics> {
        Arc::new(GregorianCalendarMetrics::new())
    }

    #[test]
    fn expand_weekly_emits_each_configured_weekday_within_the_instance_week() {
        let by_day = ByDay::new(
            vec![WeekdayNum::any(Weekday::Monday), WeekdayNum::any(Weekday::Friday)],
            Scope::Weekly,
            Weekday::Monday,
            None,
            metrics(),
        );
        let instance = Instance::new(2024, 0, 3, 9, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_day.expand(&mut out, instance, instance);
        out.sort();

        let days: Vec<u8> = out.iter().map(|i| i.day_of_month()).collect();
        assert_eq!(days, vec![1, 5]);
    }

    #[test]
    fn expand_monthly_second_tuesday() {
        let by_day = ByDay::new(
            vec![WeekdayNum::new(2, Weekday::Tuesday)],
            Scope::Monthly,
            Weekday::Monday,
            None,
            metrics(),
        );
        let instance = Instance::new(2024, 2, 1, 0, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_day.expand(&mut out, instance, instance);

        assert_eq!(out.len(), 1);
        assert_eq!(out.iter().next().unwrap().day_of_month(), 12);
    }

    #[test]
    fn expand_monthly_last_friday() {
        let by_day = ByDay::new(
            vec![WeekdayNum::new(-1, Weekday::Friday)],
            Scope::Monthly,
            Weekday::Monday,
            None,
            metrics(),
        );
        let instance = Instance::new(2024, 2, 1, 0, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_day.expand(&mut out, instance, instance);

        assert_eq!(out.iter().next().unwrap().day_of_month(), 29);
    }

    #[test]
    fn filter_monthly_matches_independent_positive_and_negative_positions() {
        let by_day = ByDay::new(
            vec![WeekdayNum::new(-1, Weekday::Friday)],
            Scope::Monthly,
            Weekday::Monday,
            None,
            metrics(),
        );

        assert!(!by_day.filter(Instance::new(2024, 2, 29, 0, 0, 0)));
        assert!(by_day.filter(Instance::new(2024, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn filter_weekly_scope_ignores_position() {
        let by_day = ByDay::new(
            vec![WeekdayNum::new(3, Weekday::Monday)],
            Scope::Weekly,
            Weekday::Monday,
            None,
            metrics(),
        );

        assert!(!by_day.filter(Instance::new(2024, 0, 1, 0, 0, 0)));
    }
}
