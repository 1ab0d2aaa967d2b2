use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::rule::Weekday;
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.6. Only valid with a YEARLY base, always EXPAND - the downstream BYDAY stage
/// (or, absent BYDAY, the week-start weekday itself) refines the day-of-week.
pub struct ByWeekNo {
    weeks: Vec<i8>,
    week_start: Weekday,
    metrics: Arc<dyn CalendarMetrics>,
}

impl ByWeekNo {
    pub fn new(weeks: Vec<i8>, week_start: Weekday, metrics: Arc<dyn CalendarMetrics>) -> Self {
        Self {
            weeks,
            week_start,
            metrics,
        }
    }
}

impl ByFilter for ByWeekNo {
    fn name(&self) -> &'static str {
        "BYWEEKNO"
    }

    fn filter(&self, instance: Instance) -> bool {
        let Ok((_, week)) = self.metrics.week_of_year(
            instance.year(),
            instance.month(),
            instance.day_of_month(),
            self.week_start,
        ) else {
            return true;
        };

        let Ok(total_weeks) = self.metrics.weeks_in_year(instance.year(), self.week_start) else {
            return true;
        };

        !self.weeks.iter().any(|&w| resolve_week(w, total_weeks) == Some(week))
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();

        for &week in &self.weeks {
            let Ok((wy, wm0, wd)) = self.metrics.week_start_date(year, week, self.week_start) else {
                continue;
            };

            out.append(Instance::new(
                wy,
                wm0,
                wd,
                instance.hour(),
                instance.minute(),
                instance.second(),
            ));
        }
    }
}

fn resolve_week(configured: i8, total_weeks: u8) -> Option<u8> {
    if configured > 0 {
        Some(configured as u8)
    } else if configured < 0 {
        let resolved = total_weeks as i16 + configured as i16 + 1;
        if resolved >= 1 {
            Some(resolved as u8)
        } else {
            None
        }
    } else {
        None
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
    fn expand_week_one_of_2023_monday_start_falls_before_jan_2() {
        let by_week_no = ByWeekNo::new(vec![1], Weekday::Monday, metrics());
        let instance = Instance::new(2023, 0, 2, 9, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_week_no.expand(&mut out, instance, instance);
        out.sort();

        let first = out.iter().next().unwrap();
        assert_eq!((first.year(), first.month(), first.day_of_month()), (2023, 0, 2));
    }

    #[test]
    fn negative_week_number_resolves_from_the_end() {
        let by_week_no = ByWeekNo::new(vec![-1], Weekday::Monday, metrics());
        let instance = Instance::new(2020, 0, 1, 0, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_week_no.expand(&mut out, instance, instance);

        assert_eq!(out.len(), 1);
        let emitted = out.iter().next().unwrap();
        assert_eq!(emitted.year(), 2020);
    }
}
