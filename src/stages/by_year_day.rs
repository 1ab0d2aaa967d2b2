use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

fn resolve(configured: i16, days_in_year: u16) -> Option<u16> {
    if configured > 0 {
        let value = configured as u16;
        (value <= days_in_year).then_some(value)
    } else if configured < 0 {
        let resolved = days_in_year as i32 + configured as i32 + 1;
        (resolved >= 1).then_some(resolved as u16)
    } else {
        None
    }
}

/// SPEC_FULL.md §4.7. EXPAND under YEARLY with no BYMONTH/BYMONTHDAY sibling, LIMIT otherwise
/// (only reachable at all under YEARLY, per RFC 5545).
pub struct ByYearDay {
    year_days: Vec<i16>,
    metrics: Arc<dyn CalendarMetrics>,
}

impl ByYearDay {
    pub fn new(year_days: Vec<i16>, metrics: Arc<dyn CalendarMetrics>) -> Self {
        Self { year_days, metrics }
    }
}

impl ByFilter for ByYearDay {
    fn name(&self) -> &'static str {
        "BYYEARDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let Ok(days_in_year) = self.metrics.days_in_year(instance.year()) else {
            return true;
        };
        let Ok(candidate_year_day) =
            self.metrics
                .day_of_year(instance.year(), instance.month(), instance.day_of_month())
        else {
            return true;
        };

        !self
            .year_days
            .iter()
            .any(|&yd| resolve(yd, days_in_year) == Some(candidate_year_day))
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();
        let Ok(days_in_year) = self.metrics.days_in_year(year) else {
            return;
        };

        for &configured in &self.year_days {
            let Some(year_day) = resolve(configured, days_in_year) else {
                continue;
            };

            let Ok((month0, day)) = self.metrics.year_day_to_month_day(year, year_day) else {
                continue;
            };

            out.append(Instance::new(
                year,
                month0,
                day,
                instance.hour(),
                instance.minute(),
                instance.second(),
            ));
        }
    }
}
