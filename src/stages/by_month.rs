use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.5. EXPAND under YEARLY, LIMIT under MONTHLY-or-finer. `months` holds
/// RFC-5545-native values (1..=12).
pub struct ByMonth {
    months: Vec<u8>,
    metrics: Arc<dyn CalendarMetrics>,
}

impl ByMonth {
    pub fn new(months: Vec<u8>, metrics: Arc<dyn CalendarMetrics>) -> Self {
        Self { months, metrics }
    }
}

impl ByFilter for ByMonth {
    fn name(&self) -> &'static str {
        "BYMONTH"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.months.contains(&(instance.month() + 1))
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();

        for &month in &self.months {
            let month0 = month - 1;
            let Ok(days_in_month) = self.metrics.days_in_month(year, month0) else {
                continue;
            };

            if instance.day_of_month() > days_in_month {
                continue;
            }

            out.append(instance.with_month(month0));
        }
    }
}
