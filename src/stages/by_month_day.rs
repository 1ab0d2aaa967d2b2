use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

fn resolve(configured: i8, days_in_month: u8) -> Option<u8> {
    if configured > 0 {
        let value = configured as u8;
        (value <= days_in_month).then_some(value)
    } else if configured < 0 {
        let resolved = days_in_month as i16 + configured as i16 + 1;
        (resolved >= 1).then_some(resolved as u8)
    } else {
        None
    }
}

/// SPEC_FULL.md §4.8. EXPAND under YEARLY/MONTHLY with no BYDAY/BYYEARDAY sibling, LIMIT
/// otherwise.
pub struct ByMonthDay {
    month_days: Vec<i8>,
    metrics: Arc<dyn CalendarMetrics>,
}

impl ByMonthDay {
    pub fn new(month_days: Vec<i8>, metrics: Arc<dyn CalendarMetrics>) -> Self {
        Self { month_days, metrics }
    }
}

impl ByFilter for ByMonthDay {
    fn name(&self) -> &'static str {
        "BYMONTHDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let Ok(days_in_month) = self.metrics.days_in_month(instance.year(), instance.month())
        else {
            return true;
        };

        !self
            .month_days
            .iter()
            .any(|&md| resolve(md, days_in_month) == Some(instance.day_of_month()))
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        let Ok(days_in_month) = self.metrics.days_in_month(instance.year(), instance.month())
        else {
            return;
        };

        for &configured in &self.month_days {
            let Some(day) = resolve(configured, days_in_month) else {
                continue;
            };

            out.append(instance.with_day_of_month(day));
        }
    }
}
