use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.10. EXPAND below HOURLY, LIMIT at HOURLY-or-finer.
pub struct ByHour {
    hours: Vec<u8>,
}

impl ByHour {
    pub fn new(hours: Vec<u8>) -> Self {
        Self { hours }
    }
}

impl ByFilter for ByHour {
    fn name(&self) -> &'static str {
        "BYHOUR"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.hours.contains(&instance.hour())
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        for &hour in &self.hours {
            out.append(instance.with_hour(hour));
        }
    }
}
