use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.10. EXPAND below MINUTELY, LIMIT at MINUTELY-or-finer.
pub struct ByMinute {
    minutes: Vec<u8>,
}

impl ByMinute {
    pub fn new(minutes: Vec<u8>) -> Self {
        Self { minutes }
    }
}

impl ByFilter for ByMinute {
    fn name(&self) -> &'static str {
        "BYMINUTE"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.minutes.contains(&instance.minute())
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        for &minute in &self.minutes {
            out.append(instance.with_minute(minute));
        }
    }
}
