use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::ByFilter;

/// SPEC_FULL.md §4.10. EXPAND below SECONDLY, LIMIT at SECONDLY.
pub struct BySecond {
    seconds: Vec<u8>,
}

impl BySecond {
    pub fn new(seconds: Vec<u8>) -> Self {
        Self { seconds }
    }
}

impl ByFilter for BySecond {
    fn name(&self) -> &'static str {
        "BYSECOND"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.seconds.contains(&instance.second())
    }

    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, _start: Instance) {
        for &second in &self.seconds {
            out.append(instance.with_second(second));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn expand_emits_one_instance_per_configured_second() {
        let by_second = BySecond::new(vec![0, 30]);
        let instance = Instance::new(2024, 0, 1, 9, 0, 0);

        let mut out = OrderedInstanceSet::new();
        by_second.expand(&mut out, instance, instance);
        out.sort();

        let seconds: Vec<u8> = out.iter().map(|i| i.second()).collect();
        assert_eq!(seconds, vec![0, 30]);
    }

    #[test]
    fn filter_drops_seconds_not_in_set() {
        let by_second = BySecond::new(vec![45]);
        assert!(!by_second.filter(Instance::new(2024, 0, 1, 9, 0, 45)));
        assert!(by_second.filter(Instance::new(2024, 0, 1, 9, 0, 46)));
    }
}
