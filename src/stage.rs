use crate::error::RecurrenceError;
use crate::instance::Instance;
use crate::ordered_set::OrderedInstanceSet;
use crate::limits::PipelineLimits;

/// The shared pull interface every pipeline stage exposes, from the source up through BYSETPOS.
/// Mirrors SPEC_FULL.md §4.4's two pull shapes.
pub trait Stage {
    fn next(&mut self) -> Result<Option<Instance>, RecurrenceError>;
    fn next_set(&mut self) -> Result<Option<&OrderedInstanceSet>, RecurrenceError>;
}

/// Whether a BY-stage multiplies its input (`Expand`) or drops input that fails its predicate
/// (`Limit`). Derived once, at stage construction time, from frequency + sibling BY-parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMode {
    Expand,
    Limit,
}

/// The two hooks a concrete BY-stage implements. `filter` is only ever called in `Limit` mode,
/// `expand` only in `Expand` mode - `FilterStage` never calls the other one.
pub trait ByFilter {
    /// Stage name used in `RecurrenceError::OverConstrained` messages (e.g. `"BYMONTH"`).
    fn name(&self) -> &'static str;

    /// `true` means "drop this candidate".
    fn filter(&self, instance: Instance) -> bool;

    /// Appends zero or more instances derived from `instance` to `out`. `start` is the
    /// pipeline's original start instance, carried through for stages (BYMONTH, BYMONTHDAY, ...)
    /// that need the rule's original day/time to replay onto newly expanded fields.
    fn expand(&self, out: &mut OrderedInstanceSet, instance: Instance, start: Instance);
}

/// The concrete adapter that composes a `ByFilter` implementation with its upstream stage and
/// implements the shared pull/batch-pull logic exactly once (SPEC_FULL.md §9,
/// "Inheritance -> trait/capability").
pub struct FilterStage<F: ByFilter> {
    previous: Box<dyn Stage>,
    filter_impl: F,
    mode: StageMode,
    start: Instance,
    limits: PipelineLimits,
    rule_summary: String,
    current_set: OrderedInstanceSet,
}

impl<F: ByFilter> FilterStage<F> {
    pub fn new(
        previous: Box<dyn Stage>,
        filter_impl: F,
        mode: StageMode,
        start: Instance,
        limits: PipelineLimits,
        rule_summary: String,
    ) -> Self {
        Self {
            previous,
            filter_impl,
            mode,
            start,
            limits,
            rule_summary,
            current_set: OrderedInstanceSet::new(),
        }
    }

    fn over_constrained(&self) -> RecurrenceError {
        RecurrenceError::OverConstrained {
            stage: self.filter_impl.name(),
            rule_summary: self.rule_summary.clone(),
        }
    }

    // Pulls ONE instance at a time from upstream (rather than a whole batch) and expands just
    // that instance into the next batch. This keeps each upstream instance's expansion as its
    // own distinct batch - required so that e.g. a YEARLY;BYMONTH=3,9;BYDAY=TU;BYSETPOS=2 rule
    // applies BYSETPOS separately within March and within September, instead of across a single
    // batch merging both months.
    fn refill_expand(&mut self) -> Result<bool, RecurrenceError> {
        let mut empty_sets = 0u32;

        loop {
            let Some(instance) = self.previous.next()? else {
                return Ok(false);
            };

            self.current_set.clear();
            self.filter_impl.expand(&mut self.current_set, instance, self.start);
            self.current_set.sort();

            if !self.current_set.is_empty() {
                return Ok(true);
            }

            empty_sets += 1;
            if empty_sets > self.limits.max_empty_sets() {
                return Err(self.over_constrained());
            }
        }
    }

    fn refill_limit(&mut self) -> Result<bool, RecurrenceError> {
        let mut empty_sets = 0u32;

        loop {
            let Some(prev_set) = self.previous.next_set()? else {
                return Ok(false);
            };

            self.current_set.clear();
            for instance in prev_set.iter() {
                if !self.filter_impl.filter(*instance) {
                    self.current_set.append(*instance);
                }
            }

            if !self.current_set.is_empty() {
                return Ok(true);
            }

            empty_sets += 1;
            if empty_sets > self.limits.max_empty_sets() {
                return Err(self.over_constrained());
            }
        }
    }
}

impl<F: ByFilter> Stage for FilterStage<F> {
    fn next(&mut self) -> Result<Option<Instance>, RecurrenceError> {
        match self.mode {
            StageMode::Expand => {
                if !self.current_set.has_next() {
                    if !self.refill_expand()? {
                        return Ok(None);
                    }
                }
                Ok(Some(self.current_set.next()))
            }

            StageMode::Limit => {
                let mut empty_instances = 0u32;
                loop {
                    let Some(instance) = self.previous.next()? else {
                        return Ok(None);
                    };

                    if !self.filter_impl.filter(instance) {
                        return Ok(Some(instance));
                    }

                    empty_instances += 1;
                    if empty_instances > self.limits.max_empty_instances() {
                        return Err(self.over_constrained());
                    }
                }
            }
        }
    }

    fn next_set(&mut self) -> Result<Option<&OrderedInstanceSet>, RecurrenceError> {
        let refilled = match self.mode {
            StageMode::Expand => self.refill_expand()?,
            StageMode::Limit => self.refill_limit()?,
        };

        if refilled {
            Ok(Some(&self.current_set))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    struct ConstantSource {
        remaining: u32,
        instance: Instance,
    }

    impl Stage for ConstantSource {
        fn next(&mut self) -> Result<Option<Instance>, RecurrenceError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(self.instance))
        }

        fn next_set(&mut self) -> Result<Option<&OrderedInstanceSet>, RecurrenceError> {
            unimplemented!("not exercised in these tests")
        }
    }

    struct RejectEverything;

    impl ByFilter for RejectEverything {
        fn name(&self) -> &'static str {
            "TEST"
        }

        fn filter(&self, _instance: Instance) -> bool {
            true
        }

        fn expand(&self, _out: &mut OrderedInstanceSet, _instance: Instance, _start: Instance) {}
    }

    #[test]
    fn limit_mode_trips_over_constrained_after_max_empty_instances() {
        let start = Instance::new(2024, 0, 1, 0, 0, 0);
        let source = ConstantSource {
            remaining: 10_000,
            instance: start,
        };

        let mut stage = FilterStage::new(
            Box::new(source),
            RejectEverything,
            StageMode::Limit,
            start,
            PipelineLimits::new().with_max_empty_instances(5),
            "FREQ=DAILY".to_string(),
        );

        let error = stage.next().unwrap_err();
        assert_eq!(
            error,
            RecurrenceError::OverConstrained {
                stage: "TEST",
                rule_summary: "FREQ=DAILY".to_string(),
            }
        );
    }

    #[test]
    fn limit_mode_returns_none_when_upstream_is_exhausted() {
        let start = Instance::new(2024, 0, 1, 0, 0, 0);
        let source = ConstantSource {
            remaining: 0,
            instance: start,
        };

        let mut stage = FilterStage::new(
            Box::new(source),
            RejectEverything,
            StageMode::Limit,
            start,
            PipelineLimits::new(),
            "FREQ=DAILY".to_string(),
        );

        assert_eq!(stage.next().unwrap(), None);
    }
}
