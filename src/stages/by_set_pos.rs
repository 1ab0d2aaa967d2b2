use crate::error::RecurrenceError;
use crate::instance::Instance;
use crate::limits::PipelineLimits;
use crate::ordered_set::OrderedInstanceSet;
use crate::stage::Stage;

/// SPEC_FULL.md §4.11. Unlike every other BY-stage, BYSETPOS operates on a whole expanded batch
/// at once rather than candidate-by-candidate, so it implements `Stage` directly instead of going
/// through `FilterStage`/`ByFilter`.
pub struct BySetPos {
    previous: Box<dyn Stage>,
    positions: Vec<i16>,
    limits: PipelineLimits,
    rule_summary: String,
    current_set: OrderedInstanceSet,
}

impl BySetPos {
    pub fn new(
        previous: Box<dyn Stage>,
        positions: Vec<i16>,
        limits: PipelineLimits,
        rule_summary: String,
    ) -> Self {
        Self {
            previous,
            positions,
            limits,
            rule_summary,
            current_set: OrderedInstanceSet::new(),
        }
    }

    fn select(&self, batch: &OrderedInstanceSet) -> OrderedInstanceSet {
        let mut selected = OrderedInstanceSet::new();
        let len = batch.len() as i64;

        for &position in &self.positions {
            let index = if position > 0 {
                position as i64 - 1
            } else if position < 0 {
                len + position as i64
            } else {
                continue;
            };

            if index >= 0 && index < len {
                selected.append(batch.as_slice()[index as usize]);
            }
        }

        selected.sort();
        selected
    }
}

impl Stage for BySetPos {
    fn next(&mut self) -> Result<Option<Instance>, RecurrenceError> {
        if !self.current_set.has_next() {
            if self.next_set()?.is_none() {
                return Ok(None);
            }
        }
        Ok(Some(self.current_set.next()))
    }

    fn next_set(&mut self) -> Result<Option<&OrderedInstanceSet>, RecurrenceError> {
        let mut empty_sets = 0u32;

        loop {
            let Some(batch) = self.previous.next_set()? else {
                return Ok(None);
            };

            let selected = self.select(batch);
            if !selected.is_empty() {
                self.current_set = selected;
                return Ok(Some(&self.current_set));
            }

            empty_sets += 1;
            if empty_sets > self.limits.max_empty_sets() {
                return Err(RecurrenceError::OverConstrained {
                    stage: "BYSETPOS",
                    rule_summary: self.rule_summary.clone(),
                });
            }
        }
    }
}
