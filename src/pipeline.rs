use std::sync::Arc;

use crate::calendar::CalendarMetrics;
use crate::error::RecurrenceError;
use crate::instance::Instance;
use crate::limits::PipelineLimits;
use crate::rule::ParsedRule;
use crate::source::SourceStage;
use crate::stage::{FilterStage, Stage, StageMode};
use crate::stages::{ByDay, ByHour, ByMinute, ByMonth, ByMonthDay, BySecond, BySetPos, ByWeekNo, ByYearDay};

fn summarize(rule: &ParsedRule) -> String {
    let mut parts = vec![format!("FREQ={:?}", rule.frequency), format!("INTERVAL={}", rule.interval)];

    if let Some(v) = &rule.by_month {
        parts.push(format!("BYMONTH={v:?}"));
    }
    if let Some(v) = &rule.by_week_no {
        parts.push(format!("BYWEEKNO={v:?}"));
    }
    if let Some(v) = &rule.by_year_day {
        parts.push(format!("BYYEARDAY={v:?}"));
    }
    if let Some(v) = &rule.by_month_day {
        parts.push(format!("BYMONTHDAY={v:?}"));
    }
    if let Some(v) = &rule.by_day {
        parts.push(format!("BYDAY={v:?}"));
    }
    if let Some(v) = &rule.by_hour {
        parts.push(format!("BYHOUR={v:?}"));
    }
    if let Some(v) = &rule.by_minute {
        parts.push(format!("BYMINUTE={v:?}"));
    }
    if let Some(v) = &rule.by_second {
        parts.push(format!("BYSECOND={v:?}"));
    }
    if let Some(v) = &rule.by_set_pos {
        parts.push(format!("BYSETPOS={v:?}"));
    }

    parts.join(";")
}

/// Assembles the canonical SOURCE -> BYMONTH -> BYWEEKNO -> BYYEARDAY -> BYMONTHDAY -> BYDAY ->
/// BYHOUR -> BYMINUTE -> BYSECOND -> BYSETPOS chain for a single `ParsedRule`, per SPEC_FULL.md
/// §4.2/§4.4. `next()`/`next_set()` on the pipeline pull raw candidates in ascending order;
/// COUNT/UNTIL truncation is left to the caller, per SPEC_FULL.md §6.
pub struct RecurrencePipeline {
    head: Box<dyn Stage>,
}

impl RecurrencePipeline {
    pub fn new(rule: &ParsedRule, start: Instance, metrics: Arc<dyn CalendarMetrics>, limits: PipelineLimits) -> Self {
        let rule_summary = summarize(rule);

        let mut stage: Box<dyn Stage> = Box::new(SourceStage::new(
            Arc::clone(&metrics),
            rule.frequency,
            rule.interval,
            start,
        ));

        if let Some(months) = &rule.by_month {
            let mode = if rule.by_month_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByMonth::new(months.clone(), Arc::clone(&metrics)),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(weeks) = &rule.by_week_no {
            stage = Box::new(FilterStage::new(
                stage,
                ByWeekNo::new(weeks.clone(), rule.week_start, Arc::clone(&metrics)),
                StageMode::Expand,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(year_days) = &rule.by_year_day {
            let mode = if rule.by_year_day_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByYearDay::new(year_days.clone(), Arc::clone(&metrics)),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(month_days) = &rule.by_month_day {
            let mode = if rule.by_month_day_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByMonthDay::new(month_days.clone(), Arc::clone(&metrics)),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(weekday_nums) = &rule.by_day {
            let mode = if rule.by_day_is_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByDay::new(
                    weekday_nums.clone(),
                    rule.by_day_scope(),
                    rule.week_start,
                    rule.by_month.clone(),
                    Arc::clone(&metrics),
                ),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(hours) = &rule.by_hour {
            let mode = if rule.by_hour_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByHour::new(hours.clone()),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(minutes) = &rule.by_minute {
            let mode = if rule.by_minute_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                ByMinute::new(minutes.clone()),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(seconds) = &rule.by_second {
            let mode = if rule.by_second_expand() {
                StageMode::Expand
            } else {
                StageMode::Limit
            };
            stage = Box::new(FilterStage::new(
                stage,
                BySecond::new(seconds.clone()),
                mode,
                start,
                limits,
                rule_summary.clone(),
            ));
        }

        if let Some(positions) = &rule.by_set_pos {
            stage = Box::new(BySetPos::new(stage, positions.clone(), limits, rule_summary.clone()));
        }

        Self { head: stage }
    }
}

impl Stage for RecurrencePipeline {
    fn next(&mut self) -> Result<Option<Instance>, RecurrenceError> {
        self.head.next()
    }

    fn next_set(&mut self) -> Result<Option<&crate::ordered_set::OrderedInstanceSet>, RecurrenceError> {
        self.head.next_set()
    }
}
