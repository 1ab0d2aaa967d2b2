use std::sync::Arc;

use recur_core::rule::{Frequency, Weekday, WeekdayNum};
use recur_core::{CalendarMetrics, GregorianCalendarMetrics, Instance, ParsedRule, PipelineLimits, RecurrencePipeline, Stage};
use pretty_assertions_sorted::assert_eq;

fn metrics() -> Arc<dyn CalendarMetrics> {
    Arc::new(GregorianCalendarMetrics::new())
}

fn take(pipeline: &mut RecurrencePipeline, n: usize) -> Vec<(i32, u8, u8, u8, u8, u8)> {
    (0..n)
        .map(|_| {
            let instance = pipeline.next().unwrap().unwrap();
            (
                instance.year(),
                instance.month() + 1,
                instance.day_of_month(),
                instance.hour(),
                instance.minute(),
                instance.second(),
            )
        })
        .collect()
}

#[test]
fn scenario_a_yearly_by_month_by_month_day() {
    let rule = ParsedRule::new(Frequency::Yearly)
        .with_by_month(vec![1])
        .with_by_month_day(vec![1]);
    let start = Instance::new(2020, 0, 1, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 3),
        vec![
            (2020, 1, 1, 0, 0, 0),
            (2021, 1, 1, 0, 0, 0),
            (2022, 1, 1, 0, 0, 0),
        ]
    );
}

#[test]
fn scenario_b_monthly_by_day_first_monday_and_last_friday() {
    let rule = ParsedRule::new(Frequency::Monthly)
        .with_by_day(vec![WeekdayNum::new(1, Weekday::Monday), WeekdayNum::new(-1, Weekday::Friday)]);
    let start = Instance::new(2020, 0, 1, 9, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 4),
        vec![
            (2020, 1, 6, 9, 0, 0),
            (2020, 1, 31, 9, 0, 0),
            (2020, 2, 3, 9, 0, 0),
            (2020, 2, 28, 9, 0, 0),
        ]
    );
}

#[test]
fn scenario_c_yearly_by_month_by_day_by_set_pos() {
    let rule = ParsedRule::new(Frequency::Yearly)
        .with_by_month(vec![3, 9])
        .with_by_day(vec![WeekdayNum::any(Weekday::Tuesday)])
        .with_by_set_pos(vec![2]);
    let start = Instance::new(2020, 2, 1, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 3),
        vec![
            (2020, 3, 10, 0, 0, 0),
            (2020, 9, 8, 0, 0, 0),
            (2021, 3, 9, 0, 0, 0),
        ]
    );
}

#[test]
fn scenario_d_weekly_interval_two_by_day_with_sunday_week_start() {
    let rule = ParsedRule::new(Frequency::Weekly)
        .with_interval(2)
        .with_week_start(Weekday::Sunday)
        .with_by_day(vec![
            WeekdayNum::any(Weekday::Monday),
            WeekdayNum::any(Weekday::Wednesday),
            WeekdayNum::any(Weekday::Friday),
        ]);
    let start = Instance::new(2020, 0, 6, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 7),
        vec![
            (2020, 1, 6, 0, 0, 0),
            (2020, 1, 8, 0, 0, 0),
            (2020, 1, 10, 0, 0, 0),
            (2020, 1, 20, 0, 0, 0),
            (2020, 1, 22, 0, 0, 0),
            (2020, 1, 24, 0, 0, 0),
            (2020, 2, 3, 0, 0, 0),
        ]
    );
}

#[test]
fn scenario_e_monthly_by_month_day_thirty_one_skips_shorter_months() {
    let rule = ParsedRule::new(Frequency::Monthly).with_by_month_day(vec![31]);
    let start = Instance::new(2024, 0, 31, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 5),
        vec![
            (2024, 1, 31, 0, 0, 0),
            (2024, 3, 31, 0, 0, 0),
            (2024, 5, 31, 0, 0, 0),
            (2024, 7, 31, 0, 0, 0),
            (2024, 8, 31, 0, 0, 0),
        ]
    );
}

#[test]
fn scenario_f_yearly_by_week_no_one_by_day_monday_crosses_calendar_year_boundary() {
    let rule = ParsedRule::new(Frequency::Yearly)
        .with_week_start(Weekday::Monday)
        .with_by_week_no(vec![1])
        .with_by_day(vec![WeekdayNum::any(Weekday::Monday)]);
    let start = Instance::new(2023, 0, 2, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 3),
        vec![
            (2023, 1, 2, 0, 0, 0),
            (2024, 1, 1, 0, 0, 0),
            (2024, 12, 30, 0, 0, 0),
        ]
    );
}

#[test]
fn boundary_leap_year_by_year_day_366_only_emits_leap_year_december_31sts() {
    let rule = ParsedRule::new(Frequency::Yearly).with_by_year_day(vec![366]);
    let start = Instance::new(2023, 0, 1, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    let first = pipeline.next().unwrap().unwrap();
    assert_eq!((first.year(), first.month() + 1, first.day_of_month()), (2024, 12, 31));

    let second = pipeline.next().unwrap().unwrap();
    assert_eq!((second.year(), second.month() + 1, second.day_of_month()), (2028, 12, 31));
}

#[test]
fn boundary_negative_by_day_position_emits_last_friday_of_each_month() {
    let rule = ParsedRule::new(Frequency::Monthly).with_by_day(vec![WeekdayNum::new(-1, Weekday::Friday)]);
    let start = Instance::new(2024, 0, 1, 0, 0, 0);
    let mut pipeline = RecurrencePipeline::new(&rule, start, metrics(), PipelineLimits::default());

    assert_eq!(
        take(&mut pipeline, 2),
        vec![(2024, 1, 26, 0, 0, 0), (2024, 2, 23, 0, 0, 0)]
    );
}
