use std::fmt;

/// The single error surface this crate exposes to callers. No other error kind crosses the
/// pipeline boundary - invalid candidates are dropped silently (they are not errors), and
/// collaborator contract violations are `debug_assert!`ed rather than returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// A stage went `max_empty_sets`/`max_empty_instances` pulls in a row without producing a
    /// usable candidate - e.g. "FREQ=MONTHLY;BYMONTHDAY=31" starting from a month where day 31
    /// never recurs within the configured safety window. Terminal: the pipeline must not be
    /// pulled again after this.
    OverConstrained {
        stage: &'static str,
        rule_summary: String,
    },

    /// A `CalendarMetrics` request (or a field passed to `Instance::try_new`) fell outside the
    /// `[1, 9999]` representable year range.
    YearOutOfRange(i32),

    /// An `Instance::try_new` field was out of its valid range.
    InvalidField {
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

impl fmt::Display for RecurrenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceError::OverConstrained { stage, rule_summary } => {
                write!(
                    f,
                    "over-constrained rule: stage '{stage}' produced no candidates within the safety window ({rule_summary})"
                )
            }

            RecurrenceError::YearOutOfRange(year) => {
                write!(f, "year {year} is outside the representable range [1, 9999]")
            }

            RecurrenceError::InvalidField {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => {
                write!(
                    f,
                    "invalid date-time field(s): {year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
                )
            }
        }
    }
}

impl std::error::Error for RecurrenceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn over_constrained_message_names_the_stage() {
        let error = RecurrenceError::OverConstrained {
            stage: "BYMONTHDAY",
            rule_summary: "FREQ=MONTHLY;BYMONTHDAY=31".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "over-constrained rule: stage 'BYMONTHDAY' produced no candidates within the safety window (FREQ=MONTHLY;BYMONTHDAY=31)"
        );
    }

    #[test]
    fn year_out_of_range_message() {
        let error = RecurrenceError::YearOutOfRange(10_000);
        assert_eq!(
            error.to_string(),
            "year 10000 is outside the representable range [1, 9999]"
        );
    }
}
