pub mod by_day;
pub mod by_hour;
pub mod by_minute;
pub mod by_month;
pub mod by_month_day;
pub mod by_second;
pub mod by_set_pos;
pub mod by_week_no;
pub mod by_year_day;

pub use by_day::ByDay;
pub use by_hour::ByHour;
pub use by_minute::ByMinute;
pub use by_month::ByMonth;
pub use by_month_day::ByMonthDay;
pub use by_second::BySecond;
pub use by_set_pos::BySetPos;
pub use by_week_no::ByWeekNo;
pub use by_year_day::ByYearDay;
