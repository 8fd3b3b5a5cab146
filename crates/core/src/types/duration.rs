//! Subscription durations from the gym price list.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How long a subscription runs, parsed from the price list `duration` label.
///
/// Labels the gym does not use are treated as a full year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionDuration {
    Day,
    Week,
    HalfMonth,
    Month,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    Year,
}

impl SubscriptionDuration {
    /// Parse a price list label (`"day"`, `"half month"`, `"3 months"`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "day" => Self::Day,
            "week" => Self::Week,
            "half month" => Self::HalfMonth,
            "month" => Self::Month,
            "2 months" => Self::TwoMonths,
            "3 months" => Self::ThreeMonths,
            "6 months" => Self::SixMonths,
            _ => Self::Year,
        }
    }

    /// The date a subscription starting on `start` runs until.
    ///
    /// Month arithmetic clamps to the last day of the target month, so a
    /// monthly subscription from Jan 31 ends on Feb 28 (or 29).
    #[must_use]
    pub fn finish_date(&self, start: NaiveDate) -> NaiveDate {
        let finish = match self {
            Self::Day => start.checked_add_days(Days::new(1)),
            Self::Week => start.checked_add_days(Days::new(7)),
            Self::HalfMonth => start.checked_add_days(Days::new(14)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::TwoMonths => start.checked_add_months(Months::new(2)),
            Self::ThreeMonths => start.checked_add_months(Months::new(3)),
            Self::SixMonths => start.checked_add_months(Months::new(6)),
            Self::Year => start.checked_add_months(Months::new(12)),
        };
        finish.unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_label() {
        assert_eq!(SubscriptionDuration::from_label("day"), SubscriptionDuration::Day);
        assert_eq!(
            SubscriptionDuration::from_label("half month"),
            SubscriptionDuration::HalfMonth
        );
        assert_eq!(
            SubscriptionDuration::from_label("6 months"),
            SubscriptionDuration::SixMonths
        );
    }

    #[test]
    fn test_unknown_label_is_a_year() {
        assert_eq!(SubscriptionDuration::from_label("year"), SubscriptionDuration::Year);
        assert_eq!(
            SubscriptionDuration::from_label("forever"),
            SubscriptionDuration::Year
        );
    }

    #[test]
    fn test_finish_date_days_and_weeks() {
        let start = date(2026, 3, 30);
        assert_eq!(SubscriptionDuration::Day.finish_date(start), date(2026, 3, 31));
        assert_eq!(SubscriptionDuration::Week.finish_date(start), date(2026, 4, 6));
        assert_eq!(
            SubscriptionDuration::HalfMonth.finish_date(start),
            date(2026, 4, 13)
        );
    }

    #[test]
    fn test_finish_date_months_clamp_to_month_end() {
        let start = date(2026, 1, 31);
        assert_eq!(SubscriptionDuration::Month.finish_date(start), date(2026, 2, 28));
        assert_eq!(
            SubscriptionDuration::ThreeMonths.finish_date(start),
            date(2026, 4, 30)
        );
        assert_eq!(
            SubscriptionDuration::SixMonths.finish_date(start),
            date(2026, 7, 31)
        );
    }

    #[test]
    fn test_finish_date_year_handles_leap_day() {
        assert_eq!(
            SubscriptionDuration::Year.finish_date(date(2028, 2, 29)),
            date(2029, 2, 28)
        );
    }
}
