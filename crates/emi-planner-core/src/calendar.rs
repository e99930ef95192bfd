//! Whole-month calendar arithmetic used by the schedule and step-up rules.
//!
//! Month differences look at year and month only; the day of month never
//! contributes. Shifting a date forward keeps its day of month, clamped to
//! the length of the target month (31 Jan + 1 month = 28/29 Feb).

use chrono::{Datelike, NaiveDate};

use crate::error::EmiPlannerError;
use crate::EmiPlannerResult;

/// Shift `date` forward by `months` whole months, clamping the day.
pub fn add_months(date: NaiveDate, months: u32) -> EmiPlannerResult<NaiveDate> {
    let total_months = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let new_year = i32::try_from(total_months.div_euclid(12)).map_err(|_| {
        EmiPlannerError::DateError(format!("{date} + {months} months is out of range"))
    })?;
    let new_month = (total_months.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(new_year, new_month));
    NaiveDate::from_ymd_opt(new_year, new_month, day).ok_or_else(|| {
        EmiPlannerError::DateError(format!("{date} + {months} months is out of range"))
    })
}

/// Whole-month difference `later − earlier` using `year*12 + month`.
pub fn months_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (i64::from(later.year()) - i64::from(earlier.year())) * 12
        + (i64::from(later.month()) - i64::from(earlier.month()))
}

/// Whole anniversary years between two dates, fractional months floored.
pub fn whole_years_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    months_between(earlier, later).div_euclid(12)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_keeps_day() {
        assert_eq!(add_months(date(2025, 2, 14), 0).unwrap(), date(2025, 2, 14));
        assert_eq!(add_months(date(2025, 2, 14), 11).unwrap(), date(2026, 1, 14));
        assert_eq!(add_months(date(2025, 2, 14), 122).unwrap(), date(2035, 4, 14));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2025, 1, 31), 1).unwrap(), date(2025, 2, 28));
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2025, 1, 31), 3).unwrap(), date(2025, 4, 30));
    }

    #[test]
    fn test_months_between_ignores_day() {
        assert_eq!(months_between(date(2025, 2, 14), date(2035, 5, 10)), 123);
        assert_eq!(months_between(date(2025, 2, 28), date(2025, 3, 1)), 1);
        assert_eq!(months_between(date(2025, 6, 1), date(2025, 2, 1)), -4);
    }

    #[test]
    fn test_whole_years_floor_partial_years() {
        assert_eq!(whole_years_between(date(2025, 6, 1), date(2026, 5, 1)), 0);
        assert_eq!(whole_years_between(date(2025, 6, 1), date(2026, 6, 1)), 1);
        assert_eq!(whole_years_between(date(2025, 6, 1), date(2028, 2, 1)), 2);
    }
}
