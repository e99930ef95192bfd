//! Human-readable rendering of amounts, dates and rates for table output.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Fields rendered as rupee amounts.
const MONEY_FIELDS: &[&str] = &[
    "payment",
    "principal",
    "interest",
    "balance",
    "cumulative_interest",
    "base_emi",
    "total_interest",
    "total_payment",
    "savings",
    "total_emi",
    "total_principal",
    "closing_balance",
    "interest_saved",
    "starting_balance",
    "residual_balance",
];

const PERCENT_FIELDS: &[&str] = &["effective_rate"];

const DATE_FIELDS: &[&str] = &["date"];

/// Render a raw field value according to what the field holds.
pub fn display_field(key: &str, raw: &str) -> String {
    if MONEY_FIELDS.contains(&key) {
        if let Ok(amount) = raw.parse::<Decimal>() {
            return inr(amount);
        }
    } else if PERCENT_FIELDS.contains(&key) {
        if let Ok(rate) = raw.parse::<Decimal>() {
            return percent(rate);
        }
    } else if DATE_FIELDS.contains(&key) {
        if let Ok(date) = raw.parse::<NaiveDate>() {
            return short_date(date);
        }
    }
    raw.to_string()
}

/// Whole-rupee amount with Indian digit grouping: ₹24,58,898.
pub fn inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{}", group_indian(&digits))
}

/// Two-decimal percentage: 9.00%.
pub fn percent(rate: Decimal) -> String {
    format!("{:.2}%", rate.round_dp(2))
}

/// 14 Feb 2025
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

// Last three digits, then pairs: 2458898 -> 24,58,898
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inr_grouping() {
        assert_eq!(inr(dec!(2458898)), "₹24,58,898");
        assert_eq!(inr(dec!(31507)), "₹31,507");
        assert_eq!(inr(dec!(999)), "₹999");
        assert_eq!(inr(dec!(30823840)), "₹3,08,23,840");
    }

    #[test]
    fn test_inr_rounds_to_rupee() {
        assert_eq!(inr(dec!(18441.735)), "₹18,442");
        assert_eq!(inr(dec!(0.4)), "₹0");
        assert_eq!(inr(dec!(-1234.5)), "-₹1,235");
    }

    #[test]
    fn test_percent_two_places() {
        assert_eq!(percent(dec!(9)), "9.00%");
        assert_eq!(percent(dec!(8.756)), "8.76%");
    }

    #[test]
    fn test_short_date() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        assert_eq!(short_date(date), "14 Feb 2025");
    }

    #[test]
    fn test_display_field_by_key() {
        assert_eq!(display_field("balance", "2445832.735"), "₹24,45,833");
        assert_eq!(display_field("date", "2025-02-14"), "14 Feb 2025");
        assert_eq!(display_field("month", "7"), "7");
    }
}
