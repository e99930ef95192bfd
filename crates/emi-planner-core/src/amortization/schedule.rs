use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::inputs::StepUpPolicy;
use super::step_up::stepped_emi;
use crate::calendar::add_months;
use crate::error::EmiPlannerError;
use crate::types::{Money, Rate};
use crate::EmiPlannerResult;

/// One month of the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based, contiguous.
    pub month: u32,
    pub date: NaiveDate,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Closing balance, floored at zero.
    pub balance: Money,
    /// Interest paid from month 1 through this month.
    pub cumulative_interest: Money,
}

/// A generated schedule with its running totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRun {
    pub entries: Vec<ScheduleEntry>,
    pub total_interest: Money,
    /// Running balance after the last installment, before clamping. Negative
    /// when the final installment overpays.
    pub residual_balance: Money,
}

/// Amortise `opening_balance` over `term` months starting at `as_of`.
///
/// Each month the step-up rule sets the installment, interest accrues on the
/// running balance, and the remainder of the installment retires principal.
/// A running figure leaving the decimal range is a calculation error.
pub fn build_schedule(
    opening_balance: Money,
    base_emi: Money,
    term: u32,
    monthly_rate: Rate,
    step_up: &StepUpPolicy,
    as_of: NaiveDate,
) -> EmiPlannerResult<ScheduleRun> {
    let mut entries = Vec::with_capacity(term as usize);
    let mut balance = opening_balance;
    let mut total_interest = Decimal::ZERO;
    let mut stepped = false;

    for month in 1..=term {
        let payment = stepped_emi(base_emi, month, step_up, as_of)?;
        if !stepped && payment != base_emi {
            stepped = true;
            debug!(month, %payment, mode = %step_up.mode, "step-up takes effect");
        }
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| EmiPlannerError::overflow(format!("interest in month {month}")))?;
        let principal = payment
            .checked_sub(interest)
            .ok_or_else(|| EmiPlannerError::overflow(format!("principal in month {month}")))?;
        balance = balance
            .checked_sub(principal)
            .ok_or_else(|| EmiPlannerError::overflow(format!("balance in month {month}")))?;
        total_interest = total_interest.checked_add(interest).ok_or_else(|| {
            EmiPlannerError::overflow(format!("cumulative interest in month {month}"))
        })?;

        entries.push(ScheduleEntry {
            month,
            date: add_months(as_of, month - 1)?,
            payment,
            principal,
            interest,
            balance: balance.max(Decimal::ZERO),
            cumulative_interest: total_interest,
        });
    }

    Ok(ScheduleRun {
        entries,
        total_interest,
        residual_balance: balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::inputs::StepUpMode;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
    }

    #[test]
    fn test_first_month_split() {
        let run = build_schedule(
            dec!(2458898),
            dec!(31507),
            123,
            dec!(0.0075),
            &StepUpPolicy::none(),
            as_of(),
        )
        .unwrap();
        let first = &run.entries[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.date, as_of());
        assert_eq!(first.interest, dec!(18441.735));
        assert_eq!(first.principal, dec!(13065.265));
        assert_eq!(first.balance, dec!(2445832.735));
        assert_eq!(first.cumulative_interest, dec!(18441.735));
    }

    #[test]
    fn test_months_contiguous_and_dated() {
        let run = build_schedule(
            dec!(10000),
            dec!(900),
            12,
            dec!(0.01),
            &StepUpPolicy::none(),
            as_of(),
        )
        .unwrap();
        assert_eq!(run.entries.len(), 12);
        for (idx, entry) in run.entries.iter().enumerate() {
            assert_eq!(entry.month as usize, idx + 1);
            assert_eq!(entry.date, add_months(as_of(), idx as u32).unwrap());
        }
    }

    #[test]
    fn test_overpayment_clamps_reported_balance() {
        // 12 payments of 1,000 against 10,000 at 1% overpay the loan.
        let run = build_schedule(
            dec!(10000),
            dec!(1000),
            12,
            dec!(0.01),
            &StepUpPolicy::none(),
            as_of(),
        )
        .unwrap();
        assert!(run.residual_balance < Decimal::ZERO);
        assert_eq!(run.entries.last().unwrap().balance, Decimal::ZERO);
        assert!(run.entries.iter().all(|e| e.balance >= Decimal::ZERO));
    }

    #[test]
    fn test_step_up_feeds_payment() {
        let policy = StepUpPolicy::new(
            StepUpMode::Onetime,
            dec!(20),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        );
        let run = build_schedule(dec!(10000), dec!(500), 4, dec!(0.01), &policy, as_of()).unwrap();
        let payments: Vec<Money> = run.entries.iter().map(|e| e.payment).collect();
        assert_eq!(payments, vec![dec!(500), dec!(500), dec!(600), dec!(600)]);
    }

    #[test]
    fn test_runaway_balance_is_calculation_error() {
        // Doubling every month drives the overpaid balance past the decimal range.
        let policy = StepUpPolicy::new(StepUpMode::Monthly, dec!(100), as_of());
        let err = build_schedule(dec!(2458898), dec!(31507), 123, dec!(0.0075), &policy, as_of())
            .unwrap_err();
        assert!(err.is_calculation());
    }

    #[test]
    fn test_zero_term_is_empty() {
        let run = build_schedule(
            dec!(10000),
            dec!(500),
            0,
            dec!(0.01),
            &StepUpPolicy::none(),
            as_of(),
        )
        .unwrap();
        assert!(run.entries.is_empty());
        assert_eq!(run.residual_balance, dec!(10000));
    }
}
