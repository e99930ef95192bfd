use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use super::inputs::{StepUpMode, StepUpPolicy};
use crate::calendar::{add_months, months_between, whole_years_between};
use crate::error::EmiPlannerError;
use crate::types::Money;
use crate::EmiPlannerResult;

/// Installment due in schedule month `month` (1-based) under `policy`.
///
/// The installment date is `as_of` shifted by `month − 1` months. Before the
/// policy's start date the base installment applies unchanged.
pub fn stepped_emi(
    base_emi: Money,
    month: u32,
    policy: &StepUpPolicy,
    as_of: NaiveDate,
) -> EmiPlannerResult<Money> {
    if !policy.is_active() {
        return Ok(base_emi);
    }

    let current = add_months(as_of, month.saturating_sub(1))?;
    let start = policy.start_date.unwrap_or(as_of);
    if current < start {
        return Ok(base_emi);
    }

    let step = Decimal::ONE + policy.percentage / dec!(100);
    let steps = match policy.mode {
        StepUpMode::None => return Ok(base_emi),
        StepUpMode::Monthly => months_between(start, current),
        StepUpMode::Yearly => whole_years_between(start, current),
        StepUpMode::Onetime => 1,
    };

    let factor = step.checked_powi(steps).ok_or_else(|| {
        EmiPlannerError::Calculation(format!(
            "step-up factor {step}^{steps} overflows in month {month}"
        ))
    })?;
    base_emi.checked_mul(factor).ok_or_else(|| {
        EmiPlannerError::Calculation(format!(
            "stepped installment overflows in month {month} (factor {factor})"
        ))
    })
}
