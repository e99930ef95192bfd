use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::{compute_schedule_with_rules, CalculationResult};
use super::inputs::{CalculationRequest, LoanAccount};
use super::validation::ValidationRules;
use crate::calendar::add_months;
use crate::types::{with_metadata, ComputationOutput};
use crate::EmiPlannerResult;

/// Everything needed for one planning run, as read from a file or stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPlanInput {
    pub account: LoanAccount,
    pub request: CalculationRequest,
    /// Reference date; the first installment of the plan falls on it.
    pub as_of_date: NaiveDate,
    #[serde(default)]
    pub rules: ValidationRules,
}

/// Run the engine and wrap the result in the standard output envelope.
pub fn plan_loan(input: &LoanPlanInput) -> EmiPlannerResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();

    let result = compute_schedule_with_rules(
        &input.account,
        &input.request,
        input.as_of_date,
        &input.rules,
    )?;
    let warnings = plan_warnings(input, &result)?;

    let methodology = format!(
        "Level-payment amortisation, prepayment {} with {} step-up",
        input.request.prepayment_type, input.request.step_up.mode
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(&methodology, input, warnings, elapsed, result))
}

fn plan_warnings(input: &LoanPlanInput, result: &CalculationResult) -> EmiPlannerResult<Vec<String>> {
    let mut warnings = Vec::new();

    if !result.analysis.rate_solver_converged {
        warnings.push(format!(
            "Effective rate search did not converge within {} iterations; \
             {}% is the last estimate",
            result.analysis.rate_solver_iterations,
            result.summary.effective_rate.round_dp(4)
        ));
    }

    let step_up = &input.request.step_up;
    if step_up.is_active() {
        if let Some(start) = step_up.start_date {
            let last_month = result.summary.months_remaining.saturating_sub(1);
            let horizon = add_months(input.as_of_date, last_month)?;
            if start > horizon {
                warnings.push(format!(
                    "Step-up start date {start} falls after the final installment on {horizon}; \
                     no installment is stepped up"
                ));
            }
        }
    }

    if result.summary.savings < Decimal::ZERO {
        warnings.push(format!(
            "The plan pays {} more than the current EMI over the same months",
            (-result.summary.savings).round_dp(2)
        ));
    }

    Ok(warnings)
}
