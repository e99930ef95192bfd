use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::breakdown::{yearly_breakdown, YearlyAggregate};
use super::inputs::{CalculationRequest, LoanAccount, PrepaymentMode};
use super::schedule::{build_schedule, ScheduleEntry};
use super::validation::{validate_account, validate_request, ValidationRules};
use crate::calendar::months_between;
use crate::error::EmiPlannerError;
use crate::time_value::{annuity_payment, effective_annual_rate, monthly_rate, payoff_periods};
use crate::types::{Money, Percent};
use crate::EmiPlannerResult;

/// Headline figures for the adjusted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Installment before any step-up, after prepayment re-derivation.
    pub base_emi: Money,
    pub months_remaining: u32,
    pub total_interest: Money,
    /// Total interest plus the post-prepayment principal.
    pub total_payment: Money,
    /// Annualised effective rate in percent.
    pub effective_rate: Percent,
    /// Original EMI over the plan's length less what the plan actually pays.
    pub savings: Money,
    pub yearly_breakdown: Vec<YearlyAggregate>,
}

/// Comparison of the adjusted plan against the unchanged loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAnalysis {
    /// Months left on the loan as originally scheduled.
    pub baseline_months: u32,
    pub time_reduced_months: u32,
    /// Baseline months at the current EMI less the plan's total payment.
    pub interest_saved: Money,
    /// Outstanding principal after the prepayment.
    pub starting_balance: Money,
    /// Running balance after the final installment, before clamping.
    pub residual_balance: Money,
    pub rate_solver_iterations: u32,
    pub rate_solver_converged: bool,
}

/// Complete output of one engine run. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub schedule: Vec<ScheduleEntry>,
    pub summary: LoanSummary,
    pub analysis: LoanAnalysis,
}

/// Compute the schedule and summary under the default validation rules.
pub fn compute_schedule(
    account: &LoanAccount,
    request: &CalculationRequest,
    as_of: NaiveDate,
) -> EmiPlannerResult<CalculationResult> {
    compute_schedule_with_rules(account, request, as_of, &ValidationRules::default())
}

/// Compute the schedule and summary, validating the request against `rules`.
#[instrument(
    level = "debug",
    skip_all,
    fields(as_of = %as_of, rate = %request.interest_rate, prepayment = %request.prepayment_amount)
)]
pub fn compute_schedule_with_rules(
    account: &LoanAccount,
    request: &CalculationRequest,
    as_of: NaiveDate,
    rules: &ValidationRules,
) -> EmiPlannerResult<CalculationResult> {
    rules.check()?;
    validate_request(request, rules)?;
    validate_account(account, request, as_of)?;

    let baseline_months = baseline_term(account, as_of)?;
    let rate = monthly_rate(request.interest_rate);
    let starting_balance = account
        .outstanding_principal
        .checked_sub(request.prepayment_amount)
        .ok_or_else(|| EmiPlannerError::overflow("post-prepayment balance"))?;

    let (base_emi, term) = if request.prepayment_amount > Decimal::ZERO {
        match request.prepayment_type {
            PrepaymentMode::ReduceEmi => {
                let emi = annuity_payment(starting_balance, rate, baseline_months)?;
                debug!(%emi, term = baseline_months, "prepayment re-derived the EMI");
                (emi, baseline_months)
            }
            PrepaymentMode::ReduceTenure => {
                let term = payoff_periods(starting_balance, rate, account.current_emi)?;
                debug!(term, baseline = baseline_months, "prepayment re-derived the tenure");
                (account.current_emi, term)
            }
        }
    } else {
        (account.current_emi, baseline_months)
    };

    if term == 0 {
        return Err(EmiPlannerError::Calculation(
            "derived term has no installments".into(),
        ));
    }

    let run = build_schedule(starting_balance, base_emi, term, rate, &request.step_up, as_of)?;

    let payments: Vec<Money> = run.entries.iter().map(|e| e.payment).collect();
    let estimate = effective_annual_rate(&payments, starting_balance)?;
    if !estimate.converged {
        warn!(
            iterations = estimate.iterations,
            estimate = %estimate.annual_rate,
            "effective rate search stopped before converging"
        );
    }

    let total_paid = payments
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
        .ok_or_else(|| EmiPlannerError::overflow("total paid"))?;
    let savings = total_savings(run.entries.len(), account.current_emi, total_paid)?;
    let total_payment = run
        .total_interest
        .checked_add(starting_balance)
        .ok_or_else(|| EmiPlannerError::overflow("total payment"))?;
    let interest_saved = total_savings(baseline_months as usize, account.current_emi, total_payment)?;

    let analysis = LoanAnalysis {
        baseline_months,
        time_reduced_months: baseline_months.saturating_sub(term),
        interest_saved,
        starting_balance,
        residual_balance: run.residual_balance,
        rate_solver_iterations: estimate.iterations,
        rate_solver_converged: estimate.converged,
    };

    let summary = LoanSummary {
        base_emi,
        months_remaining: term,
        total_interest: run.total_interest,
        total_payment,
        effective_rate: estimate.annual_rate,
        savings,
        yearly_breakdown: yearly_breakdown(&run.entries)?,
    };

    Ok(CalculationResult {
        schedule: run.entries,
        summary,
        analysis,
    })
}

/// Whole months from `as_of` to the account's final installment.
pub fn baseline_term(account: &LoanAccount, as_of: NaiveDate) -> EmiPlannerResult<u32> {
    let months = months_between(as_of, account.last_installment);
    u32::try_from(months)
        .ok()
        .filter(|m| *m > 0)
        .ok_or_else(|| {
            EmiPlannerError::invalid(
                "last_installment",
                format!(
                    "no installments remain between {} and {}",
                    as_of, account.last_installment
                ),
            )
        })
}

/// Paying the original EMI for `months` less what was actually paid.
pub fn total_savings(months: usize, current_emi: Money, total_paid: Money) -> EmiPlannerResult<Money> {
    Decimal::from(months)
        .checked_mul(current_emi)
        .and_then(|baseline| baseline.checked_sub(total_paid))
        .ok_or_else(|| EmiPlannerError::overflow("savings"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::inputs::{StepUpMode, StepUpPolicy};
    use rust_decimal_macros::dec;

    fn account() -> LoanAccount {
        LoanAccount {
            sanctioned_amount: dec!(3082384),
            outstanding_principal: dec!(2458898),
            current_emi: dec!(31507),
            first_installment: NaiveDate::from_ymd_opt(2020, 5, 2).unwrap(),
            last_installment: NaiveDate::from_ymd_opt(2035, 5, 10).unwrap(),
            initial_paid_emi: Some(dec!(33515)),
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
    }

    #[test]
    fn test_baseline_term_from_dates() {
        assert_eq!(baseline_term(&account(), as_of()).unwrap(), 123);
    }

    #[test]
    fn test_baseline_term_same_month_rejected() {
        let as_of = NaiveDate::from_ymd_opt(2035, 5, 1).unwrap();
        assert!(baseline_term(&account(), as_of).unwrap_err().is_validation());
    }

    #[test]
    fn test_no_prepayment_keeps_account_terms() {
        let result = compute_schedule(&account(), &CalculationRequest::at_rate(dec!(9)), as_of())
            .unwrap();
        assert_eq!(result.summary.base_emi, dec!(31507));
        assert_eq!(result.summary.months_remaining, 123);
        assert_eq!(result.schedule.len(), 123);
        assert_eq!(result.analysis.time_reduced_months, 0);
        assert_eq!(result.summary.savings, Decimal::ZERO);
    }

    #[test]
    fn test_reduce_emi_lowers_installment() {
        let mut req = CalculationRequest::at_rate(dec!(9));
        req.prepayment_amount = dec!(100000);
        req.prepayment_type = PrepaymentMode::ReduceEmi;
        let result = compute_schedule(&account(), &req, as_of()).unwrap();
        assert!(result.summary.base_emi < dec!(31507));
        assert_eq!(result.summary.months_remaining, 123);
        assert!(result.summary.savings > Decimal::ZERO);
    }

    #[test]
    fn test_reduce_tenure_shortens_term() {
        let mut req = CalculationRequest::at_rate(dec!(9));
        req.prepayment_amount = dec!(100000);
        req.prepayment_type = PrepaymentMode::ReduceTenure;
        let result = compute_schedule(&account(), &req, as_of()).unwrap();
        assert_eq!(result.summary.base_emi, dec!(31507));
        assert!(result.summary.months_remaining <= 123);
        assert_eq!(
            result.analysis.time_reduced_months,
            123 - result.summary.months_remaining
        );
    }

    #[test]
    fn test_reduce_tenure_unpayable_is_calculation_error() {
        // 30% of 2,358,898 / 12 = 58,972 interest in month one > 31,507 EMI
        let mut req = CalculationRequest::at_rate(dec!(30));
        req.prepayment_amount = dec!(100000);
        req.prepayment_type = PrepaymentMode::ReduceTenure;
        let err = compute_schedule(&account(), &req, as_of()).unwrap_err();
        assert!(err.is_calculation());
    }

    #[test]
    fn test_validation_precedes_computation() {
        let err = compute_schedule(&account(), &CalculationRequest::at_rate(dec!(0.5)), as_of())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_step_up_raises_total_paid() {
        let mut req = CalculationRequest::at_rate(dec!(9));
        req.step_up = StepUpPolicy::new(
            StepUpMode::Yearly,
            dec!(5),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        );
        let result = compute_schedule(&account(), &req, as_of()).unwrap();
        assert!(result.summary.savings < Decimal::ZERO);
        assert!(result.schedule.iter().any(|e| e.payment > dec!(31507)));
    }

    #[test]
    fn test_total_savings_sign() {
        assert_eq!(total_savings(10, dec!(100), dec!(900)).unwrap(), dec!(100));
        assert_eq!(total_savings(10, dec!(100), dec!(1100)).unwrap(), dec!(-100));
    }

    #[test]
    fn test_total_savings_overflow_is_calculation_error() {
        let err = total_savings(10, dec!(100), Decimal::MIN).unwrap_err();
        assert!(err.is_calculation());
    }
}
