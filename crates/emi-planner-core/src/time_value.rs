use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EmiPlannerError;
use crate::types::{Money, Percent, Rate};
use crate::EmiPlannerResult;

/// Starting monthly guess for the effective-rate solver.
const RATE_SOLVER_GUESS: f64 = 0.10;
const RATE_SOLVER_TOLERANCE: f64 = 0.0000001;
const MAX_RATE_SOLVER_ITERATIONS: u32 = 20;

/// Convert an annual percentage (9 = 9% p.a.) to a monthly decimal rate.
pub fn monthly_rate(annual_pct: Percent) -> Rate {
    annual_pct / dec!(1200)
}

/// Level installment that retires `principal` over `months` at `rate` per month.
///
/// `EMI = P·r·(1+r)^n / ((1+r)^n − 1)`; a zero rate spreads the principal evenly.
pub fn annuity_payment(principal: Money, rate: Rate, months: u32) -> EmiPlannerResult<Money> {
    if months == 0 {
        return Err(EmiPlannerError::Calculation(
            "annuity payment requires at least one period".into(),
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powi(i64::from(months))
        .ok_or_else(|| {
            EmiPlannerError::Calculation(format!(
                "annuity factor (1 + {rate})^{months} overflows"
            ))
        })?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(EmiPlannerError::Calculation(
            "annuity factor denominator is zero".into(),
        ));
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_mul(factor))
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(|| {
            EmiPlannerError::Calculation(format!(
                "installment for {principal} over {months} months overflows"
            ))
        })
}

/// Number of installments of `emi` needed to retire `principal`.
///
/// `n = ceil( ln(EMI / (EMI − P·r)) / ln(1+r) )`. Fails when the installment
/// does not cover the first month's interest, where the logarithm is undefined.
pub fn payoff_periods(principal: Money, rate: Rate, emi: Money) -> EmiPlannerResult<u32> {
    if emi <= Decimal::ZERO {
        return Err(EmiPlannerError::Calculation(
            "installment must be positive to retire the balance".into(),
        ));
    }
    if principal <= Decimal::ZERO {
        return Ok(0);
    }

    let periods = if rate.is_zero() {
        principal
            .checked_div(emi)
            .ok_or_else(|| {
                EmiPlannerError::Calculation(format!("payoff term for {principal} at {emi} overflows"))
            })?
            .ceil()
    } else {
        let first_interest = principal.checked_mul(rate).ok_or_else(|| {
            EmiPlannerError::Calculation(format!("first month's interest on {principal} overflows"))
        })?;
        if emi <= first_interest {
            return Err(EmiPlannerError::Calculation(format!(
                "installment {emi} does not cover the first month's interest {first_interest}; \
                 the loan can never be repaid"
            )));
        }
        let growth = emi
            .checked_div(emi - first_interest)
            .and_then(|ratio| ratio.checked_ln())
            .ok_or_else(|| {
                EmiPlannerError::Calculation("payoff ratio logarithm is undefined".into())
            })?;
        let per_period = (Decimal::ONE + rate).checked_ln().ok_or_else(|| {
            EmiPlannerError::Calculation("periodic growth logarithm is undefined".into())
        })?;
        if per_period.is_zero() {
            return Err(EmiPlannerError::Calculation(
                "periodic growth logarithm is zero".into(),
            ));
        }
        (growth / per_period).ceil()
    };

    periods.to_u32().ok_or_else(|| {
        EmiPlannerError::Calculation(format!("payoff term {periods} is not a valid month count"))
    })
}

/// Result of the effective-rate root search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Annualised rate in percent (`monthly × 1200`).
    pub annual_rate: Percent,
    pub iterations: u32,
    pub converged: bool,
}

/// Present value of `payments` (first payment one period out) less `principal`.
pub fn npv(rate: f64, payments: &[f64], principal: f64) -> f64 {
    let one_plus_r = 1.0 + rate;
    payments
        .iter()
        .enumerate()
        .map(|(idx, p)| p / one_plus_r.powi(idx as i32 + 1))
        .sum::<f64>()
        - principal
}

/// Derivative of [`npv`] with respect to the rate.
pub fn npv_derivative(rate: f64, payments: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    payments
        .iter()
        .enumerate()
        .map(|(idx, p)| -((idx + 1) as f64) * p / one_plus_r.powi(idx as i32 + 2))
        .sum()
}

/// Effective annual rate implied by a monthly payment stream against `principal`.
///
/// Newton-Raphson from a 10% monthly guess, stopping when a step moves less
/// than 1e-7 or after 20 iterations. The last estimate is returned either way;
/// `converged` records which. Iterates can leave Decimal's range, so the search
/// runs in f64 and only the final estimate is converted back.
pub fn effective_annual_rate(payments: &[Money], principal: Money) -> EmiPlannerResult<RateEstimate> {
    if payments.is_empty() {
        return Err(EmiPlannerError::Calculation(
            "effective rate requires at least one payment".into(),
        ));
    }

    let flows: Vec<f64> = payments
        .iter()
        .map(|p| {
            p.to_f64().ok_or_else(|| {
                EmiPlannerError::Calculation(format!("payment {p} is not representable"))
            })
        })
        .collect::<EmiPlannerResult<_>>()?;
    let principal_f = principal.to_f64().ok_or_else(|| {
        EmiPlannerError::Calculation(format!("principal {principal} is not representable"))
    })?;

    let mut guess = RATE_SOLVER_GUESS;
    let mut iterations = 0;
    let mut converged = false;

    for i in 0..MAX_RATE_SOLVER_ITERATIONS {
        iterations = i + 1;
        let f = npv(guess, &flows, principal_f);
        let f_prime = npv_derivative(guess, &flows);
        let next = guess - f / f_prime;

        if !next.is_finite() {
            return Err(EmiPlannerError::Calculation(format!(
                "effective rate search produced a non-finite estimate at iteration {iterations}"
            )));
        }

        if (next - guess).abs() < RATE_SOLVER_TOLERANCE {
            guess = next;
            converged = true;
            break;
        }
        guess = next;
    }

    let annual_rate = Decimal::from_f64(guess * 1200.0).ok_or_else(|| {
        EmiPlannerError::Calculation(format!("effective rate estimate {guess} is not representable"))
    })?;

    Ok(RateEstimate {
        annual_rate,
        iterations,
        converged,
    })
}
