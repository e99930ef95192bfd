use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EmiPlannerError;
use crate::types::{Money, Percent};

/// Reference data for the loan being planned. Fixed for a computation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAccount {
    /// Amount originally sanctioned by the lender.
    pub sanctioned_amount: Money,
    /// Principal still owed at the reference date.
    pub outstanding_principal: Money,
    /// Installment currently being paid.
    pub current_emi: Money,
    pub first_installment: NaiveDate,
    /// Final installment under the current schedule; drives the baseline term.
    pub last_installment: NaiveDate,
    /// Installment paid before any earlier restructuring, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_paid_emi: Option<Money>,
}

/// How a prepayment is reallocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrepaymentMode {
    /// Keep the term, lower the installment.
    #[default]
    ReduceEmi,
    /// Keep the installment, shorten the term.
    ReduceTenure,
}

/// How the installment grows once a step-up takes effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepUpMode {
    #[default]
    None,
    /// Compounds every month after the start date.
    Monthly,
    /// Compounds on each anniversary of the start date.
    Yearly,
    /// Single flat increase from the start date onward.
    #[serde(alias = "one-time")]
    Onetime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepUpPolicy {
    #[serde(rename = "type", default)]
    pub mode: StepUpMode,
    /// Increment per step in percent (10 = 10%).
    #[serde(default)]
    pub percentage: Percent,
    /// First date on which the step-up applies. `None` means from the first
    /// scheduled installment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl StepUpPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(mode: StepUpMode, percentage: Percent, start_date: NaiveDate) -> Self {
        Self {
            mode,
            percentage,
            start_date: Some(start_date),
        }
    }

    /// True when the policy can change any installment.
    pub fn is_active(&self) -> bool {
        self.mode != StepUpMode::None && !self.percentage.is_zero()
    }
}

/// Borrower choices for one computation. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Annual interest rate in percent (9 = 9% p.a.).
    pub interest_rate: Percent,
    #[serde(default)]
    pub prepayment_amount: Money,
    #[serde(default)]
    pub prepayment_type: PrepaymentMode,
    #[serde(default)]
    pub step_up: StepUpPolicy,
}

impl CalculationRequest {
    /// A request with no prepayment and no step-up.
    pub fn at_rate(interest_rate: Percent) -> Self {
        Self {
            interest_rate,
            prepayment_amount: Decimal::ZERO,
            prepayment_type: PrepaymentMode::default(),
            step_up: StepUpPolicy::none(),
        }
    }
}

impl fmt::Display for PrepaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepaymentMode::ReduceEmi => write!(f, "reduce-emi"),
            PrepaymentMode::ReduceTenure => write!(f, "reduce-tenure"),
        }
    }
}

impl FromStr for PrepaymentMode {
    type Err = EmiPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reduce-emi" | "emi" => Ok(PrepaymentMode::ReduceEmi),
            "reduce-tenure" | "tenure" => Ok(PrepaymentMode::ReduceTenure),
            other => Err(EmiPlannerError::invalid(
                "prepayment_type",
                format!("unknown prepayment mode '{other}' (expected reduce-emi or reduce-tenure)"),
            )),
        }
    }
}

impl fmt::Display for StepUpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepUpMode::None => "none",
            StepUpMode::Monthly => "monthly",
            StepUpMode::Yearly => "yearly",
            StepUpMode::Onetime => "onetime",
        };
        f.write_str(s)
    }
}

impl FromStr for StepUpMode {
    type Err = EmiPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(StepUpMode::None),
            "monthly" => Ok(StepUpMode::Monthly),
            "yearly" => Ok(StepUpMode::Yearly),
            "onetime" | "one-time" => Ok(StepUpMode::Onetime),
            other => Err(EmiPlannerError::invalid(
                "step_up.type",
                format!("unknown step-up mode '{other}' (expected none, monthly, yearly or onetime)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_modes_deserialize_kebab_case() {
        let mode: PrepaymentMode = serde_json::from_str("\"reduce-tenure\"").unwrap();
        assert_eq!(mode, PrepaymentMode::ReduceTenure);
        let step: StepUpMode = serde_json::from_str("\"onetime\"").unwrap();
        assert_eq!(step, StepUpMode::Onetime);
    }

    #[test]
    fn test_unknown_mode_rejected_at_construction() {
        assert!(serde_json::from_str::<PrepaymentMode>("\"reduce-both\"").is_err());
        assert!("quarterly".parse::<StepUpMode>().is_err());
        assert!("sideways".parse::<PrepaymentMode>().unwrap_err().is_validation());
    }

    #[test]
    fn test_mode_parse_display_agree() {
        for mode in [PrepaymentMode::ReduceEmi, PrepaymentMode::ReduceTenure] {
            assert_eq!(mode.to_string().parse::<PrepaymentMode>().unwrap(), mode);
        }
        for mode in [
            StepUpMode::None,
            StepUpMode::Monthly,
            StepUpMode::Yearly,
            StepUpMode::Onetime,
        ] {
            assert_eq!(mode.to_string().parse::<StepUpMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_request_defaults() {
        let req: CalculationRequest = serde_json::from_str(r#"{"interest_rate": "9"}"#).unwrap();
        assert_eq!(req.interest_rate, dec!(9));
        assert_eq!(req.prepayment_amount, Decimal::ZERO);
        assert_eq!(req.prepayment_type, PrepaymentMode::ReduceEmi);
        assert!(!req.step_up.is_active());
    }

    #[test]
    fn test_step_up_policy_type_field() {
        let policy: StepUpPolicy = serde_json::from_str(
            r#"{"type": "yearly", "percentage": "5", "start_date": "2026-04-01"}"#,
        )
        .unwrap();
        assert_eq!(policy.mode, StepUpMode::Yearly);
        assert!(policy.is_active());
        assert_eq!(policy.start_date, NaiveDate::from_ymd_opt(2026, 4, 1));
    }

    #[test]
    fn test_zero_percentage_is_inactive() {
        let policy = StepUpPolicy::new(
            StepUpMode::Monthly,
            Decimal::ZERO,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert!(!policy.is_active());
    }
}
