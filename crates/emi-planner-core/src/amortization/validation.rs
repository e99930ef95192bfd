use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::inputs::{CalculationRequest, LoanAccount};
use crate::error::EmiPlannerError;
use crate::types::{Money, Percent};
use crate::EmiPlannerResult;

/// Policy bounds a request must satisfy before anything is computed.
///
/// Ranges are inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub interest_rate_min: Percent,
    pub interest_rate_max: Percent,
    pub step_up_min: Percent,
    pub step_up_max: Percent,
    pub prepayment_min: Money,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            interest_rate_min: dec!(1),
            interest_rate_max: dec!(30),
            step_up_min: dec!(0),
            step_up_max: dec!(100),
            prepayment_min: dec!(0),
        }
    }
}

impl ValidationRules {
    /// Reject rules whose own ranges are inverted.
    pub fn check(&self) -> EmiPlannerResult<()> {
        if self.interest_rate_min > self.interest_rate_max {
            return Err(EmiPlannerError::invalid(
                "rules.interest_rate",
                format!(
                    "minimum {} exceeds maximum {}",
                    self.interest_rate_min, self.interest_rate_max
                ),
            ));
        }
        if self.step_up_min > self.step_up_max {
            return Err(EmiPlannerError::invalid(
                "rules.step_up",
                format!(
                    "minimum {} exceeds maximum {}",
                    self.step_up_min, self.step_up_max
                ),
            ));
        }
        if self.interest_rate_min < Decimal::ZERO {
            return Err(EmiPlannerError::invalid(
                "rules.interest_rate",
                "interest rate bounds cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Validate a request against `rules`. The first violation wins.
pub fn validate_request(request: &CalculationRequest, rules: &ValidationRules) -> EmiPlannerResult<()> {
    if request.interest_rate < rules.interest_rate_min
        || request.interest_rate > rules.interest_rate_max
    {
        return Err(EmiPlannerError::invalid(
            "interest_rate",
            format!(
                "Interest rate must be between {}% and {}%",
                rules.interest_rate_min, rules.interest_rate_max
            ),
        ));
    }

    let step_up_pct = request.step_up.percentage;
    if step_up_pct < rules.step_up_min || step_up_pct > rules.step_up_max {
        return Err(EmiPlannerError::invalid(
            "step_up.percentage",
            format!(
                "Step-up percentage must be between {}% and {}%",
                rules.step_up_min, rules.step_up_max
            ),
        ));
    }

    if request.prepayment_amount < rules.prepayment_min {
        return Err(EmiPlannerError::invalid(
            "prepayment_amount",
            format!("Prepayment amount must be at least {}", rules.prepayment_min),
        ));
    }

    Ok(())
}

/// Validate the account and its relationship to the request and reference date.
pub fn validate_account(
    account: &LoanAccount,
    request: &CalculationRequest,
    as_of: NaiveDate,
) -> EmiPlannerResult<()> {
    if account.outstanding_principal <= Decimal::ZERO {
        return Err(EmiPlannerError::invalid(
            "outstanding_principal",
            "Outstanding principal must be positive",
        ));
    }
    if account.current_emi <= Decimal::ZERO {
        return Err(EmiPlannerError::invalid(
            "current_emi",
            "Current EMI must be positive",
        ));
    }
    if account.last_installment <= as_of {
        return Err(EmiPlannerError::invalid(
            "last_installment",
            format!(
                "Final installment {} must fall after the reference date {}",
                account.last_installment, as_of
            ),
        ));
    }
    if request.prepayment_amount >= account.outstanding_principal {
        return Err(EmiPlannerError::invalid(
            "prepayment_amount",
            format!(
                "Prepayment must be less than the outstanding principal {}",
                account.outstanding_principal
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::inputs::{StepUpMode, StepUpPolicy};

    fn request(rate: Decimal) -> CalculationRequest {
        CalculationRequest::at_rate(rate)
    }

    fn account() -> LoanAccount {
        LoanAccount {
            sanctioned_amount: dec!(3082384),
            outstanding_principal: dec!(2458898),
            current_emi: dec!(31507),
            first_installment: NaiveDate::from_ymd_opt(2020, 5, 2).unwrap(),
            last_installment: NaiveDate::from_ymd_opt(2035, 5, 10).unwrap(),
            initial_paid_emi: None,
        }
    }

    #[test]
    fn test_rate_bounds_inclusive() {
        let rules = ValidationRules::default();
        assert!(validate_request(&request(dec!(1)), &rules).is_ok());
        assert!(validate_request(&request(dec!(30)), &rules).is_ok());
        assert!(validate_request(&request(dec!(0)), &rules).unwrap_err().is_validation());
        assert!(validate_request(&request(dec!(31)), &rules).unwrap_err().is_validation());
    }

    #[test]
    fn test_step_up_bounds() {
        let rules = ValidationRules::default();
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut req = request(dec!(9));
        req.step_up = StepUpPolicy::new(StepUpMode::Yearly, dec!(100), start);
        assert!(validate_request(&req, &rules).is_ok());
        req.step_up.percentage = dec!(101);
        assert!(validate_request(&req, &rules).is_err());
        req.step_up.percentage = dec!(-1);
        assert!(validate_request(&req, &rules).is_err());
    }

    #[test]
    fn test_negative_prepayment_rejected() {
        let mut req = request(dec!(9));
        req.prepayment_amount = dec!(-1);
        let err = validate_request(&req, &ValidationRules::default()).unwrap_err();
        match err {
            EmiPlannerError::Validation { field, .. } => assert_eq!(field, "prepayment_amount"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_first_violation_wins() {
        let mut req = request(dec!(45));
        req.prepayment_amount = dec!(-1);
        match validate_request(&req, &ValidationRules::default()).unwrap_err() {
            EmiPlannerError::Validation { field, .. } => assert_eq!(field, "interest_rate"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_rules() {
        let rules = ValidationRules {
            interest_rate_min: dec!(6),
            interest_rate_max: dec!(12),
            ..ValidationRules::default()
        };
        assert!(validate_request(&request(dec!(5)), &rules).is_err());
        assert!(validate_request(&request(dec!(12)), &rules).is_ok());
    }

    #[test]
    fn test_inverted_rules_rejected() {
        let rules = ValidationRules {
            step_up_min: dec!(50),
            step_up_max: dec!(10),
            ..ValidationRules::default()
        };
        assert!(rules.check().is_err());
        assert!(ValidationRules::default().check().is_ok());
    }

    #[test]
    fn test_rules_partial_override_keeps_defaults() {
        let rules: ValidationRules = serde_json::from_str(r#"{"interest_rate_max": "24"}"#).unwrap();
        assert_eq!(rules.interest_rate_max, dec!(24));
        assert_eq!(rules.interest_rate_min, dec!(1));
    }

    #[test]
    fn test_account_prepayment_cannot_clear_loan() {
        let as_of = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let mut req = request(dec!(9));
        req.prepayment_amount = dec!(2458898);
        assert!(validate_account(&account(), &req, as_of).is_err());
        req.prepayment_amount = dec!(2458897);
        assert!(validate_account(&account(), &req, as_of).is_ok());
    }

    #[test]
    fn test_account_term_must_be_in_future() {
        let as_of = NaiveDate::from_ymd_opt(2035, 6, 1).unwrap();
        assert!(validate_account(&account(), &request(dec!(9)), as_of).is_err());
    }
}
