//! Amortisation engine for a single EMI loan.
//!
//! Builds the month-by-month schedule for an outstanding loan under an
//! optional one-off prepayment and an EMI step-up policy, and derives the
//! summary analytics (effective annual rate, total interest, savings and a
//! calendar-year breakdown). Every computation is a pure function of its
//! inputs; the reference date is always passed in by the caller.

pub mod amortization;
pub mod calendar;
pub mod error;
pub mod time_value;
pub mod types;

pub use amortization::{
    compute_schedule, compute_schedule_with_rules, filter_schedule, plan_loan,
    CalculationRequest, CalculationResult, LoanAccount, LoanAnalysis, LoanPlanInput, LoanSummary,
    PrepaymentMode, ScheduleEntry, ScheduleFilter, StepUpMode, StepUpPolicy, ValidationRules,
    YearlyAggregate,
};
pub use error::EmiPlannerError;
pub use types::*;

/// Standard result type for all emi-planner operations
pub type EmiPlannerResult<T> = Result<T, EmiPlannerError>;
