//! Schedule generation, step-up policy, yearly breakdown and plan analytics.

pub mod breakdown;
pub mod engine;
pub mod inputs;
pub mod plan;
pub mod schedule;
pub mod step_up;
pub mod validation;

pub use breakdown::{filter_schedule, yearly_breakdown, ScheduleFilter, YearlyAggregate};
pub use engine::{
    compute_schedule, compute_schedule_with_rules, CalculationResult, LoanAnalysis, LoanSummary,
};
pub use inputs::{CalculationRequest, LoanAccount, PrepaymentMode, StepUpMode, StepUpPolicy};
pub use plan::{plan_loan, LoanPlanInput};
pub use schedule::{build_schedule, ScheduleEntry, ScheduleRun};
pub use step_up::stepped_emi;
pub use validation::ValidationRules;
