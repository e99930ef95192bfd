use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use emi_planner_core::{LoanPlanInput, ScheduleEntry, ScheduleFilter};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Full plan envelope for a `{ account, request, as_of_date, rules? }` document.
#[napi]
pub fn plan_loan(input_json: String) -> NapiResult<String> {
    let input: LoanPlanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_planner_core::plan_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Bare calculation result (schedule, summary, analysis), no envelope.
#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanPlanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = emi_planner_core::compute_schedule_with_rules(
        &input.account,
        &input.request,
        input.as_of_date,
        &input.rules,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FilterRequest {
    schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    filter: ScheduleFilter,
    current_emi: Decimal,
}

/// Filter a previously computed schedule:
/// `{ schedule, filter: "all" | "yearly" | "step-up", current_emi }`.
#[napi]
pub fn filter_schedule(input_json: String) -> NapiResult<String> {
    let req: FilterRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let entries = emi_planner_core::filter_schedule(&req.schedule, req.filter, req.current_emi);
    serde_json::to_string(&entries).map_err(to_napi_error)
}
