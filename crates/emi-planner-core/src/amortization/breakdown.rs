use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::ScheduleEntry;
use crate::error::EmiPlannerError;
use crate::types::Money;
use crate::EmiPlannerResult;

/// Schedule totals for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub total_emi: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    /// Balance of the last entry seen in this year.
    pub closing_balance: Money,
}

impl YearlyAggregate {
    fn opening(year: i32) -> Self {
        Self {
            year,
            total_emi: Decimal::ZERO,
            total_principal: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            closing_balance: Decimal::ZERO,
        }
    }
}

/// Year-keyed aggregates kept in the order each year first appears.
#[derive(Debug, Default)]
struct YearlyLedger {
    order: Vec<YearlyAggregate>,
    index: HashMap<i32, usize>,
}

impl YearlyLedger {
    fn record(&mut self, entry: &ScheduleEntry) -> EmiPlannerResult<()> {
        let year = entry.date.year();
        let slot = match self.index.get(&year) {
            Some(&slot) => slot,
            None => {
                self.order.push(YearlyAggregate::opening(year));
                self.index.insert(year, self.order.len() - 1);
                self.order.len() - 1
            }
        };

        let agg = &mut self.order[slot];
        agg.total_emi = accumulate(agg.total_emi, entry.payment, "EMI", year)?;
        agg.total_principal = accumulate(agg.total_principal, entry.principal, "principal", year)?;
        agg.total_interest = accumulate(agg.total_interest, entry.interest, "interest", year)?;
        agg.closing_balance = entry.balance;
        Ok(())
    }

    fn into_aggregates(self) -> Vec<YearlyAggregate> {
        self.order
    }
}

fn accumulate(total: Money, amount: Money, what: &str, year: i32) -> EmiPlannerResult<Money> {
    total
        .checked_add(amount)
        .ok_or_else(|| EmiPlannerError::overflow(format!("{year} total {what}")))
}

/// Group schedule entries by calendar year, in first-seen order.
pub fn yearly_breakdown(schedule: &[ScheduleEntry]) -> EmiPlannerResult<Vec<YearlyAggregate>> {
    let mut ledger = YearlyLedger::default();
    for entry in schedule {
        ledger.record(entry)?;
    }
    Ok(ledger.into_aggregates())
}

/// Views over a schedule used by reporting front ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleFilter {
    #[default]
    All,
    /// Every twelfth installment.
    Yearly,
    /// Installments above the account's current EMI.
    StepUp,
}

impl ScheduleFilter {
    pub fn matches(&self, entry: &ScheduleEntry, current_emi: Money) -> bool {
        match self {
            ScheduleFilter::All => true,
            ScheduleFilter::Yearly => entry.month % 12 == 0,
            ScheduleFilter::StepUp => entry.payment > current_emi,
        }
    }
}

/// Entries of `schedule` selected by `filter`, in schedule order.
pub fn filter_schedule(
    schedule: &[ScheduleEntry],
    filter: ScheduleFilter,
    current_emi: Money,
) -> Vec<&ScheduleEntry> {
    schedule
        .iter()
        .filter(|entry| filter.matches(entry, current_emi))
        .collect()
}

impl fmt::Display for ScheduleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleFilter::All => write!(f, "all"),
            ScheduleFilter::Yearly => write!(f, "yearly"),
            ScheduleFilter::StepUp => write!(f, "step-up"),
        }
    }
}

impl FromStr for ScheduleFilter {
    type Err = EmiPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ScheduleFilter::All),
            "yearly" => Ok(ScheduleFilter::Yearly),
            "step-up" | "stepup" => Ok(ScheduleFilter::StepUp),
            other => Err(EmiPlannerError::invalid(
                "filter",
                format!("unknown schedule filter '{other}' (expected all, yearly or step-up)"),
            )),
        }
    }
}
