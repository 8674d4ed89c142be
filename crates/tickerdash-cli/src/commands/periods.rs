use serde::Serialize;
use tickerdash_core::Period;

use super::{CommandResult, Payload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodInfo {
    pub period: Period,
    pub label: &'static str,
    pub code: &'static str,
    pub days: i64,
}

impl From<Period> for PeriodInfo {
    fn from(period: Period) -> Self {
        Self {
            period,
            label: period.label(),
            code: period.code(),
            days: period.days(),
        }
    }
}

pub fn run() -> CommandResult {
    let periods = Period::ALL.into_iter().map(PeriodInfo::from).collect();
    CommandResult::ok(Payload::Periods(periods))
}
