use chrono::NaiveDate;

use crate::errors::Result;

use super::cashflow_model::{CashFlowEntry, SalaryRecord};

/// Read access to cash-flow streams and their entries.
pub trait CashFlowRepositoryTrait: Send + Sync {
    /// Human-readable label of the stream, used for default snapshot names.
    fn get_flow_label(&self, flow_id: &str) -> Result<String>;

    fn get_entries_in_range(
        &self,
        flow_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CashFlowEntry>>;

    fn get_salary_records_in_range(
        &self,
        flow_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SalaryRecord>>;
}
