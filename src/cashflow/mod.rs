pub mod cashflow_model;
pub mod cashflow_traits;

pub use cashflow_model::{CashFlowEntry, EntryDirection, SalaryRecord};
pub use cashflow_traits::CashFlowRepositoryTrait;
