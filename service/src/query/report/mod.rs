//! Operator reports.

pub mod fleet_utilization;
pub mod overdue;

pub use self::{fleet_utilization::FleetUtilization, overdue::Overdue};
