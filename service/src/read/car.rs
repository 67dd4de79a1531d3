//! [`Car`]-related read definitions.

#[cfg(doc)]
use crate::domain::Car;

/// Selector of all the [`Car`]s in the fleet, ordered by their IDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct All;
