//! [`Reservation`]-related read definitions.

use crate::{availability::Interval, domain::car};
#[cfg(doc)]
use crate::domain::Reservation;

/// Selector of [`Reservation`]s of any status whose `[pickup, return)`
/// interval overlaps the provided one.
///
/// Results are ordered by pickup.
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// Car to select [`Reservation`]s of, or the whole fleet if [`None`].
    pub car_id: Option<car::Id>,

    /// [`Interval`] to overlap.
    pub interval: Interval,
}
