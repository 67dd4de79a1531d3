//! Car availability over date ranges.

use common::{DateTime, DateTimeOf};
use derive_more::{Display, Error};

use crate::domain::{reservation, Reservation};

/// Half-open `[start, end)` time interval.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interval {
    /// Inclusive start of this [`Interval`].
    pub start: DateTime,

    /// Exclusive end of this [`Interval`].
    pub end: DateTime,
}

impl Interval {
    /// Creates a new [`Interval`] between the provided moments.
    #[must_use]
    pub fn new<A: ?Sized, B: ?Sized>(
        start: DateTimeOf<A>,
        end: DateTimeOf<B>,
    ) -> Self {
        Self {
            start: start.coerce(),
            end: end.coerce(),
        }
    }

    /// Indicates whether this [`Interval`] overlaps the `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clips this [`Interval`] to the provided `window`.
    ///
    /// [`None`] is returned if nothing remains.
    #[must_use]
    pub fn clip(&self, window: &Self) -> Option<Self> {
        let clipped = Self {
            start: self.start.max(window.start),
            end: self.end.min(window.end),
        };
        (clipped.start < clipped.end).then_some(clipped)
    }
}

impl From<&Reservation> for Interval {
    fn from(r: &Reservation) -> Self {
        Self::new(r.pickup_at, r.return_at)
    }
}

/// Checks whether the `requested` [`Interval`] is free among the `existing`
/// [`Reservation`]s of a car.
///
/// Only [`reservation::Status::is_blocking`] [`Reservation`]s are taken into
/// account. The one with the `exclude` ID is skipped, so a [`Reservation`]
/// never conflicts with itself.
///
/// # Errors
///
/// With [`Unavailable`] carrying the first conflicting [`Reservation`].
pub fn check<'r>(
    existing: impl IntoIterator<Item = &'r Reservation>,
    requested: Interval,
    exclude: Option<reservation::Id>,
) -> Result<(), Unavailable> {
    existing
        .into_iter()
        .filter(|r| Some(r.id) != exclude && r.status.is_blocking())
        .find(|r| Interval::from(*r).overlaps(&requested))
        .map_or(Ok(()), |r| Err(Unavailable(r.id)))
}

/// Car is taken by another [`Reservation`] over the requested [`Interval`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("car is taken by `Reservation(id: {_0})`")]
pub struct Unavailable(#[error(not(source))] pub reservation::Id);

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{
        car,
        reservation::{spec::reservation, Status},
    };

    use super::{check, Interval, Unavailable};

    fn interval(start: &str, end: &str) -> Interval {
        Interval::new(
            DateTime::from_rfc3339(start).unwrap(),
            DateTime::from_rfc3339(end).unwrap(),
        )
    }

    #[test]
    fn half_open_overlap() {
        let a = interval("2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z");

        assert!(a.overlaps(&interval(
            "2024-05-04T10:00:00Z",
            "2024-05-06T10:00:00Z",
        )));
        assert!(a.overlaps(&interval(
            "2024-05-02T00:00:00Z",
            "2024-05-03T00:00:00Z",
        )));
        assert!(!a.overlaps(&interval(
            "2024-05-05T10:00:00Z",
            "2024-05-07T10:00:00Z",
        )));
        assert!(!a.overlaps(&interval(
            "2024-04-28T10:00:00Z",
            "2024-05-01T10:00:00Z",
        )));
    }

    #[test]
    fn clips_to_window() {
        let window = interval("2024-05-01T00:00:00Z", "2024-05-31T00:00:00Z");

        assert_eq!(
            interval("2024-04-28T00:00:00Z", "2024-05-03T00:00:00Z")
                .clip(&window),
            Some(interval("2024-05-01T00:00:00Z", "2024-05-03T00:00:00Z")),
        );
        assert_eq!(
            interval("2024-04-28T00:00:00Z", "2024-05-01T00:00:00Z")
                .clip(&window),
            None,
        );
    }

    #[test]
    fn only_blocking_statuses_conflict() {
        let car_id = car::Id::new();
        let req = interval("2024-05-03T10:00:00Z", "2024-05-06T10:00:00Z");
        let (from, to) = ("2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z");

        for status in [Status::Cancelled, Status::NoShow] {
            let existing = [reservation(car_id, from, to, status)];
            assert_eq!(check(&existing, req, None), Ok(()));
        }
        for status in [Status::Confirmed, Status::PickedUp] {
            let existing = [reservation(car_id, from, to, status)];
            assert_eq!(
                check(&existing, req, None),
                Err(Unavailable(existing[0].id)),
            );
            assert_eq!(
                check(&existing, req, Some(existing[0].id)),
                Ok(()),
            );
        }
    }
}
