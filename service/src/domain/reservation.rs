//! [`Reservation`] definitions.

use common::{define_kind, unit, DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use uuid::Uuid;

use super::{
    add_on::{self, PricingMode},
    car, coverage,
    quote::Snapshot,
    Client,
};

/// Confirmed intent to rent a specific car over a date range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// ID of the reserved car.
    pub car_id: car::Id,

    /// [`Client`] renting the car.
    pub client: Client,

    /// [`DateTime`] when the car is picked up.
    pub pickup_at: PickupDateTime,

    /// [`DateTime`] when the car is returned.
    pub return_at: ReturnDateTime,

    /// [`Location`] where the car is picked up.
    pub pickup_location: Location,

    /// [`Location`] where the car is returned.
    pub return_location: Location,

    /// Selected coverage, if any.
    pub coverage: Option<coverage::Selection>,

    /// Delivery fee, if any.
    pub delivery_fee: Option<Money>,

    /// [`AddOnRecord`]s of this [`Reservation`], in the order they were added.
    pub add_ons: Vec<AddOnRecord>,

    /// Last persisted price breakdown of this [`Reservation`].
    pub price_snapshot: Snapshot,

    /// [`Status`] of this [`Reservation`].
    pub status: Status,

    /// [`DateTime`] when this [`Reservation`] was cancelled, if it was.
    pub cancelled_at: Option<CancellationDateTime>,

    /// [`CancellationReason`] of this [`Reservation`], if it was cancelled.
    pub cancellation_reason: Option<CancellationReason>,

    /// [`DateTime`] when this [`Reservation`] was marked as a no-show.
    pub no_show_at: Option<NoShowDateTime>,

    /// [`DateTime`] when this [`Reservation`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Reservation`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Reservation {
    /// Checks whether this [`Reservation`] may be edited.
    ///
    /// # Errors
    ///
    /// With [`TransitionError::NotConfirmed`] unless this [`Reservation`] is
    /// [`Status::Confirmed`].
    pub fn ensure_editable(&self) -> Result<(), TransitionError> {
        if self.status == Status::Confirmed {
            Ok(())
        } else {
            Err(TransitionError::NotConfirmed(self.status))
        }
    }

    /// Applies the provided [`Transition`] to this [`Reservation`] at the
    /// provided `now` moment.
    ///
    /// Nothing is changed if the [`Transition`] is rejected.
    ///
    /// # Errors
    ///
    /// If the [`Transition`] is not allowed from the current [`Status`] or its
    /// guard doesn't hold.
    pub fn apply(
        &mut self,
        transition: Transition,
        now: DateTime,
    ) -> Result<Status, TransitionError> {
        use Transition as T;
        use TransitionError as E;

        let to = self.status.next(&transition).ok_or_else(|| {
            match &transition {
                T::Reactivate => E::NotCancelledOrNoShow(self.status),
                T::PickUp | T::Cancel(_) | T::MarkNoShow => {
                    E::NotConfirmed(self.status)
                }
            }
        })?;

        match transition {
            T::PickUp => {
                if now.date() < self.pickup_at.date() {
                    return Err(E::TooEarlyForPickup);
                }
            }
            T::Cancel(reason) => {
                let reason = reason
                    .as_deref()
                    .and_then(CancellationReason::new)
                    .ok_or(E::MissingReason)?;
                self.cancelled_at = Some(now.coerce());
                self.cancellation_reason = Some(reason);
            }
            T::MarkNoShow => {
                self.no_show_at = Some(now.coerce());
            }
            T::Reactivate => {
                self.cancelled_at = None;
                self.cancellation_reason = None;
                self.no_show_at = None;
            }
        }

        self.status = to;
        self.updated_at = now.coerce();
        Ok(to)
    }
}

/// ID of a [`Reservation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Reservation`]."]
    #[case = "snake_case"]
    enum Status {
        #[doc = "Reservation is active and editable."]
        Confirmed = 1,

        #[doc = "Car was handed over to the client."]
        PickedUp = 2,

        #[doc = "Reservation was cancelled."]
        Cancelled = 3,

        #[doc = "Client never showed up."]
        NoShow = 4,
    }
}

impl Status {
    /// Indicates whether a [`Reservation`] in this [`Status`] occupies its car.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Confirmed | Self::PickedUp)
    }

    /// Returns the [`Status`] the provided [`Transition`] leads to from this
    /// one, if it's allowed.
    #[must_use]
    pub fn next(self, transition: &Transition) -> Option<Self> {
        use Transition as T;

        match (self, transition) {
            (Self::Confirmed, T::PickUp) => Some(Self::PickedUp),
            (Self::Confirmed, T::Cancel(_)) => Some(Self::Cancelled),
            (Self::Confirmed, T::MarkNoShow) => Some(Self::NoShow),
            (Self::Cancelled | Self::NoShow, T::Reactivate) => {
                Some(Self::Confirmed)
            }
            (
                Self::Confirmed
                | Self::PickedUp
                | Self::Cancelled
                | Self::NoShow,
                T::PickUp | T::Cancel(_) | T::MarkNoShow | T::Reactivate,
            ) => None,
        }
    }
}

/// Change of a [`Reservation`]'s [`Status`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Car is handed over to the client.
    PickUp,

    /// [`Reservation`] is cancelled with the provided free-text reason.
    Cancel(Option<String>),

    /// Client didn't show up.
    MarkNoShow,

    /// Cancelled or no-show [`Reservation`] is confirmed again.
    Reactivate,
}

/// Error of applying a [`Transition`] to a [`Reservation`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum TransitionError {
    /// [`Reservation`] is not [`Status::Confirmed`].
    #[display("`Reservation` is `{_0}`, not `confirmed`")]
    NotConfirmed(#[error(not(source))] Status),

    /// [`Reservation`] is neither [`Status::Cancelled`] nor
    /// [`Status::NoShow`].
    #[display("`Reservation` is `{_0}`, not `cancelled` or `no_show`")]
    NotCancelledOrNoShow(#[error(not(source))] Status),

    /// Pickup date of the [`Reservation`] hasn't come yet.
    #[display("pickup date hasn't come yet")]
    TooEarlyForPickup,

    /// No cancellation reason was provided.
    #[display("cancellation reason is missing")]
    MissingReason,
}

/// Add-on attached to a [`Reservation`], with its price copied at the moment
/// it was added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddOnRecord {
    /// ID of this [`AddOnRecord`].
    pub id: AddOnRecordId,

    /// ID of the catalog add-on.
    pub add_on_id: add_on::Id,

    /// Name of the add-on.
    pub name: String,

    /// [`PricingMode`] of the add-on.
    pub pricing_mode: PricingMode,

    /// Price of a single unit, copied from the catalog.
    pub unit_price: Money,

    /// Quantity explicitly supplied for a [`PricingMode::ManualQty`] add-on.
    pub manual_quantity: Option<u32>,

    /// Number of charged units, as last priced.
    pub quantity: u32,

    /// Price of all the charged units, as last priced.
    pub total: Money,
}

/// ID of an [`AddOnRecord`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
)]
pub struct AddOnRecordId(Uuid);

impl AddOnRecordId {
    /// Creates a new random [`AddOnRecordId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Pickup or return location of a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Free-text reason of a [`Reservation`] cancellation.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Creates a new [`CancellationReason`] out of the given `reason`,
    /// trimming it.
    ///
    /// [`None`] is returned if nothing remains after trimming.
    #[must_use]
    pub fn new(reason: impl AsRef<str>) -> Option<Self> {
        let reason = reason.as_ref().trim();
        (!reason.is_empty() && reason.len() <= 2048)
            .then(|| Self(reason.to_owned()))
    }
}

/// [`DateTime`] when a car is picked up.
pub type PickupDateTime = DateTimeOf<(Reservation, unit::Pickup)>;

/// [`DateTime`] when a car is returned.
pub type ReturnDateTime = DateTimeOf<(Reservation, unit::Return)>;

/// [`DateTime`] when a [`Reservation`] was created.
pub type CreationDateTime = DateTimeOf<(Reservation, unit::Creation)>;

/// [`DateTime`] when a [`Reservation`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Reservation, unit::Modification)>;

/// [`DateTime`] when a [`Reservation`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Reservation, unit::Cancellation)>;

/// [`DateTime`] when a [`Reservation`] was marked as a no-show.
pub type NoShowDateTime = DateTimeOf<(Reservation, unit::NoShow)>;

#[cfg(test)]
pub(crate) mod spec {
    use common::{money::Currency, DateTime, Money};

    use crate::domain::{
        car,
        client::{self, Client},
        quote::{LeanSnapshot, Snapshot},
    };

    use super::{
        Id, Location, Reservation, Status, Transition, TransitionError,
    };

    /// Creates a [`Reservation`] fixture in the provided [`Status`].
    pub(crate) fn reservation(
        car_id: car::Id,
        pickup: &str,
        ret: &str,
        status: Status,
    ) -> Reservation {
        let now = DateTime::from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        Reservation {
            id: Id::new(),
            car_id,
            client: Client {
                name: client::Name::new("Jane Doe").unwrap(),
                phone: None,
                email: None,
            },
            pickup_at: DateTime::from_rfc3339(pickup).unwrap().coerce(),
            return_at: DateTime::from_rfc3339(ret).unwrap().coerce(),
            pickup_location: Location::new("Airport").unwrap(),
            return_location: Location::new("Airport").unwrap(),
            coverage: None,
            delivery_fee: None,
            add_ons: vec![],
            price_snapshot: Snapshot::Lean(LeanSnapshot {
                total_days: 1,
                daily_rate: Money::new(4000, Currency::Usd),
                grand_total: Money::new(4000, Currency::Usd),
                deposit_amount: None,
            }),
            status,
            cancelled_at: None,
            cancellation_reason: None,
            no_show_at: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn transitions() -> [Transition; 4] {
        [
            Transition::PickUp,
            Transition::Cancel(Some("changed plans".into())),
            Transition::MarkNoShow,
            Transition::Reactivate,
        ]
    }

    #[test]
    fn transition_table() {
        let reachable = |from: Status| {
            transitions()
                .iter()
                .filter_map(|t| from.next(t))
                .collect::<Vec<_>>()
        };

        assert_eq!(
            reachable(Status::Confirmed),
            [Status::PickedUp, Status::Cancelled, Status::NoShow],
        );
        assert_eq!(reachable(Status::Cancelled), [Status::Confirmed]);
        assert_eq!(reachable(Status::NoShow), [Status::Confirmed]);
        assert_eq!(reachable(Status::PickedUp), Vec::<Status>::new());
    }

    #[test]
    fn pickup_compares_calendar_dates() {
        let mut r = reservation(
            car::Id::new(),
            "2024-05-10T18:00:00Z",
            "2024-05-12T18:00:00Z",
            Status::Confirmed,
        );

        assert_eq!(
            r.apply(Transition::PickUp, at("2024-05-09T23:59:59Z")),
            Err(TransitionError::TooEarlyForPickup),
        );
        assert_eq!(r.status, Status::Confirmed);

        assert_eq!(
            r.apply(Transition::PickUp, at("2024-05-10T08:00:00Z")),
            Ok(Status::PickedUp),
        );
        assert_eq!(
            r.apply(Transition::Reactivate, at("2024-05-10T09:00:00Z")),
            Err(TransitionError::NotCancelledOrNoShow(Status::PickedUp)),
        );
    }

    #[test]
    fn cancel_requires_reason() {
        let mut r = reservation(
            car::Id::new(),
            "2024-05-10T18:00:00Z",
            "2024-05-12T18:00:00Z",
            Status::Confirmed,
        );
        let now = at("2024-05-01T00:00:00Z");

        assert_eq!(
            r.apply(Transition::Cancel(Some("   ".into())), now),
            Err(TransitionError::MissingReason),
        );
        assert_eq!(
            r.apply(Transition::Cancel(None), now),
            Err(TransitionError::MissingReason),
        );
        assert_eq!(r.status, Status::Confirmed);
        assert_eq!(r.cancelled_at, None);

        assert_eq!(
            r.apply(Transition::Cancel(Some(" flight moved ".into())), now),
            Ok(Status::Cancelled),
        );
        assert_eq!(
            r.cancellation_reason.as_ref().map(AsRef::<str>::as_ref),
            Some("flight moved"),
        );
        assert_eq!(r.cancelled_at, Some(now.coerce()));
    }

    #[test]
    fn reactivation_clears_metadata() {
        let mut r = reservation(
            car::Id::new(),
            "2024-05-10T18:00:00Z",
            "2024-05-12T18:00:00Z",
            Status::Confirmed,
        );
        let now = at("2024-05-11T00:00:00Z");

        assert_eq!(r.apply(Transition::MarkNoShow, now), Ok(Status::NoShow));
        assert_eq!(r.no_show_at, Some(now.coerce()));
        assert_eq!(
            r.apply(Transition::MarkNoShow, now),
            Err(TransitionError::NotConfirmed(Status::NoShow)),
        );
        assert_eq!(
            r.ensure_editable(),
            Err(TransitionError::NotConfirmed(Status::NoShow)),
        );

        assert_eq!(r.apply(Transition::Reactivate, now), Ok(Status::Confirmed));
        assert_eq!(r.no_show_at, None);
        assert_eq!(r.cancelled_at, None);
        assert_eq!(r.cancellation_reason, None);
        assert_eq!(r.ensure_editable(), Ok(()));
    }
}
