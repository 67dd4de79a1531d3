//! [`Rental`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{datetime::Date, define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use uuid::Uuid;

use super::{car, reservation};

/// Operational record of a car physically handed over to a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rental {
    /// ID of this [`Rental`].
    pub id: Id,

    /// ID of the reservation this [`Rental`] was created from.
    pub reservation_id: reservation::Id,

    /// ID of the rented car.
    pub car_id: car::Id,

    /// [`ContractNumber`] of this [`Rental`].
    pub contract_number: ContractNumber,

    /// Odometer reading when the car was picked up, if recorded.
    pub pickup_odometer: Option<u32>,

    /// [`DateTime`] when the car was picked up.
    pub picked_up_at: PickupDateTime,

    /// [`DateTime`] when the car was actually returned, if it was.
    pub returned_at: Option<ReturnDateTime>,

    /// [`Status`] of this [`Rental`].
    pub status: Status,
}

/// ID of a [`Rental`].
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
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Contract number of a [`Rental`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct ContractNumber(String);

impl ContractNumber {
    /// Creates a new [`ContractNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Generates a [`ContractNumber`] of the `RC-YYYYMMDD-XXXXXXXX` form out
    /// of the pickup [`Date`] and the [`Rental`] [`Id`].
    #[must_use]
    pub fn generate(date: Date, id: Id) -> Self {
        let mut hex = id.0.simple().to_string();
        hex.truncate(8);
        Self(format!(
            "RC-{:04}{:02}{:02}-{}",
            date.year(),
            u8::from(date.month()),
            date.day(),
            hex.to_ascii_uppercase(),
        ))
    }

    /// Checks whether the given `number` is a valid [`ContractNumber`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 64
    }
}

impl FromStr for ContractNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ContractNumber`")
    }
}

define_kind! {
    #[doc = "Status of a [`Rental`]."]
    #[case = "snake_case"]
    enum Status {
        #[doc = "Car is with the client."]
        Active = 1,

        #[doc = "Car was returned."]
        Completed = 2,

        #[doc = "Rental was cancelled."]
        Cancelled = 3,
    }
}

/// [`DateTime`] when a car was picked up.
pub type PickupDateTime = DateTimeOf<(Rental, unit::Pickup)>;

/// [`DateTime`] when a car was returned.
pub type ReturnDateTime = DateTimeOf<(Rental, unit::Return)>;

#[cfg(test)]
mod spec {
    use common::DateTime;
    use uuid::Uuid;

    use super::{ContractNumber, Id};

    #[test]
    fn generates_contract_number() {
        let date = DateTime::from_rfc3339("2024-03-05T10:00:00Z")
            .unwrap()
            .date();
        let id = Id::from(
            Uuid::parse_str("0a1b2c3d-4e5f-4a7b-8c9d-0e1f2a3b4c5d").unwrap(),
        );

        assert_eq!(
            ContractNumber::generate(date, id).to_string(),
            "RC-20240305-0A1B2C3D",
        );
    }
}
