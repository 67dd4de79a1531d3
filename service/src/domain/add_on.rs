//! [`AddOn`] definitions.

use std::str::FromStr;

use common::{define_kind, Money};
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Priced extra service or item offered with a rental.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddOn {
    /// ID of this [`AddOn`].
    pub id: Id,

    /// Human-readable name of this [`AddOn`].
    pub name: String,

    /// [`PricingMode`] of this [`AddOn`].
    pub pricing_mode: PricingMode,

    /// Price of a single unit of this [`AddOn`].
    pub unit_price: Money,

    /// Indicator whether an operator may edit the quantity of this [`AddOn`].
    pub is_quantity_editable: bool,
}

define_kind! {
    #[doc = "Way the quantity of an [`AddOn`] is determined."]
    enum PricingMode {
        #[doc = "Charged for every rental day."]
        PerDay = 1,

        #[doc = "Charged once regardless of the rental duration."]
        OneTime = 2,

        #[doc = "Charged for an explicitly supplied quantity."]
        ManualQty = 3,
    }
}

/// Quantity used for a [`PricingMode::ManualQty`] [`AddOn`] when none is
/// supplied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DefaultQuantity {
    /// Number of rental days.
    #[default]
    RentalDays,

    /// Fixed number of units.
    Fixed(u32),
}

impl FromStr for DefaultQuantity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rental_days" => Ok(Self::RentalDays),
            n => n
                .parse()
                .map(Self::Fixed)
                .map_err(|_| "invalid `DefaultQuantity`"),
        }
    }
}

/// [`AddOn`] selected for a quote.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// ID of the selected [`AddOn`].
    pub add_on_id: Id,

    /// Explicitly supplied quantity, if any.
    ///
    /// Only meaningful for [`PricingMode::ManualQty`].
    pub quantity: Option<u32>,
}

/// ID of an [`AddOn`].
///
/// Lowercase ASCII slug, like `child-seat`.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `slug` is valid.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Option<Self> {
        let slug = slug.into();
        Self::check(&slug).then_some(Self(slug))
    }

    /// Checks whether the given `slug` is a valid [`Id`].
    fn check(slug: impl AsRef<str>) -> bool {
        let slug = slug.as_ref();
        !slug.is_empty()
            && slug.len() <= 64
            && slug.bytes().all(|b| {
                b.is_ascii_lowercase()
                    || b.is_ascii_digit()
                    || b == b'-'
                    || b == b'_'
            })
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl TryFrom<String> for Id {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid add-on `Id`")
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid add-on `Id`")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{DefaultQuantity, PricingMode};

    #[test]
    fn default_quantity_from_str() {
        assert_eq!(
            DefaultQuantity::from_str("rental_days").unwrap(),
            DefaultQuantity::RentalDays,
        );
        assert_eq!(
            DefaultQuantity::from_str("2").unwrap(),
            DefaultQuantity::Fixed(2),
        );
        assert!(DefaultQuantity::from_str("-1").is_err());
    }

    #[test]
    fn pricing_mode_names() {
        assert_eq!(PricingMode::PerDay.to_string(), "PER_DAY");
        assert_eq!(
            PricingMode::from_str("MANUAL_QTY").unwrap(),
            PricingMode::ManualQty,
        );
    }
}
