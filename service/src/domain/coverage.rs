//! Coverage definitions.
//!
//! A car carries its own inline [`Plan`]s, while [`Package`]s come from the
//! pricing catalog. Both express deposit reduction differently, so they are
//! normalized into a single [`Modifier`] before entering any calculation.

use std::str::FromStr;

use common::Percent;
use derive_more::{AsRef, Display};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coverage option attached to a specific car.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Plan {
    /// ID of this [`Plan`].
    pub id: Id,

    /// Human-readable name of this [`Plan`].
    pub name: String,

    /// Markup applied to the daily price.
    pub price_percent: Markup,

    /// Share of the deposit waived by this [`Plan`].
    pub deposit_waived_percent: Percent,
}

/// Coverage option from the pricing catalog, available for any car.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Package {
    /// ID of this [`Package`].
    pub id: Id,

    /// Human-readable name of this [`Package`].
    pub name: String,

    /// Markup applied to the daily price.
    pub price_percent: Markup,

    /// Share of the deposit still owed under this [`Package`].
    ///
    /// `0` means full coverage, `100` means the full deposit is owed.
    pub deposit_remaining_percent: Percent,
}

/// Coverage selected for a quote or a reservation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum Selection {
    /// [`Plan`] of the car itself.
    Plan(Id),

    /// [`Package`] from the pricing catalog.
    Package(Id),
}

impl Selection {
    /// Returns the [`Id`] of the selected coverage.
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            Self::Plan(id) | Self::Package(id) => id,
        }
    }
}

/// Normalized price and deposit modifier of a coverage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Modifier {
    /// Markup applied to the daily price.
    pub price_percent: Markup,

    /// Share of the deposit waived.
    pub deposit_waived_percent: Percent,
}

impl Modifier {
    /// [`Modifier`] of no coverage at all.
    pub const NONE: Self = Self {
        price_percent: Markup::ZERO,
        deposit_waived_percent: Percent::ZERO,
    };
}

impl From<&Plan> for Modifier {
    fn from(plan: &Plan) -> Self {
        Self {
            price_percent: plan.price_percent,
            deposit_waived_percent: plan.deposit_waived_percent,
        }
    }
}

impl From<&Package> for Modifier {
    fn from(package: &Package) -> Self {
        Self {
            price_percent: package.price_percent,
            deposit_waived_percent: package
                .deposit_remaining_percent
                .complement(),
        }
    }
}

/// Non-negative markup of a price, in percent.
///
/// Unlike a [`Percent`], it may exceed `100`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Markup(Decimal);

impl Markup {
    /// No markup at all.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Markup`] if the provided value is not negative.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (val >= Decimal::ZERO).then_some(Self(val))
    }

    /// Returns this [`Markup`] as a fraction of the price.
    #[must_use]
    pub fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Returns the inner [`Decimal`] value of this [`Markup`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Markup {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid markup value")
    }
}

/// ID of a [`Plan`] or a [`Package`].
///
/// Lowercase ASCII slug, like `full-cover`.
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
        Self::new(s).ok_or("invalid coverage `Id`")
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid coverage `Id`")
    }
}

#[cfg(test)]
mod spec {
    use common::Percent;
    use rust_decimal::Decimal;

    use super::{Id, Markup, Modifier, Package, Plan};

    fn percent(s: &str) -> Percent {
        s.parse().unwrap()
    }

    fn markup(s: &str) -> Markup {
        s.parse().unwrap()
    }

    #[test]
    fn package_owes_the_remaining_deposit() {
        let package = Package {
            id: Id::new("basic").unwrap(),
            name: "Basic".into(),
            price_percent: markup("10"),
            deposit_remaining_percent: percent("30"),
        };

        assert_eq!(
            Modifier::from(&package),
            Modifier {
                price_percent: markup("10"),
                deposit_waived_percent: percent("70"),
            },
        );
    }

    #[test]
    fn plan_waives_the_deposit() {
        let plan = Plan {
            id: Id::new("full").unwrap(),
            name: "Full".into(),
            price_percent: markup("25"),
            deposit_waived_percent: percent("100"),
        };

        assert_eq!(
            Modifier::from(&plan),
            Modifier {
                price_percent: markup("25"),
                deposit_waived_percent: percent("100"),
            },
        );
    }

    #[test]
    fn markup_may_exceed_a_hundred() {
        assert_eq!(markup("150").fraction(), Decimal::new(15, 1));
        assert_eq!(markup("0"), Markup::ZERO);
        assert!("-5".parse::<Markup>().is_err());
        assert!("much".parse::<Markup>().is_err());
    }

    #[test]
    fn id_is_a_slug() {
        assert!(Id::new("full-cover_2").is_some());
        assert!(Id::new("Full").is_none());
        assert!(Id::new("").is_none());
        assert!(Id::new("a b").is_none());
    }
}
