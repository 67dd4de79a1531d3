//! [`Quote`] definitions.

use common::{money::Currency, Money, Percent};
use serde::{Deserialize, Serialize};

use super::add_on::{self, PricingMode};

/// Itemized price breakdown of a booking configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Number of billed rental days.
    pub total_days: u32,

    /// Price of a single rental day after coverage and discount.
    pub daily_rate: Money,

    /// Price of all the rental days.
    pub rental_total: Money,

    /// Priced add-on [`Line`]s, in selection order.
    pub add_ons: Vec<Line>,

    /// Sum of all the add-on [`Line`]s.
    pub add_ons_total: Money,

    /// Delivery fee.
    pub delivery_fee: Money,

    /// Share of the tariff deposit waived by the selected coverage.
    pub deposit_percent: Percent,

    /// Deposit to be taken.
    pub deposit_amount: Money,

    /// Total price: rental, add-ons and delivery.
    pub grand_total: Money,

    /// [`Currency`] of every amount in this [`Quote`].
    pub currency: Currency,

    /// Indicator whether no tariff tier applied and the last one was used.
    #[serde(default)]
    pub tariff_fallback: bool,
}

/// Priced add-on line of a [`Quote`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// ID of the priced add-on.
    pub add_on_id: add_on::Id,

    /// Name of the priced add-on.
    pub name: String,

    /// [`PricingMode`] of the priced add-on.
    pub pricing_mode: PricingMode,

    /// Price of a single unit.
    pub unit_price: Money,

    /// Number of charged units.
    pub quantity: u32,

    /// Price of all the charged units.
    pub total: Money,
}

/// [`Quote`] persisted along with a reservation.
///
/// Serialized with a numeric `version` field. Records written before
/// versioning carry no `version` at all and are read as [`LeanSnapshot`]s.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "repr::Snapshot", into = "repr::Snapshot")]
pub enum Snapshot {
    /// Early shape holding the totals only.
    Lean(LeanSnapshot),

    /// Complete [`Quote`].
    Full(Quote),
}

impl Snapshot {
    /// Returns the number of billed rental days.
    #[must_use]
    pub fn total_days(&self) -> u32 {
        match self {
            Self::Lean(s) => s.total_days,
            Self::Full(q) => q.total_days,
        }
    }

    /// Returns the price of a single rental day.
    #[must_use]
    pub fn daily_rate(&self) -> Money {
        match self {
            Self::Lean(s) => s.daily_rate,
            Self::Full(q) => q.daily_rate,
        }
    }

    /// Returns the total price.
    #[must_use]
    pub fn grand_total(&self) -> Money {
        match self {
            Self::Lean(s) => s.grand_total,
            Self::Full(q) => q.grand_total,
        }
    }

    /// Returns the deposit to be taken, if known.
    #[must_use]
    pub fn deposit_amount(&self) -> Option<Money> {
        match self {
            Self::Lean(s) => s.deposit_amount,
            Self::Full(q) => Some(q.deposit_amount),
        }
    }

    /// Returns the [`Currency`] of the amounts.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.grand_total().currency
    }

    /// Returns the complete [`Quote`], if this is a [`Snapshot::Full`].
    #[must_use]
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Lean(_) => None,
            Self::Full(q) => Some(q),
        }
    }
}

impl From<Quote> for Snapshot {
    fn from(quote: Quote) -> Self {
        Self::Full(quote)
    }
}

/// Totals-only shape of a [`Snapshot`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeanSnapshot {
    /// Number of billed rental days.
    pub total_days: u32,

    /// Price of a single rental day.
    pub daily_rate: Money,

    /// Total price.
    pub grand_total: Money,

    /// Deposit to be taken, if it was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<Money>,
}

mod repr {
    //! Wire representation of a [`Snapshot`].
    //!
    //! [`Snapshot`]: super::Snapshot

    use serde::{Deserialize, Serialize};

    use super::{LeanSnapshot, Quote};

    /// Wire representation of a [`super::Snapshot`].
    #[derive(Clone, Deserialize, Serialize)]
    #[serde(untagged)]
    pub(super) enum Snapshot {
        /// Versioned complete [`Quote`].
        Full {
            /// Always `2`.
            version: Version<2>,

            /// Flattened [`Quote`].
            #[serde(flatten)]
            quote: Quote,
        },

        /// [`LeanSnapshot`], either versioned or legacy.
        Lean {
            /// `1`, or absent for legacy records.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            version: Option<Version<1>>,

            /// Flattened [`LeanSnapshot`].
            #[serde(flatten)]
            lean: LeanSnapshot,
        },
    }

    /// Exact numeric version tag.
    #[derive(Clone, Copy, Deserialize, Serialize)]
    #[serde(try_from = "u8", into = "u8")]
    pub(super) struct Version<const N: u8>;

    impl<const N: u8> TryFrom<u8> for Version<N> {
        type Error = &'static str;

        fn try_from(v: u8) -> Result<Self, Self::Error> {
            (v == N).then_some(Self).ok_or("unexpected snapshot `version`")
        }
    }

    impl<const N: u8> From<Version<N>> for u8 {
        fn from(_: Version<N>) -> Self {
            N
        }
    }

    impl From<Snapshot> for super::Snapshot {
        fn from(repr: Snapshot) -> Self {
            match repr {
                Snapshot::Full { quote, .. } => Self::Full(quote),
                Snapshot::Lean { lean, .. } => Self::Lean(lean),
            }
        }
    }

    impl From<super::Snapshot> for Snapshot {
        fn from(snapshot: super::Snapshot) -> Self {
            match snapshot {
                super::Snapshot::Full(quote) => Self::Full {
                    version: Version,
                    quote,
                },
                super::Snapshot::Lean(lean) => Self::Lean {
                    version: Some(Version),
                    lean,
                },
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};
    use serde_json::json;

    use super::{LeanSnapshot, Quote, Snapshot};

    fn usd(major: i64) -> Money {
        Money::new(major * 100, Currency::Usd)
    }

    fn quote() -> Quote {
        Quote {
            total_days: 5,
            daily_rate: usd(40),
            rental_total: usd(200),
            add_ons: vec![],
            add_ons_total: usd(0),
            delivery_fee: usd(0),
            deposit_percent: Percent::ZERO,
            deposit_amount: usd(500),
            grand_total: usd(200),
            currency: Currency::Usd,
            tariff_fallback: false,
        }
    }

    #[test]
    fn full_snapshot_carries_version_2() {
        let snapshot = Snapshot::from(quote());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["version"], json!(2));
        assert_eq!(json["totalDays"], json!(5));

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn reads_unversioned_lean_records() {
        let json = json!({
            "totalDays": 3,
            "dailyRate": {"amount": 5000, "currency": "USD"},
            "grandTotal": {"amount": 15000, "currency": "USD"},
        });

        let snapshot: Snapshot = serde_json::from_value(json).unwrap();

        assert_eq!(
            snapshot,
            Snapshot::Lean(LeanSnapshot {
                total_days: 3,
                daily_rate: usd(50),
                grand_total: usd(150),
                deposit_amount: None,
            }),
        );
        assert_eq!(snapshot.grand_total(), usd(150));
        assert_eq!(snapshot.deposit_amount(), None);
        assert!(snapshot.quote().is_none());
    }

    #[test]
    fn rejects_unknown_versions() {
        let json = json!({
            "version": 3,
            "totalDays": 3,
            "dailyRate": {"amount": 5000, "currency": "USD"},
            "grandTotal": {"amount": 15000, "currency": "USD"},
        });

        assert!(serde_json::from_value::<Snapshot>(json).is_err());
    }
}
