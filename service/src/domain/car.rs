//! [`Car`] definitions.

use common::{money::Currency, Money, Percent};
use derive_more::{AsRef, Deref, Display, Error, From, FromStr, Into};
use uuid::Uuid;

use super::coverage;

/// Car available for rent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// Pricing [`Segment`] of this [`Car`].
    pub segment: Segment,

    /// [`Tariffs`] table of this [`Car`].
    pub tariffs: Tariffs,

    /// Inline [`coverage::Plan`]s offered with this [`Car`].
    pub coverage_plans: Vec<coverage::Plan>,

    /// Promotional discount applied to the daily price of this [`Car`].
    pub discount: Percent,
}

impl Car {
    /// Returns the inline [`coverage::Plan`] with the provided ID, if any.
    #[must_use]
    pub fn coverage_plan(&self, id: &coverage::Id) -> Option<&coverage::Plan> {
        self.coverage_plans.iter().find(|p| &p.id == id)
    }
}

/// ID of a [`Car`].
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

/// Pricing class of a [`Car`], like `economy` or `suv`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Segment(String);

impl Segment {
    /// Creates a new [`Segment`] if the given `segment` is valid.
    #[must_use]
    pub fn new(segment: impl Into<String>) -> Option<Self> {
        let segment = segment.into();
        Self::check(&segment).then_some(Self(segment))
    }

    /// Checks whether the given `segment` is a valid [`Segment`].
    fn check(segment: impl AsRef<str>) -> bool {
        let segment = segment.as_ref();
        segment.trim() == segment && !segment.is_empty() && segment.len() <= 64
    }
}

impl FromStr for Segment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Segment`")
    }
}

/// Tier of a [`Car`]'s daily-rate table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tariff {
    /// Minimal number of rental days this [`Tariff`] applies to.
    pub min_days: u32,

    /// Maximal number of rental days this [`Tariff`] applies to.
    ///
    /// `0` means unbounded.
    pub max_days: u32,

    /// Price of a single rental day.
    pub daily_price: Money,

    /// Deposit taken for the whole rental.
    pub deposit: Money,
}

impl Tariff {
    /// Indicates whether this [`Tariff`] applies to the provided number of
    /// rental days.
    #[must_use]
    pub fn applies_to(&self, days: i64) -> bool {
        days >= i64::from(self.min_days)
            && (self.max_days == 0 || days <= i64::from(self.max_days))
    }

    /// Indicates whether this [`Tariff`] has no upper bound.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_days == 0
    }
}

/// Ordered table of [`Tariff`] tiers.
#[derive(Clone, Debug, Default, Deref, Eq, From, PartialEq)]
#[deref(forward)]
pub struct Tariffs(Vec<Tariff>);

impl Tariffs {
    /// Returns the [`Currency`] this table is priced in, if it's not empty.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        self.0.first().map(|t| t.daily_price.currency)
    }

    /// Checks that the tiers of this table cover every positive number of
    /// days exactly once, ending with an unbounded tier, and share a single
    /// [`Currency`].
    ///
    /// # Errors
    ///
    /// With the first [`TilingError`] found, in tier order.
    pub fn check_tiling(&self) -> Result<(), TilingError> {
        use TilingError as E;

        let currency = self.currency().ok_or(E::Empty)?;

        let mut next = 1;
        for (i, t) in self.0.iter().enumerate() {
            if t.daily_price.currency != currency
                || t.deposit.currency != currency
            {
                return Err(E::MixedCurrencies { tier: i });
            }
            if !t.is_unbounded() && t.max_days < t.min_days {
                return Err(E::InvertedRange { tier: i });
            }
            if t.min_days > next {
                return Err(E::Gap {
                    from: next,
                    to: t.min_days - 1,
                });
            }
            if t.min_days < next {
                return Err(E::Overlap { tier: i });
            }
            if t.is_unbounded() {
                return if i + 1 == self.0.len() {
                    Ok(())
                } else {
                    Err(E::UnboundedNotLast { tier: i })
                };
            }
            next = t.max_days.saturating_add(1);
        }

        Err(E::MissingCatchAll)
    }
}

/// Violation of the [`Tariffs`] tiling.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum TilingError {
    /// [`Tariffs`] table has no tiers.
    #[display("`Tariffs` table is empty")]
    Empty,

    /// Some day counts are not covered by any tier.
    #[display("days {from}..={to} are not covered by any tier")]
    Gap {
        /// First uncovered day count.
        from: u32,

        /// Last uncovered day count.
        to: u32,
    },

    /// Tier covers day counts already covered by a previous one.
    #[display("tier #{tier} overlaps the previous one")]
    Overlap {
        /// Index of the overlapping tier.
        tier: usize,
    },

    /// Tier ends before it starts.
    #[display("tier #{tier} has `max_days` lower than `min_days`")]
    InvertedRange {
        /// Index of the inverted tier.
        tier: usize,
    },

    /// Unbounded tier is followed by other tiers.
    #[display("unbounded tier #{tier} is not the last one")]
    UnboundedNotLast {
        /// Index of the unbounded tier.
        tier: usize,
    },

    /// Last tier is bounded.
    #[display("last tier is bounded")]
    MissingCatchAll,

    /// Tier is priced in a [`Currency`] different from the first tier.
    #[display("tier #{tier} is priced in a different currency")]
    MixedCurrencies {
        /// Index of the tier with a different [`Currency`].
        tier: usize,
    },
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money};

    use super::{Tariff, Tariffs, TilingError};

    fn tier(min_days: u32, max_days: u32, daily: i64) -> Tariff {
        Tariff {
            min_days,
            max_days,
            daily_price: Money::new(daily * 100, Currency::Usd),
            deposit: Money::new(50_000, Currency::Usd),
        }
    }

    #[test]
    fn accepts_contiguous_table() {
        let tariffs = Tariffs::from(vec![
            tier(1, 2, 50),
            tier(3, 7, 40),
            tier(8, 29, 35),
            tier(30, 0, 30),
        ]);

        assert_eq!(tariffs.check_tiling(), Ok(()));
        assert_eq!(tariffs.currency(), Some(Currency::Usd));
    }

    #[test]
    fn reports_first_violation() {
        assert_eq!(Tariffs::default().check_tiling(), Err(TilingError::Empty));
        assert_eq!(
            Tariffs::from(vec![tier(1, 2, 50), tier(4, 0, 40)]).check_tiling(),
            Err(TilingError::Gap { from: 3, to: 3 }),
        );
        assert_eq!(
            Tariffs::from(vec![tier(1, 3, 50), tier(3, 0, 40)]).check_tiling(),
            Err(TilingError::Overlap { tier: 1 }),
        );
        assert_eq!(
            Tariffs::from(vec![tier(1, 0, 50), tier(2, 0, 40)]).check_tiling(),
            Err(TilingError::UnboundedNotLast { tier: 0 }),
        );
        assert_eq!(
            Tariffs::from(vec![tier(1, 7, 50)]).check_tiling(),
            Err(TilingError::MissingCatchAll),
        );
        assert_eq!(
            Tariffs::from(vec![tier(1, 5, 50), tier(6, 3, 40)]).check_tiling(),
            Err(TilingError::InvertedRange { tier: 1 }),
        );
    }

    #[test]
    fn applies_to_inclusive_bounds() {
        let t = tier(3, 7, 40);

        assert!(!t.applies_to(2));
        assert!(t.applies_to(3));
        assert!(t.applies_to(7));
        assert!(!t.applies_to(8));
        assert!(tier(30, 0, 30).applies_to(365));
    }
}
