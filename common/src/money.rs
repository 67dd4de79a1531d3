//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`], stored as an integer number of its
/// minor units (cents).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Money {
    /// Amount of this [`Money`] in minor units.
    pub amount: i64,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Number of minor units in a single major unit of any [`Currency`].
    pub const MINOR_PER_MAJOR: i64 = 100;

    /// Creates a new [`Money`] of the provided minor units `amount`.
    #[must_use]
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Indicates whether this [`Money`] is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Adds the `other` [`Money`] to this one.
    ///
    /// [`None`] is returned if the currencies differ or the sum overflows.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency == other.currency).then_some(())?;
        Some(Self::new(self.amount.checked_add(other.amount)?, self.currency))
    }

    /// Multiplies this [`Money`] by the provided integer `factor`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<Self> {
        Some(Self::new(self.amount.checked_mul(factor)?, self.currency))
    }

    /// Multiplies this [`Money`] by the provided decimal `factor`, rounding
    /// the result half-up to the nearest minor unit.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn scale(self, factor: Decimal) -> Option<Self> {
        let scaled = Decimal::from(self.amount).checked_mul(factor)?;
        Some(Self::new(round_half_up(scaled)?, self.currency))
    }
}

/// Rounds the provided amount of minor units half-up (away from zero) to an
/// integer.
///
/// [`None`] is returned if the result doesn't fit into [`i64`].
#[must_use]
pub fn round_half_up(amount: Decimal) -> Option<i64> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        let major = amount / Self::MINOR_PER_MAJOR;
        let minor = (amount % Self::MINOR_PER_MAJOR).abs();
        let sign = if *amount < 0 && major == 0 { "-" } else { "" };
        if minor == 0 {
            write!(f, "{sign}{major}{currency}")
        } else {
            write!(f, "{sign}{major}.{minor:02}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        let minor = amount
            .checked_mul(Decimal::from(Self::MINOR_PER_MAJOR))
            .filter(Decimal::is_integer)
            .ok_or("too precise amount")?
            .to_i64()
            .ok_or("too large amount")?;

        Ok(Self::new(minor, currency))
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer of at most two digits;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money::new(12345, Currency::Usd),
        );
        assert_eq!(
            Money::from_str("123.4EUR").unwrap(),
            Money::new(12340, Currency::Eur),
        );
        assert_eq!(
            Money::from_str("123GBP").unwrap(),
            Money::new(12300, Currency::Gbp),
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45Usdollar").is_err());
        assert!(Money::from_str("123.456USD").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::new(12345, Currency::Usd).to_string(), "123.45USD");
        assert_eq!(Money::new(12305, Currency::Eur).to_string(), "123.05EUR");
        assert_eq!(Money::new(12300, Currency::Usd).to_string(), "123USD");
        assert_eq!(Money::new(-50, Currency::Usd).to_string(), "-0.50USD");
        assert_eq!(Money::new(0, Currency::Gbp).to_string(), "0GBP");
    }

    #[test]
    fn scale_rounds_half_up_once() {
        let price = Money::new(4000, Currency::Usd);

        assert_eq!(
            price.scale(decimal("1.10")).unwrap(),
            Money::new(4400, Currency::Usd),
        );
        assert_eq!(
            Money::new(5, Currency::Usd).scale(decimal("0.5")).unwrap(),
            Money::new(3, Currency::Usd),
        );
        assert_eq!(
            Money::new(-5, Currency::Usd).scale(decimal("0.5")).unwrap(),
            Money::new(-3, Currency::Usd),
        );
    }

    #[test]
    fn checked_add_requires_same_currency() {
        let usd = Money::new(100, Currency::Usd);

        assert_eq!(usd.checked_add(usd), Some(Money::new(200, Currency::Usd)));
        assert_eq!(usd.checked_add(Money::new(100, Currency::Eur)), None);
    }
}
