//! Coverage and add-on price calculations.
//!
//! Every amount is rounded half-up once, at the point it's produced.

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{
    add_on::{DefaultQuantity, PricingMode},
    car::Tariff,
    coverage::Modifier,
    quote::Line,
};

use super::Item;

/// Calculates the daily price of the provided [`Tariff`] with the coverage
/// [`Modifier`] markup and then the `discount` applied.
///
/// [`None`] is returned on overflow.
#[must_use]
pub fn daily_price(
    tariff: &Tariff,
    modifier: Modifier,
    discount: Percent,
) -> Option<Money> {
    let markup = Decimal::ONE.checked_add(modifier.price_percent.fraction())?;
    let factor = markup.checked_mul(discount.complement().fraction())?;
    tariff.daily_price.scale(factor)
}

/// Calculates the deposit of the provided [`Tariff`] with the coverage
/// [`Modifier`] waiver applied.
///
/// [`None`] is returned on overflow.
#[must_use]
pub fn deposit(tariff: &Tariff, modifier: Modifier) -> Option<Money> {
    tariff
        .deposit
        .scale(modifier.deposit_waived_percent.complement().fraction())
}

/// Determines the number of charged units of an add-on.
#[must_use]
pub fn quantity(
    mode: PricingMode,
    supplied: Option<u32>,
    default: DefaultQuantity,
    days: u32,
) -> u32 {
    match mode {
        PricingMode::PerDay => days,
        PricingMode::OneTime => 1,
        PricingMode::ManualQty => supplied.unwrap_or(match default {
            DefaultQuantity::RentalDays => days,
            DefaultQuantity::Fixed(n) => n,
        }),
    }
}

/// Prices the provided add-on [`Item`] as a [`Line`].
///
/// [`None`] is returned on overflow.
#[must_use]
pub fn line(item: &Item, default: DefaultQuantity, days: u32) -> Option<Line> {
    let Item { add_on, quantity: supplied } = item;
    let quantity = quantity(add_on.pricing_mode, *supplied, default, days);
    Some(Line {
        add_on_id: add_on.id.clone(),
        name: add_on.name.clone(),
        pricing_mode: add_on.pricing_mode,
        unit_price: add_on.unit_price,
        quantity,
        total: add_on.unit_price.checked_mul(quantity.into())?,
    })
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};

    use crate::domain::{
        add_on::{DefaultQuantity, PricingMode},
        car::Tariff,
        coverage::{Markup, Modifier},
    };

    use super::{daily_price, deposit, quantity};

    fn percent(s: &str) -> Percent {
        s.parse().unwrap()
    }

    fn markup(s: &str) -> Markup {
        s.parse().unwrap()
    }

    fn tariff(daily: i64, deposit: i64) -> Tariff {
        Tariff {
            min_days: 1,
            max_days: 0,
            daily_price: Money::new(daily, Currency::Eur),
            deposit: Money::new(deposit, Currency::Eur),
        }
    }

    #[test]
    fn coverage_then_discount() {
        let modifier = Modifier {
            price_percent: markup("10"),
            deposit_waived_percent: percent("50"),
        };
        let t = tariff(4000, 50_000);

        assert_eq!(
            daily_price(&t, modifier, Percent::ZERO),
            Some(Money::new(4400, Currency::Eur)),
        );
        assert_eq!(
            daily_price(&t, modifier, percent("10")),
            Some(Money::new(3960, Currency::Eur)),
        );
        assert_eq!(
            deposit(&t, modifier),
            Some(Money::new(25_000, Currency::Eur)),
        );
    }

    #[test]
    fn markup_above_a_hundred() {
        let modifier = Modifier {
            price_percent: markup("150"),
            deposit_waived_percent: Percent::ZERO,
        };

        assert_eq!(
            daily_price(&tariff(4000, 0), modifier, Percent::ZERO),
            Some(Money::new(10_000, Currency::Eur)),
        );
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(
            daily_price(&tariff(1005, 0), Modifier::NONE, percent("10")),
            Some(Money::new(905, Currency::Eur)),
        );

        let markup = Modifier {
            price_percent: markup("15"),
            deposit_waived_percent: Percent::ZERO,
        };
        assert_eq!(
            daily_price(&tariff(3333, 0), markup, Percent::ZERO),
            Some(Money::new(3833, Currency::Eur)),
        );
    }

    #[test]
    fn quantity_per_pricing_mode() {
        let days = DefaultQuantity::RentalDays;
        let fixed = DefaultQuantity::Fixed(2);

        assert_eq!(quantity(PricingMode::PerDay, Some(9), fixed, 5), 5);
        assert_eq!(quantity(PricingMode::OneTime, Some(9), days, 5), 1);
        assert_eq!(quantity(PricingMode::ManualQty, Some(3), days, 5), 3);
        assert_eq!(quantity(PricingMode::ManualQty, None, days, 5), 5);
        assert_eq!(quantity(PricingMode::ManualQty, None, fixed, 5), 2);
    }
}
