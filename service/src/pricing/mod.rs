//! Rental pricing engine.
//!
//! [`quote()`] is the single pure computation behind both the public quote
//! preview and every price persisted along with a reservation.

pub mod calculator;
pub mod days;
pub mod tariff;

use common::{money::Currency, DateTime, Money};
use derive_more::{Display, Error as StdError};

use crate::domain::{
    add_on::{self, DefaultQuantity},
    coverage::{self, Modifier},
    AddOn, Car, Quote, Reservation,
};

/// Pricing constants shared by every quote.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    /// [`AddOn`]s available for selection.
    pub add_ons: Vec<AddOn>,

    /// [`coverage::Package`]s available for any car.
    pub coverage_packages: Vec<coverage::Package>,

    /// Quantity of a [`add_on::PricingMode::ManualQty`] [`AddOn`] selected
    /// without one.
    pub default_manual_quantity: DefaultQuantity,
}

impl Catalog {
    /// Returns the [`AddOn`] with the provided ID, if any.
    #[must_use]
    pub fn add_on(&self, id: &add_on::Id) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| &a.id == id)
    }

    /// Returns the [`coverage::Package`] with the provided ID, if any.
    #[must_use]
    pub fn coverage_package(
        &self,
        id: &coverage::Id,
    ) -> Option<&coverage::Package> {
        self.coverage_packages.iter().find(|p| &p.id == id)
    }

    /// Resolves the provided [`add_on::Selection`]s into [`Item`]s, copying
    /// the current catalog prices.
    ///
    /// # Errors
    ///
    /// With [`Error::UnknownAddOn`] if any selection is not in this
    /// [`Catalog`].
    pub fn items(
        &self,
        selections: &[add_on::Selection],
    ) -> Result<Vec<Item>, Error> {
        selections
            .iter()
            .map(|s| {
                let add_on = self
                    .add_on(&s.add_on_id)
                    .ok_or_else(|| Error::UnknownAddOn(s.add_on_id.clone()))?;
                Ok(Item {
                    add_on: add_on.clone(),
                    quantity: s.quantity,
                })
            })
            .collect()
    }
}

/// [`AddOn`] to be priced, with its unit price already fixed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// Priced [`AddOn`].
    pub add_on: AddOn,

    /// Explicitly supplied quantity, if any.
    pub quantity: Option<u32>,
}

/// Booking configuration to be priced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Input {
    /// [`DateTime`] when the car is picked up.
    pub pickup_at: DateTime,

    /// [`DateTime`] when the car is returned.
    pub return_at: DateTime,

    /// Selected coverage, if any.
    pub coverage: Option<coverage::Selection>,

    /// Add-on [`Item`]s, in selection order.
    pub add_ons: Vec<Item>,

    /// Delivery fee, if any.
    pub delivery_fee: Option<Money>,
}

impl From<&Reservation> for Input {
    fn from(r: &Reservation) -> Self {
        Self {
            pickup_at: r.pickup_at.coerce(),
            return_at: r.return_at.coerce(),
            coverage: r.coverage.clone(),
            add_ons: r
                .add_ons
                .iter()
                .map(|rec| Item {
                    add_on: AddOn {
                        id: rec.add_on_id.clone(),
                        name: rec.name.clone(),
                        pricing_mode: rec.pricing_mode,
                        unit_price: rec.unit_price,
                        is_quantity_editable: rec.pricing_mode
                            == add_on::PricingMode::ManualQty,
                    },
                    quantity: rec.manual_quantity,
                })
                .collect(),
            delivery_fee: r.delivery_fee,
        }
    }
}

/// Prices the provided [`Input`] for the provided [`Car`].
///
/// Identical arguments always produce an identical [`Quote`].
///
/// # Errors
///
/// If the date range is invalid, the [`Car`] has no tariff tiers, a selection
/// is not known, amounts are priced in different currencies, or an amount
/// overflows.
pub fn quote(
    car: &Car,
    catalog: &Catalog,
    input: &Input,
) -> Result<Quote, Error> {
    use Error as E;

    if input.return_at <= input.pickup_at {
        return Err(E::InvalidDateRange);
    }
    let total_days =
        u32::try_from(days::count(input.pickup_at, input.return_at))
            .ok()
            .filter(|d| *d > 0)
            .ok_or(E::InvalidDateRange)?;

    let tariff::Resolution {
        tariff,
        is_fallback,
    } = tariff::resolve(car, total_days.into()).ok_or(E::NoApplicableTariff)?;
    let currency = tariff.daily_price.currency;
    ensure_currency(currency, tariff.deposit)?;

    let modifier = match &input.coverage {
        None => Modifier::NONE,
        Some(coverage::Selection::Plan(id)) => car
            .coverage_plan(id)
            .map(Modifier::from)
            .ok_or_else(|| E::UnknownCoverage(id.clone()))?,
        Some(coverage::Selection::Package(id)) => catalog
            .coverage_package(id)
            .map(Modifier::from)
            .ok_or_else(|| E::UnknownCoverage(id.clone()))?,
    };

    let daily_rate = calculator::daily_price(tariff, modifier, car.discount)
        .ok_or(E::AmountOverflow)?;
    let deposit_amount =
        calculator::deposit(tariff, modifier).ok_or(E::AmountOverflow)?;
    let rental_total = daily_rate
        .checked_mul(total_days.into())
        .ok_or(E::AmountOverflow)?;

    let mut add_ons = Vec::with_capacity(input.add_ons.len());
    let mut add_ons_total = Money::zero(currency);
    for item in &input.add_ons {
        ensure_currency(currency, item.add_on.unit_price)?;
        let line =
            calculator::line(item, catalog.default_manual_quantity, total_days)
                .ok_or(E::AmountOverflow)?;
        add_ons_total = add_ons_total
            .checked_add(line.total)
            .ok_or(E::AmountOverflow)?;
        add_ons.push(line);
    }

    let delivery_fee = input.delivery_fee.unwrap_or(Money::zero(currency));
    ensure_currency(currency, delivery_fee)?;
    if delivery_fee.amount < 0 {
        return Err(E::NegativeDeliveryFee);
    }

    let grand_total = rental_total
        .checked_add(add_ons_total)
        .and_then(|t| t.checked_add(delivery_fee))
        .ok_or(E::AmountOverflow)?;

    Ok(Quote {
        total_days,
        daily_rate,
        rental_total,
        add_ons,
        add_ons_total,
        delivery_fee,
        deposit_percent: modifier.deposit_waived_percent,
        deposit_amount,
        grand_total,
        currency,
        tariff_fallback: is_fallback,
    })
}

/// Re-prices the provided [`Reservation`] of the provided [`Car`], refreshing
/// its add-on records and its price snapshot.
///
/// Add-on unit prices are the ones copied into the [`Reservation`], not the
/// current [`Catalog`] ones.
///
/// # Errors
///
/// Same as [`quote()`]. The [`Reservation`] is left untouched on error.
pub fn reprice(
    reservation: &mut Reservation,
    car: &Car,
    catalog: &Catalog,
) -> Result<(), Error> {
    let quote = quote(car, catalog, &Input::from(&*reservation))?;
    for (record, line) in reservation.add_ons.iter_mut().zip(&quote.add_ons) {
        record.quantity = line.quantity;
        record.total = line.total;
    }
    reservation.price_snapshot = quote.into();
    Ok(())
}

/// Ensures the provided `amount` is in the `expected` [`Currency`].
fn ensure_currency(expected: Currency, amount: Money) -> Result<(), Error> {
    if amount.currency == expected {
        Ok(())
    } else {
        Err(Error::CurrencyMismatch {
            expected,
            found: amount.currency,
        })
    }
}

/// Error of pricing an [`Input`].
#[derive(Clone, Debug, Display, Eq, StdError, PartialEq)]
pub enum Error {
    /// Return is not after pickup.
    #[display("return must be after pickup")]
    InvalidDateRange,

    /// [`Car`] has no tariff tiers.
    #[display("`Car` has no tariff tiers")]
    NoApplicableTariff,

    /// Amount is priced in a [`Currency`] other than the tariff one.
    #[display("expected an amount in `{expected}`, found `{found}`")]
    CurrencyMismatch {
        /// [`Currency`] of the tariff.
        expected: Currency,

        /// [`Currency`] of the mismatched amount.
        found: Currency,
    },

    /// Selected [`AddOn`] is not in the [`Catalog`].
    #[display("`AddOn(id: {_0})` does not exist")]
    UnknownAddOn(#[error(not(source))] add_on::Id),

    /// Selected coverage is not offered.
    #[display("coverage `{_0}` does not exist")]
    UnknownCoverage(#[error(not(source))] coverage::Id),

    /// Delivery fee is negative.
    #[display("delivery fee cannot be negative")]
    NegativeDeliveryFee,

    /// Some amount doesn't fit into [`Money`].
    #[display("amount overflow")]
    AmountOverflow,
}

#[cfg(test)]
pub(crate) mod spec {
    use common::{money::Currency, DateTime, Money, Percent};

    use crate::domain::{
        add_on::{self, DefaultQuantity, PricingMode},
        car::{self, Segment, Tariff, Tariffs},
        coverage, AddOn, Car,
    };

    use super::{quote, Catalog, Error, Input, Item};

    pub(crate) fn usd(major: i64) -> Money {
        Money::new(major * 100, Currency::Usd)
    }

    /// [`Car`] with `[1-2: $50], [3-7: $40], [8-29: $35], [30+: $30]` tiers
    /// and a $500 deposit.
    pub(crate) fn car() -> Car {
        let tier = |min_days, max_days, daily| Tariff {
            min_days,
            max_days,
            daily_price: usd(daily),
            deposit: usd(500),
        };
        Car {
            id: car::Id::new(),
            segment: Segment::new("economy").unwrap(),
            tariffs: Tariffs::from(vec![
                tier(1, 2, 50),
                tier(3, 7, 40),
                tier(8, 29, 35),
                tier(30, 0, 30),
            ]),
            coverage_plans: vec![coverage::Plan {
                id: coverage::Id::new("premium").unwrap(),
                name: "Premium".into(),
                price_percent: "20".parse().unwrap(),
                deposit_waived_percent: "100".parse().unwrap(),
            }],
            discount: Percent::ZERO,
        }
    }

    pub(crate) fn add_on(id: &str, mode: PricingMode, major: i64) -> AddOn {
        AddOn {
            id: add_on::Id::new(id).unwrap(),
            name: id.to_uppercase(),
            pricing_mode: mode,
            unit_price: usd(major),
            is_quantity_editable: mode == PricingMode::ManualQty,
        }
    }

    pub(crate) fn catalog() -> Catalog {
        Catalog {
            add_ons: vec![
                add_on("gps", PricingMode::PerDay, 6),
                add_on("cleaning", PricingMode::OneTime, 25),
                add_on("fuel", PricingMode::ManualQty, 10),
            ],
            coverage_packages: vec![coverage::Package {
                id: coverage::Id::new("basic").unwrap(),
                name: "Basic".into(),
                price_percent: "10".parse().unwrap(),
                deposit_remaining_percent: "50".parse().unwrap(),
            }],
            default_manual_quantity: DefaultQuantity::RentalDays,
        }
    }

    pub(crate) fn input(pickup: &str, ret: &str) -> Input {
        Input {
            pickup_at: DateTime::from_rfc3339(pickup).unwrap(),
            return_at: DateTime::from_rfc3339(ret).unwrap(),
            coverage: None,
            add_ons: vec![],
            delivery_fee: None,
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        catalog()
            .items(
                &ids.iter()
                    .map(|id| add_on::Selection {
                        add_on_id: add_on::Id::new(*id).unwrap(),
                        quantity: None,
                    })
                    .collect::<Vec<_>>(),
            )
            .unwrap()
    }

    /// Five rental days.
    fn five_days() -> Input {
        input("2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
    }

    #[test]
    fn five_day_booking_with_per_day_add_on() {
        let q = quote(
            &car(),
            &catalog(),
            &Input {
                add_ons: items(&["gps"]),
                ..five_days()
            },
        )
        .unwrap();

        assert_eq!(q.total_days, 5);
        assert_eq!(q.daily_rate, usd(40));
        assert_eq!(q.rental_total, usd(200));
        assert_eq!(q.add_ons_total, usd(30));
        assert_eq!(q.add_ons[0].quantity, 5);
        assert_eq!(q.delivery_fee, usd(0));
        assert_eq!(q.grand_total, usd(230));
        assert_eq!(q.deposit_amount, usd(500));
        assert_eq!(q.currency, Currency::Usd);
        assert!(!q.tariff_fallback);
    }

    #[test]
    fn five_day_booking_with_coverage_package() {
        let q = quote(
            &car(),
            &catalog(),
            &Input {
                coverage: Some(coverage::Selection::Package(
                    coverage::Id::new("basic").unwrap(),
                )),
                ..five_days()
            },
        )
        .unwrap();

        assert_eq!(q.daily_rate, usd(44));
        assert_eq!(q.rental_total, usd(220));
        assert_eq!(q.deposit_amount, usd(250));
        assert_eq!(q.deposit_percent, "50".parse().unwrap());
    }

    #[test]
    fn car_coverage_plan_waives_deposit() {
        let q = quote(
            &car(),
            &catalog(),
            &Input {
                coverage: Some(coverage::Selection::Plan(
                    coverage::Id::new("premium").unwrap(),
                )),
                ..five_days()
            },
        )
        .unwrap();

        assert_eq!(q.daily_rate, usd(48));
        assert_eq!(q.deposit_amount, usd(0));
    }

    #[test]
    fn discount_applies_after_coverage() {
        let car = Car {
            discount: "10".parse().unwrap(),
            ..car()
        };
        let q = quote(
            &car,
            &catalog(),
            &Input {
                coverage: Some(coverage::Selection::Package(
                    coverage::Id::new("basic").unwrap(),
                )),
                ..five_days()
            },
        )
        .unwrap();

        assert_eq!(q.daily_rate, Money::new(3960, Currency::Usd));
        assert_eq!(q.rental_total, Money::new(19_800, Currency::Usd));
    }

    #[test]
    fn is_deterministic_and_sums_up() {
        let input = Input {
            add_ons: items(&["gps", "cleaning", "fuel"]),
            delivery_fee: Some(usd(15)),
            ..five_days()
        };

        let first = quote(&car(), &catalog(), &input).unwrap();
        let second = quote(&car(), &catalog(), &input).unwrap();
        assert_eq!(first, second);

        assert_eq!(
            first.rental_total.amount,
            first.daily_rate.amount * i64::from(first.total_days),
        );
        assert_eq!(
            first.add_ons_total.amount,
            first.add_ons.iter().map(|l| l.total.amount).sum::<i64>(),
        );
        assert_eq!(
            first.grand_total.amount,
            first.rental_total.amount
                + first.add_ons_total.amount
                + first.delivery_fee.amount,
        );
        // 5 x $6 + $25 + 5 x $10
        assert_eq!(first.add_ons_total, usd(105));
    }

    #[test]
    fn rental_total_grows_within_a_tier() {
        let catalog = catalog();
        let car = car();
        let totals = ["2024-05-03", "2024-05-04", "2024-05-05", "2024-05-07"]
            .map(|ret| {
                let ret = format!("{ret}T10:00:00Z");
                let q =
                    quote(&car, &catalog, &input("2024-05-01T10:00:00Z", &ret))
                        .unwrap();
                assert_eq!(q.daily_rate, usd(40));
                q.rental_total.amount
            });

        assert!(totals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn per_day_add_on_adds_unit_price_per_day() {
        let without = quote(&car(), &catalog(), &five_days()).unwrap();
        let with = quote(
            &car(),
            &catalog(),
            &Input {
                add_ons: items(&["gps"]),
                ..five_days()
            },
        )
        .unwrap();

        assert_eq!(
            with.add_ons_total.amount - without.add_ons_total.amount,
            600 * i64::from(with.total_days),
        );
    }

    #[test]
    fn rejects_invalid_input() {
        let car = car();
        let catalog = catalog();

        assert_eq!(
            quote(
                &car,
                &catalog,
                &input("2024-05-05T10:00:00Z", "2024-05-05T10:00:00Z"),
            ),
            Err(Error::InvalidDateRange),
        );
        assert_eq!(
            quote(
                &Car {
                    tariffs: Tariffs::default(),
                    ..car.clone()
                },
                &catalog,
                &five_days(),
            ),
            Err(Error::NoApplicableTariff),
        );
        assert_eq!(
            quote(
                &car,
                &catalog,
                &Input {
                    coverage: Some(coverage::Selection::Plan(
                        coverage::Id::new("basic").unwrap(),
                    )),
                    ..five_days()
                },
            ),
            Err(Error::UnknownCoverage(coverage::Id::new("basic").unwrap())),
        );
        assert_eq!(
            quote(
                &car,
                &catalog,
                &Input {
                    delivery_fee: Some(Money::new(100, Currency::Eur)),
                    ..five_days()
                },
            ),
            Err(Error::CurrencyMismatch {
                expected: Currency::Usd,
                found: Currency::Eur,
            }),
        );
        assert_eq!(
            catalog.items(&[add_on::Selection {
                add_on_id: add_on::Id::new("wifi").unwrap(),
                quantity: None,
            }]),
            Err(Error::UnknownAddOn(add_on::Id::new("wifi").unwrap())),
        );
    }

    #[test]
    fn flags_tariff_fallback() {
        let car = Car {
            tariffs: Tariffs::from(vec![Tariff {
                min_days: 1,
                max_days: 3,
                daily_price: usd(50),
                deposit: usd(500),
            }]),
            ..car()
        };

        let q = quote(&car, &catalog(), &five_days()).unwrap();

        assert!(q.tariff_fallback);
        assert_eq!(q.daily_rate, usd(50));
    }
}
