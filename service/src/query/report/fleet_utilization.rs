//! [`FleetUtilization`] definition.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use rust_decimal::{Decimal, RoundingStrategy};
use tracerr::Traced;

use crate::{
    availability::Interval,
    domain::{car, Car, Reservation},
    infra::{database, Database},
    read::{self, reservation::Overlapping},
    Query, Service,
};

/// Number of seconds in a day.
const SECS_PER_DAY: i64 = 86_400;

/// [`Query`] measuring which share of the fleet's time over the
/// `[from, to)` window is occupied by [`Reservation`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FleetUtilization {
    /// Inclusive start of the window.
    pub from: DateTime,

    /// Exclusive end of the window.
    pub to: DateTime,
}

/// Output of the [`FleetUtilization`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Length of the window in days.
    pub window_days: Decimal,

    /// Utilization of the whole fleet, in percent.
    pub average_percent: Decimal,

    /// Utilization of every [`Car`], ordered by [`car::Id`].
    pub per_car: Vec<Row>,
}

/// Row in the [`Output`] of the [`FleetUtilization`] [`Query`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Row {
    /// ID of the [`Car`].
    pub car_id: car::Id,

    /// Days the [`Car`] is occupied within the window.
    pub rented_days: Decimal,

    /// Share of the window the [`Car`] is occupied, in percent.
    pub percent: Decimal,
}

impl<Db> Query<FleetUtilization> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Car>, read::car::All>>,
            Ok = Vec<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Reservation>, Overlapping>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        FleetUtilization { from, to }: FleetUtilization,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if to <= from {
            return Err(tracerr::new!(E::InvalidWindow));
        }
        let window = Interval::new(from, to);
        let window_days = days(window);

        let cars = self
            .database()
            .execute(Select(By::<Vec<Car>, _>::new(read::car::All)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut occupied = self
            .database()
            .execute(Select(By::<Vec<Reservation>, _>::new(Overlapping {
                car_id: None,
                interval: window,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|r| r.status.is_blocking())
            .filter_map(|r| {
                Interval::from(&r)
                    .clip(&window)
                    .map(|clipped| (r.car_id, days(clipped)))
            })
            .into_grouping_map()
            .sum();

        let per_car = cars
            .iter()
            .map(|car| {
                let rented_days = occupied.remove(&car.id).unwrap_or_default();
                Row {
                    car_id: car.id,
                    rented_days,
                    percent: percent(rented_days, window_days),
                }
            })
            .collect::<Vec<_>>();

        let fleet_days = window_days * Decimal::from(cars.len());
        let average_percent = percent(
            per_car.iter().map(|row| row.rented_days).sum(),
            fleet_days,
        );

        Ok(Output {
            window_days,
            average_percent,
            per_car,
        })
    }
}

/// Returns the length of the provided [`Interval`] in days.
fn days(interval: Interval) -> Decimal {
    Decimal::from((interval.end - interval.start).whole_seconds())
        / Decimal::from(SECS_PER_DAY)
}

/// Returns the `part` of the `whole` in percent, rounded half-up to two
/// decimal places.
///
/// Zero is returned for an empty `whole`.
fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Error of [`FleetUtilization`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// End of the window is not after its start.
    #[display("`to` must be after `from`")]
    InvalidWindow,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Handler as _};
    use rust_decimal::Decimal;

    use crate::{
        domain::reservation::{spec::reservation, Status},
        infra::Memory,
        pricing::spec::car,
        Config, Service,
    };

    use super::{ExecutionError, FleetUtilization};

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn clips_blocking_reservations_to_window() {
        let db = Memory::new();
        let (busy, idle) = (car(), car());
        db.execute(Insert(busy.clone())).await.unwrap();
        db.execute(Insert(idle.clone())).await.unwrap();

        for (pickup, ret, status) in [
            ("2024-04-28T00:00:00Z", "2024-05-03T00:00:00Z", Status::PickedUp),
            ("2024-05-05T00:00:00Z", "2024-05-07T12:00:00Z", Status::Confirmed),
            ("2024-05-08T00:00:00Z", "2024-05-10T00:00:00Z", Status::Cancelled),
        ] {
            db.execute(Insert(reservation(busy.id, pickup, ret, status)))
                .await
                .unwrap();
        }
        let service = Service::new(Config::default(), db);

        let report = service
            .execute(FleetUtilization {
                from: at("2024-05-01T00:00:00Z"),
                to: at("2024-05-11T00:00:00Z"),
            })
            .await
            .unwrap();

        assert_eq!(report.window_days, dec("10"));
        let row = |id| report.per_car.iter().find(|r| r.car_id == id).unwrap();
        assert_eq!(row(busy.id).rented_days, dec("4.5"));
        assert_eq!(row(busy.id).percent, dec("45"));
        assert_eq!(row(idle.id).rented_days, Decimal::ZERO);
        assert_eq!(row(idle.id).percent, Decimal::ZERO);
        assert_eq!(report.average_percent, dec("22.5"));
    }

    #[tokio::test]
    async fn rejects_inverted_window() {
        let service = Service::new(Config::default(), Memory::new());

        let err = service
            .execute(FleetUtilization {
                from: at("2024-05-11T00:00:00Z"),
                to: at("2024-05-01T00:00:00Z"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidWindow));

        let empty = service
            .execute(FleetUtilization {
                from: at("2024-05-01T00:00:00Z"),
                to: at("2024-05-11T00:00:00Z"),
            })
            .await
            .unwrap();
        assert_eq!(empty.average_percent, Decimal::ZERO);
        assert!(empty.per_car.is_empty());
    }
}
