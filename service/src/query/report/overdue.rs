//! [`Overdue`] definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{reservation, Rental, Reservation},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] listing picked up [`Reservation`]s whose car should have been
/// returned already.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Overdue {
    /// Moment the report is built at.
    pub at: DateTime,
}

/// Output of the [`Overdue`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Number of overdue [`Reservation`]s.
    pub count: usize,

    /// Overdue [`Reservation`]s, the longest overdue first.
    pub items: Vec<Item>,
}

/// Overdue [`Reservation`] in the [`Output`] of the [`Overdue`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// Overdue [`Reservation`].
    pub reservation: Reservation,

    /// [`Rental`] of the overdue [`Reservation`], if any.
    pub rental: Option<Rental>,

    /// Whole calendar days passed since the planned return date.
    pub overdue_days: i64,
}

impl<Db> Query<Overdue> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Reservation>, reservation::Status>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<reservation::Id, Rental>, Vec<reservation::Id>>>,
            Ok = HashMap<reservation::Id, Rental>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Overdue { at }: Overdue,
    ) -> Result<Self::Ok, Self::Err> {
        let late = self
            .database()
            .execute(Select(By::<Vec<Reservation>, _>::new(
                reservation::Status::PickedUp,
            )))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|r| r.return_at.coerce() < at)
            .collect::<Vec<_>>();
        if late.is_empty() {
            return Ok(Output {
                count: 0,
                items: vec![],
            });
        }

        let ids = late.iter().map(|r| r.id).collect::<Vec<_>>();
        let mut rentals = self
            .database()
            .execute(Select(By::<HashMap<reservation::Id, Rental>, _>::new(
                ids,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let items = late
            .into_iter()
            .filter_map(|reservation| {
                let rental = rentals.remove(&reservation.id);
                if rental.as_ref().is_some_and(|r| r.returned_at.is_some()) {
                    return None;
                }
                Some(Item {
                    overdue_days: at.days_since(&reservation.return_at),
                    reservation,
                    rental,
                })
            })
            .collect::<Vec<_>>();

        Ok(Output {
            count: items.len(),
            items,
        })
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Handler as _};

    use crate::{
        domain::{
            car,
            rental::{self, ContractNumber},
            reservation::{spec::reservation, Status},
            Rental, Reservation,
        },
        infra::Memory,
        Config, Service,
    };

    use super::Overdue;

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn rental_of(r: &Reservation, returned: Option<&str>) -> Rental {
        let id = rental::Id::new();
        Rental {
            id,
            reservation_id: r.id,
            car_id: r.car_id,
            contract_number: ContractNumber::generate(r.pickup_at.date(), id),
            pickup_odometer: None,
            picked_up_at: r.pickup_at.coerce(),
            returned_at: returned.map(|s| at(s).coerce()),
            status: if returned.is_some() {
                rental::Status::Completed
            } else {
                rental::Status::Active
            },
        }
    }

    #[tokio::test]
    async fn lists_unreturned_past_due() {
        let db = Memory::new();
        let car_id = car::Id::new();

        let late = reservation(
            car_id,
            "2024-05-01T10:00:00Z",
            "2024-05-05T10:00:00Z",
            Status::PickedUp,
        );
        let returned = reservation(
            car::Id::new(),
            "2024-05-01T10:00:00Z",
            "2024-05-04T10:00:00Z",
            Status::PickedUp,
        );
        let running = reservation(
            car::Id::new(),
            "2024-05-01T10:00:00Z",
            "2024-05-20T10:00:00Z",
            Status::PickedUp,
        );
        let cancelled = reservation(
            car::Id::new(),
            "2024-04-01T10:00:00Z",
            "2024-04-05T10:00:00Z",
            Status::Cancelled,
        );
        for r in [&late, &returned, &running, &cancelled] {
            db.execute(Insert(r.clone())).await.unwrap();
        }
        for r in [
            rental_of(&late, None),
            rental_of(&returned, Some("2024-05-04T09:00:00Z")),
            rental_of(&running, None),
        ] {
            db.execute(Insert(r)).await.unwrap();
        }
        let service = Service::new(Config::default(), db);

        let report = service
            .execute(Overdue {
                at: at("2024-05-08T08:00:00Z"),
            })
            .await
            .unwrap();

        assert_eq!(report.count, 1);
        assert_eq!(report.items[0].reservation, late);
        assert_eq!(report.items[0].overdue_days, 3);
        assert!(report.items[0].rental.is_some());
    }

    #[tokio::test]
    async fn empty_fleet_has_nothing_overdue() {
        let service = Service::new(Config::default(), Memory::new());

        let report = service
            .execute(Overdue {
                at: DateTime::now(),
            })
            .await
            .unwrap();

        assert_eq!(report.count, 0);
        assert!(report.items.is_empty());
    }
}
