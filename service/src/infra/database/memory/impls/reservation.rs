//! [`Reservation`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    availability::Interval,
    domain::{reservation, Reservation},
    infra::{
        database::{self, memory::Connection, Memory},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|v| v.get::<Reservation>(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Reservation>, read::reservation::Overlapping>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Reservation>, read::reservation::Overlapping>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::reservation::Overlapping { car_id, interval } =
            by.into_inner();

        let mut found = self
            .read(|v| {
                v.all::<Reservation>()
                    .filter(|r| car_id.map_or(true, |id| r.car_id == id))
                    .filter(|r| Interval::from(*r).overlaps(&interval))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_unstable_by_key(|r| (r.pickup_at, r.id));
        Ok(found)
    }
}

impl<C> Database<Select<By<Vec<Reservation>, reservation::Status>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, reservation::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = by.into_inner();

        let mut found = self
            .read(|v| {
                v.all::<Reservation>()
                    .filter(|r| r.status == status)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        found.sort_unstable_by_key(|r| (r.return_at, r.id));
        Ok(found)
    }
}
