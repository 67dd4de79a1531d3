//! [`Car`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{car, Car},
    infra::{
        database::{self, memory::Connection, Memory},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Car>, car::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|v| v.get::<Car>(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Car>, read::car::All>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Car>, read::car::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut cars = self
            .read(|v| v.all::<Car>().cloned().collect::<Vec<_>>())
            .await
            .map_err(tracerr::wrap!())?;
        cars.sort_unstable_by_key(|c| c.id);
        Ok(cars)
    }
}
