//! [`Rental`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{reservation, Rental},
    infra::{
        database::{self, memory::Connection, Memory},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<reservation::Id, Rental>, IDs>>>
    for Memory<C>
where
    C: Connection,
    IDs: AsRef<[reservation::Id]>,
{
    type Ok = HashMap<reservation::Id, Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<reservation::Id, Rental>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids: &[reservation::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.read(|v| {
            v.all::<Rental>()
                .filter(|r| ids.contains(&r.reservation_id))
                .map(|r| (r.reservation_id, r.clone()))
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Rental>, reservation::Id>>> for Memory<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<reservation::Id, Rental>, [reservation::Id; 1]>>,
        Ok = HashMap<reservation::Id, Rental>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}
