//! [`Database`] implementations.

mod car;
mod rental;
mod reservation;

use common::operations::{By, Commit, Insert, Lock, Transact, Update};
use tracerr::Traced;

use crate::{
    domain::{self, Car},
    infra::{database, Database},
};

use super::{
    client::{Connection, Write},
    Memory, NonTx, Record, Tx,
};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::from_non_tx(&self.0)))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<Car, domain::car::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, domain::car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.lock(by.into_inner()).await.map_err(tracerr::wrap!())
    }
}

impl<C, T> Database<Insert<T>> for Memory<C>
where
    C: Connection,
    T: Record,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<T>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Write::Insert, record)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C, T> Database<Update<T>> for Memory<C>
where
    C: Connection,
    T: Record,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(record): Update<T>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Write::Update, record)
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Lock, Select, Transact, Update},
        Handler as _,
    };

    use crate::{
        domain::{
            car,
            reservation::{spec::reservation, Status},
            Reservation,
        },
        infra::Memory,
    };

    fn fixture() -> Reservation {
        reservation(
            car::Id::new(),
            "2024-05-01T10:00:00Z",
            "2024-05-05T10:00:00Z",
            Status::Confirmed,
        )
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let db = Memory::new();
        let r = fixture();

        {
            let tx = db.execute(Transact).await.unwrap();
            tx.execute(Insert(r.clone())).await.unwrap();

            let staged = tx
                .execute(Select(By::<Option<Reservation>, _>::new(r.id)))
                .await
                .unwrap();
            assert_eq!(staged.as_ref(), Some(&r));
        }

        let found = db
            .execute(Select(By::<Option<Reservation>, _>::new(r.id)))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn commit_applies_writes_once() {
        let db = Memory::new();
        let r = fixture();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(r.clone())).await.unwrap();
        assert!(tx.execute(Insert(r.clone())).await.is_err());
        tx.execute(Commit).await.unwrap();
        assert!(tx.execute(Commit).await.is_err());

        let found = db
            .execute(Select(By::<Option<Reservation>, _>::new(r.id)))
            .await
            .unwrap();
        assert_eq!(found, Some(r.clone()));

        let missing = fixture();
        assert!(db.execute(Update(missing)).await.is_err());
    }

    #[tokio::test]
    async fn car_lock_is_held_until_commit() {
        let db = Memory::new();
        let car_id = car::Id::new();

        let first = db.execute(Transact).await.unwrap();
        first.execute(Lock(By::new(car_id))).await.unwrap();
        first.execute(Lock(By::new(car_id))).await.unwrap();

        let second = db.execute(Transact).await.unwrap();
        let waiting = tokio::spawn(async move {
            second.execute(Lock(By::new(car_id))).await.map(drop)
        });
        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        first.execute(Commit).await.unwrap();
        waiting.await.unwrap().unwrap();
    }
}
