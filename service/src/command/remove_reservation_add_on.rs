//! [`Command`] for detaching an add-on from a [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        car,
        reservation::{self, AddOnRecordId, TransitionError},
        Car, Reservation,
    },
    infra::{database, Database},
    pricing, Service,
};

use super::Command;

/// [`Command`] for detaching an add-on from a [`Reservation`] and re-pricing
/// it.
#[derive(Clone, Copy, Debug)]
pub struct RemoveReservationAddOn {
    /// ID of the [`Reservation`] to detach the add-on from.
    pub reservation_id: reservation::Id,

    /// ID of the [`reservation::AddOnRecord`] to be detached.
    pub record_id: AddOnRecordId,
}

impl<Db> Command<RemoveReservationAddOn> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>:
        Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
            + Database<
                Select<By<Option<Reservation>, reservation::Id>>,
                Ok = Option<Reservation>,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Option<Car>, car::Id>>,
                Ok = Option<Car>,
                Err = Traced<database::Error>,
            > + Database<Update<Reservation>, Err = Traced<database::Error>>
            + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemoveReservationAddOn,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveReservationAddOn {
            reservation_id,
            record_id,
        } = cmd;

        let reservation = self
            .database()
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(reservation.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        reservation
            .ensure_editable()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let pos = reservation
            .add_ons
            .iter()
            .position(|r| r.id == record_id)
            .ok_or(E::AddOnNotExists(record_id))
            .map_err(tracerr::wrap!())?;

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(reservation.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(reservation.car_id))
            .map_err(tracerr::wrap!())?;

        let removed = reservation.add_ons.remove(pos);
        pricing::reprice(&mut reservation, &car, self.catalog())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        reservation.updated_at = DateTime::now().coerce();

        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            reservation.id = %reservation_id,
            add_on.id = %removed.add_on_id,
            grand_total = %reservation.price_snapshot.grand_total(),
            "add-on detached from reservation"
        );

        Ok(reservation)
    }
}

/// Error of [`RemoveReservationAddOn`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`reservation::AddOnRecord`] is not attached to the [`Reservation`].
    #[display("`AddOnRecord(id: {_0})` does not exist")]
    AddOnNotExists(#[error(not(source))] AddOnRecordId),

    /// [`Car`] of the [`Reservation`] does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] is not editable.
    #[display("Cannot edit `Reservation`: {_0}")]
    #[from]
    Transition(TransitionError),

    /// [`Reservation`] cannot be re-priced.
    #[display("Pricing failed: {_0}")]
    #[from]
    Pricing(pricing::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::confirm_reservation::spec::{confirm, service_with},
        domain::{add_on, reservation::AddOnRecordId},
        pricing::spec::{car, usd},
    };

    use super::{ExecutionError, RemoveReservationAddOn};

    #[tokio::test]
    async fn reprices_without_the_record() {
        let car = car();
        let service = service_with(&car).await;

        let mut cmd =
            confirm(&car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z");
        cmd.add_ons = ["gps", "cleaning"]
            .into_iter()
            .map(|id| add_on::Selection {
                add_on_id: add_on::Id::new(id).unwrap(),
                quantity: None,
            })
            .collect();
        let reservation = service.execute(cmd).await.unwrap();
        assert_eq!(reservation.price_snapshot.grand_total(), usd(255));

        let updated = service
            .execute(RemoveReservationAddOn {
                reservation_id: reservation.id,
                record_id: reservation.add_ons[0].id,
            })
            .await
            .unwrap();
        assert_eq!(updated.add_ons.len(), 1);
        assert_eq!(updated.add_ons[0], reservation.add_ons[1]);
        assert_eq!(updated.price_snapshot.grand_total(), usd(225));

        let err = service
            .execute(RemoveReservationAddOn {
                reservation_id: reservation.id,
                record_id: AddOnRecordId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::AddOnNotExists(_)));
    }
}
