//! [`Command`] for marking a [`Reservation`] as a no-show.

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
        reservation::{self, Transition, TransitionError},
        Car, Reservation,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Reservation`] whose client never showed up.
#[derive(Clone, Copy, Debug)]
pub struct MarkReservationNoShow {
    /// ID of the [`Reservation`] to be marked.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<MarkReservationNoShow> for Service<Db>
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
            > + Database<Update<Reservation>, Err = Traced<database::Error>>
            + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkReservationNoShow,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkReservationNoShow { reservation_id } = cmd;

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

        _ = reservation
            .apply(Transition::MarkNoShow, DateTime::now())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(reservation.id = %reservation_id, "reservation no-show");

        Ok(reservation)
    }
}

/// Error of [`MarkReservationNoShow`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] cannot be marked as a no-show.
    #[display("Cannot mark `Reservation` as no-show: {_0}")]
    #[from]
    Transition(TransitionError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::confirm_reservation::spec::{book, service_with},
        domain::reservation::{Status, TransitionError},
        pricing::spec::car,
    };

    use super::{ExecutionError, MarkReservationNoShow};

    #[tokio::test]
    async fn is_allowed_once() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;
        let cmd = MarkReservationNoShow {
            reservation_id: reservation.id,
        };

        let marked = service.execute(cmd).await.unwrap();
        assert_eq!(marked.status, Status::NoShow);
        assert!(marked.no_show_at.is_some());

        let err = service.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(TransitionError::NotConfirmed(
                Status::NoShow
            )),
        ));
    }
}
