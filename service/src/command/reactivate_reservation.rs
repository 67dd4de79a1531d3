//! [`Command`] for reactivating a cancelled or no-show [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    availability::{self, Interval},
    domain::{
        car,
        reservation::{self, Transition, TransitionError},
        Car, Reservation,
    },
    infra::{database, Database},
    read::reservation::Overlapping,
    Service,
};

use super::Command;

/// [`Command`] for bringing a cancelled or no-show [`Reservation`] back to
/// the confirmed status.
///
/// The [`Reservation`]'s dates must still be free.
#[derive(Clone, Copy, Debug)]
pub struct ReactivateReservation {
    /// ID of the [`Reservation`] to be reactivated.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<ReactivateReservation> for Service<Db>
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
                Select<By<Vec<Reservation>, Overlapping>>,
                Ok = Vec<Reservation>,
                Err = Traced<database::Error>,
            > + Database<Update<Reservation>, Err = Traced<database::Error>>
            + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReactivateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReactivateReservation { reservation_id } = cmd;

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
            .apply(Transition::Reactivate, DateTime::now())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let requested = Interval::from(&reservation);
        let existing = tx
            .execute(Select(By::<Vec<Reservation>, _>::new(Overlapping {
                car_id: Some(reservation.car_id),
                interval: requested,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        availability::check(&existing, requested, Some(reservation_id))
            .map_err(|e| {
                tracerr::new!(E::CarUnavailable(reservation.car_id, e))
            })?;

        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(reservation.id = %reservation_id, "reservation reactivated");

        Ok(reservation)
    }
}

/// Error of [`ReactivateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] cannot be reactivated.
    #[display("Cannot reactivate `Reservation`: {_0}")]
    #[from]
    Transition(TransitionError),

    /// [`Car`] was booked by someone else meanwhile.
    #[display("`Car(id: {_0})` is unavailable: {_1}")]
    CarUnavailable(#[error(not(source))] car::Id, availability::Unavailable),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{
            cancel_reservation::CancelReservation,
            confirm_reservation::spec::{book, service_with},
            mark_reservation_no_show::MarkReservationNoShow,
        },
        domain::reservation::{Status, TransitionError},
        pricing::spec::car,
    };

    use super::{ExecutionError, ReactivateReservation};

    #[tokio::test]
    async fn clears_cancellation_metadata() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;
        let cmd = ReactivateReservation {
            reservation_id: reservation.id,
        };

        let err = service.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(TransitionError::NotCancelledOrNoShow(
                Status::Confirmed
            )),
        ));

        _ = service
            .execute(CancelReservation {
                reservation_id: reservation.id,
                reason: Some("changed plans".into()),
            })
            .await
            .unwrap();
        let reactivated = service.execute(cmd).await.unwrap();
        assert_eq!(reactivated.status, Status::Confirmed);
        assert_eq!(reactivated.cancelled_at, None);
        assert_eq!(reactivated.cancellation_reason, None);
        assert_eq!(reactivated.price_snapshot, reservation.price_snapshot);
    }

    #[tokio::test]
    async fn fails_when_dates_were_taken() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;

        _ = service
            .execute(MarkReservationNoShow {
                reservation_id: reservation.id,
            })
            .await
            .unwrap();
        _ = book(&service, &car, "2024-05-03T10:00:00Z", "2024-05-06T10:00:00Z")
            .await;

        let err = service
            .execute(ReactivateReservation {
                reservation_id: reservation.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::CarUnavailable(id, _) if *id == car.id,
        ));
    }
}
