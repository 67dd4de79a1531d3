//! [`Command`] for editing a [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    availability::{self, Interval},
    domain::{
        car, coverage,
        reservation::{self, Location, TransitionError},
        Car, Reservation,
    },
    infra::{database, Database},
    pricing,
    read::reservation::Overlapping,
    Service,
};

use super::Command;

/// [`Command`] for editing dates, locations, coverage or delivery fee of a
/// [`Reservation`].
///
/// [`None`] fields are left untouched. The [`Reservation`] is re-checked for
/// availability and re-priced.
#[derive(Clone, Debug, Default)]
pub struct UpdateReservation {
    /// ID of the [`Reservation`] to be edited.
    pub reservation_id: reservation::Id,

    /// New pickup [`DateTime`].
    pub pickup_at: Option<reservation::PickupDateTime>,

    /// New return [`DateTime`].
    pub return_at: Option<reservation::ReturnDateTime>,

    /// New pickup [`Location`].
    pub pickup_location: Option<Location>,

    /// New return [`Location`].
    pub return_location: Option<Location>,

    /// New coverage selection, where `Some(None)` removes the coverage.
    pub coverage: Option<Option<coverage::Selection>>,

    /// New delivery fee, where `Some(None)` removes the fee.
    pub delivery_fee: Option<Option<Money>>,
}

impl<Db> Command<UpdateReservation> for Service<Db>
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
        cmd: UpdateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateReservation {
            reservation_id,
            pickup_at,
            return_at,
            pickup_location,
            return_location,
            coverage,
            delivery_fee,
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

        if let Some(at) = pickup_at {
            reservation.pickup_at = at;
        }
        if let Some(at) = return_at {
            reservation.return_at = at;
        }
        if let Some(location) = pickup_location {
            reservation.pickup_location = location;
        }
        if let Some(location) = return_location {
            reservation.return_location = location;
        }
        if let Some(selection) = coverage {
            reservation.coverage = selection;
        }
        if let Some(fee) = delivery_fee {
            reservation.delivery_fee = fee;
        }

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(reservation.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(reservation.car_id))
            .map_err(tracerr::wrap!())?;
        pricing::reprice(&mut reservation, &car, self.catalog())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let requested = Interval::from(&reservation);
        let existing = tx
            .execute(Select(By::<Vec<Reservation>, _>::new(Overlapping {
                car_id: Some(car.id),
                interval: requested,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        availability::check(&existing, requested, Some(reservation_id))
            .map_err(|e| tracerr::new!(E::CarUnavailable(car.id, e)))?;

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
            grand_total = %reservation.price_snapshot.grand_total(),
            "reservation updated"
        );

        Ok(reservation)
    }
}

/// Error of [`UpdateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] of the [`Reservation`] does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is taken over the new dates.
    #[display("`Car(id: {_0})` is unavailable: {_1}")]
    CarUnavailable(#[error(not(source))] car::Id, availability::Unavailable),

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
