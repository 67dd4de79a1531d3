//! [`Command`] for handing a reserved car over to the client.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        car,
        rental::{self, ContractNumber},
        reservation::{self, Transition, TransitionError},
        Car, Rental, Reservation,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for handing a reserved car over to the client, which creates
/// the [`Rental`] of the [`Reservation`].
#[derive(Clone, Debug)]
pub struct PickUpReservation {
    /// ID of the [`Reservation`] being picked up.
    pub reservation_id: reservation::Id,

    /// Odometer reading at pickup, if recorded.
    pub odometer: Option<u32>,

    /// [`ContractNumber`] of the [`Rental`], generated if omitted.
    pub contract_number: Option<ContractNumber>,
}

impl<Db> Command<PickUpReservation> for Service<Db>
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
            + Database<Insert<Rental>, Err = Traced<database::Error>>
            + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Rental;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PickUpReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PickUpReservation {
            reservation_id,
            odometer,
            contract_number,
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

        let now = DateTime::now();
        _ = reservation
            .apply(Transition::PickUp, now)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let id = rental::Id::new();
        let rental = Rental {
            id,
            reservation_id,
            car_id: reservation.car_id,
            contract_number: contract_number
                .unwrap_or_else(|| ContractNumber::generate(now.date(), id)),
            pickup_odometer: odometer,
            picked_up_at: now.coerce(),
            returned_at: None,
            status: rental::Status::Active,
        };

        tx.execute(Update(reservation))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(rental.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            reservation.id = %reservation_id,
            rental.id = %rental.id,
            contract_number = %rental.contract_number,
            "reservation picked up"
        );

        Ok(rental)
    }
}

/// Error of [`PickUpReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Reservation`] cannot be picked up.
    #[display("Cannot pick up `Reservation`: {_0}")]
    #[from]
    Transition(TransitionError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
