//! [`Command`] for attaching an add-on to a [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        add_on::{self, PricingMode},
        car,
        reservation::{self, AddOnRecord, AddOnRecordId, TransitionError},
        Car, Reservation,
    },
    infra::{database, Database},
    pricing, Service,
};

use super::Command;

/// [`Command`] for attaching a catalog add-on to a [`Reservation`].
///
/// The current catalog price is copied into the [`Reservation`] and the
/// [`Reservation`] is re-priced.
#[derive(Clone, Debug)]
pub struct AddReservationAddOn {
    /// ID of the [`Reservation`] to attach the add-on to.
    pub reservation_id: reservation::Id,

    /// ID of the catalog add-on.
    pub add_on_id: add_on::Id,

    /// Quantity of a [`PricingMode::ManualQty`] add-on, ignored otherwise.
    pub quantity: Option<u32>,
}

impl<Db> Command<AddReservationAddOn> for Service<Db>
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
        cmd: AddReservationAddOn,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddReservationAddOn {
            reservation_id,
            add_on_id,
            quantity,
        } = cmd;

        let add_on = self
            .catalog()
            .add_on(&add_on_id)
            .ok_or_else(|| E::UnknownAddOn(add_on_id.clone()))
            .map_err(tracerr::wrap!())?;

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
        if reservation.add_ons.iter().any(|r| r.add_on_id == add_on_id) {
            return Err(tracerr::new!(E::AddOnAlreadyPresent(add_on_id)));
        }

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(reservation.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(reservation.car_id))
            .map_err(tracerr::wrap!())?;

        reservation.add_ons.push(AddOnRecord {
            id: AddOnRecordId::new(),
            add_on_id: add_on.id.clone(),
            name: add_on.name.clone(),
            pricing_mode: add_on.pricing_mode,
            unit_price: add_on.unit_price,
            manual_quantity: quantity
                .filter(|_| add_on.pricing_mode == PricingMode::ManualQty),
            quantity: 0,
            total: Money::zero(add_on.unit_price.currency),
        });
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
            add_on.id = %add_on_id,
            grand_total = %reservation.price_snapshot.grand_total(),
            "add-on attached to reservation"
        );

        Ok(reservation)
    }
}

/// Error of [`AddReservationAddOn`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Add-on is already attached to the [`Reservation`].
    #[display("`AddOn(id: {_0})` is already attached")]
    AddOnAlreadyPresent(#[error(not(source))] add_on::Id),

    /// [`Car`] of the [`Reservation`] does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// Add-on with the provided ID is not in the catalog.
    #[display("`AddOn(id: {_0})` does not exist")]
    UnknownAddOn(#[error(not(source))] add_on::Id),

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
        command::{
            cancel_reservation::CancelReservation,
            confirm_reservation::spec::{book, service_with},
        },
        domain::{
            add_on,
            reservation::{Status, TransitionError},
            Reservation,
        },
        pricing::spec::{car, usd},
    };

    use super::{AddReservationAddOn, ExecutionError};

    fn add(reservation: &Reservation, id: &str) -> AddReservationAddOn {
        AddReservationAddOn {
            reservation_id: reservation.id,
            add_on_id: add_on::Id::new(id).unwrap(),
            quantity: None,
        }
    }

    #[tokio::test]
    async fn reprices_with_copied_price() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;

        let updated = service.execute(add(&reservation, "gps")).await.unwrap();
        let record = &updated.add_ons[0];
        assert_eq!(record.unit_price, usd(6));
        assert_eq!(record.quantity, 5);
        assert_eq!(record.total, usd(30));
        assert_eq!(updated.price_snapshot.grand_total(), usd(230));

        let updated = service
            .execute(AddReservationAddOn {
                quantity: Some(3),
                ..add(&reservation, "fuel")
            })
            .await
            .unwrap();
        assert_eq!(updated.add_ons.len(), 2);
        assert_eq!(updated.add_ons[1].manual_quantity, Some(3));
        assert_eq!(updated.add_ons[1].total, usd(30));
        assert_eq!(updated.price_snapshot.grand_total(), usd(260));
    }

    #[tokio::test]
    async fn rejects_duplicates_and_unknown() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;

        _ = service.execute(add(&reservation, "gps")).await.unwrap();
        let err = service.execute(add(&reservation, "gps")).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AddOnAlreadyPresent(_),
        ));

        let err = service
            .execute(add(&reservation, "helicopter"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::UnknownAddOn(_)));
    }

    #[tokio::test]
    async fn requires_confirmed_reservation() {
        let car = car();
        let service = service_with(&car).await;
        let reservation =
            book(&service, &car, "2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z")
                .await;
        _ = service
            .execute(CancelReservation {
                reservation_id: reservation.id,
                reason: Some("changed plans".into()),
            })
            .await
            .unwrap();

        let err = service.execute(add(&reservation, "gps")).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(TransitionError::NotConfirmed(
                Status::Cancelled
            )),
        ));
    }
}
