//! [`Command`] for confirming a new [`Reservation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    availability::{self, Interval},
    domain::{
        add_on, car, coverage,
        reservation::{self, AddOnRecord, AddOnRecordId, Location, Status},
        Car, Client, Reservation,
    },
    infra::{database, Database},
    pricing,
    read::reservation::Overlapping,
    Service,
};

use super::Command;

/// [`Command`] for confirming a new [`Reservation`].
#[derive(Clone, Debug)]
pub struct ConfirmReservation {
    /// ID of the reserved [`Car`].
    pub car_id: car::Id,

    /// [`Client`] renting the [`Car`].
    pub client: Client,

    /// [`DateTime`] when the [`Car`] is picked up.
    pub pickup_at: reservation::PickupDateTime,

    /// [`DateTime`] when the [`Car`] is returned.
    pub return_at: reservation::ReturnDateTime,

    /// [`Location`] where the [`Car`] is picked up.
    pub pickup_location: Location,

    /// [`Location`] where the [`Car`] is returned.
    pub return_location: Location,

    /// Selected coverage, if any.
    pub coverage: Option<coverage::Selection>,

    /// Selected add-ons, in the order they should be listed.
    pub add_ons: Vec<add_on::Selection>,

    /// Delivery fee, if any.
    pub delivery_fee: Option<Money>,
}

impl<Db> Command<ConfirmReservation> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>:
        Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
            + Database<
                Select<By<Vec<Reservation>, Overlapping>>,
                Ok = Vec<Reservation>,
                Err = Traced<database::Error>,
            > + Database<Insert<Reservation>, Err = Traced<database::Error>>
            + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ConfirmReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmReservation {
            car_id,
            client,
            pickup_at,
            return_at,
            pickup_location,
            return_location,
            coverage,
            add_ons,
            delivery_fee,
        } = cmd;

        if let Some(dup) = add_ons.iter().enumerate().find_map(|(i, s)| {
            add_ons[..i]
                .iter()
                .any(|prev| prev.add_on_id == s.add_on_id)
                .then_some(&s.add_on_id)
        }) {
            return Err(tracerr::new!(E::AddOnAlreadyPresent(dup.clone())));
        }

        let car = self
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;

        let catalog = self.catalog();
        let items = catalog
            .items(&add_ons)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let quote = pricing::quote(
            &car,
            catalog,
            &pricing::Input {
                pickup_at: pickup_at.coerce(),
                return_at: return_at.coerce(),
                coverage: coverage.clone(),
                add_ons: items.clone(),
                delivery_fee,
            },
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes bookings of the same `Car`.
        tx.execute(Lock(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let requested = Interval::new(pickup_at, return_at);
        let existing = tx
            .execute(Select(By::<Vec<Reservation>, _>::new(Overlapping {
                car_id: Some(car_id),
                interval: requested,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        availability::check(&existing, requested, None)
            .map_err(|e| tracerr::new!(E::CarUnavailable(car_id, e)))?;

        let records = items
            .into_iter()
            .zip(&quote.add_ons)
            .map(|(item, line)| AddOnRecord {
                id: AddOnRecordId::new(),
                add_on_id: item.add_on.id,
                name: item.add_on.name,
                pricing_mode: item.add_on.pricing_mode,
                unit_price: item.add_on.unit_price,
                manual_quantity: item.quantity.filter(|_| {
                    item.add_on.pricing_mode == add_on::PricingMode::ManualQty
                }),
                quantity: line.quantity,
                total: line.total,
            })
            .collect();

        let now = DateTime::now();
        let reservation = Reservation {
            id: reservation::Id::new(),
            car_id,
            client,
            pickup_at,
            return_at,
            pickup_location,
            return_location,
            coverage,
            delivery_fee,
            add_ons: records,
            price_snapshot: quote.into(),
            status: Status::Confirmed,
            cancelled_at: None,
            cancellation_reason: None,
            no_show_at: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            reservation.id = %reservation.id,
            car.id = %car_id,
            grand_total = %reservation.price_snapshot.grand_total(),
            "reservation confirmed"
        );

        Ok(reservation)
    }
}

/// Error of [`ConfirmReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// The same [`add_on::AddOn`] is selected more than once.
    #[display("`AddOn(id: {_0})` is selected more than once")]
    AddOnAlreadyPresent(#[error(not(source))] add_on::Id),

    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is taken over the requested dates.
    #[display("`Car(id: {_0})` is unavailable: {_1}")]
    CarUnavailable(#[error(not(source))] car::Id, availability::Unavailable),

    /// Requested configuration cannot be priced.
    #[display("Pricing failed: {_0}")]
    #[from]
    Pricing(pricing::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
