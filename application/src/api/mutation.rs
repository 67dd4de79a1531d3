//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Money};
use juniper::{graphql_object, Nullable};
use service::{command, domain, Command as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Reserves the `Car` for the provided dates, pricing the selected
    /// configuration.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist;
    /// - `CAR_UNAVAILABLE` - the `Car` is already reserved over the dates;
    /// - `ADD_ON_ALREADY_PRESENT` - the same add-on is selected twice;
    /// - `INVALID_DATE_RANGE` - `returnAt` is not after `pickupAt`;
    /// - `NO_APPLICABLE_TARIFF` - the `Car` has no tariff tiers;
    /// - `UNKNOWN_ADD_ON` - some selected add-on does not exist;
    /// - `UNKNOWN_COVERAGE` - the selected coverage is not offered;
    /// - `CURRENCY_MISMATCH` - `deliveryFee` is in a foreign currency;
    /// - `NEGATIVE_DELIVERY_FEE` - `deliveryFee` is negative;
    /// - `NEGATIVE_QUANTITY` - some add-on quantity is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            car.id = %car_id,
            gql.name = "confirmReservation",
            otel.name = Self::SPAN_NAME,
            pickup_at = ?pickup_at,
            return_at = ?return_at,
        ),
    )]
    pub async fn confirm_reservation(
        car_id: api::car::Id,
        client: api::reservation::ClientInput,
        pickup_at: DateTime,
        return_at: DateTime,
        pickup_location: api::reservation::Location,
        return_location: api::reservation::Location,
        coverage: Option<api::quote::CoverageInput>,
        add_ons: Option<Vec<api::quote::AddOnInput>>,
        delivery_fee: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let add_ons = add_ons
            .unwrap_or_default()
            .into_iter()
            .map(domain::add_on::Selection::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::from)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::ConfirmReservation {
                car_id: car_id.into(),
                client: client.into(),
                pickup_at: pickup_at.coerce(),
                return_at: return_at.coerce(),
                pickup_location: pickup_location.into(),
                return_location: return_location.into(),
                coverage: coverage.map(Into::into),
                add_ons,
                delivery_fee,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Edits the dates, locations, coverage or delivery fee of the
    /// `Reservation`, re-checking availability and re-pricing it.
    ///
    /// Omitted arguments are left untouched, while an explicit `null`
    /// `coverage` or `deliveryFee` removes it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed;
    /// - `CAR_UNAVAILABLE` - the `Car` is already reserved over the new
    ///                       dates;
    /// - `INVALID_DATE_RANGE` - return is not after pickup;
    /// - `UNKNOWN_COVERAGE` - the selected coverage is not offered;
    /// - `CURRENCY_MISMATCH` - `deliveryFee` is in a foreign currency;
    /// - `NEGATIVE_DELIVERY_FEE` - `deliveryFee` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_reservation(
        id: api::reservation::Id,
        pickup_at: Option<DateTime>,
        return_at: Option<DateTime>,
        pickup_location: Option<api::reservation::Location>,
        return_location: Option<api::reservation::Location>,
        coverage: Nullable<api::quote::CoverageInput>,
        delivery_fee: Nullable<Money>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::UpdateReservation {
                reservation_id: id.into(),
                pickup_at: pickup_at.map(DateTime::coerce),
                return_at: return_at.map(DateTime::coerce),
                pickup_location: pickup_location.map(Into::into),
                return_location: return_location.map(Into::into),
                coverage: coverage.explicit().map(|c| c.map(Into::into)),
                delivery_fee: delivery_fee.explicit(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Hands the `Car` over to the client, creating a `Rental`.
    ///
    /// A contract number is generated if none is provided.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed;
    /// - `TOO_EARLY_FOR_PICKUP` - the pickup date hasn't come yet;
    /// - `NEGATIVE_ODOMETER` - `odometer` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "pickUpReservation",
            id = %id,
            odometer = ?odometer,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pick_up_reservation(
        id: api::reservation::Id,
        odometer: Option<i32>,
        contract_number: Option<api::rental::ContractNumber>,
        ctx: &Context,
    ) -> Result<api::Rental, Error> {
        let odometer = odometer
            .map(u32::try_from)
            .transpose()
            .map_err(|_| api::InputError::NegativeOdometer.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::PickUpReservation {
                reservation_id: id.into(),
                odometer,
                contract_number: contract_number.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Reservation`, freeing its `Car`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed;
    /// - `MISSING_REASON` - `reason` is missing or blank.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_reservation(
        id: api::reservation::Id,
        reason: Option<String>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::CancelReservation {
                reservation_id: id.into(),
                reason,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records that the client never showed up, freeing the `Car`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markReservationNoShow",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_reservation_no_show(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::MarkReservationNoShow {
                reservation_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms the cancelled or no-show `Reservation` again.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CANCELLED_OR_NO_SHOW` - the `Reservation` is neither cancelled
    ///                                nor a no-show;
    /// - `CAR_UNAVAILABLE` - the `Car` was reserved by someone else
    ///                       meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reactivateReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reactivate_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::ReactivateReservation {
                reservation_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Attaches the add-on to the `Reservation` and re-prices it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed;
    /// - `UNKNOWN_ADD_ON` - the add-on does not exist;
    /// - `ADD_ON_ALREADY_PRESENT` - the add-on is already attached;
    /// - `NEGATIVE_QUANTITY` - `quantity` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            add_on.id = %add_on_id,
            gql.name = "addReservationAddOn",
            id = %id,
            otel.name = Self::SPAN_NAME,
            quantity = ?quantity,
        ),
    )]
    pub async fn add_reservation_add_on(
        id: api::reservation::Id,
        add_on_id: api::quote::AddOnId,
        quantity: Option<i32>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let quantity = quantity
            .map(u32::try_from)
            .transpose()
            .map_err(|_| api::InputError::NegativeQuantity.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::AddReservationAddOn {
                reservation_id: id.into(),
                add_on_id: add_on_id.into(),
                quantity,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Detaches the add-on from the `Reservation` and re-prices it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist;
    /// - `NOT_CONFIRMED` - the `Reservation` is not confirmed;
    /// - `ADD_ON_NOT_EXISTS` - the add-on is not attached.
    #[tracing::instrument(
        skip_all,
        fields(
            add_on.id = %add_on_id,
            gql.name = "removeReservationAddOn",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn remove_reservation_add_on(
        id: api::reservation::Id,
        add_on_id: api::reservation::AddOnId,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::RemoveReservationAddOn {
                reservation_id: id.into(),
                record_id: add_on_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::confirm_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ReservationError as E;

        match self {
            Self::AddOnAlreadyPresent(_) => {
                Some(E::AddOnAlreadyPresent.into())
            }
            Self::CarNotExists(_) => Some(E::CarNotExists.into()),
            Self::CarUnavailable(..) => Some(E::CarUnavailable.into()),
            Self::Pricing(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ReservationError as E;

        match self {
            Self::ReservationNotExists(_) => {
                Some(E::ReservationNotExists.into())
            }
            Self::CarUnavailable(..) => Some(E::CarUnavailable.into()),
            Self::Transition(e) => e.try_as_error(),
            Self::Pricing(e) => e.try_as_error(),
            Self::CarNotExists(_) => Some(E::CarNotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::pick_up_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::ReservationNotExists.into())
            }
            Self::Transition(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::cancel_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::ReservationNotExists.into())
            }
            Self::Transition(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::mark_reservation_no_show::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::ReservationNotExists.into())
            }
            Self::Transition(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::reactivate_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ReservationError as E;

        match self {
            Self::ReservationNotExists(_) => {
                Some(E::ReservationNotExists.into())
            }
            Self::CarUnavailable(..) => Some(E::CarUnavailable.into()),
            Self::Transition(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::add_reservation_add_on::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ReservationError as E;

        match self {
            Self::AddOnAlreadyPresent(_) => {
                Some(E::AddOnAlreadyPresent.into())
            }
            Self::ReservationNotExists(_) => {
                Some(E::ReservationNotExists.into())
            }
            Self::UnknownAddOn(id) => {
                service::pricing::Error::UnknownAddOn(id.clone())
                    .try_as_error()
            }
            Self::Transition(e) => e.try_as_error(),
            Self::Pricing(e) => e.try_as_error(),
            Self::CarNotExists(_) => Some(E::CarNotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::remove_reservation_add_on::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ReservationError as E;

        match self {
            Self::AddOnNotExists(_) => Some(E::AddOnNotExists.into()),
            Self::ReservationNotExists(_) => {
                Some(E::ReservationNotExists.into())
            }
            Self::Transition(e) => e.try_as_error(),
            Self::Pricing(e) => e.try_as_error(),
            Self::CarNotExists(_) => Some(E::CarNotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}
