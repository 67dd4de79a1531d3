//! GraphQL [`Query`]s definitions.

use common::{DateTime, Money};
use juniper::graphql_object;
use service::{domain, query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Prices the provided booking configuration without reserving anything.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist;
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
            gql.name = "quote",
            otel.name = Self::SPAN_NAME,
            pickup_at = ?pickup_at,
            return_at = ?return_at,
        ),
    )]
    pub async fn quote(
        car_id: api::car::Id,
        pickup_at: DateTime,
        return_at: DateTime,
        coverage: Option<api::quote::CoverageInput>,
        add_ons: Option<Vec<api::quote::AddOnInput>>,
        delivery_fee: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        let add_ons = add_ons
            .unwrap_or_default()
            .into_iter()
            .map(domain::add_on::Selection::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::from)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::quote::Preview {
                car_id: car_id.into(),
                pickup_at,
                return_at,
                coverage: coverage.map(Into::into),
                add_ons,
                delivery_fee,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Reservation` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(query::reservation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::ReservationNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Car` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "car",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(query::car::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::CarNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Car`s of the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cars",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cars(ctx: &Context) -> Result<Vec<api::Car>, Error> {
        ctx.service()
            .execute(query::car::All::by(service::read::car::All))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Lists picked up `Reservation`s whose `Car` should have been returned
    /// before the specified moment (now, by default).
    #[tracing::instrument(
        skip_all,
        fields(
            at = ?at,
            gql.name = "overdueReport",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn overdue_report(
        at: Option<DateTime>,
        ctx: &Context,
    ) -> Result<api::report::Overdue, Error> {
        ctx.service()
            .execute(query::report::Overdue {
                at: at.unwrap_or_else(DateTime::now),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Measures the fleet utilization over the `[from, to)` window.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_WINDOW` - `to` is not after `from`.
    #[tracing::instrument(
        skip_all,
        fields(
            from = ?from,
            gql.name = "fleetUtilization",
            otel.name = Self::SPAN_NAME,
            to = ?to,
        ),
    )]
    pub async fn fleet_utilization(
        from: DateTime,
        to: DateTime,
        ctx: &Context,
    ) -> Result<api::report::FleetUtilization, Error> {
        ctx.service()
            .execute(query::report::FleetUtilization { from, to })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for query::quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::CarNotExists(_) => {
                Some(api::ReservationError::CarNotExists.into())
            }
            Self::Pricing(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for query::report::fleet_utilization::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_WINDOW"]
                #[status = BAD_REQUEST]
                #[message = "`to` must be after `from`"]
                InvalidWindow,
            }
        }

        match self {
            Self::InvalidWindow => Some(Error::InvalidWindow.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}
