//! [`Rental`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Car handed over to a client under a picked up `Reservation`.
#[derive(Clone, Debug, From)]
pub struct Rental(domain::Rental);

/// Car handed over to a client under a picked up `Reservation`.
#[graphql_object(context = Context)]
impl Rental {
    /// Unique identifier of this `Rental`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Identifier of the `Reservation` this `Rental` was created for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.reservationId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn reservation_id(&self) -> api::reservation::Id {
        self.0.reservation_id.into()
    }

    /// Number of the rental contract.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.contractNumber",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn contract_number(&self) -> ContractNumber {
        self.0.contract_number.clone().into()
    }

    /// Odometer reading at pickup, if recorded.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.pickupOdometer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn pickup_odometer(&self) -> Option<i32> {
        self.0.pickup_odometer.map(api::int)
    }

    /// `DateTime` when the car was picked up.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.pickedUpAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn picked_up_at(&self) -> DateTime {
        self.0.picked_up_at.coerce()
    }

    /// `DateTime` when the car was returned, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.returnedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn returned_at(&self) -> Option<DateTime> {
        self.0.returned_at.map(|at| at.coerce())
    }

    /// Status of this `Rental`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }
}

/// Unique identifier of a `Rental`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::rental::Id)]
#[into(domain::rental::Id)]
#[graphql(name = "RentalId", transparent)]
pub struct Id(Uuid);

/// Number of a rental contract, like `RC-20240501-1A2B3C4D`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RentalContractNumber",
    with = scalar::Via::<domain::rental::ContractNumber>,
)]
pub struct ContractNumber(domain::rental::ContractNumber);

/// Status of a `Rental`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentalStatus")]
pub enum Status {
    /// Car is with the client.
    Active,

    /// Car was returned.
    Completed,

    /// Rental was cancelled.
    Cancelled,
}

impl From<domain::rental::Status> for Status {
    fn from(status: domain::rental::Status) -> Self {
        use domain::rental::Status as S;
        match status {
            S::Active => Self::Active,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
        }
    }
}
