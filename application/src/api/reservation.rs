//! [`Reservation`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// Booking of a car for a date range.
#[derive(Clone, Debug, From)]
pub struct Reservation(domain::Reservation);

/// Booking of a car for a date range.
#[graphql_object(context = Context)]
impl Reservation {
    /// Unique identifier of this `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Reserved `Car`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the reserved `Car` was removed from the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            car.id = %self.0.car_id,
            gql.name = "Reservation.car",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn car(&self, ctx: &Context) -> Result<api::Car, Error> {
        ctx.service()
            .execute(query::car::ById::by(self.0.car_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::CarNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Client renting the `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn client(&self) -> Client {
        self.0.client.clone().into()
    }

    /// `DateTime` when the `Car` is picked up.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.pickupAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn pickup_at(&self) -> DateTime {
        self.0.pickup_at.coerce()
    }

    /// `DateTime` when the `Car` is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.returnAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn return_at(&self) -> DateTime {
        self.0.return_at.coerce()
    }

    /// Location where the `Car` is picked up.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.pickupLocation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn pickup_location(&self) -> Location {
        self.0.pickup_location.clone().into()
    }

    /// Location where the `Car` is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.returnLocation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn return_location(&self) -> Location {
        self.0.return_location.clone().into()
    }

    /// Selected coverage, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.coverage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn coverage(&self) -> Option<api::quote::Coverage> {
        self.0.coverage.clone().map(Into::into)
    }

    /// Delivery fee, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.deliveryFee",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn delivery_fee(&self) -> Option<Money> {
        self.0.delivery_fee
    }

    /// Add-ons attached to this `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.addOns",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn add_ons(&self) -> Vec<AddOn> {
        self.0.add_ons.iter().map(Into::into).collect()
    }

    /// Price of this `Reservation` fixed at the moment it was last priced.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.priceSnapshot",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price_snapshot(&self) -> PriceSnapshot {
        PriceSnapshot(self.0.price_snapshot.clone())
    }

    /// Status of this `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Reservation` was cancelled, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.cancelledAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn cancelled_at(&self) -> Option<DateTime> {
        self.0.cancelled_at.map(|at| at.coerce())
    }

    /// Reason this `Reservation` was cancelled with, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.cancellationReason",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn cancellation_reason(&self) -> Option<String> {
        self.0.cancellation_reason.as_ref().map(ToString::to_string)
    }

    /// `DateTime` when this `Reservation` was marked as a no-show, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.noShowAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn no_show_at(&self) -> Option<DateTime> {
        self.0.no_show_at.map(|at| at.coerce())
    }

    /// `Rental` created when the `Car` was picked up, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.rental",
            otel.name = api::Query::SPAN_NAME,
            reservation.id = %self.0.id,
        ),
    )]
    pub async fn rental(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Rental>, Error> {
        ctx.service()
            .execute(query::reservation::RentalOf::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|r| r.map(Into::into))
    }

    /// `DateTime` when this `Reservation` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Reservation` was last modified.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::Id)]
#[into(domain::reservation::Id)]
#[graphql(name = "ReservationId", transparent)]
pub struct Id(Uuid);

/// Status of a `Reservation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationStatus")]
pub enum Status {
    /// Reservation is active and editable.
    Confirmed,

    /// Car was handed over to the client.
    PickedUp,

    /// Reservation was cancelled.
    Cancelled,

    /// Client never showed up.
    NoShow,
}

impl From<domain::reservation::Status> for Status {
    fn from(status: domain::reservation::Status) -> Self {
        use domain::reservation::Status as S;
        match status {
            S::Confirmed => Self::Confirmed,
            S::PickedUp => Self::PickedUp,
            S::Cancelled => Self::Cancelled,
            S::NoShow => Self::NoShow,
        }
    }
}

/// Pickup or return location of a `Reservation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReservationLocation",
    with = scalar::Via::<domain::reservation::Location>,
)]
pub struct Location(domain::reservation::Location);

/// Add-on attached to a `Reservation`, priced at the moment it was attached.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ReservationAddOn")]
pub struct AddOn {
    /// Unique identifier of this attachment.
    pub id: AddOnId,

    /// Identifier of the catalog add-on.
    pub add_on_id: api::quote::AddOnId,

    /// Human-readable name of the add-on.
    pub name: String,

    /// Way the quantity of the add-on is determined.
    pub pricing_mode: api::quote::PricingMode,

    /// Price of a single unit.
    pub unit_price: Money,

    /// Explicitly supplied quantity, if any.
    pub manual_quantity: Option<i32>,

    /// Number of billed units.
    pub quantity: i32,

    /// Price of all the units.
    pub total: Money,
}

impl From<&domain::reservation::AddOnRecord> for AddOn {
    fn from(record: &domain::reservation::AddOnRecord) -> Self {
        Self {
            id: record.id.into(),
            add_on_id: record.add_on_id.clone().into(),
            name: record.name.clone(),
            pricing_mode: record.pricing_mode.into(),
            unit_price: record.unit_price,
            manual_quantity: record.manual_quantity.map(api::int),
            quantity: api::int(record.quantity),
            total: record.total,
        }
    }
}

/// Unique identifier of an add-on attached to a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::AddOnRecordId)]
#[into(domain::reservation::AddOnRecordId)]
#[graphql(name = "ReservationAddOnId", transparent)]
pub struct AddOnId(Uuid);

/// Price of a `Reservation` fixed at the moment it was last priced.
#[derive(Clone, Debug)]
pub struct PriceSnapshot(domain::quote::Snapshot);

/// Price of a `Reservation` fixed at the moment it was last priced.
///
/// Early snapshots hold the totals only and have no `quote`.
#[graphql_object(context = Context)]
impl PriceSnapshot {
    /// Version of the snapshot shape.
    pub fn version(&self) -> i32 {
        match self.0 {
            domain::quote::Snapshot::Lean(_) => 1,
            domain::quote::Snapshot::Full(_) => 2,
        }
    }

    /// Number of billed rental days.
    pub fn total_days(&self) -> i32 {
        api::int(self.0.total_days())
    }

    /// Price of a single rental day.
    pub fn daily_rate(&self) -> Money {
        self.0.daily_rate()
    }

    /// Total price of the rental.
    pub fn grand_total(&self) -> Money {
        self.0.grand_total()
    }

    /// Deposit to be taken, if known.
    pub fn deposit_amount(&self) -> Option<Money> {
        self.0.deposit_amount()
    }

    /// Complete price breakdown, if recorded.
    pub fn quote(&self) -> Option<api::Quote> {
        self.0.quote().cloned().map(Into::into)
    }
}

/// Person renting a car.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Client {
    /// Full name of the client.
    pub name: ClientName,

    /// Phone number of the client, if provided.
    pub phone: Option<ClientPhone>,

    /// Email address of the client, if provided.
    pub email: Option<ClientEmail>,
}

impl From<domain::Client> for Client {
    fn from(client: domain::Client) -> Self {
        let domain::Client { name, phone, email } = client;
        Self {
            name: name.into(),
            phone: phone.map(Into::into),
            email: email.map(Into::into),
        }
    }
}

/// Person renting a car.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct ClientInput {
    /// Full name of the client.
    pub name: ClientName,

    /// Phone number of the client.
    pub phone: Option<ClientPhone>,

    /// Email address of the client.
    pub email: Option<ClientEmail>,
}

impl From<ClientInput> for domain::Client {
    fn from(input: ClientInput) -> Self {
        let ClientInput { name, phone, email } = input;
        Self {
            name: name.into(),
            phone: phone.map(Into::into),
            email: email.map(Into::into),
        }
    }
}

/// Full name of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::client::Name>)]
pub struct ClientName(domain::client::Name);

/// Phone number of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::client::Phone>)]
pub struct ClientPhone(domain::client::Phone);

/// Email address of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::client::Email>)]
pub struct ClientEmail(domain::client::Email);
