//! [`Car`]-related definitions.

use common::{Money, Percent};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A car available for rent.
#[derive(Clone, Debug, From)]
pub struct Car(domain::Car);

/// A car available for rent.
#[graphql_object(context = Context)]
impl Car {
    /// Unique identifier of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Pricing segment of this `Car`, like `economy`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.segment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn segment(&self) -> String {
        self.0.segment.to_string()
    }

    /// Daily-rate tiers of this `Car`, in ascending order of days.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.tariffs",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn tariffs(&self) -> Vec<Tariff> {
        self.0.tariffs.iter().copied().map(Into::into).collect()
    }

    /// Coverage plans offered with this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.coveragePlans",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn coverage_plans(&self) -> Vec<CoveragePlan> {
        self.0.coverage_plans.iter().map(Into::into).collect()
    }

    /// Promotional discount of the daily price of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.discount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn discount(&self) -> Percent {
        self.0.discount
    }
}

/// Unique identifier of a `Car`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::car::Id)]
#[into(domain::car::Id)]
#[graphql(name = "CarId", transparent)]
pub struct Id(Uuid);

/// Tier of a `Car`'s daily-rate table.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "CarTariff")]
pub struct Tariff {
    /// Minimal number of rental days this tier applies to.
    pub min_days: i32,

    /// Maximal number of rental days this tier applies to.
    ///
    /// `null` means the tier is unbounded.
    pub max_days: Option<i32>,

    /// Price of a single rental day.
    pub daily_price: Money,

    /// Deposit taken for the whole rental.
    pub deposit: Money,
}

impl From<domain::car::Tariff> for Tariff {
    fn from(tariff: domain::car::Tariff) -> Self {
        Self {
            min_days: api::int(tariff.min_days),
            max_days: (!tariff.is_unbounded())
                .then(|| api::int(tariff.max_days)),
            daily_price: tariff.daily_price,
            deposit: tariff.deposit,
        }
    }
}

/// Coverage option offered with a specific `Car`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "CoveragePlan")]
pub struct CoveragePlan {
    /// Identifier of this plan, unique within the `Car`.
    pub id: api::quote::CoverageId,

    /// Human-readable name of this plan.
    pub name: String,

    /// Markup applied to the daily price, in percent.
    ///
    /// May exceed `100`.
    pub price_percent: api::scalar::Decimal,

    /// Share of the deposit waived by this plan.
    pub deposit_waived_percent: Percent,
}

impl From<&domain::coverage::Plan> for CoveragePlan {
    fn from(plan: &domain::coverage::Plan) -> Self {
        Self {
            id: plan.id.clone().into(),
            name: plan.name.clone(),
            price_percent: plan.price_percent.value().into(),
            deposit_waived_percent: plan.deposit_waived_percent,
        }
    }
}
