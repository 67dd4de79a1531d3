//! [`Quote`]-related definitions.

use common::{money, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::domain;

use crate::{api, api::scalar, Context};

/// Price breakdown of a booking configuration.
#[derive(Clone, Debug, From)]
pub struct Quote(domain::Quote);

/// Price breakdown of a booking configuration.
#[graphql_object(context = Context)]
impl Quote {
    /// Number of billed rental days.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.totalDays",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn total_days(&self) -> i32 {
        api::int(self.0.total_days)
    }

    /// Price of a single rental day, with coverage markup and discount
    /// applied.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.dailyRate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn daily_rate(&self) -> Money {
        self.0.daily_rate
    }

    /// Price of all the rental days.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.rentalTotal",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rental_total(&self) -> Money {
        self.0.rental_total
    }

    /// Priced add-ons, in selection order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.addOns",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn add_ons(&self) -> Vec<Line> {
        self.0.add_ons.iter().map(Into::into).collect()
    }

    /// Sum of all the add-on totals.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.addOnsTotal",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn add_ons_total(&self) -> Money {
        self.0.add_ons_total
    }

    /// Delivery fee, zero if none.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.deliveryFee",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn delivery_fee(&self) -> Money {
        self.0.delivery_fee
    }

    /// Share of the deposit waived by the selected coverage.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.depositPercent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn deposit_percent(&self) -> Percent {
        self.0.deposit_percent
    }

    /// Deposit to be taken, not included into `grandTotal`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.depositAmount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn deposit_amount(&self) -> Money {
        self.0.deposit_amount
    }

    /// Total price of the rental.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.grandTotal",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn grand_total(&self) -> Money {
        self.0.grand_total
    }

    /// Currency of all the amounts.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.currency",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn currency(&self) -> Currency {
        self.0.currency.into()
    }

    /// Indicator whether no tariff tier matched and the cheapest one was
    /// used instead.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.tariffFallback",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn tariff_fallback(&self) -> bool {
        self.0.tariff_fallback
    }
}

/// Priced add-on of a `Quote`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "QuoteLine")]
pub struct Line {
    /// Identifier of the add-on.
    pub add_on_id: AddOnId,

    /// Human-readable name of the add-on.
    pub name: String,

    /// Way the quantity of the add-on is determined.
    pub pricing_mode: PricingMode,

    /// Price of a single unit.
    pub unit_price: Money,

    /// Number of units.
    pub quantity: i32,

    /// Price of all the units.
    pub total: Money,
}

impl From<&domain::quote::Line> for Line {
    fn from(line: &domain::quote::Line) -> Self {
        Self {
            add_on_id: line.add_on_id.clone().into(),
            name: line.name.clone(),
            pricing_mode: line.pricing_mode.into(),
            unit_price: line.unit_price,
            quantity: api::int(line.quantity),
            total: line.total,
        }
    }
}

/// Identifier of an add-on, like `child-seat`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::add_on::Id>)]
pub struct AddOnId(domain::add_on::Id);

/// Identifier of a coverage plan or package, like `full-cover`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::coverage::Id>)]
pub struct CoverageId(domain::coverage::Id);

/// Way the quantity of an add-on is determined.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "AddOnPricingMode")]
pub enum PricingMode {
    /// Charged for every rental day.
    PerDay,

    /// Charged once regardless of the rental duration.
    OneTime,

    /// Charged for an explicitly supplied quantity.
    ManualQty,
}

impl From<domain::add_on::PricingMode> for PricingMode {
    fn from(mode: domain::add_on::PricingMode) -> Self {
        use domain::add_on::PricingMode as M;
        match mode {
            M::PerDay => Self::PerDay,
            M::OneTime => Self::OneTime,
            M::ManualQty => Self::ManualQty,
        }
    }
}

/// Currency of an amount.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum Currency {
    /// US Dollar.
    Usd,

    /// Euro.
    Eur,

    /// Pound Sterling.
    Gbp,
}

impl From<money::Currency> for Currency {
    fn from(currency: money::Currency) -> Self {
        use money::Currency as C;
        match currency {
            C::Usd => Self::Usd,
            C::Eur => Self::Eur,
            C::Gbp => Self::Gbp,
        }
    }
}

/// Origin of a coverage.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum CoverageKind {
    /// Plan offered with the car itself.
    Plan,

    /// Package from the pricing catalog, available for any car.
    Package,
}

/// Coverage selected for a quote or a `Reservation`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Coverage {
    /// Origin of the selected coverage.
    pub kind: CoverageKind,

    /// Identifier of the selected coverage.
    pub id: CoverageId,
}

impl From<domain::coverage::Selection> for Coverage {
    fn from(selection: domain::coverage::Selection) -> Self {
        use domain::coverage::Selection as S;
        let (kind, id) = match selection {
            S::Plan(id) => (CoverageKind::Plan, id),
            S::Package(id) => (CoverageKind::Package, id),
        };
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Coverage to be selected.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct CoverageInput {
    /// Origin of the coverage.
    pub kind: CoverageKind,

    /// Identifier of the coverage.
    pub id: CoverageId,
}

impl From<CoverageInput> for domain::coverage::Selection {
    fn from(input: CoverageInput) -> Self {
        let CoverageInput { kind, id } = input;
        match kind {
            CoverageKind::Plan => Self::Plan(id.into()),
            CoverageKind::Package => Self::Package(id.into()),
        }
    }
}

/// Add-on to be selected.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct AddOnInput {
    /// Identifier of the add-on.
    pub add_on_id: AddOnId,

    /// Number of units, only meaningful for `MANUAL_QTY` add-ons.
    pub quantity: Option<i32>,
}

impl TryFrom<AddOnInput> for domain::add_on::Selection {
    type Error = api::InputError;

    fn try_from(input: AddOnInput) -> Result<Self, Self::Error> {
        let AddOnInput {
            add_on_id,
            quantity,
        } = input;

        Ok(Self {
            add_on_id: add_on_id.into(),
            quantity: quantity
                .map(u32::try_from)
                .transpose()
                .map_err(|_| api::InputError::NegativeQuantity)?,
        })
    }
}
