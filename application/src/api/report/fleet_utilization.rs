//! [`FleetUtilization`] report definition.

use std::sync::OnceLock;

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, api::scalar::Decimal, AsError, Context, Error};

/// Report measuring which share of the fleet's time over a window is
/// occupied by `Reservation`s.
#[derive(Clone, Debug)]
pub struct FleetUtilization {
    /// Underlying [`query::report::fleet_utilization::Output`].
    output: query::report::fleet_utilization::Output,

    /// [`Row`]s of this report.
    rows: OnceLock<Vec<Row>>,
}

impl From<query::report::fleet_utilization::Output> for FleetUtilization {
    fn from(output: query::report::fleet_utilization::Output) -> Self {
        Self {
            output,
            rows: OnceLock::new(),
        }
    }
}

/// Report measuring which share of the fleet's time over a window is
/// occupied by `Reservation`s.
#[graphql_object(name = "FleetUtilizationReport", context = Context)]
impl FleetUtilization {
    /// Length of the window in days.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "FleetUtilizationReport.windowDays",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn window_days(&self) -> Decimal {
        self.output.window_days.into()
    }

    /// Utilization of the whole fleet, in percent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "FleetUtilizationReport.averagePercent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn average_percent(&self) -> Decimal {
        self.output.average_percent.into()
    }

    /// `FleetUtilizationReportRow`s of every `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "FleetUtilizationReport.perCar",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn per_car(&self) -> &[Row] {
        self.rows
            .get_or_init(|| {
                self.output.per_car.iter().copied().map(Row).collect()
            })
            .as_slice()
    }
}

/// Row of a [`FleetUtilization`] report.
#[derive(Clone, Copy, Debug)]
pub struct Row(query::report::fleet_utilization::Row);

/// Utilization of a single `Car`.
#[graphql_object(name = "FleetUtilizationReportRow", context = Context)]
impl Row {
    /// `Car` this row is about.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` was removed from the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            car.id = %self.0.car_id,
            gql.name = "FleetUtilizationReportRow.car",
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

    /// Days the `Car` is occupied within the window.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "FleetUtilizationReportRow.rentedDays",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn rented_days(&self) -> Decimal {
        self.0.rented_days.into()
    }

    /// Share of the window the `Car` is occupied, in percent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "FleetUtilizationReportRow.percent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn percent(&self) -> Decimal {
        self.0.percent.into()
    }
}
