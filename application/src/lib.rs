//! Application exposes the [`Service`] of car rental pricing and
//! reservations as a GraphQL API.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Extension, Json, Router,
};
use derive_more::{Debug, Display, Error as StdError, From};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::extract::JuniperRequest;
use common::operations::Insert;
use service::{
    domain,
    infra::{database, Database as _, Memory},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracerr::Traced;
use tracing as log;
// Used in binary.
use axum_client_ip as _;
use tokio as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<Memory>;

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        if response.is_ok() {
            Json(response).into_response()
        } else {
            (status_code, Json(response)).into_response()
        }
    }
}

/// GraphQL API handler.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    // Resolvers record the status while executing.
    let response = gql_request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Builds the [`Router`] serving the GraphQL API of the provided [`Service`].
///
/// # Errors
///
/// If some of the [`config::Cors`] origins is not a valid header value.
pub fn router(
    service: Service,
    schema: Arc<api::Schema>,
    cors: &config::Cors,
) -> Result<Router, http::header::InvalidHeaderValue> {
    let allow_origin = if cors.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.origins
                .iter()
                .map(|o| o.parse::<http::HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    let cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(allow_origin);

    Ok(Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(schema))
        .layer(Extension(service))
        .layer(cors))
}

/// Loads the configured [`config::Fleet`] into the provided [`Memory`]
/// database, returning the number of loaded cars.
///
/// Cars with malformed tariff tiers are still loaded, as quoting falls back
/// to their last tier.
///
/// # Errors
///
/// If some car configuration is invalid or the car already exists.
pub async fn seed_fleet(
    database: &Memory,
    fleet: config::Fleet,
) -> Result<usize, SeedError> {
    let mut count = 0;
    for car in fleet.cars {
        let car = domain::Car::try_from(car)?;
        if let Err(e) = car.tariffs.check_tiling() {
            log::warn!(car.id = %car.id, "`Car` tariffs are malformed: {e}");
        }
        database.execute(Insert(car)).await?;
        count += 1;
    }
    Ok(count)
}

/// Error of [`seed_fleet()`].
#[derive(Debug, Display, From, StdError)]
pub enum SeedError {
    /// Car configuration is invalid.
    #[display("invalid car: {_0}")]
    Config(config::InvalidValue),

    /// Car cannot be stored.
    #[display("cannot store car: {_0}")]
    Db(Traced<database::Error>),
}
