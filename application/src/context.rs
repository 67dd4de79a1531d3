//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};

use crate::{Error, JuniperResponse, Service};

/// Per-request context of GraphQL resolvers.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] the resolvers execute operations on.
    service: Service,

    /// Status code of the first failed resolver, or `0` if none failed.
    error_status_code: AtomicU16,
}

impl Context {
    /// Creates a new [`Context`] around the provided [`Service`].
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self {
            service,
            error_status_code: AtomicU16::new(0),
        }
    }

    /// Returns the [`Service`] of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the status code to respond with if the GraphQL response
    /// contains errors.
    ///
    /// Errors not recorded via [`Context::set_error_status_code()`] are
    /// reported as [`http::StatusCode::INTERNAL_SERVER_ERROR`].
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        match self.error_status_code.load(atomic::Ordering::Acquire) {
            0 => http::StatusCode::INTERNAL_SERVER_ERROR,
            code => http::StatusCode::from_u16(code)
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Records the status code of a failed resolver.
    ///
    /// Only the first recorded code is kept.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        _ = self.error_status_code.compare_exchange(
            0,
            status_code.as_u16(),
            atomic::Ordering::AcqRel,
            atomic::Ordering::Acquire,
        );
    }

    /// Returns a closure recording the status code of an [`Error`], to be
    /// used in [`Result::map_err()`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>() else {
            let err = Error::internal(&"`Service` is not provided");
            return Err(JuniperResponse {
                status_code: err.status_code,
                response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                    err.into_field_error(),
                )),
            });
        };
        Ok(Self::new(service.clone()))
    }
}

#[cfg(test)]
mod spec {
    use service::infra::Memory;

    use crate::{api, Service};

    use super::Context;

    #[test]
    fn keeps_first_error_status_code() {
        let ctx = Context::new(Service::new(
            service::Config::default(),
            Memory::new(),
        ));
        assert_eq!(
            ctx.error_status_code(),
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );

        _ = ctx.error()(api::ReservationError::CarUnavailable.into());
        _ = ctx.error()(api::ReservationError::CarNotExists.into());

        assert_eq!(ctx.error_status_code(), http::StatusCode::CONFLICT);
    }
}
