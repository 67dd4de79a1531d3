//! GraphQL API definitions.

pub mod car;
mod mutation;
mod query;
pub mod quote;
pub mod rental;
pub mod report;
pub mod reservation;
pub mod scalar;

use juniper::EmptySubscription;
use service::{domain::reservation::TransitionError, pricing};

use crate::{define_error, AsError, Context, Error};

pub use self::{
    car::Car, mutation::Mutation, query::Query, quote::Quote, rental::Rental,
    reservation::Reservation,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

/// Converts the provided integer into a GraphQL `Int`, saturating on
/// overflow.
pub(crate) fn int(n: impl TryInto<i32>) -> i32 {
    n.try_into().unwrap_or(i32::MAX)
}

define_error! {
    enum InputError {
        #[code = "NEGATIVE_QUANTITY"]
        #[status = BAD_REQUEST]
        #[message = "Add-on quantity cannot be negative"]
        NegativeQuantity,

        #[code = "NEGATIVE_ODOMETER"]
        #[status = BAD_REQUEST]
        #[message = "Odometer reading cannot be negative"]
        NegativeOdometer,
    }
}

define_error! {
    enum ReservationError {
        #[code = "CAR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Car` with the provided ID does not exist"]
        CarNotExists,

        #[code = "RESERVATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Reservation` with the provided ID does not exist"]
        ReservationNotExists,

        #[code = "CAR_UNAVAILABLE"]
        #[status = CONFLICT]
        #[message = "`Car` is already reserved over the requested dates"]
        CarUnavailable,

        #[code = "ADD_ON_ALREADY_PRESENT"]
        #[status = CONFLICT]
        #[message = "Add-on is already attached to the `Reservation`"]
        AddOnAlreadyPresent,

        #[code = "ADD_ON_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Add-on is not attached to the `Reservation`"]
        AddOnNotExists,
    }
}

impl AsError for TransitionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOT_CONFIRMED"]
                #[status = CONFLICT]
                #[message = "`Reservation` is not confirmed"]
                NotConfirmed,

                #[code = "NOT_CANCELLED_OR_NO_SHOW"]
                #[status = CONFLICT]
                #[message = "`Reservation` is neither cancelled nor a no-show"]
                NotCancelledOrNoShow,

                #[code = "TOO_EARLY_FOR_PICKUP"]
                #[status = CONFLICT]
                #[message = "Pickup date of the `Reservation` hasn't come yet"]
                TooEarlyForPickup,

                #[code = "MISSING_REASON"]
                #[status = BAD_REQUEST]
                #[message = "Cancellation reason must be provided"]
                MissingReason,
            }
        }

        Some(
            match self {
                Self::NotConfirmed(_) => Error::NotConfirmed,
                Self::NotCancelledOrNoShow(_) => Error::NotCancelledOrNoShow,
                Self::TooEarlyForPickup => Error::TooEarlyForPickup,
                Self::MissingReason => Error::MissingReason,
            }
            .into(),
        )
    }
}

impl AsError for pricing::Error {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_DATE_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "Return must be after pickup"]
                InvalidDateRange,

                #[code = "NO_APPLICABLE_TARIFF"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Car` has no tariff to price the rental with"]
                NoApplicableTariff,

                #[code = "CURRENCY_MISMATCH"]
                #[status = BAD_REQUEST]
                #[message = "Amount is priced in a currency other than the \
                             tariff one"]
                CurrencyMismatch,

                #[code = "UNKNOWN_ADD_ON"]
                #[status = BAD_REQUEST]
                #[message = "Add-on with the provided ID does not exist"]
                UnknownAddOn,

                #[code = "UNKNOWN_COVERAGE"]
                #[status = BAD_REQUEST]
                #[message = "Coverage with the provided ID is not offered"]
                UnknownCoverage,

                #[code = "NEGATIVE_DELIVERY_FEE"]
                #[status = BAD_REQUEST]
                #[message = "Delivery fee cannot be negative"]
                NegativeDeliveryFee,
            }
        }

        match self {
            Self::InvalidDateRange => Some(Error::InvalidDateRange.into()),
            Self::NoApplicableTariff => Some(Error::NoApplicableTariff.into()),
            Self::CurrencyMismatch { .. } => {
                Some(Error::CurrencyMismatch.into())
            }
            Self::UnknownAddOn(_) => Some(Error::UnknownAddOn.into()),
            Self::UnknownCoverage(_) => Some(Error::UnknownCoverage.into()),
            Self::NegativeDeliveryFee => {
                Some(Error::NegativeDeliveryFee.into())
            }
            Self::AmountOverflow => None,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;
    use juniper::{graphql_value, ExecutionError, Value, Variables};
    use service::{
        domain,
        infra::{Database as _, Memory},
    };

    use crate::{config, Context, Service};

    const CAR_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn context() -> Context {
        let car = domain::Car::try_from(config::Car {
            id: Some(CAR_ID.to_owned()),
            segment: "economy".to_owned(),
            tariffs: vec![config::Tariff {
                min_days: 1,
                max_days: 0,
                daily_price: "40USD".to_owned(),
                deposit: "500USD".to_owned(),
            }],
            coverage_plans: vec![],
            discount: None,
        })
        .unwrap();
        let pricing = config::Pricing {
            add_ons: vec![config::AddOn {
                id: "gps".to_owned(),
                name: "GPS".to_owned(),
                pricing_mode: "PER_DAY".to_owned(),
                unit_price: "5USD".to_owned(),
            }],
            ..config::Pricing::default()
        };

        let db = Memory::new();
        db.execute(Insert(car)).await.unwrap();
        Context::new(Service::new(pricing.try_into().unwrap(), db))
    }

    async fn execute(
        doc: &str,
        ctx: &Context,
    ) -> (Value, Vec<ExecutionError<juniper::DefaultScalarValue>>) {
        juniper::execute(doc, None, &super::schema(), &Variables::new(), ctx)
            .await
            .unwrap()
    }

    fn error_code(
        errs: &[ExecutionError<juniper::DefaultScalarValue>],
    ) -> &Value {
        errs[0]
            .error()
            .extensions()
            .as_object_value()
            .and_then(|ext| ext.get_field_value("code"))
            .unwrap()
    }

    fn confirm_doc(pickup_at: &str, return_at: &str) -> String {
        format!(
            r#"mutation {{
                confirmReservation(
                    carId: "{CAR_ID}",
                    client: {{ name: "Jane Roe" }},
                    pickupAt: "{pickup_at}",
                    returnAt: "{return_at}",
                    pickupLocation: "Airport",
                    returnLocation: "Airport",
                ) {{ id status priceSnapshot {{ grandTotal }} }}
            }}"#,
        )
    }

    #[tokio::test]
    async fn quotes_without_reserving() {
        let ctx = context().await;

        let (res, errs) = execute(
            &format!(
                r#"{{
                    quote(
                        carId: "{CAR_ID}",
                        pickupAt: "2030-05-01T10:00:00Z",
                        returnAt: "2030-05-03T10:00:00Z",
                        addOns: [{{ addOnId: "gps" }}],
                        deliveryFee: "15USD",
                    ) {{
                        totalDays
                        dailyRate
                        rentalTotal
                        addOnsTotal
                        grandTotal
                        depositAmount
                        currency
                    }}
                }}"#,
            ),
            &ctx,
        )
        .await;

        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(
            res,
            graphql_value!({"quote": {
                "totalDays": 3,
                "dailyRate": "40USD",
                "rentalTotal": "120USD",
                "addOnsTotal": "15USD",
                "grandTotal": "150USD",
                "depositAmount": "500USD",
                "currency": "USD",
            }}),
        );
    }

    #[tokio::test]
    async fn rejects_quote_for_unknown_car() {
        let ctx = context().await;

        let (_, errs) = execute(
            r#"{
                quote(
                    carId: "00000000-0000-4000-8000-000000000000",
                    pickupAt: "2030-05-01T10:00:00Z",
                    returnAt: "2030-05-03T10:00:00Z",
                ) { grandTotal }
            }"#,
            &ctx,
        )
        .await;

        assert_eq!(error_code(&errs), &graphql_value!("CAR_NOT_EXISTS"));
        assert_eq!(ctx.error_status_code(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn refuses_overlapping_reservation() {
        let ctx = context().await;

        let (res, errs) = execute(
            &confirm_doc("2030-05-01T10:00:00Z", "2030-05-03T10:00:00Z"),
            &ctx,
        )
        .await;
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(
            res.as_object_value()
                .and_then(|o| o.get_field_value("confirmReservation"))
                .and_then(Value::as_object_value)
                .and_then(|o| o.get_field_value("status")),
            Some(&graphql_value!("CONFIRMED")),
        );

        let (_, errs) = execute(
            &confirm_doc("2030-05-02T10:00:00Z", "2030-05-04T10:00:00Z"),
            &ctx,
        )
        .await;
        assert_eq!(error_code(&errs), &graphql_value!("CAR_UNAVAILABLE"));
        assert_eq!(ctx.error_status_code(), http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn requires_cancellation_reason() {
        let ctx = context().await;

        let (res, errs) = execute(
            &confirm_doc("2030-06-01T10:00:00Z", "2030-06-03T10:00:00Z"),
            &ctx,
        )
        .await;
        assert!(errs.is_empty(), "{errs:?}");
        let id = res
            .as_object_value()
            .and_then(|o| o.get_field_value("confirmReservation"))
            .and_then(Value::as_object_value)
            .and_then(|o| o.get_field_value("id"))
            .and_then(Value::as_string_value)
            .map(ToOwned::to_owned)
            .unwrap();

        let (_, errs) = execute(
            &format!(
                r#"mutation {{
                    cancelReservation(id: "{id}", reason: "  ") {{ status }}
                }}"#,
            ),
            &ctx,
        )
        .await;
        assert_eq!(error_code(&errs), &graphql_value!("MISSING_REASON"));

        let (res, errs) = execute(
            &format!(
                r#"mutation {{
                    cancelReservation(id: "{id}", reason: "Plans changed") {{
                        status
                        cancellationReason
                    }}
                }}"#,
            ),
            &ctx,
        )
        .await;
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(
            res,
            graphql_value!({"cancelReservation": {
                "status": "CANCELLED",
                "cancellationReason": "Plans changed",
            }}),
        );
    }
}
