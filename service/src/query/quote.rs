//! [`Preview`] definition.

use common::{
    operations::{By, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{add_on, car, coverage, Car, Quote},
    infra::{database, Database},
    pricing, Query, Service,
};

/// [`Query`] pricing a booking configuration without persisting anything.
#[derive(Clone, Debug)]
pub struct Preview {
    /// ID of the [`Car`] to be priced.
    pub car_id: car::Id,

    /// [`DateTime`] when the [`Car`] is picked up.
    pub pickup_at: DateTime,

    /// [`DateTime`] when the [`Car`] is returned.
    pub return_at: DateTime,

    /// Selected coverage, if any.
    pub coverage: Option<coverage::Selection>,

    /// Selected add-ons.
    pub add_ons: Vec<add_on::Selection>,

    /// Delivery fee, if any.
    pub delivery_fee: Option<Money>,
}

impl<Db> Query<Preview> for Service<Db>
where
    Db: Database<
        Select<By<Option<Car>, car::Id>>,
        Ok = Option<Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Preview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Preview {
            car_id,
            pickup_at,
            return_at,
            coverage,
            add_ons,
            delivery_fee,
        } = query;

        let car = self
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;

        let catalog = self.catalog();
        let input = pricing::Input {
            pickup_at,
            return_at,
            coverage,
            add_ons: catalog
                .items(&add_ons)
                .map_err(tracerr::from_and_wrap!(=> E))?,
            delivery_fee,
        };
        pricing::quote(&car, catalog, &input)
            .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`Preview`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// Configuration cannot be priced.
    #[display("Pricing failed: {_0}")]
    #[from]
    Pricing(pricing::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Handler as _};

    use crate::{
        command::confirm_reservation::spec::service_with,
        domain::{add_on, car},
        pricing::{
            self,
            spec::{car, usd},
        },
    };

    use super::{ExecutionError, Preview};

    fn preview(car_id: car::Id, add_ons: &[&str]) -> Preview {
        Preview {
            car_id,
            pickup_at: DateTime::from_rfc3339("2024-05-01T10:00:00Z").unwrap(),
            return_at: DateTime::from_rfc3339("2024-05-05T10:00:00Z").unwrap(),
            coverage: None,
            add_ons: add_ons
                .iter()
                .map(|id| add_on::Selection {
                    add_on_id: add_on::Id::new(*id).unwrap(),
                    quantity: None,
                })
                .collect(),
            delivery_fee: None,
        }
    }

    #[tokio::test]
    async fn prices_without_persisting() {
        let car = car();
        let service = service_with(&car).await;

        let quote = service.execute(preview(car.id, &["gps"])).await.unwrap();
        assert_eq!(quote.total_days, 5);
        assert_eq!(quote.grand_total, usd(230));

        let again = service.execute(preview(car.id, &["gps"])).await.unwrap();
        assert_eq!(quote, again);
    }

    #[tokio::test]
    async fn reports_unknown_selections() {
        let car = car();
        let service = service_with(&car).await;

        let err = service
            .execute(preview(car.id, &["jetpack"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Pricing(pricing::Error::UnknownAddOn(_)),
        ));

        let err = service
            .execute(preview(car::Id::new(), &[]))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::CarNotExists(_)));
    }
}
