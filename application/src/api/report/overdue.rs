//! [`Overdue`] report definition.

use juniper::GraphQLObject;
use service::query;

use crate::{api, Context};

/// Report listing picked up `Reservation`s whose car should have been
/// returned already.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "OverdueReport", context = Context)]
pub struct Overdue {
    /// Number of overdue `Reservation`s.
    pub count: i32,

    /// Overdue `Reservation`s, the longest overdue first.
    pub items: Vec<Item>,
}

impl From<query::report::overdue::Output> for Overdue {
    fn from(output: query::report::overdue::Output) -> Self {
        Self {
            count: api::int(output.count),
            items: output.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Item of an `OverdueReport`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "OverdueReportItem", context = Context)]
pub struct Item {
    /// Overdue `Reservation`.
    pub reservation: api::Reservation,

    /// `Rental` of the overdue `Reservation`, if any.
    pub rental: Option<api::Rental>,

    /// Whole calendar days passed since the planned return date.
    pub overdue_days: i32,
}

impl From<query::report::overdue::Item> for Item {
    fn from(item: query::report::overdue::Item) -> Self {
        let query::report::overdue::Item {
            reservation,
            rental,
            overdue_days,
        } = item;

        Self {
            reservation: reservation.into(),
            rental: rental.map(Into::into),
            overdue_days: api::int(overdue_days),
        }
    }
}
