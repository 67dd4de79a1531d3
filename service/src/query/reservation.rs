//! [`Query`] collection related to a single [`Reservation`].

use common::operations::By;

use crate::domain::{reservation, Rental, Reservation};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Reservation`] by its [`reservation::Id`].
pub type ById = DatabaseQuery<By<Option<Reservation>, reservation::Id>>;

/// Queries the [`Rental`] created when a [`Reservation`] was picked up.
pub type RentalOf = DatabaseQuery<By<Option<Rental>, reservation::Id>>;
