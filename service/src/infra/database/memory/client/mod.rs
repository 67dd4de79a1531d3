//! [`Memory`] database client definitions.
//!
//! [`Memory`]: super::Memory

pub mod non_tx;
pub mod tx;

use std::future::Future;

use tracerr::Traced;

use crate::infra::database;

use super::{Record, View};

pub use self::{non_tx::NonTx, tx::Tx};

/// Kind of a write staged through a [`Connection`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Write {
    /// New record is inserted.
    Insert,

    /// Existing record is replaced.
    Update,
}

/// Connection to the [`Memory`] database records.
///
/// [`Memory`]: super::Memory
pub trait Connection {
    /// Runs the provided function over a consistent [`View`] of the records.
    fn read<F, R>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(View<'_>) -> R;

    /// Writes the provided [`Record`].
    fn write<T: Record>(
        &self,
        kind: Write,
        record: T,
    ) -> impl Future<Output = Result<(), Traced<database::Error>>>;
}

/// Checks whether the provided [`Record`] may be written into the provided
/// [`View`].
fn check<T: Record>(
    view: &View<'_>,
    kind: Write,
    record: &T,
) -> Result<(), super::Error> {
    let exists = view.get::<T>(&record.key()).is_some();
    match kind {
        Write::Insert if exists || record.conflicts(view) => {
            Err(super::Error::Duplicate(T::NAME))
        }
        Write::Update if !exists => Err(super::Error::NotFound(T::NAME)),
        Write::Insert | Write::Update => Ok(()),
    }
}
