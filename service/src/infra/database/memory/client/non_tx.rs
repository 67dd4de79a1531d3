//! [`NonTx`] client definitions.

use std::sync::Arc;

use tracerr::Traced;

use crate::infra::database::{
    self,
    memory::{Record, Store, View},
};

use super::{Connection, Write};

/// Non-transactional [`Memory`] database client.
///
/// Every write is applied immediately.
///
/// [`Memory`]: crate::infra::Memory
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Shared [`Store`] of the database.
    pub(crate) store: Arc<Store>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`Store`].
    #[must_use]
    pub(crate) fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl Connection for NonTx {
    async fn read<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(View<'_>) -> R,
    {
        let tables = self.store.tables.read().await;
        Ok(f(View {
            committed: &tables,
            staged: None,
        }))
    }

    async fn write<T: Record>(
        &self,
        kind: Write,
        record: T,
    ) -> Result<(), Traced<database::Error>> {
        let mut tables = self.store.tables.write().await;
        let view = View {
            committed: &tables,
            staged: None,
        };
        super::check(&view, kind, &record)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        drop(T::table_mut(&mut tables).insert(record.key(), record));
        Ok(())
    }
}
