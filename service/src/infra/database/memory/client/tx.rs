//! [`Tx`] client definitions.

use std::{collections::HashMap, mem, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::car,
    infra::database::{
        self,
        memory::{self, Record, Store, Tables, View},
    },
};

use super::{Connection, NonTx, Write};

/// Transactional [`Memory`] database client.
///
/// Writes are buffered until [`Tx::commit()`] and discarded if it's never
/// called. Clones share the same transaction.
///
/// [`Memory`]: crate::infra::Memory
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared [`Store`] of the database.
    store: Arc<Store>,

    /// Inner state of this transaction.
    inner: Arc<Mutex<Inner>>,
}

/// Inner state of a [`Tx`].
#[derive(Debug, Default)]
struct Inner {
    /// Records written, but not committed yet.
    staged: Tables,

    /// Guards of the car locks held by this transaction.
    locks: HashMap<car::Id, OwnedMutexGuard<()>>,

    /// Indicator whether this transaction was committed.
    committed: bool,
}

impl Tx {
    /// Starts a new [`Tx`] over the [`Store`] of the provided [`NonTx`]
    /// client.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            store: Arc::clone(&client.store),
            inner: Arc::default(),
        }
    }

    /// Locks the car with the provided ID until this [`Tx`] is committed or
    /// dropped.
    ///
    /// Locking an already held car is a no-op.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is already committed.
    pub async fn lock(
        &self,
        id: car::Id,
    ) -> Result<(), Traced<database::Error>> {
        {
            let inner = self.inner.lock().await;
            Self::ensure_pending(&inner)?;
            if inner.locks.contains_key(&id) {
                return Ok(());
            }
        }

        let mutex =
            Arc::clone(self.store.locks.lock().await.entry(id).or_default());
        let guard = mutex.lock_owned().await;

        let mut inner = self.inner.lock().await;
        Self::ensure_pending(&inner)?;
        drop(inner.locks.insert(id, guard));
        Ok(())
    }

    /// Commits this [`Tx`], applying its writes and releasing its locks.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is already committed.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let mut inner = self.inner.lock().await;
        Self::ensure_pending(&inner)?;

        inner.committed = true;
        self.store
            .tables
            .write()
            .await
            .merge(mem::take(&mut inner.staged));
        inner.locks.clear();
        Ok(())
    }

    /// Ensures the provided [`Inner`] state is not committed yet.
    fn ensure_pending(inner: &Inner) -> Result<(), Traced<database::Error>> {
        if inner.committed {
            Err(tracerr::new!(database::Error::from(
                memory::Error::TransactionFinished
            )))
        } else {
            Ok(())
        }
    }
}

impl Connection for Tx {
    async fn read<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(View<'_>) -> R,
    {
        let inner = self.inner.lock().await;
        Self::ensure_pending(&inner)?;

        let tables = self.store.tables.read().await;
        Ok(f(View {
            committed: &tables,
            staged: Some(&inner.staged),
        }))
    }

    async fn write<T: Record>(
        &self,
        kind: Write,
        record: T,
    ) -> Result<(), Traced<database::Error>> {
        let mut inner = self.inner.lock().await;
        Self::ensure_pending(&inner)?;

        {
            let tables = self.store.tables.read().await;
            let view = View {
                committed: &tables,
                staged: Some(&inner.staged),
            };
            super::check(&view, kind, &record)
                .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        }

        drop(T::table_mut(&mut inner.staged).insert(record.key(), record));
        Ok(())
    }
}
