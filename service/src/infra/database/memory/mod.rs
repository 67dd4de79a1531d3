//! In-memory transactional [`Database`] implementation.
//!
//! Transactions buffer their writes and apply them to the shared [`Tables`]
//! on [`Commit`] only. Locks are per car and are held until the transaction
//! is committed or dropped.
//!
//! [`Commit`]: common::operations::Commit
//! [`Database`]: crate::infra::Database

pub mod client;
mod impls;

use std::{collections::HashMap, hash::Hash, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{car, rental, reservation, Car, Rental, Reservation};

pub use self::client::{Connection, NonTx, Tx};

/// In-memory [`Database`] client.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Debug, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx::new(Arc::default()))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Inserted record already exists.
    #[display("`{_0}` record already exists")]
    Duplicate(#[error(not(source))] &'static str),

    /// Updated record doesn't exist.
    #[display("`{_0}` record does not exist")]
    NotFound(#[error(not(source))] &'static str),

    /// Transaction was already committed.
    #[display("transaction is already committed")]
    TransactionFinished,
}

/// Shared state of a [`Memory`] database.
#[derive(Debug, Default)]
pub struct Store {
    /// Committed records.
    tables: RwLock<Tables>,

    /// Per-car locks.
    locks: Mutex<HashMap<car::Id, Arc<Mutex<()>>>>,
}

/// Set of record tables.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// [`Car`]s by their IDs.
    cars: HashMap<car::Id, Car>,

    /// [`Reservation`]s by their IDs.
    reservations: HashMap<reservation::Id, Reservation>,

    /// [`Rental`]s by their IDs.
    rentals: HashMap<rental::Id, Rental>,
}

impl Tables {
    /// Moves all the records of the `other` [`Tables`] into these ones,
    /// replacing the existing ones.
    fn merge(&mut self, other: Self) {
        let Self {
            cars,
            reservations,
            rentals,
        } = other;
        self.cars.extend(cars);
        self.reservations.extend(reservations);
        self.rentals.extend(rentals);
    }
}

/// Read-only view of [`Tables`], with the records staged by a transaction
/// (if any) shadowing the committed ones.
#[derive(Clone, Copy, Debug)]
pub struct View<'t> {
    /// Committed [`Tables`].
    committed: &'t Tables,

    /// [`Tables`] staged by a transaction, if any.
    staged: Option<&'t Tables>,
}

impl<'t> View<'t> {
    /// Returns the record of type `R` with the provided key, if any.
    #[must_use]
    pub fn get<R: Record>(&self, key: &R::Key) -> Option<&'t R> {
        self.staged
            .and_then(|s| R::table(s).get(key))
            .or_else(|| R::table(self.committed).get(key))
    }

    /// Iterates over all the records of type `R`, in no particular order.
    pub fn all<R: Record>(&self) -> impl Iterator<Item = &'t R> + 't {
        let staged = self.staged.map(R::table);
        let committed = R::table(self.committed)
            .iter()
            .filter(move |&(k, _)| {
                staged.map_or(true, |s| !s.contains_key(k))
            })
            .map(|(_, v)| v);
        staged.into_iter().flat_map(HashMap::values).chain(committed)
    }
}

/// Record stored in [`Tables`].
pub trait Record: Clone + 'static {
    /// Type of the key identifying this [`Record`].
    type Key: Copy + Eq + Hash;

    /// Name of this [`Record`] used in [`Error`]s.
    const NAME: &'static str;

    /// Returns the key of this [`Record`].
    fn key(&self) -> Self::Key;

    /// Returns the table of this [`Record`] type.
    fn table(tables: &Tables) -> &HashMap<Self::Key, Self>;

    /// Returns the mutable table of this [`Record`] type.
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Key, Self>;

    /// Indicates whether inserting this [`Record`] breaks a uniqueness
    /// constraint beyond its key.
    fn conflicts(&self, _: &View<'_>) -> bool {
        false
    }
}

impl Record for Car {
    type Key = car::Id;

    const NAME: &'static str = "Car";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Self::Key, Self> {
        &tables.cars
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Key, Self> {
        &mut tables.cars
    }
}

impl Record for Reservation {
    type Key = reservation::Id;

    const NAME: &'static str = "Reservation";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Self::Key, Self> {
        &tables.reservations
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Key, Self> {
        &mut tables.reservations
    }
}

impl Record for Rental {
    type Key = rental::Id;

    const NAME: &'static str = "Rental";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Self::Key, Self> {
        &tables.rentals
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Key, Self> {
        &mut tables.rentals
    }

    /// A reservation is picked up at most once.
    fn conflicts(&self, view: &View<'_>) -> bool {
        view.all::<Self>()
            .any(|r| r.reservation_id == self.reservation_id)
    }
}
