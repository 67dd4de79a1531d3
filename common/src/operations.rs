//! Operations vocabulary shared by the service layer and its storage.
//!
//! Each operation is a plain value, while a [`Handler`] implementation
//! decides what executing it means.

use std::{future::Future, marker::PhantomData};

/// Something executing `Args` operations asynchronously.
pub trait Handler<Args = ()> {
    /// Result of a successful execution.
    type Ok;

    /// Error of a failed execution.
    type Err;

    /// Executes the provided operation.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

/// Stores a new record.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing record.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads whatever the inner selector describes.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Takes an exclusive lock for the rest of a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Opens a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Transaction opened by a `T` [`Handler`] of [`Transact`].
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Applies the writes of a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B` key or filter.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Selected type.
    _what: PhantomData<W>,

    /// Key or filter.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key or filter.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.by
    }

    /// Unwraps the key or filter.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
