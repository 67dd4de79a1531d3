//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::infra::{database, memory};
use tracerr::{Trace, Traced};

/// Defines a new error type convertible into an API [`Error`].
///
/// Every variant declares its GraphQL error code, the HTTP status of the
/// response and a human-readable message.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl $name {
            /// Returns the code, the status and the message of this error.
            const fn parts(
                self,
            ) -> ($crate::error::Code, ::http::StatusCode, &'static str) {
                match self {
                    $(
                        Self::$variant => (
                            $code,
                            ::http::StatusCode::$status_code,
                            $message,
                        ),
                    )*
                }
            }
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                let (code, status_code, message) = err.parts();
                Self::new(code, status_code, message)
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// [`Trace`] of the domain error this [`Error`] originates from.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] without a [`Trace`].
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message: message.into(),
        }
    }

    /// Creates a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        if let Some(trace) = &self.backtrace {
            write!(f, "\n{}", trace.iter().join("\n"))?;
        }
        Ok(())
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let backtrace = self
            .backtrace
            .iter()
            .flat_map(|trace| trace.iter())
            .map(|frame| juniper::Value::scalar(frame.to_string()))
            .collect();

        let mut ext = juniper::Object::with_capacity(2);
        _ = ext.add_field("code", juniper::Value::scalar(self.code.to_owned()));
        _ = ext.add_field("backtrace", juniper::Value::list(backtrace));

        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type has no public [`Error`]
    /// representation.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`], falling back to
    /// [`Error::internal()`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|e| Error {
            backtrace: Some(self.trace().clone()),
            ..e
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        crate::define_error! {
            enum Error {
                #[code = "CONCURRENT_MODIFICATION"]
                #[status = CONFLICT]
                #[message = "Record was modified concurrently, retry"]
                ConcurrentModification,
            }
        }

        match self {
            Self::Memory(
                memory::Error::Duplicate(_) | memory::Error::NotFound(_),
            ) => Some(Error::ConcurrentModification.into()),
            Self::Memory(memory::Error::TransactionFinished) => None,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::infra::{database, memory};

    use super::{AsError as _, Error};

    crate::define_error! {
        enum TestError {
            #[code = "SOLD_OUT"]
            #[status = CONFLICT]
            #[message = "No cars left"]
            SoldOut,
        }
    }

    #[test]
    fn defined_error_carries_its_parts() {
        let err = Error::from(TestError::SoldOut);

        assert_eq!(err.code, "SOLD_OUT");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(err.message, "No cars left");
        assert_eq!(err.to_string(), "[SOLD_OUT]: No cars left");
    }

    #[test]
    fn storage_conflicts_are_public() {
        let err = database::Error::from(memory::Error::NotFound("car"))
            .as_error();
        assert_eq!(err.code, "CONCURRENT_MODIFICATION");

        let err = database::Error::from(memory::Error::TransactionFinished)
            .as_error();
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(
            err.status_code,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
