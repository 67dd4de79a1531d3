//! Instants in UTC, optionally tagged with the event they describe.

use std::{cmp::Ordering, marker::PhantomData, ops};

use derive_more::{Debug, Display, Error};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub use time::{Date, Duration};

/// Untagged [`DateTimeOf`].
pub type DateTime = DateTimeOf;

/// Instant in UTC with a microsecond precision.
///
/// The `Of` parameter tags the event the instant describes (a pickup, a
/// cancellation and so on), so instants of different events are not mixed
/// up accidentally. Use [`DateTimeOf::coerce()`] to retag.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Instant itself, always in UTC.
    utc: OffsetDateTime,

    /// Tag of the event.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Normalizes the provided instant to UTC, truncating it to
    /// microseconds.
    fn normalized(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(time::UtcOffset::UTC);
        let nanos = utc.nanosecond();
        Self {
            utc: utc - Duration::nanoseconds(i64::from(nanos % 1_000)),
            _of: PhantomData,
        }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self::normalized(OffsetDateTime::now_utc())
    }

    /// Parses an [RFC 3339] string, normalizing its offset to UTC.
    ///
    /// # Errors
    ///
    /// If the `input` is not a valid [RFC 3339] string.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        OffsetDateTime::parse(input, &Rfc3339)
            .map(Self::normalized)
            .map_err(ParseError)
    }

    /// Formats this instant as an [RFC 3339] string in UTC.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.utc
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.utc.to_string())
    }

    /// Returns the UTC calendar [`Date`] of this instant.
    #[must_use]
    pub fn date(&self) -> Date {
        self.utc.date()
    }

    /// Returns the number of calendar days from the `earlier` instant's
    /// [`Date`] to this one's, negative if `earlier` is in fact later.
    #[must_use]
    pub fn days_since<E: ?Sized>(&self, earlier: &DateTimeOf<E>) -> i64 {
        (self.date() - earlier.date()).whole_days()
    }

    /// Retags this instant.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            utc: self.utc,
            _of: PhantomData,
        }
    }
}

/// Error of parsing a [`DateTime`] from an [RFC 3339] string.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid RFC 3339 date and time: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            utc: self.utc + rhs,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> ops::Sub<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            utc: self.utc - rhs,
            _of: PhantomData,
        }
    }
}

/// Signed distance between two instants.
impl<Of: ?Sized> ops::Sub for DateTimeOf<Of> {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self.utc - rhs.utc
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Instant in [RFC 3339] format, like `2024-05-01T10:00:00Z`.
    ///
    /// Inputs with an offset are normalized to UTC.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_rfc3339())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let Some(s) = input.as_string_value() else {
                return Err(format!(
                    "`DateTime` input scalar must be a string, found: {input}",
                ));
            };
            Self::from_rfc3339(s).map_err(|e| format!("`DateTime`: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{DateTime, Duration};

    #[test]
    fn normalizes_offsets_to_utc() {
        let local =
            DateTime::from_rfc3339("2024-03-31T01:30:00+02:00").unwrap();
        let utc = DateTime::from_rfc3339("2024-03-30T23:30:00Z").unwrap();

        assert_eq!(local, utc);
        assert_eq!(local.date().to_string(), "2024-03-30");
    }

    #[test]
    fn truncates_to_microseconds() {
        let dt =
            DateTime::from_rfc3339("2024-05-01T10:00:00.123456789Z").unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-05-01T10:00:00.123456Z");
    }

    #[test]
    fn counts_calendar_days() {
        let returned = DateTime::from_rfc3339("2024-05-01T23:30:00Z").unwrap();
        let at = DateTime::from_rfc3339("2024-05-03T00:10:00Z").unwrap();

        assert_eq!(at.days_since(&returned), 2);
        assert_eq!(returned.days_since(&at), -2);
        assert_eq!(at.days_since(&at), 0);
    }

    #[test]
    fn subtraction_is_signed() {
        let earlier = DateTime::from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let later = earlier + Duration::hours(5);

        assert_eq!(later - earlier, Duration::hours(5));
        assert_eq!(earlier - later, Duration::hours(-5));
    }
}
