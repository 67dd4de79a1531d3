//! Rental day counting.

use common::{datetime::Duration, DateTimeOf};

/// Grace period subtracted before counting days.
const GRACE: Duration = Duration::HOUR;

/// Counts the billed rental days between the provided pickup and return
/// moments as `ceil((return - pickup - 1h) / 1d) + 1`.
///
/// The span is measured at full precision, so a fraction of a second past
/// a day boundary starts another day.
///
/// The result is not positive for inverted ranges.
#[must_use]
pub fn count<A: ?Sized, B: ?Sized>(
    pickup_at: DateTimeOf<A>,
    return_at: DateTimeOf<B>,
) -> i64 {
    let span = return_at - pickup_at.coerce::<B>() - GRACE;
    let whole = span.whole_days();
    let ceil = whole + i64::from((span - Duration::days(whole)).is_positive());
    ceil + 1
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::count;

    fn days(pickup: &str, ret: &str) -> i64 {
        count(
            DateTime::from_rfc3339(pickup).unwrap(),
            DateTime::from_rfc3339(ret).unwrap(),
        )
    }

    #[test]
    fn grace_hour_and_inclusive_day() {
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-01T10:00:01Z"), 1);
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-02T10:00:00Z"), 2);
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-02T11:00:00Z"), 2);
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-02T11:00:01Z"), 3);
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-06T10:00:00Z"), 6);
        assert_eq!(days("2024-05-01T10:00:00Z", "2024-05-05T10:00:00Z"), 5);
    }

    #[test]
    fn sub_second_overrun_starts_a_day() {
        assert_eq!(
            days("2024-05-01T10:00:00.000Z", "2024-05-01T11:00:00.500Z"),
            2,
        );
        assert_eq!(
            days("2024-05-01T10:00:00.000Z", "2024-05-02T11:00:00.000001Z"),
            3,
        );
        assert_eq!(
            days("2024-05-01T10:00:00.250Z", "2024-05-01T11:00:00.250Z"),
            1,
        );
    }

    #[test]
    fn inverted_range_is_not_positive() {
        assert_eq!(days("2024-05-03T10:00:00Z", "2024-05-01T10:00:00Z"), -1);
        assert_eq!(days("2024-05-02T10:00:00Z", "2024-05-01T10:00:00Z"), 0);
    }

    #[test]
    fn across_dst_boundaries() {
        // Same local wall-clock time, 47h apart over the spring-forward.
        assert_eq!(
            days("2024-03-30T10:00:00+01:00", "2024-04-01T10:00:00+02:00"),
            3,
        );
        // Same local wall-clock time, 49h apart over the fall-back.
        assert_eq!(
            days("2024-10-26T10:00:00+02:00", "2024-10-28T10:00:00+01:00"),
            3,
        );
        assert_eq!(
            days("2024-06-01T10:00:00+02:00", "2024-06-03T10:00:00+02:00"),
            3,
        );
    }
}
