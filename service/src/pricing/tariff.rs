//! Tariff tier resolution.

use tracing as log;

use crate::domain::{car::Tariff, Car};

/// [`Tariff`] tier selected for a number of rental days.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolution<'t> {
    /// Selected [`Tariff`].
    pub tariff: &'t Tariff,

    /// Indicator whether no tier applied and the last one was taken instead.
    pub is_fallback: bool,
}

/// Resolves the [`Tariff`] tier of the provided [`Car`] applying to the
/// provided number of rental `days`.
///
/// Falls back to the last tier if none applies, which means a gap in the
/// table. [`None`] is returned only if the [`Car`] has no tiers at all.
#[must_use]
pub fn resolve(car: &Car, days: i64) -> Option<Resolution<'_>> {
    if let Some(tariff) = car.tariffs.iter().find(|t| t.applies_to(days)) {
        return Some(Resolution {
            tariff,
            is_fallback: false,
        });
    }

    let tariff = car.tariffs.last()?;
    log::warn!(
        car.id = %car.id,
        days,
        "no tariff tier applies, falling back to the last one"
    );
    Some(Resolution {
        tariff,
        is_fallback: true,
    })
}
