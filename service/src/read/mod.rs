//! Read entities definitions.

pub mod car;
pub mod reservation;
