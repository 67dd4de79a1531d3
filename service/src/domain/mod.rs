//! Domain definitions.

pub mod add_on;
pub mod car;
pub mod client;
pub mod coverage;
pub mod quote;
pub mod rental;
pub mod reservation;

pub use self::{
    add_on::AddOn, car::Car, client::Client, quote::Quote, rental::Rental,
    reservation::Reservation,
};
