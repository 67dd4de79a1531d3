//! [`Command`] definition.

pub mod add_reservation_add_on;
pub mod cancel_reservation;
pub mod confirm_reservation;
pub mod mark_reservation_no_show;
pub mod pick_up_reservation;
pub mod reactivate_reservation;
pub mod remove_reservation_add_on;
pub mod update_reservation;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_reservation_add_on::AddReservationAddOn,
    cancel_reservation::CancelReservation,
    confirm_reservation::ConfirmReservation,
    mark_reservation_no_show::MarkReservationNoShow,
    pick_up_reservation::PickUpReservation,
    reactivate_reservation::ReactivateReservation,
    remove_reservation_add_on::RemoveReservationAddOn,
    update_reservation::UpdateReservation,
};
