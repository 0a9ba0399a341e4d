use crate::model::{Booking, BookingStatus};
use serde::Serialize;

///
/// BookingStats
///
/// Counts per status plus revenue from completed bookings. Bookings with
/// an unrecognized status are counted in `total` and `unknown` only.
///

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub unknown: usize,
    pub completed_revenue: f64,
}

impl BookingStats {
    /// Completed share of non-cancelled bookings, 0..=100.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        let active = self.total - self.cancelled - self.unknown;
        if active == 0 {
            return 0.0;
        }

        #[allow(clippy::cast_precision_loss)]
        let rate = self.completed as f64 * 100.0 / active as f64;
        rate
    }
}

#[must_use]
pub fn booking_stats(bookings: &[Booking]) -> BookingStats {
    let mut out = BookingStats::default();

    for booking in bookings {
        out.total += 1;
        match booking.status() {
            Some(BookingStatus::Pendente) => out.pending += 1,
            Some(BookingStatus::Confirmado) => out.confirmed += 1,
            Some(BookingStatus::Concluido) => {
                out.completed += 1;
                out.completed_revenue += booking.price;
            }
            Some(BookingStatus::Cancelado) => out.cancelled += 1,
            None => out.unknown += 1,
        }
    }

    out
}

///
/// TESTS
///
