//! Time sources and business-day arithmetic for termination scheduling.
//!
//! Rules never read the wall clock directly: they receive a [`BusinessCalendar`]
//! at construction so tests can pin "now" with a [`FixedClock`].

#![warn(missing_docs, clippy::pedantic)]

mod calendar;
mod clock;

pub use calendar::{BusinessCalendar, WorkCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
