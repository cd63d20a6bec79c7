//! The booking state machine: reservations, the per-facility schedule
//! store, the at-most-once duplicate cache, and the monitor registry
//! (spec.md §3, §4.2, §4.3, §4.4).

pub mod duplicate_cache;
pub mod monitor;
pub mod reservation;
pub mod schedule;

pub use duplicate_cache::DuplicateCache;
pub use monitor::MonitorRegistry;
pub use reservation::Reservation;
pub use schedule::ScheduleStore;
