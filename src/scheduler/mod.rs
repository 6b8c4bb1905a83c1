pub mod time_interface;

pub use time_interface::{ClockError, FixedClock, HostClock, TimeInterface};
