//! Soak test for serial ports wired in loopback.
//!
//! A [`Sweep`] streams a fixed ASCII pattern through the port at a list of
//! baud rates and verifies every byte that comes back. A trial fails when a
//! byte differs from the pattern or the measured throughput drops below a
//! tolerance floor derived from the nominal bit rate.

#[macro_use]
mod log;

pub mod serial_port;

mod counters;
mod error;
mod history;
mod pattern;
mod receiver;
mod sweep;
mod transmitter;

pub use counters::Counters;
pub use error::Mismatch;
pub use error::ReceiveError;
pub use error::SendError;
pub use error::SweepError;
pub use history::HistoryRing;
pub use pattern::PatternCursor;
pub use pattern::TEST_PATTERN;
pub use receiver::ReceiverHandle;
pub use serial_port::SerialPort;
pub use sweep::Sweep;
pub use sweep::SweepOptions;
pub use sweep::TrialReport;
pub use transmitter::Transmitter;
