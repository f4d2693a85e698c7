use std::time::{Duration, Instant};

use crate::counters::Counters;
use crate::error::SendError;
use crate::pattern::PatternCursor;
use crate::SerialPort;

/// Default upper bound on a single wait for device readiness.
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Streams the repeating test pattern into a serial port for one trial.
///
/// The transmitter runs on the thread driving the sweep. It writes the
/// pattern pass after pass until the trial duration elapses or the byte
/// limit is reached, advancing its cursor only by the number of bytes the
/// device actually accepted.
pub struct Transmitter<'a, P: SerialPort> {
	port: &'a P,
	counters: &'a Counters,
	cursor: PatternCursor,

	/// Upper bound on a single wait for room in the output buffer.
	///
	/// The stop conditions are re-checked every time the wait expires, so a
	/// device that never accepts data cannot hang the trial.
	pub poll_interval: Duration,

	/// Cap on the number of bytes transmitted in one trial.
	pub byte_limit: u64,
}

impl<'a, P: SerialPort> Transmitter<'a, P> {
	pub fn new(port: &'a P, counters: &'a Counters) -> Self {
		Self {
			port,
			counters,
			cursor: PatternCursor::new(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			byte_limit: u64::MAX,
		}
	}

	/// Configure `baud_rate` and stream the pattern for `duration`.
	///
	/// Returns the number of bytes the device accepted. A timed out write
	/// is retried without advancing the cursor; any other write error aborts
	/// the trial. Exhausting the duration or the byte limit is a clean stop,
	/// not an error.
	pub fn run(&mut self, baud_rate: u32, duration: Duration) -> Result<u64, SendError<P::Error>> {
		self.port.set_baud_rate(baud_rate).map_err(SendError::Configure)?;
		self.cursor.reset();

		let deadline = Instant::now() + duration;
		let mut sent: u64 = 0;
		loop {
			// One pass over the pattern. When it completes before the stop
			// condition, the outer loop restarts at the first pattern byte,
			// producing the continuous stream the receiver expects.
			let mut pending = self.cursor.remaining();
			while !pending.is_empty() {
				if Instant::now() >= deadline || sent >= self.byte_limit {
					debug!("transmitter stopping after {} byte(s)", sent);
					return Ok(sent);
				}
				let len = chunk_len(pending.len(), self.byte_limit - sent);
				match self.port.write(&pending[..len], self.poll_interval) {
					// Accepted nothing within the poll interval, or an
					// explicit timeout: wait again. The cursor stays put.
					Ok(0) => continue,
					Ok(count) => {
						trace!("device accepted {} of {} byte(s)", count, len);
						pending = &pending[count..];
						self.cursor.advance(count);
						self.counters.add_transmitted(count as u64);
						sent += count as u64;
					},
					Err(e) if P::is_timeout_error(&e) => continue,
					Err(e) => return Err(SendError::Write(e)),
				}
			}
		}
	}
}

/// Trim a chunk length to the remaining byte budget.
fn chunk_len(len: usize, budget: u64) -> usize {
	if (len as u64) <= budget {
		len
	} else {
		budget as usize
	}
}
