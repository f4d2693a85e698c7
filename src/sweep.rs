use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{SendError, SweepError};
use crate::receiver::ReceiverHandle;
use crate::transmitter::{Transmitter, DEFAULT_POLL_INTERVAL};
use crate::SerialPort;

/// Minimum wait for the receive thread to acknowledge a trial reset.
///
/// The actual wait also covers two poll slices, since the thread only checks
/// its command queue between read waits.
const RESET_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a baud rate sweep.
#[derive(Debug, Clone)]
pub struct SweepOptions {
	/// Candidate baud rates, tried in the given order.
	pub baud_rates: Vec<u32>,

	/// Rates above this limit are skipped instead of tried.
	pub max_baud_rate: u32,

	/// Allowed throughput shortfall, in percent of the nominal bit rate.
	pub tolerance_percent: u8,

	/// How long each trial keeps transmitting.
	pub trial_duration: Duration,

	/// Grace period after each trial so in-flight bytes can drain.
	pub settle_delay: Duration,

	/// Use RTS/CTS hardware flow control.
	pub flow_control: bool,

	/// Upper bound on a single read or write wait.
	pub poll_interval: Duration,

	/// Cap on the bytes transmitted per trial.
	pub byte_limit: u64,
}

impl Default for SweepOptions {
	fn default() -> Self {
		Self {
			baud_rates: vec![
				9600, 57600, 115200, 230400, 460800, 921600, 1843200, 3686400, 7372800,
			],
			max_baud_rate: 460800,
			tolerance_percent: 20,
			trial_duration: Duration::from_secs(10),
			settle_delay: Duration::from_secs(1),
			flow_control: true,
			poll_interval: DEFAULT_POLL_INTERVAL,
			byte_limit: u64::MAX,
		}
	}
}

/// Measured outcome of one trial.
#[derive(Debug, Clone)]
pub struct TrialReport {
	/// The baud rate the trial ran at.
	pub baud_rate: u32,

	/// Wall-clock time spent transmitting.
	pub elapsed: Duration,

	/// Bytes the device accepted for transmission.
	pub transmitted: u64,

	/// Bytes received and verified against the pattern.
	pub received: u64,

	/// Measured throughput in bits per second, counting ten line bits
	/// per byte.
	pub throughput: u64,

	/// Minimum acceptable throughput for the configured tolerance.
	pub floor: u64,
}

impl TrialReport {
	/// Whether the trial moved data, lost nothing and met the throughput
	/// floor.
	pub fn passed(&self) -> bool {
		self.transmitted > 0 && self.received == self.transmitted && self.throughput >= self.floor
	}
}

impl std::fmt::Display for TrialReport {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"baud rate {}: transmitted {} and received {} byte(s) in {:.2?}, throughput {} bit/s, floor {} bit/s",
			self.baud_rate, self.transmitted, self.received, self.elapsed, self.throughput, self.floor,
		)
	}
}

/// A baud rate sweep over a single serial port.
///
/// The sweep owns the port and a lazily spawned receive thread. The thread
/// survives from trial to trial and is reset at each trial boundary, so a
/// sweep over nine rates still uses a single thread.
pub struct Sweep<P: SerialPort> {
	port: Arc<P>,
	options: SweepOptions,
	receiver: Option<ReceiverHandle<P::Error>>,
}

impl<P> Sweep<P>
where
	P: SerialPort + Send + Sync + 'static,
	P::Error: Send + 'static,
{
	pub fn new(port: P, options: SweepOptions) -> Self {
		Self {
			port: Arc::new(port),
			options,
			receiver: None,
		}
	}

	/// Run one trial per configured baud rate and collect the reports.
	///
	/// Rates above the configured maximum are skipped. Configuration errors,
	/// I/O errors and verification failures abort the sweep. A trial that
	/// merely falls short of its throughput floor does not: it is reported
	/// with [`TrialReport::passed`] false and the sweep moves on.
	pub fn run(&mut self) -> Result<Vec<TrialReport>, SweepError<P::Error>> {
		self.port
			.set_rts_cts(self.options.flow_control)
			.map_err(|e| SweepError::Send(SendError::Configure(e)))?;

		let rates = self.options.baud_rates.clone();
		let mut reports = Vec::with_capacity(rates.len());
		for rate in rates {
			if rate > self.options.max_baud_rate {
				info!(
					"skipping {} baud, above the configured maximum of {}",
					rate, self.options.max_baud_rate
				);
				continue;
			}
			let report = self.run_trial(rate)?;
			if report.passed() {
				info!("{}", report);
			} else {
				warn!("{}", report);
			}
			reports.push(report);
		}
		Ok(reports)
	}

	fn run_trial(&mut self, baud_rate: u32) -> Result<TrialReport, SweepError<P::Error>> {
		let port = Arc::clone(&self.port);
		let poll_interval = self.options.poll_interval;
		let receiver = self
			.receiver
			.get_or_insert_with(|| ReceiverHandle::spawn(port, poll_interval));
		let reset_timeout = RESET_TIMEOUT.max(poll_interval * 2);
		receiver.reset(reset_timeout).map_err(SweepError::Receive)?;

		debug!("starting a {:.2?} trial at {} baud", self.options.trial_duration, baud_rate);
		let mut transmitter = Transmitter::new(self.port.as_ref(), receiver.counters());
		transmitter.poll_interval = self.options.poll_interval;
		transmitter.byte_limit = self.options.byte_limit;

		let started = Instant::now();
		let transmitted = transmitter
			.run(baud_rate, self.options.trial_duration)
			.map_err(SweepError::Send)?;
		let elapsed = started.elapsed();

		// Let bytes still on the wire reach the receive thread before the
		// trial is judged.
		std::thread::sleep(self.options.settle_delay);

		if let Some(error) = receiver.take_failure() {
			return Err(SweepError::Receive(error));
		}

		let received = receiver.counters().received();
		Ok(TrialReport {
			baud_rate,
			elapsed,
			transmitted,
			received,
			throughput: throughput_bits_per_sec(received, elapsed),
			floor: acceptance_floor(baud_rate, self.options.tolerance_percent),
		})
	}
}

#[cfg(feature = "serial2")]
impl Sweep<serial2::SerialPort> {
	/// Open the serial port at `path` and prepare a sweep over it.
	///
	/// The port initially opens at the first configured baud rate; each trial
	/// then configures its own rate.
	pub fn open(path: impl AsRef<std::path::Path>, options: SweepOptions) -> std::io::Result<Self> {
		let initial_baud_rate = options.baud_rates.first().copied().unwrap_or(9600);
		let port = serial2::SerialPort::open(path, initial_baud_rate)?;
		Ok(Self::new(port, options))
	}
}

/// Measured throughput in bits per second.
///
/// Each byte costs ten line bits: one start bit, eight data bits and one
/// stop bit.
fn throughput_bits_per_sec(received: u64, elapsed: Duration) -> u64 {
	let millis = (elapsed.as_millis() as u64).max(1);
	received.saturating_mul(10).saturating_mul(1000) / millis
}

/// The lowest throughput a trial may reach and still pass.
fn acceptance_floor(baud_rate: u32, tolerance_percent: u8) -> u64 {
	let factor = 100u64.saturating_sub(tolerance_percent as u64);
	baud_rate as u64 * factor / 100
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn floor_scales_with_tolerance() {
		assert!(acceptance_floor(9600, 20) == 7680);
		assert!(acceptance_floor(115200, 0) == 115200);
		assert!(acceptance_floor(460800, 100) == 0);
		// Over-unity tolerances saturate instead of wrapping.
		assert!(acceptance_floor(9600, 255) == 0);
	}

	#[test]
	fn throughput_counts_ten_bits_per_byte() {
		assert!(throughput_bits_per_sec(9600, Duration::from_secs(10)) == 9600);
		assert!(throughput_bits_per_sec(2000, Duration::from_secs(10)) == 2000);
		assert!(throughput_bits_per_sec(0, Duration::from_secs(10)) == 0);
	}

	#[test]
	fn throughput_tolerates_a_zero_elapsed_time() {
		assert!(throughput_bits_per_sec(1000, Duration::ZERO) == 10_000_000);
	}

	#[test]
	fn a_short_transfer_fails_the_floor() {
		// 2000 bytes in 10 seconds is 2000 bit/s, well under the 7680 bit/s
		// floor of a 9600 baud trial at 20 percent tolerance.
		let report = TrialReport {
			baud_rate: 9600,
			elapsed: Duration::from_secs(10),
			transmitted: 2000,
			received: 2000,
			throughput: throughput_bits_per_sec(2000, Duration::from_secs(10)),
			floor: acceptance_floor(9600, 20),
		};
		assert!(report.floor == 7680);
		assert!(!report.passed());
	}

	#[test]
	fn passing_needs_lossless_delivery_and_the_floor() {
		let report = TrialReport {
			baud_rate: 9600,
			elapsed: Duration::from_secs(10),
			transmitted: 11000,
			received: 11000,
			throughput: 11000,
			floor: 7680,
		};
		assert!(report.passed());

		let short = TrialReport {
			received: 10999,
			..report.clone()
		};
		assert!(!short.passed());

		let idle = TrialReport {
			transmitted: 0,
			received: 0,
			throughput: 0,
			..report
		};
		assert!(!idle.passed());
	}

	#[test]
	fn reports_render_their_numbers() {
		let report = TrialReport {
			baud_rate: 9600,
			elapsed: Duration::from_secs(10),
			transmitted: 11520,
			received: 11520,
			throughput: 11520,
			floor: 7680,
		};
		let rendered = format!("{}", report);
		assert!(rendered.contains("9600"));
		assert!(rendered.contains("11520"));
		assert!(rendered.contains("7680"));
	}
}
