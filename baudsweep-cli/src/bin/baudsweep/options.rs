use std::path::PathBuf;
use std::time::Duration;

/// Sweep a serial port through a list of baud rates to verify its real
/// throughput.
///
/// The port must be wired in loopback, either with a jumper between TX and RX
/// or through an echoing far end. Every transmitted byte has to come back
/// unchanged: one corrupted, dropped or inserted byte fails the whole sweep.
#[derive(clap::Parser)]
pub struct Options {
	/// Print more verbose messages. Use multiple times to increase the verbosity.
	#[clap(long, short)]
	#[clap(action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// The serial port to test.
	#[clap(long, short)]
	#[cfg_attr(target_os = "windows", clap(default_value = "COM1"))]
	#[cfg_attr(not(target_os = "windows"), clap(default_value = "/dev/ttyUSB0"))]
	pub serial_port: PathBuf,

	/// The baud rates to try, in the given order.
	#[clap(long, short)]
	#[clap(value_name = "RATE,RATE,...")]
	#[clap(value_delimiter = ',')]
	#[clap(default_value = "9600,57600,115200,230400,460800,921600,1843200,3686400,7372800")]
	pub baud_rates: Vec<u32>,

	/// Skip configured baud rates above this limit.
	#[clap(long)]
	#[clap(value_name = "RATE")]
	#[clap(default_value = "460800")]
	pub max_baud_rate: u32,

	/// Allowed throughput shortfall, in percent of the nominal bit rate.
	#[clap(long)]
	#[clap(value_name = "PERCENT")]
	#[clap(default_value = "20")]
	pub tolerance: u8,

	/// How long each trial keeps transmitting, in seconds.
	#[clap(long)]
	#[clap(value_name = "SECONDS")]
	#[clap(default_value = "10")]
	pub duration: u64,

	/// How long to wait after each trial for in-flight bytes, in seconds.
	#[clap(long)]
	#[clap(value_name = "SECONDS")]
	#[clap(default_value = "1")]
	pub settle_delay: u64,

	/// Upper bound on a single read or write wait, in milliseconds.
	#[clap(long)]
	#[clap(value_name = "MILLISECONDS")]
	#[clap(default_value = "100")]
	pub poll_interval: u64,

	/// Stop a trial after this many bytes even if time remains.
	#[clap(long)]
	#[clap(value_name = "BYTES")]
	pub byte_limit: Option<u64>,

	/// Do not use RTS/CTS hardware flow control.
	#[clap(long)]
	pub no_flow_control: bool,
}

impl Options {
	pub fn sweep_options(&self) -> baudsweep::SweepOptions {
		let defaults = baudsweep::SweepOptions::default();
		baudsweep::SweepOptions {
			baud_rates: self.baud_rates.clone(),
			max_baud_rate: self.max_baud_rate,
			tolerance_percent: self.tolerance,
			trial_duration: Duration::from_secs(self.duration),
			settle_delay: Duration::from_secs(self.settle_delay),
			flow_control: !self.no_flow_control,
			poll_interval: Duration::from_millis(self.poll_interval),
			byte_limit: self.byte_limit.unwrap_or(defaults.byte_limit),
		}
	}
}
