use std::time::Instant;

mod logging;
mod options;

use options::Options;

fn main() {
	if let Err(()) = do_main(clap::Parser::parse()) {
		std::process::exit(1);
	}
}

fn do_main(options: Options) -> Result<(), ()> {
	logging::init(module_path!(), options.verbose as i8);

	let sweep_options = options.sweep_options();
	log::debug!(
		"Using serial port {} with {} candidate baud rate(s)",
		options.serial_port.display(),
		sweep_options.baud_rates.len()
	);

	let mut sweep = baudsweep::Sweep::open(&options.serial_port, sweep_options)
		.map_err(|e| log::error!("Failed to open serial port: {}: {}", options.serial_port.display(), e))?;

	let start = Instant::now();
	let reports = sweep.run().map_err(|e| log::error!("Test failed: {}", e))?;

	if reports.is_empty() {
		log::warn!("No trials were run: every configured baud rate is above the maximum");
		return Ok(());
	}

	let failed = reports.iter().filter(|report| !report.passed()).count();
	let passed = reports.len() - failed;
	log::info!("{:?}: {} of {} trial(s) passed", start.elapsed(), passed, reports.len());
	if failed > 0 {
		log::error!("{} trial(s) lost data or fell short of the throughput floor", failed);
		return Err(());
	}
	Ok(())
}
