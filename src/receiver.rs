use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::counters::{Counters, Shared};
use crate::error::{Mismatch, ReceiveError};
use crate::history::HistoryRing;
use crate::pattern::PatternCursor;
use crate::SerialPort;

/// Bytes of trailing context kept for mismatch reports.
const HISTORY_DEPTH: usize = 16;

/// Size of the read scratch buffer.
const SCRATCH_LEN: usize = 256;

/// Commands the sweep sends to the receive thread.
pub(crate) enum Command {
	/// Prepare for a new trial, then acknowledge through the channel.
	Reset(mpsc::SyncSender<()>),
}

/// The verifying half of the loopback test.
///
/// Lives on its own thread for the whole sweep and checks every received
/// byte against the position its expected-byte cursor predicts. The first
/// wrong byte, read error or hang-up is published for the sweep to pick up
/// and the thread exits.
struct Receiver<P: SerialPort> {
	port: Arc<P>,
	shared: Arc<Shared<P::Error>>,
	stop: Arc<AtomicBool>,
	commands: mpsc::Receiver<Command>,
	cursor: PatternCursor,
	history: HistoryRing,
	poll_interval: Duration,

	/// Until the first reset arms the thread, anything on the line is stale
	/// input from before the sweep and is discarded unverified.
	verifying: bool,
}

impl<P: SerialPort> Receiver<P> {
	fn run(mut self) {
		let mut scratch = [0u8; SCRATCH_LEN];
		loop {
			if self.stop.load(Ordering::Relaxed) {
				return;
			}
			loop {
				match self.commands.try_recv() {
					Ok(Command::Reset(ack)) => {
						if let Err(e) = self.reset() {
							self.shared.record_failure(e);
							return;
						}
						if ack.send(()).is_err() {
							return;
						}
					},
					Err(mpsc::TryRecvError::Empty) => break,
					Err(mpsc::TryRecvError::Disconnected) => return,
				}
			}
			match self.port.read(&mut scratch, self.poll_interval) {
				Ok(0) => {
					self.shared.record_failure(ReceiveError::Disconnected);
					return;
				},
				Ok(count) => {
					let bytes = &scratch[..count];
					if !self.verifying {
						debug!("discarded {} stale byte(s)", bytes.len());
					} else if let Err(e) = self.verify(bytes) {
						self.shared.record_failure(e);
						return;
					}
				},
				Err(e) if P::is_timeout_error(&e) => (),
				Err(e) => {
					self.shared.record_failure(ReceiveError::Read(e));
					return;
				},
			}
		}
	}

	/// Flush stale input and rewind all per-trial state.
	fn reset(&mut self) -> Result<(), ReceiveError<P::Error>> {
		self.port.discard_input_buffer().map_err(ReceiveError::Flush)?;
		self.cursor.reset();
		self.history.clear();
		self.shared.counters.reset();
		self.verifying = true;
		Ok(())
	}

	/// Check a chunk of received bytes against the expected pattern bytes.
	fn verify(&mut self, bytes: &[u8]) -> Result<(), ReceiveError<P::Error>> {
		for &byte in bytes {
			let expected = self.cursor.expected();
			if byte != expected {
				let mismatch = Mismatch {
					actual: byte,
					expected,
					pattern_offset: self.cursor.position(),
					received: self.shared.counters.received(),
					transmitted: self.shared.counters.transmitted(),
					history: self.history.to_vec(),
				};
				error!("{}", mismatch);
				return Err(mismatch.into());
			}
			self.cursor.advance(1);
			self.history.push(byte);
			self.shared.counters.add_received(1);
		}
		Ok(())
	}
}

/// Owner of a spawned receive thread.
///
/// Dropping the handle stops the thread and joins it. The thread wakes from
/// its read wait at least once per poll interval, so the join is bounded.
pub struct ReceiverHandle<E> {
	shared: Arc<Shared<E>>,
	commands: mpsc::Sender<Command>,
	stop: Arc<AtomicBool>,
	thread: Option<JoinHandle<()>>,
}

impl<E> ReceiverHandle<E> {
	pub(crate) fn spawn<P>(port: Arc<P>, poll_interval: Duration) -> Self
	where
		P: SerialPort<Error = E> + Send + Sync + 'static,
		E: Send + 'static,
	{
		let shared = Arc::new(Shared::new());
		let stop = Arc::new(AtomicBool::new(false));
		let (commands, command_queue) = mpsc::channel();
		let receiver = Receiver {
			port,
			shared: Arc::clone(&shared),
			stop: Arc::clone(&stop),
			commands: command_queue,
			cursor: PatternCursor::new(),
			history: HistoryRing::new(HISTORY_DEPTH),
			poll_interval,
			verifying: false,
		};
		let thread = std::thread::spawn(move || receiver.run());
		Self {
			shared,
			commands,
			stop,
			thread: Some(thread),
		}
	}

	/// The transmit and receive counters of the current trial.
	pub fn counters(&self) -> &Counters {
		&self.shared.counters
	}

	/// Ask the receive thread to prepare for a new trial and wait for the
	/// acknowledgement.
	///
	/// Stale input is flushed, the expected-byte cursor rewinds to the start
	/// of the pattern and both counters drop to zero. Call this only while no
	/// transmitter is running. The timeout must comfortably exceed the poll
	/// interval, since the thread may be waiting out one read timeout before
	/// it sees the command.
	pub fn reset(&self, timeout: Duration) -> Result<(), ReceiveError<E>> {
		let (ack, done) = mpsc::sync_channel(0);
		if self.commands.send(Command::Reset(ack)).is_err() {
			return Err(self.failure_or_stalled());
		}
		match done.recv_timeout(timeout) {
			Ok(()) => Ok(()),
			Err(_) => Err(self.failure_or_stalled()),
		}
	}

	/// Take the failure the receive thread recorded, if any.
	///
	/// The thread exits after recording a failure, so at most one is ever
	/// reported per sweep.
	pub fn take_failure(&self) -> Option<ReceiveError<E>> {
		self.shared.take_failure()
	}

	fn failure_or_stalled(&self) -> ReceiveError<E> {
		self.take_failure().unwrap_or(ReceiveError::Stalled)
	}
}

impl<E> Drop for ReceiverHandle<E> {
	fn drop(&mut self) {
		self.stop.store(true, Ordering::Relaxed);
		if let Some(thread) = self.thread.take() {
			let _ = thread.join();
		}
	}
}
