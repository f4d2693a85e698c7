use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Mutex;

use crate::error::ReceiveError;

/// Byte counters for one trial, shared between the transmit and receive
/// threads.
///
/// Both counters are monotonic within a trial and are zeroed together when
/// the receiver re-arms for the next baud rate. Relaxed ordering is enough:
/// each counter has a single writer, and the verdict is computed only after
/// the transmitter has stopped and the settle delay has passed.
#[derive(Debug, Default)]
pub struct Counters {
	transmitted: AtomicU64,
	received: AtomicU64,
}

impl Counters {
	pub fn new() -> Self {
		Self::default()
	}

	/// Total bytes the device accepted for transmission this trial.
	pub fn transmitted(&self) -> u64 {
		self.transmitted.load(Relaxed)
	}

	/// Total bytes received and verified this trial.
	pub fn received(&self) -> u64 {
		self.received.load(Relaxed)
	}

	pub(crate) fn add_transmitted(&self, count: u64) {
		self.transmitted.fetch_add(count, Relaxed);
	}

	pub(crate) fn add_received(&self, count: u64) {
		self.received.fetch_add(count, Relaxed);
	}

	pub(crate) fn reset(&self) {
		self.transmitted.store(0, Relaxed);
		self.received.store(0, Relaxed);
	}
}

/// State shared between the receive thread and the thread driving the sweep.
pub(crate) struct Shared<E> {
	pub counters: Counters,

	/// The first fatal failure the receive thread hit, if any.
	///
	/// The receive thread publishes here and exits; the sweep picks it up at
	/// the next trial boundary.
	failure: Mutex<Option<ReceiveError<E>>>,
}

impl<E> Shared<E> {
	pub fn new() -> Self {
		Self {
			counters: Counters::new(),
			failure: Mutex::new(None),
		}
	}

	/// Record a fatal receive failure. The first failure wins; later ones
	/// are dropped.
	pub fn record_failure(&self, error: ReceiveError<E>) {
		let mut slot = match self.failure.lock() {
			Ok(slot) => slot,
			Err(poisoned) => poisoned.into_inner(),
		};
		if slot.is_none() {
			*slot = Some(error);
		}
	}

	pub fn take_failure(&self) -> Option<ReceiveError<E>> {
		let mut slot = match self.failure.lock() {
			Ok(slot) => slot,
			Err(poisoned) => poisoned.into_inner(),
		};
		slot.take()
	}
}
