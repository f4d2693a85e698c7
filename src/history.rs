use std::collections::VecDeque;

/// A bounded ring of the most recently received bytes.
///
/// Pushing into a full ring evicts the oldest byte. Purely diagnostic: the
/// receiver keeps one so a mismatch report can show what arrived just before
/// the offending byte.
#[derive(Debug, Clone)]
pub struct HistoryRing {
	buffer: VecDeque<u8>,
	capacity: usize,
}

impl HistoryRing {
	/// Create an empty ring that holds at most `capacity` bytes.
	pub fn new(capacity: usize) -> Self {
		Self {
			buffer: VecDeque::with_capacity(capacity),
			capacity,
		}
	}

	/// Append a byte, evicting the oldest one if the ring is full.
	///
	/// A zero-capacity ring stores nothing.
	pub fn push(&mut self, byte: u8) {
		if self.capacity == 0 {
			return;
		}
		if self.buffer.len() == self.capacity {
			self.buffer.pop_front();
		}
		self.buffer.push_back(byte);
	}

	pub fn len(&self) -> usize {
		self.buffer.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	/// Drop all stored bytes, keeping the capacity.
	pub fn clear(&mut self) {
		self.buffer.clear();
	}

	/// The stored bytes, oldest first.
	pub fn to_vec(&self) -> Vec<u8> {
		self.buffer.iter().copied().collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn keeps_last_n_bytes() {
		let mut ring = HistoryRing::new(4);
		for byte in 0..10u8 {
			ring.push(byte);
		}
		assert!(ring.len() == 4);
		assert!(ring.to_vec() == vec![6, 7, 8, 9]);
	}

	#[test]
	fn fills_up_from_empty() {
		let mut ring = HistoryRing::new(4);
		assert!(ring.is_empty());
		ring.push(b'a');
		ring.push(b'b');
		assert!(ring.to_vec() == vec![b'a', b'b']);
	}

	#[test]
	fn a_zero_capacity_ring_stores_nothing() {
		let mut ring = HistoryRing::new(0);
		ring.push(1);
		ring.push(2);
		assert!(ring.is_empty());
	}

	#[test]
	fn clear_resets_contents_only() {
		let mut ring = HistoryRing::new(2);
		ring.push(1);
		ring.push(2);
		ring.clear();
		assert!(ring.is_empty());
		ring.push(3);
		assert!(ring.to_vec() == vec![3]);
	}
}
