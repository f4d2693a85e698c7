//! The canonical payload streamed over the serial link.
//!
//! The pattern is a fixed table of human readable ASCII: 21 blocks of 100
//! bytes, each starting with a `_____NNNN:` offset marker followed by 90
//! decimal digits. Markers make it easy to see where a corrupted stream went
//! wrong in a diagnostic dump. The table is treated as a ring: both the
//! transmitter and the receiver walk it with a [`PatternCursor`] that wraps
//! back to the first byte after the last one.

/// The repeating test payload, 2100 bytes of printable ASCII.
pub const TEST_PATTERN: &[u8] = b"_____0000:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0100:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0200:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0300:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0400:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0500:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0600:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0700:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0800:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____0900:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1000:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1100:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1200:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1300:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1400:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1500:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1600:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1700:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1800:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____1900:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789\
	_____2000:0123456789012345678901234567890123456789\
	01234567890123456789012345678901234567890123456789";

/// A wrapping index into [`TEST_PATTERN`].
///
/// The transmitter advances its cursor by the number of bytes the device
/// accepted per write. The receiver advances its cursor by one per verified
/// byte. The two run at independent offsets because the device buffers data
/// in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternCursor {
	position: usize,
}

impl PatternCursor {
	/// Create a cursor pointing at the first pattern byte.
	pub fn new() -> Self {
		Self { position: 0 }
	}

	/// The current offset into the pattern.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Rewind to the first pattern byte.
	pub fn reset(&mut self) {
		self.position = 0;
	}

	/// The byte the cursor currently points at.
	pub fn expected(&self) -> u8 {
		TEST_PATTERN[self.position]
	}

	/// The rest of the current pattern pass, starting at the cursor.
	pub fn remaining(&self) -> &'static [u8] {
		&TEST_PATTERN[self.position..]
	}

	/// Advance the cursor by `count` bytes, wrapping at the pattern end.
	pub fn advance(&mut self, count: usize) {
		self.position = (self.position + count) % TEST_PATTERN.len();
	}
}

impl Default for PatternCursor {
	fn default() -> Self {
		Self::new()
	}
}
