/// An error that can occur while driving a sweep.
#[derive(Debug)]
pub enum SweepError<E> {
	Send(SendError<E>),
	Receive(ReceiveError<E>),
}

/// A fatal error on the transmit side of a trial.
#[derive(Debug)]
pub enum SendError<E> {
	/// Reconfiguring the device for the trial baud rate failed.
	Configure(E),
	/// A write failed with something other than the transient timeout result.
	Write(E),
}

/// A fatal error on the receive side of a trial.
#[derive(Debug)]
pub enum ReceiveError<E> {
	/// Discarding stale input while re-arming for a trial failed.
	Flush(E),
	/// A read failed with something other than the transient timeout result.
	Read(E),
	/// The device signalled a hang-up (a read returned zero bytes).
	Disconnected,
	/// A received byte did not match the expected pattern byte.
	Mismatch(Mismatch),
	/// The receive thread stopped responding without recording a failure.
	Stalled,
}

/// A received byte differed from the pattern byte the verifier expected.
///
/// A single corrupted byte invalidates the whole run: the verifier does not
/// resynchronize, it reports and stops.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Mismatch {
	/// The byte that arrived.
	pub actual: u8,
	/// The pattern byte that should have arrived.
	pub expected: u8,
	/// Offset of the expected byte in the pattern.
	pub pattern_offset: usize,
	/// Bytes received and verified before the offending one.
	pub received: u64,
	/// Bytes transmitted at the moment the mismatch was seen.
	pub transmitted: u64,
	/// The most recently received bytes, oldest first, ending just before
	/// the offending byte.
	pub history: Vec<u8>,
}

impl<E> std::error::Error for SweepError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl<E> std::error::Error for SendError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl<E> std::error::Error for ReceiveError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl std::error::Error for Mismatch {}

impl<E> From<SendError<E>> for SweepError<E> {
	fn from(other: SendError<E>) -> Self {
		Self::Send(other)
	}
}

impl<E> From<ReceiveError<E>> for SweepError<E> {
	fn from(other: ReceiveError<E>) -> Self {
		Self::Receive(other)
	}
}

impl<E> From<Mismatch> for ReceiveError<E> {
	fn from(other: Mismatch) -> Self {
		Self::Mismatch(other)
	}
}

impl<E> std::fmt::Display for SweepError<E>
where
	E: std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Send(e) => write!(f, "{}", e),
			Self::Receive(e) => write!(f, "{}", e),
		}
	}
}

impl<E> std::fmt::Display for SendError<E>
where
	E: std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Configure(e) => write!(f, "failed to configure serial port: {}", e),
			Self::Write(e) => write!(f, "failed to write to serial port: {}", e),
		}
	}
}

impl<E> std::fmt::Display for ReceiveError<E>
where
	E: std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Flush(e) => write!(f, "failed to discard input buffer: {}", e),
			Self::Read(e) => write!(f, "failed to read from serial port: {}", e),
			Self::Disconnected => write!(f, "serial device hung up"),
			Self::Mismatch(e) => write!(f, "{}", e),
			Self::Stalled => write!(f, "receive thread stopped responding"),
		}
	}
}

impl std::fmt::Display for Mismatch {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"pattern mismatch after {} byte(s) received ({} transmitted): expected {} at pattern offset {}, got {}; last {} byte(s): \"{}\"",
			self.received,
			self.transmitted,
			DisplayByte(self.expected),
			self.pattern_offset,
			DisplayByte(self.actual),
			self.history.len(),
			DisplayBytes(&self.history),
		)
	}
}

/// Format a byte as `'c' (0xHH)` when printable, `0xHH` otherwise.
struct DisplayByte(u8);

impl std::fmt::Display for DisplayByte {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		if self.0.is_ascii_graphic() || self.0 == b' ' {
			write!(f, "'{}' (0x{:02X})", self.0 as char, self.0)
		} else {
			write!(f, "0x{:02X}", self.0)
		}
	}
}

/// Format a byte run with non-printable bytes replaced by `.`.
struct DisplayBytes<'a>(&'a [u8]);

impl std::fmt::Display for DisplayBytes<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		for &byte in self.0 {
			if byte.is_ascii_graphic() || byte == b' ' {
				write!(f, "{}", byte as char)?;
			} else {
				write!(f, ".")?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::pattern::TEST_PATTERN;
	use assert2::assert;

	#[test]
	fn mismatch_display_shows_context() {
		let mismatch = Mismatch {
			actual: 0x10,
			expected: b'5',
			pattern_offset: 15,
			received: 15,
			transmitted: 2100,
			history: b"_____0000:01234".to_vec(),
		};
		let text = mismatch.to_string();
		assert!(text.contains("after 15 byte(s) received"));
		assert!(text.contains("2100 transmitted"));
		assert!(text.contains("expected '5' (0x35)"));
		assert!(text.contains("got 0x10"));
		assert!(text.contains("\"_____0000:01234\""));
	}

	#[test]
	fn mismatch_offset_stays_inside_pattern() {
		let mismatch = Mismatch {
			actual: b'x',
			expected: TEST_PATTERN[0],
			pattern_offset: 0,
			received: TEST_PATTERN.len() as u64,
			transmitted: TEST_PATTERN.len() as u64 + 7,
			history: Vec::new(),
		};
		assert!(mismatch.pattern_offset < TEST_PATTERN.len());
		assert!(mismatch.expected == b'_');
	}
}
