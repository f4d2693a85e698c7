use baudsweep::SerialPort;
use log::trace;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A serial port double whose transmit side loops straight back into its
/// receive side.
///
/// Clones share the line state, like two handles to one device. The fault
/// injection knobs cover the interesting line conditions: timed out writes,
/// short writes, a corrupted byte at a chosen stream offset and a far end
/// that hangs up.
#[derive(Clone)]
pub struct MockSerialPort {
	line: Arc<Mutex<Line>>,
}

struct Line {
	/// Bytes written but not yet read back.
	echo: VecDeque<u8>,
	/// Total bytes accepted by writes so far.
	written: u64,
	/// Total bytes read back so far.
	read_back: u64,
	/// Most recently configured baud rate.
	baud_rate: u32,
	/// Most recently configured flow control state.
	flow_control: bool,
	/// Writes left to fail with a timeout before data flows again.
	write_timeouts: u32,
	/// Cap on the bytes accepted by a single write.
	max_write_chunk: usize,
	/// Flip bit 5 of the byte written at this stream offset.
	corrupt_at: Option<u64>,
	/// Report a hang-up once this many bytes were read back.
	hangup_after: Option<u64>,
}

impl MockSerialPort {
	pub fn new() -> Self {
		Self {
			line: Arc::new(Mutex::new(Line {
				echo: VecDeque::new(),
				written: 0,
				read_back: 0,
				baud_rate: 0,
				flow_control: false,
				write_timeouts: 0,
				max_write_chunk: usize::MAX,
				corrupt_at: None,
				hangup_after: None,
			})),
		}
	}

	/// Put stale bytes on the line, as if a previous test left them behind.
	pub fn seed_input(&self, bytes: &[u8]) {
		self.line.lock().unwrap().echo.extend(bytes.iter().copied());
	}

	/// Fail the next `count` writes with a timeout.
	pub fn fail_writes(&self, count: u32) {
		self.line.lock().unwrap().write_timeouts = count;
	}

	/// Accept at most `len` bytes per write call.
	pub fn set_max_write_chunk(&self, len: usize) {
		self.line.lock().unwrap().max_write_chunk = len;
	}

	/// Corrupt the byte written at stream offset `offset`.
	pub fn corrupt_at(&self, offset: u64) {
		self.line.lock().unwrap().corrupt_at = Some(offset);
	}

	/// Hang up after `count` bytes were read back.
	pub fn hangup_after(&self, count: u64) {
		self.line.lock().unwrap().hangup_after = Some(count);
	}

	/// Total bytes accepted by writes so far.
	pub fn written(&self) -> u64 {
		self.line.lock().unwrap().written
	}

	/// Most recently configured baud rate.
	pub fn baud_rate(&self) -> u32 {
		self.line.lock().unwrap().baud_rate
	}

	/// Most recently configured flow control state.
	pub fn flow_control(&self) -> bool {
		self.line.lock().unwrap().flow_control
	}
}

impl SerialPort for MockSerialPort {
	type Error = std::io::Error;

	fn set_baud_rate(&self, baud_rate: u32) -> Result<(), Self::Error> {
		self.line.lock().unwrap().baud_rate = baud_rate;
		Ok(())
	}

	fn set_rts_cts(&self, enabled: bool) -> Result<(), Self::Error> {
		self.line.lock().unwrap().flow_control = enabled;
		Ok(())
	}

	fn discard_input_buffer(&self) -> Result<(), Self::Error> {
		self.line.lock().unwrap().echo.clear();
		Ok(())
	}

	fn read(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
		let deadline = Instant::now() + timeout;
		loop {
			{
				let mut line = self.line.lock().unwrap();
				if let Some(limit) = line.hangup_after {
					if line.read_back >= limit {
						trace!("hanging up after {} byte(s) read back", line.read_back);
						return Ok(0);
					}
				}
				if !line.echo.is_empty() {
					let len = buffer.len().min(line.echo.len());
					for (target, byte) in buffer.iter_mut().zip(line.echo.drain(..len)) {
						*target = byte;
					}
					line.read_back += len as u64;
					return Ok(len);
				}
			}
			if Instant::now() >= deadline {
				return Err(std::io::ErrorKind::TimedOut.into());
			}
			std::thread::sleep(Duration::from_micros(200));
		}
	}

	fn write(&self, buffer: &[u8], timeout: Duration) -> Result<usize, Self::Error> {
		{
			let mut line = self.line.lock().unwrap();
			if line.write_timeouts > 0 {
				line.write_timeouts -= 1;
				trace!("timing out a write, {} injected timeout(s) left", line.write_timeouts);
			} else {
				let len = buffer.len().min(line.max_write_chunk);
				for (offset, &byte) in buffer[..len].iter().enumerate() {
					let stream_offset = line.written + offset as u64;
					if line.corrupt_at == Some(stream_offset) {
						trace!("corrupting the byte at stream offset {}", stream_offset);
						line.echo.push_back(byte ^ 0x20);
					} else {
						line.echo.push_back(byte);
					}
				}
				line.written += len as u64;
				return Ok(len);
			}
		}
		// A real port would block this long before giving up.
		std::thread::sleep(timeout);
		Err(std::io::ErrorKind::TimedOut.into())
	}

	fn is_timeout_error(error: &Self::Error) -> bool {
		error.kind() == std::io::ErrorKind::TimedOut
	}
}
