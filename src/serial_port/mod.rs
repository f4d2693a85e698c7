//! [`SerialPort`] trait to support exercising different serial port implementations.

use std::time::Duration;

#[cfg(feature = "serial2")]
pub mod serial2;

/// The raw byte stream device a sweep runs against.
///
/// The implementor must present an already-open channel configured for 8 bit
/// characters, 1 stop bit and no parity. All methods take `&self` so one port
/// can be shared between the transmit and receive threads: the transmitter
/// only writes, the receiver only reads.
///
/// Reads and writes take a timeout bounding the wait for readiness. A result
/// classified by [`Self::is_timeout_error`] means "nothing was ready within
/// the timeout, try again"; it is never treated as a failure. Any other error
/// is fatal for the run.
pub trait SerialPort {
	/// The error type returned by the serial port.
	type Error;

	/// Reconfigure the port for a new baud rate.
	fn set_baud_rate(&self, baud_rate: u32) -> Result<(), Self::Error>;

	/// Enable or disable RTS/CTS flow control.
	fn set_rts_cts(&self, enabled: bool) -> Result<(), Self::Error>;

	/// Discard all bytes currently buffered on the input side.
	fn discard_input_buffer(&self) -> Result<(), Self::Error>;

	/// Wait up to `timeout` for input, then read available bytes.
	///
	/// Returns the number of bytes read. A return of zero means the device
	/// hung up. A timeout error means no byte arrived within `timeout`.
	fn read(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;

	/// Wait up to `timeout` for room in the output buffer, then write.
	///
	/// May accept fewer bytes than offered. A timeout error means the device
	/// accepted nothing within `timeout`.
	fn write(&self, buffer: &[u8], timeout: Duration) -> Result<usize, Self::Error>;

	/// Check if an error is the transient "try again" result of a timed out
	/// read or write.
	fn is_timeout_error(error: &Self::Error) -> bool;
}
