//! Trait implementation using the `serial2` crate.

use std::time::Duration;

impl crate::SerialPort for serial2::SerialPort {
	type Error = std::io::Error;

	fn set_baud_rate(&self, baud_rate: u32) -> Result<(), Self::Error> {
		// Reconfiguration needs a mutable port. A clone shares the underlying
		// file descriptor, so settings applied through it stick to this port.
		let mut port = self.try_clone()?;
		let mut settings = port.get_configuration()?;
		settings.set_baud_rate(baud_rate)?;
		port.set_configuration(&settings)?;
		Ok(())
	}

	fn set_rts_cts(&self, enabled: bool) -> Result<(), Self::Error> {
		let mut port = self.try_clone()?;
		let mut settings = port.get_configuration()?;
		if enabled {
			settings.set_flow_control(serial2::FlowControl::RtsCts);
		} else {
			settings.set_flow_control(serial2::FlowControl::None);
		}
		port.set_configuration(&settings)?;
		Ok(())
	}

	fn discard_input_buffer(&self) -> Result<(), Self::Error> {
		serial2::SerialPort::discard_input_buffer(self)
	}

	fn read(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
		// Timeouts live on the handle, not on the file descriptor, so the
		// read has to go through the same clone the timeout was set on.
		let mut port = self.try_clone()?;
		port.set_read_timeout(timeout)?;
		serial2::SerialPort::read(&port, buffer)
	}

	fn write(&self, buffer: &[u8], timeout: Duration) -> Result<usize, Self::Error> {
		let mut port = self.try_clone()?;
		port.set_write_timeout(timeout)?;
		serial2::SerialPort::write(&port, buffer)
	}

	fn is_timeout_error(error: &Self::Error) -> bool {
		error.kind() == std::io::ErrorKind::TimedOut
	}
}
