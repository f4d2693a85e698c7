pub mod mock_serial_port;

pub use mock_serial_port::MockSerialPort;
