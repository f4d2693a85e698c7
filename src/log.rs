#[cfg(feature = "log")]
macro_rules! trace {
	($($args:tt)*) => { ::log::trace!($($args)*) }
}

#[cfg(feature = "log")]
macro_rules! debug {
	($($args:tt)*) => { ::log::debug!($($args)*) }
}

#[cfg(feature = "log")]
macro_rules! info {
	($($args:tt)*) => { ::log::info!($($args)*) }
}

#[cfg(feature = "log")]
macro_rules! warn {
	($($args:tt)*) => { ::log::warn!($($args)*) }
}

#[cfg(feature = "log")]
macro_rules! error {
	($($args:tt)*) => { ::log::error!($($args)*) }
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
	($($args:tt)*) => {}
}

#[cfg(not(feature = "log"))]
macro_rules! debug {
	($($args:tt)*) => {}
}

#[cfg(not(feature = "log"))]
macro_rules! info {
	($($args:tt)*) => {}
}

#[cfg(not(feature = "log"))]
macro_rules! warn {
	($($args:tt)*) => {}
}

#[cfg(not(feature = "log"))]
macro_rules! error {
	($($args:tt)*) => {}
}
