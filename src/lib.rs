#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod codec;
mod driver;
mod eh;
mod error;
pub mod gpio;
pub mod i2c;
mod memory;
pub mod settings;
pub mod status;
pub mod transport;

pub use driver::Mcp2221;
pub use error::Error;
pub use memory::MemoryTarget;
