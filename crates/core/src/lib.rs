#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

#[macro_use]
pub mod environment;

mod artifacts;
mod checksums;
mod error;
mod filter;
mod formatter;
mod func;
pub mod license_header;
mod signature;
mod step;

pub use artifacts::*;
pub use checksums::*;
pub use error::*;
pub use filter::*;
pub use formatter::*;
pub use func::*;
pub use signature::*;
pub use step::*;
