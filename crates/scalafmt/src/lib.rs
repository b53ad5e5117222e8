#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

//! Formats Scala sources with a scalafmt release loaded from its own
//! isolated set of WebAssembly modules.

pub mod api;
mod step;
mod version;
pub mod wasm;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use step::*;
pub use version::*;
