#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

mod config;
mod encoding;
mod factory;
mod file_locator;
pub mod generic;
mod plugin_config;
mod provisioner;
pub mod scala;

pub use config::*;
pub use encoding::*;
pub use factory::*;
pub use file_locator::*;
pub use plugin_config::*;
pub use provisioner::*;
