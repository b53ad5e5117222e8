#[macro_use]
mod environment;
mod real_environment;
#[cfg(any(test, feature = "testing"))]
mod test_environment;

pub use environment::*;
pub use real_environment::*;

#[cfg(any(test, feature = "testing"))]
pub use test_environment::*;
