mod scalafmt;

pub use scalafmt::*;
