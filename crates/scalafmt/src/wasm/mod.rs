mod classpath;
mod instance;

pub use classpath::*;
pub use instance::*;
