mod git;
mod step;

pub use git::*;
pub use step::*;
