mod license_header;

pub use license_header::*;
