mod json_logging;

pub use json_logging::*;
