//! Process-wide setup performed once by the binary.

mod logger;

pub use logger::init_logger_with;
