pub mod timespec;
pub mod format;

pub use format::{parse_search_string, parse_syntax, TimeSearchFormat};
pub use timespec::{TimeSpec, TimeValue};
