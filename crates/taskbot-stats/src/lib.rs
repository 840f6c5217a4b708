pub mod parser;
pub mod scanner;
pub mod types;

pub use parser::{parse_line, STATS_MARKER};
pub use scanner::LogScanner;
pub use types::{CommandCount, LogStats, UsageEvent};
