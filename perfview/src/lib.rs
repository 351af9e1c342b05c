pub mod annotation;
pub mod event_table;
pub mod render;
pub mod report;
pub mod severity;

pub use annotation::{annotate, correlate, CorrelatedLine, Correlation, Disassembly};
pub use event_table::{build_event_table, EventRow, EventTable};
pub use report::{parse_report, Hotspot, Report, ReportLine};
pub use severity::{HotThreshold, SeverityBucket, SEVERITY_LEVELS};
