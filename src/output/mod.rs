//! Report structures, formatters and file output

pub mod csv_export;
pub mod formatter;
pub mod report;

pub use formatter::{save_bytes_to_file, save_report_to_file, OutputFormatter, ReportGenerator};
pub use report::{AnalyticsReport, MatchReport, RankingReport, ReportMetadata, SkippedResume};
