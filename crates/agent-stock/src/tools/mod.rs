//! Tools bound to the team's agents

pub mod analyze;
pub mod report;
pub mod search;

pub use analyze::{AnalyzeStockTool, LATEST_CHART};
pub use report::{Extraction, ReportFormat, SaveReportTool, SavedReport};
pub use search::{SearchResult, WebSearchTool};
