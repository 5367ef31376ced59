//! Built-in analysis strategies.

pub mod database;
pub mod test_context;
pub mod test_execution;

pub use database::{DatabaseAnalyzer, DATABASE_PRIORITY};
pub use test_context::{TestContextAnalyzer, TEST_CONTEXT_PRIORITY};
pub use test_execution::{TestExecutionAnalyzer, TEST_EXECUTION_PRIORITY};
