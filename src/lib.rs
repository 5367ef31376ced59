//! faultlens - pluggable exception classification
//!
//! Classifies raised errors (including their cause chains) with a registry of
//! analysis strategies, and renders the result as a uniform JSON error payload
//! or, at startup, as a human-readable failure report.
//!
//! ```
//! use faultlens::analysis::{AnalysisEngine, RaisedError};
//!
//! let engine = AnalysisEngine::with_default_analyzers();
//! let error = RaisedError::new("java.sql.SQLException").with_message("Access denied for user");
//! let result = engine.classify(&error);
//!
//! assert_eq!(result.error_code, "DB_AUTHENTICATION_FAILURE");
//! assert!(!result.recoverable);
//! ```

pub mod analysis;
pub mod analyzers;
pub mod config;
pub mod domain;
pub mod logging;
pub mod render;
pub mod response;
pub mod startup;

pub use analysis::{
    AnalysisEngine, AnalysisError, AnalysisStrategy, ClassificationResult, ErrorCategory, Raised,
    RaisedError,
};
pub use config::ExceptionProperties;
pub use domain::{DomainError, DomainErrorKind};
pub use response::{ErrorHandler, ErrorResponse, ResponseBuilder};
pub use startup::{FailureReport, StartupFailureReporter};
