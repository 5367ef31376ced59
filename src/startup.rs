//! Startup failure reporting
//!
//! Used only while the process is being brought up. Strategies are ordered by
//! priority, highest value first, and the first one that recognizes the error
//! classifies it. This is the reverse of the request-time engine, which picks
//! the smallest priority value; both orders are kept on purpose.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::analysis::{
    extract_root_cause, AnalysisError, AnalysisEngine, AnalysisStrategy, ClassificationResult,
    ErrorCategory, Raised, INTERNAL_SERVER_ERROR,
};
use crate::config::{ExceptionProperties, STARTUP_PRIORITY};

/// Description and suggested action for a startup failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    pub description: String,
    pub action: String,
}

impl FailureReport {
    /// The report emitted when analysis itself fails.
    pub fn unexpected() -> Self {
        Self {
            description: "Unexpected Startup Failure\n\n\
                          An unexpected error occurred during application startup."
                .to_string(),
            action: "Check the full stack trace and application configuration.".to_string(),
        }
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.description, self.action)
    }
}

/// Classifies errors raised during startup and formats them as reports.
#[derive(Clone)]
pub struct StartupFailureReporter {
    strategies: Vec<Arc<dyn AnalysisStrategy>>,
    priority: i32,
}

impl StartupFailureReporter {
    /// Sorts `strategies` by priority, highest first. Equal priorities keep
    /// their registration order.
    pub fn new(mut strategies: Vec<Arc<dyn AnalysisStrategy>>) -> Self {
        strategies.sort_by_key(|strategy| std::cmp::Reverse(strategy.priority()));
        info!(
            "Startup failure reporter initialized with {} analyzers",
            strategies.len()
        );
        Self {
            strategies,
            priority: STARTUP_PRIORITY,
        }
    }

    /// Uses the strategies registered in a request-time engine.
    pub fn from_engine(engine: &AnalysisEngine) -> Self {
        Self::new(engine.strategies().to_vec())
    }

    /// Builds the reporter over the enabled analyzers, or `None` when startup
    /// reporting (or the whole library) is switched off.
    pub fn from_properties(properties: &ExceptionProperties) -> Option<Self> {
        if !properties.enabled || !properties.startup_analyzer.enabled {
            info!("Startup failure reporting is disabled");
            return None;
        }
        let engine = AnalysisEngine::from_properties(properties);
        Some(Self::from_engine(&engine).with_priority(properties.startup_analyzer.priority))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Precedence of this reporter among other startup failure handlers.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Strategies in dispatch order.
    pub fn strategies(&self) -> &[Arc<dyn AnalysisStrategy>] {
        &self.strategies
    }

    /// The first strategy, in descending priority order, that recognizes `error`.
    pub fn select(&self, error: &dyn Raised) -> Option<&dyn AnalysisStrategy> {
        self.strategies
            .iter()
            .find(|strategy| strategy.can_analyze(error))
            .map(|strategy| strategy.as_ref())
    }

    /// Classifies a startup error.
    pub fn classify(&self, error: &dyn Raised) -> Result<ClassificationResult, AnalysisError> {
        match self.select(error) {
            Some(strategy) => {
                debug!("Using analyzer: {}", strategy.name());
                strategy.analyze(error)
            }
            None => Ok(default_analysis(error)),
        }
    }

    /// Builds the report for a startup error. Never fails.
    pub fn report(&self, failure: &dyn Raised) -> FailureReport {
        match self.classify(failure) {
            Ok(result) => {
                error!(
                    "Application startup failed - {}: {}",
                    result.error_code, result.root_cause
                );
                FailureReport {
                    description: format_description(&result),
                    action: format_action(&result),
                }
            }
            Err(e) => {
                error!("Error during exception analysis: {}", e);
                FailureReport::unexpected()
            }
        }
    }
}

impl std::fmt::Debug for StartupFailureReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupFailureReporter")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("priority", &self.priority)
            .finish()
    }
}

fn default_analysis(error: &dyn Raised) -> ClassificationResult {
    ClassificationResult::new(
        ErrorCategory::Startup,
        "UNKNOWN_STARTUP_FAILURE",
        "Unknown Startup Failure",
    )
    .with_status(INTERNAL_SERVER_ERROR)
    .with_message(error.message())
    .with_root_cause(extract_root_cause(error))
    .with_tags(["startup", "unknown"])
    .with_remediation("Check application logs, configuration, and dependencies")
    .recoverable(false)
}

fn format_description(result: &ClassificationResult) -> String {
    let mut description = format!("{}\n\n", result.title);
    description.push_str(&format!("Error Code: {}\n", result.error_code));
    description.push_str(&format!("Category: {}\n", result.category));
    description.push_str(&format!("Root Cause: {}\n", result.root_cause));

    if !result.context.is_empty() {
        description.push_str("\nContext:\n");
        for (key, value) in &result.context {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            description.push_str(&format!("  - {}: {}\n", key, value));
        }
    }
    description
}

fn format_action(result: &ClassificationResult) -> String {
    let mut action = String::from("Recommended Actions:\n\n");
    action.push_str(&format!("1. {}\n", result.remediation));

    if result.recoverable {
        action.push_str("2. This issue is potentially recoverable - retry after fixing\n");
    } else {
        action.push_str("2. This is a critical issue requiring immediate attention\n");
    }

    if !result.tags.is_empty() {
        let tags: Vec<&str> = result.tags.iter().map(String::as_str).collect();
        action.push_str(&format!("3. Related tags: {}\n", tags.join(", ")));
    }
    action
}
