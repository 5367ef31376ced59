//! Request-time dispatch over the registered analysis strategies.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::raised::Raised;
use super::strategy::AnalysisStrategy;
use super::{ClassificationResult, ErrorCategory, INTERNAL_SERVER_ERROR};
use crate::analyzers::{DatabaseAnalyzer, TestContextAnalyzer, TestExecutionAnalyzer};
use crate::config::ExceptionProperties;

/// Selects the best strategy for a raised error and classifies it.
///
/// Among the strategies that can analyze an error, the one with the smallest
/// priority value wins; ties go to the strategy registered first. Every call
/// returns a classification: when nothing matches, or the selected analyzer
/// fails, a fallback classification is built from the error itself.
#[derive(Clone, Default)]
pub struct AnalysisEngine {
    strategies: Vec<Arc<dyn AnalysisStrategy>>,
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AnalysisEngine {
    /// Creates an engine over the given strategies, in registration order.
    pub fn new(strategies: Vec<Arc<dyn AnalysisStrategy>>) -> Self {
        Self { strategies }
    }

    /// Creates an engine with the built-in analyzers at their default priorities.
    pub fn with_default_analyzers() -> Self {
        Self::from_properties(&ExceptionProperties::default())
    }

    /// Registers the built-in analyzers enabled in `properties`.
    ///
    /// When the library is disabled the engine has no strategies and every
    /// error gets the fallback classification.
    pub fn from_properties(properties: &ExceptionProperties) -> Self {
        let mut engine = Self::default();
        if !properties.enabled {
            info!("Exception analysis disabled, using fallback classification only");
            return engine;
        }

        let database = &properties.database_analyzer;
        if database.enabled {
            engine.register(Arc::new(
                DatabaseAnalyzer::new()
                    .with_priority(database.priority)
                    .with_timeout_threshold_ms(database.timeout_threshold_ms),
            ));
        }

        let test = &properties.test_analyzer;
        if test.enabled {
            engine.register(Arc::new(
                TestExecutionAnalyzer::new()
                    .with_priority(test.priority)
                    .with_stack_trace(test.include_stack_trace),
            ));
        }

        let test_context = &properties.test_context_analyzer;
        if test_context.enabled {
            engine.register(Arc::new(
                TestContextAnalyzer::new()
                    .with_priority(test_context.priority)
                    .with_context_details(test_context.show_context_details),
            ));
        }

        info!(
            "Analysis engine initialized with {} analyzers",
            engine.strategy_count()
        );
        engine
    }

    /// Appends a strategy. Later registrations lose priority ties.
    pub fn register(&mut self, strategy: Arc<dyn AnalysisStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Registered strategies, in registration order.
    pub fn strategies(&self) -> &[Arc<dyn AnalysisStrategy>] {
        &self.strategies
    }

    /// The strategy that would classify `error`, if any.
    pub fn select(&self, error: &dyn Raised) -> Option<&dyn AnalysisStrategy> {
        self.strategies
            .iter()
            .filter(|strategy| strategy.can_analyze(error))
            .min_by_key(|strategy| strategy.priority())
            .map(|strategy| strategy.as_ref())
    }

    /// Classifies a raised error. Never fails.
    pub fn classify(&self, error: &dyn Raised) -> ClassificationResult {
        debug!("Analyzing exception: {}", error.type_name());

        let Some(strategy) = self.select(error) else {
            debug!("No analyzer matched {}", error.type_name());
            return fallback(error);
        };

        match strategy.analyze(error) {
            Ok(result) => {
                debug!("Analyzer {} produced {}", strategy.name(), result.error_code);
                result
            }
            Err(e) => {
                warn!("Analyzer {} failed: {}", strategy.name(), e);
                fallback(error)
            }
        }
    }
}

/// The classification returned when no analyzer handles an error.
pub fn fallback(error: &dyn Raised) -> ClassificationResult {
    let short_name = error.short_type_name();
    ClassificationResult::new(ErrorCategory::Unknown, "UNKNOWN_ERROR", short_name)
        .with_status(INTERNAL_SERVER_ERROR)
        .with_message(error.message())
        .with_root_cause(short_name)
        .add_context("exceptionType", error.type_name())
        .with_tags(["unknown", "fallback"])
        .with_remediation("Contact system administrator")
        .recoverable(false)
}
