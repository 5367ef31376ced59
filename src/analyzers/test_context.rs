//! Test application context analyzer
//!
//! Recognizes failures raised while a test application context is being
//! bootstrapped: missing or broken beans, circular dependencies and
//! transaction configuration errors.

use serde_json::{Map, Value};

use crate::analysis::strategy::lowercase_message;
use crate::analysis::{
    build_base_context, extract_root_cause, AnalysisError, AnalysisStrategy,
    ClassificationResult, ContextFailure, ErrorCategory, Raised, Recognizer,
    INTERNAL_SERVER_ERROR,
};

/// Default dispatch priority.
pub const TEST_CONTEXT_PRIORITY: i32 = 80;

const CONTEXT_TYPES: &[&str] = &[
    "org.springframework.test.context.TestContextException",
    "org.springframework.test.context.ContextLoadException",
    "org.springframework.beans.factory.BeanCreationException",
    "org.springframework.beans.factory.NoSuchBeanDefinitionException",
    "org.springframework.boot.test.context.SpringBootTestContextBootstrapper",
    "org.springframework.test.context.transaction.TransactionConfigurationError",
];

const CONTEXT_PATTERNS: &[&str] = &[
    r"(?i)failed to load.*applicationcontext",
    r"(?i)no qualifying bean",
    r"(?i)bean.*could not be found",
    r"(?i)circular dependency",
    r"(?i)test.*configuration.*error",
    r"(?i)@springboottest",
    r"(?i)test.*context.*failed",
];

/// Classifies test context failures.
#[derive(Debug, Clone)]
pub struct TestContextAnalyzer {
    recognizer: Recognizer,
    priority: i32,
    show_context_details: bool,
}

impl Default for TestContextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContextAnalyzer {
    /// Creates the analyzer with its default priority and options.
    pub fn new() -> Self {
        Self {
            recognizer: Recognizer::new(CONTEXT_TYPES, CONTEXT_PATTERNS),
            priority: TEST_CONTEXT_PRIORITY,
            show_context_details: true,
        }
    }

    /// Overrides the dispatch priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether bean details parsed from the message are added to the context.
    pub fn with_context_details(mut self, show: bool) -> Self {
        self.show_context_details = show;
        self
    }

    /// Maps the short type name and lowercased message to a failure subtype.
    pub fn categorize(short_type_name: &str, message: &str) -> ContextFailure {
        if message.contains("failed to load") && message.contains("context") {
            ContextFailure::ContextLoadFailure
        } else if short_type_name.contains("NoSuchBeanDefinitionException")
            || message.contains("no qualifying bean")
        {
            ContextFailure::BeanNotFound
        } else if short_type_name.contains("BeanCreationException") {
            ContextFailure::BeanCreationFailure
        } else if message.contains("circular dependency") {
            ContextFailure::CircularDependency
        } else if message.contains("transaction") {
            ContextFailure::TransactionConfigError
        } else {
            ContextFailure::GenericContextError
        }
    }

    /// Suggested fix for a failure subtype.
    pub fn remediation(failure: ContextFailure) -> &'static str {
        match failure {
            ContextFailure::ContextLoadFailure => {
                "Check @SpringBootTest configuration, component scanning paths, \
                 and ensure all required beans are available in test context."
            }
            ContextFailure::BeanNotFound => {
                "Add missing bean to test configuration or use @MockBean/@SpyBean \
                 to provide test doubles."
            }
            ContextFailure::BeanCreationFailure => {
                "Review bean dependencies and configuration. Check for missing \
                 properties or circular dependencies."
            }
            ContextFailure::CircularDependency => {
                "Refactor bean dependencies to remove circular references. \
                 Consider using @Lazy annotation or constructor injection."
            }
            ContextFailure::TransactionConfigError => {
                "Review @Transactional configuration and transaction manager setup \
                 in test context."
            }
            ContextFailure::GenericContextError => {
                "Review test context configuration and Spring Boot test setup."
            }
        }
    }

    fn details(&self, error: &dyn Raised, failure: ContextFailure) -> Map<String, Value> {
        let mut context = build_base_context(error);
        context.insert("contextFailureType".into(), failure.code().into());
        context.insert("springTestContext".into(), true.into());

        if !self.show_context_details {
            return context;
        }
        if let Some(message) = error.message().filter(|m| m.contains("bean")) {
            context.insert("beanRelated".into(), true.into());
            if let Some(bean) = quoted_span(message) {
                context.insert("missingBean".into(), bean.into());
            }
        }
        context
    }
}

/// Text between the first and last single quote, when they differ.
fn quoted_span(message: &str) -> Option<&str> {
    let first = message.find('\'')?;
    let last = message.rfind('\'')?;
    (last > first).then(|| &message[first + 1..last])
}

impl AnalysisStrategy for TestContextAnalyzer {
    fn name(&self) -> &str {
        "TestContext"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_analyze(&self, error: &dyn Raised) -> bool {
        self.recognizer.recognizes(error)
    }

    fn analyze(&self, error: &dyn Raised) -> Result<ClassificationResult, AnalysisError> {
        let root_cause = extract_root_cause(error);
        let failure = Self::categorize(error.short_type_name(), &lowercase_message(error));

        Ok(ClassificationResult::new(
            ErrorCategory::TestContext(failure),
            format!("TEST_CONTEXT_{}", failure.code()),
            format!("Test Context {}", failure.display_name()),
        )
        .with_status(INTERNAL_SERVER_ERROR)
        .with_message(Some(root_cause.as_str()))
        .with_root_cause(root_cause.as_str())
        .with_context(self.details(error, failure))
        .with_tags([
            "test".to_string(),
            "context".to_string(),
            "spring".to_string(),
            failure.code().to_lowercase(),
        ])
        .with_remediation(Self::remediation(failure))
        .recoverable(true))
    }
}
