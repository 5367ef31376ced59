//! Test framework exception analyzer
//!
//! Recognizes assertion, mock and verification failures raised by JUnit,
//! TestNG, Hamcrest and Mockito.

use serde_json::Value;

use crate::analysis::strategy::lowercase_message;
use crate::analysis::{
    build_base_context, extract_root_cause, AnalysisError, AnalysisStrategy,
    ClassificationResult, ErrorCategory, Raised, Recognizer, TestFailure,
    INTERNAL_SERVER_ERROR,
};

/// Default dispatch priority.
pub const TEST_EXECUTION_PRIORITY: i32 = 75;

/// Number of stack frames copied into the `stackTrace` context entry.
pub const CONTEXT_STACK_FRAMES: usize = 5;

const TEST_TYPES: &[&str] = &[
    "org.junit.ComparisonFailure",
    "org.junit.jupiter.api.AssertionFailedError",
    "java.lang.AssertionError",
    "org.mockito.exceptions.base.MockitoException",
    "org.mockito.exceptions.misusing.MockitoConfigurationException",
    "org.mockito.exceptions.verification.VerificationInOrderFailure",
    "org.mockito.exceptions.verification.WantedButNotInvoked",
    "org.hamcrest.AssertionError",
    "org.testng.AssertionError",
];

const TEST_PATTERNS: &[&str] = &[
    // JUnit
    r"(?i)expected.*but.*was",
    r"(?i)assertion.*failed",
    r"(?i)test.*failed",
    // Mockito
    r"(?i)wanted but not invoked",
    r"(?i)never wanted here",
    r"(?i)mock.*cannot be returned",
    r"(?i)argument.*should be provided",
    // Spring test runner
    r"(?i)failed to load.*applicationcontext",
    r"(?i)test.*execution.*failed",
];

/// Classifies test execution failures.
#[derive(Debug, Clone)]
pub struct TestExecutionAnalyzer {
    recognizer: Recognizer,
    priority: i32,
    include_stack_trace: bool,
}

impl Default for TestExecutionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExecutionAnalyzer {
    /// Creates the analyzer with its default priority and options.
    pub fn new() -> Self {
        Self {
            recognizer: Recognizer::new(TEST_TYPES, TEST_PATTERNS),
            priority: TEST_EXECUTION_PRIORITY,
            include_stack_trace: true,
        }
    }

    /// Overrides the dispatch priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the first stack frames are copied into the context.
    pub fn with_stack_trace(mut self, include: bool) -> Self {
        self.include_stack_trace = include;
        self
    }

    /// Maps the short type name and lowercased message to a failure subtype.
    pub fn categorize(short_type_name: &str, message: &str) -> TestFailure {
        if short_type_name.contains("ComparisonFailure")
            || (message.contains("expected") && message.contains("but"))
            || short_type_name.contains("AssertionError")
        {
            TestFailure::AssertionFailure
        } else if short_type_name.contains("MockitoException") {
            TestFailure::MockFailure
        } else if message.contains("context") && message.contains("load") {
            TestFailure::ContextLoadFailure
        } else if message.contains("verification") {
            TestFailure::VerificationFailure
        } else {
            TestFailure::GenericTestFailure
        }
    }

    /// Suggested fix for a failure subtype.
    pub fn remediation(failure: TestFailure) -> &'static str {
        match failure {
            TestFailure::AssertionFailure => {
                "Review test assertions and expected vs actual values. \
                 Check if the test logic matches the implementation behavior."
            }
            TestFailure::MockFailure => {
                "Review mock setup and configuration. Ensure mocks are properly \
                 initialized and behavior is correctly stubbed."
            }
            TestFailure::VerificationFailure => {
                "Check mock interaction verification. Ensure the expected method \
                 calls are being made with correct parameters."
            }
            TestFailure::ContextLoadFailure => {
                "Review Spring test configuration, component scanning, and test \
                 context setup. Check for missing beans or configuration issues."
            }
            TestFailure::GenericTestFailure => {
                "Review test implementation and check for logical errors or setup issues."
            }
        }
    }

    /// Test framework inferred from the fully qualified type name.
    /// Test framework inferred from the type name prefix.
    pub fn detect_framework(type_name: &str) -> &'static str {
        if type_name.starts_with("org.junit.jupiter") {
            "JUnit 5"
        } else if type_name.starts_with("org.junit") {
            "JUnit 4"
        } else if type_name.starts_with("org.testng") {
            "TestNG"
        } else if type_name.starts_with("org.mockito") {
            "Mockito"
        } else {
            "Unknown"
        }
    }
}

impl AnalysisStrategy for TestExecutionAnalyzer {
    fn name(&self) -> &str {
        "TestExecution"
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

        let mut context = build_base_context(error);
        context.insert(
            "testFramework".into(),
            Self::detect_framework(error.type_name()).into(),
        );
        context.insert("failureType".into(), failure.code().into());
        if self.include_stack_trace && !error.stack_frames().is_empty() {
            let frames: Vec<Value> = error
                .stack_frames()
                .iter()
                .take(CONTEXT_STACK_FRAMES)
                .map(|frame| Value::from(frame.as_str()))
                .collect();
            context.insert("stackTrace".into(), Value::Array(frames));
        }

        Ok(ClassificationResult::new(
            ErrorCategory::TestExecution(failure),
            format!("TEST_{}", failure.code()),
            format!("Test {}", failure.display_name()),
        )
        .with_status(INTERNAL_SERVER_ERROR)
        .with_message(Some(root_cause.as_str()))
        .with_root_cause(root_cause.as_str())
        .with_context(context)
        .with_tags([
            "test".to_string(),
            "failure".to_string(),
            failure.code().to_lowercase(),
        ])
        .with_remediation(Self::remediation(failure))
        .recoverable(true))
    }
}
