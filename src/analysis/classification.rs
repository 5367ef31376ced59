//! Classification types produced by the analysis engine
//!
//! A [`ClassificationResult`] describes a raised error by category, error code,
//! remediation and recoverability. Categories carry the analyzer-specific
//! failure subtype, in the same way a recovery category carries its reason.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// HTTP-like status used by every built-in classification.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// The category of a classified error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Persistence layer failures.
    Database(DatabaseFailure),
    /// Assertion, mock and verification failures raised by test frameworks.
    TestExecution(TestFailure),
    /// Failures bringing up a test application context.
    TestContext(ContextFailure),
    /// No analyzer matched while the process was starting.
    Startup,
    /// No analyzer matched.
    Unknown,
    /// Category label supplied by a custom strategy.
    Custom(String),
}

impl ErrorCategory {
    /// The upper-case label written to payloads and reports.
    pub fn label(&self) -> &str {
        match self {
            Self::Database(_) => "DATABASE",
            Self::TestExecution(_) => "TEST",
            Self::TestContext(_) => "TEST_CONTEXT",
            Self::Startup => "STARTUP",
            Self::Unknown => "UNKNOWN",
            Self::Custom(label) => label,
        }
    }

    /// The subtype code, e.g. `CONNECTION_FAILURE`, when the category has one.
    pub fn subtype(&self) -> Option<&'static str> {
        match self {
            Self::Database(failure) => Some(failure.code()),
            Self::TestExecution(failure) => Some(failure.code()),
            Self::TestContext(failure) => Some(failure.code()),
            Self::Startup | Self::Unknown | Self::Custom(_) => None,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ErrorCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Database failure subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatabaseFailure {
    /// The server refused the connection or timed out.
    ConnectionFailure,
    /// Credentials or permissions were rejected.
    AuthenticationFailure,
    /// A unique key or integrity constraint was violated.
    ConstraintViolation,
    /// A referenced table does not exist.
    SchemaError,
    /// The statement has a syntax error.
    QueryError,
    /// Any other database failure.
    GenericError,
}

impl DatabaseFailure {
    /// Upper-case code appended to the analyzer's error code prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConnectionFailure => "CONNECTION_FAILURE",
            Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::QueryError => "QUERY_ERROR",
            Self::GenericError => "GENERIC_ERROR",
        }
    }

    /// Human-readable name used in titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ConnectionFailure => "Connection Failure",
            Self::AuthenticationFailure => "Authentication Failure",
            Self::ConstraintViolation => "Data Constraint Violation",
            Self::SchemaError => "Schema Error",
            Self::QueryError => "Query Error",
            Self::GenericError => "Database Error",
        }
    }
}

/// Test execution failure subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestFailure {
    /// An assertion or comparison did not hold.
    AssertionFailure,
    /// A mock was misconfigured.
    MockFailure,
    /// A mock interaction was not verified.
    VerificationFailure,
    /// The test application context failed to load.
    ContextLoadFailure,
    /// Any other test failure.
    GenericTestFailure,
}

impl TestFailure {
    /// Upper-case code appended to the analyzer's error code prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AssertionFailure => "ASSERTION_FAILURE",
            Self::MockFailure => "MOCK_FAILURE",
            Self::VerificationFailure => "VERIFICATION_FAILURE",
            Self::ContextLoadFailure => "CONTEXT_LOAD_FAILURE",
            Self::GenericTestFailure => "GENERIC_TEST_FAILURE",
        }
    }

    /// Human-readable name used in titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AssertionFailure => "Assertion Failure",
            Self::MockFailure => "Mock Configuration Failure",
            Self::VerificationFailure => "Mock Verification Failure",
            Self::ContextLoadFailure => "Test Context Load Failure",
            Self::GenericTestFailure => "Test Execution Failure",
        }
    }
}

/// Test application context failure subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextFailure {
    /// The application context failed to load.
    ContextLoadFailure,
    /// No bean matched a required dependency.
    BeanNotFound,
    /// A bean could not be created.
    BeanCreationFailure,
    /// Beans depend on each other in a cycle.
    CircularDependency,
    /// Transaction management is misconfigured.
    TransactionConfigError,
    /// Any other context failure.
    GenericContextError,
}

impl ContextFailure {
    /// Upper-case code appended to the analyzer's error code prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContextLoadFailure => "CONTEXT_LOAD_FAILURE",
            Self::BeanNotFound => "BEAN_NOT_FOUND",
            Self::BeanCreationFailure => "BEAN_CREATION_FAILURE",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::TransactionConfigError => "TRANSACTION_CONFIG_ERROR",
            Self::GenericContextError => "GENERIC_CONTEXT_ERROR",
        }
    }

    /// Human-readable name used in titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ContextLoadFailure => "Load Failure",
            Self::BeanNotFound => "Bean Not Found",
            Self::BeanCreationFailure => "Bean Creation Failure",
            Self::CircularDependency => "Circular Dependency",
            Self::TransactionConfigError => "Transaction Configuration Error",
            Self::GenericContextError => "Configuration Error",
        }
    }
}

/// A classified error.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// HTTP-like status code.
    pub status: u16,
    /// Stable machine-readable code, e.g. `DB_QUERY_ERROR`.
    pub error_code: String,
    /// Short human-readable title.
    pub title: String,
    /// Human-readable message.
    pub message: Option<String>,
    /// `ShortTypeName: message` of the deepest cause.
    pub root_cause: String,
    /// Structured context, in insertion order.
    pub context: Map<String, Value>,
    /// Tags for filtering and dashboards.
    pub tags: BTreeSet<String>,
    /// Category and subtype.
    pub category: ErrorCategory,
    /// Suggested fix.
    pub remediation: String,
    /// Whether retrying after a fix is expected to succeed.
    pub recoverable: bool,
}

impl ClassificationResult {
    /// Creates a classification with an empty context, no tags and no message.
    ///
    /// The status defaults to [`INTERNAL_SERVER_ERROR`].
    pub fn new(
        category: ErrorCategory,
        error_code: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            status: INTERNAL_SERVER_ERROR,
            error_code: error_code.into(),
            title: title.into(),
            message: None,
            root_cause: String::new(),
            context: Map::new(),
            tags: BTreeSet::new(),
            category,
            remediation: String::new(),
            recoverable: false,
        }
    }

    /// Overrides the status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets or clears the message.
    pub fn with_message(mut self, message: Option<impl Into<String>>) -> Self {
        self.message = message.map(Into::into);
        self
    }

    /// Sets the root cause description.
    pub fn with_root_cause(mut self, root_cause: impl Into<String>) -> Self {
        self.root_cause = root_cause.into();
        self
    }

    /// Replaces the whole context map.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Adds a context key-value pair.
    pub fn add_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds tags. Duplicates collapse.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Sets the suggested fix.
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Marks whether retrying after a fix is expected to succeed.
    pub fn recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    /// Returns true if this classification came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        self.tags.contains("fallback")
    }

    /// Returns true if the error is a database failure.
    pub fn is_database(&self) -> bool {
        matches!(self.category, ErrorCategory::Database(_))
    }

    /// Returns true if the error came from a test framework or test context.
    pub fn is_test(&self) -> bool {
        matches!(
            self.category,
            ErrorCategory::TestExecution(_) | ErrorCategory::TestContext(_)
        )
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.title)
    }
}
