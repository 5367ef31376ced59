//! Database exception analyzer
//!
//! Recognizes persistence-layer errors by type (JDBC, JPA, Hibernate, Mongo,
//! Spring DAO) or by message, and sorts them into connection, constraint,
//! authentication, schema and query failures.

use crate::analysis::strategy::lowercase_message;
use crate::analysis::{
    build_base_context, extract_root_cause, AnalysisError, AnalysisStrategy,
    ClassificationResult, DatabaseFailure, ErrorCategory, Raised, Recognizer,
    INTERNAL_SERVER_ERROR,
};

/// Default dispatch priority.
pub const DATABASE_PRIORITY: i32 = 100;

/// Default connection timeout threshold reported with connection failures.
pub const DEFAULT_TIMEOUT_THRESHOLD_MS: u64 = 30_000;

const DATABASE_TYPES: &[&str] = &[
    "org.springframework.dao.DataAccessException",
    "java.sql.SQLException",
    "javax.persistence.PersistenceException",
    "org.hibernate.HibernateException",
    "com.mongodb.MongoException",
    "org.springframework.jdbc.CannotGetJdbcConnectionException",
    "org.springframework.dao.DataIntegrityViolationException",
];

const DATABASE_PATTERNS: &[&str] = &[
    r"(?i)connection.*refused",
    r"(?i)timeout",
    r"(?i)duplicate.*key",
    r"(?i)table.*doesn't exist",
    r"(?i)access denied",
    r"(?i)unknown database",
    r"(?i)syntax error",
];

/// Classifies database failures.
#[derive(Debug, Clone)]
pub struct DatabaseAnalyzer {
    recognizer: Recognizer,
    priority: i32,
    timeout_threshold_ms: u64,
}

impl Default for DatabaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseAnalyzer {
    /// Creates the analyzer with its default priority and options.
    pub fn new() -> Self {
        Self {
            recognizer: Recognizer::new(DATABASE_TYPES, DATABASE_PATTERNS),
            priority: DATABASE_PRIORITY,
            timeout_threshold_ms: DEFAULT_TIMEOUT_THRESHOLD_MS,
        }
    }

    /// Overrides the dispatch priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Threshold reported with connection failures.
    pub fn with_timeout_threshold_ms(mut self, threshold: u64) -> Self {
        self.timeout_threshold_ms = threshold;
        self
    }

    /// Maps a lowercased message to a failure subtype. First match wins.
    pub fn categorize(message: &str) -> DatabaseFailure {
        if message.contains("connection")
            && (message.contains("refused") || message.contains("timeout"))
        {
            DatabaseFailure::ConnectionFailure
        } else if message.contains("duplicate") || message.contains("constraint") {
            DatabaseFailure::ConstraintViolation
        } else if message.contains("access denied") || message.contains("authentication") {
            DatabaseFailure::AuthenticationFailure
        } else if message.contains("table") && message.contains("exist") {
            DatabaseFailure::SchemaError
        } else if message.contains("syntax") {
            DatabaseFailure::QueryError
        } else {
            DatabaseFailure::GenericError
        }
    }

    /// Remediation text and recoverability per subtype.
    pub fn remediation(failure: DatabaseFailure) -> (&'static str, bool) {
        match failure {
            DatabaseFailure::ConnectionFailure => (
                "Check database server status, connection URL, and network connectivity",
                true,
            ),
            DatabaseFailure::AuthenticationFailure => {
                ("Verify database credentials and user permissions", false)
            }
            DatabaseFailure::ConstraintViolation => (
                "Check data integrity constraints and unique key violations",
                true,
            ),
            DatabaseFailure::SchemaError => ("Verify database schema and table existence", false),
            DatabaseFailure::QueryError => ("Review SQL syntax and query structure", true),
            DatabaseFailure::GenericError => {
                ("Check database configuration and connectivity", false)
            }
        }
    }
}

impl AnalysisStrategy for DatabaseAnalyzer {
    fn name(&self) -> &str {
        "Database"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_analyze(&self, error: &dyn Raised) -> bool {
        self.recognizer.recognizes(error)
    }

    fn analyze(&self, error: &dyn Raised) -> Result<ClassificationResult, AnalysisError> {
        let root_cause = extract_root_cause(error);
        let failure = Self::categorize(&lowercase_message(error));
        let (remediation, recoverable) = Self::remediation(failure);

        let mut context = build_base_context(error);
        if failure == DatabaseFailure::ConnectionFailure {
            context.insert(
                "timeoutThresholdMs".into(),
                self.timeout_threshold_ms.into(),
            );
        }

        Ok(ClassificationResult::new(
            ErrorCategory::Database(failure),
            format!("DB_{}", failure.code()),
            format!("Database {}", failure.display_name()),
        )
        .with_status(INTERNAL_SERVER_ERROR)
        .with_message(Some(root_cause.as_str()))
        .with_root_cause(root_cause.as_str())
        .with_context(context)
        .with_tags(["database".to_string(), failure.code().to_lowercase()])
        .with_remediation(remediation)
        .recoverable(recoverable))
    }
}
